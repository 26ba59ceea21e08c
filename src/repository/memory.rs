//! Deterministic in-memory repository.
//!
//! Holds a fixed package list and lets callers inject failures for single
//! queries or for enumeration as a whole. Every query is counted, so tests
//! can assert that projections never go back to the repository.

use super::PackageRepository;
use crate::error::{Result, TrackerError};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    installed: Vec<String>,
    dependents: HashMap<String, Vec<String>>,
    sizes: HashMap<String, u64>,
    fail_enumeration: bool,
    failing_dependents: HashSet<String>,
    failing_sizes: HashSet<String>,
    queries: AtomicUsize,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an installed package; enumeration returns packages in the order added.
    pub fn with_package<I, S>(mut self, id: &str, size: u64, dependents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.installed.push(id.to_string());
        self.sizes.insert(id.to_string(), size);
        self.dependents.insert(
            id.to_string(),
            dependents.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Make `list_installed` fail.
    pub fn failing_enumeration(mut self) -> Self {
        self.fail_enumeration = true;
        self
    }

    /// Make the reverse-dependency query for `id` fail.
    pub fn failing_dependents(mut self, id: &str) -> Self {
        self.failing_dependents.insert(id.to_string());
        self
    }

    /// Make the size lookup for `id` fail.
    pub fn failing_size(mut self, id: &str) -> Self {
        self.failing_sizes.insert(id.to_string());
        self
    }

    /// Total number of repository calls served so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn count_query(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
    }
}

impl PackageRepository for InMemoryRepository {
    fn list_installed(&self) -> Result<Vec<String>> {
        self.count_query();
        if self.fail_enumeration {
            return Err(TrackerError::enumeration("injected enumeration failure"));
        }
        Ok(self.installed.clone())
    }

    fn list_reverse_dependents(&self, package_id: &str) -> Result<Vec<String>> {
        self.count_query();
        if self.failing_dependents.contains(package_id) {
            return Err(TrackerError::dependency_query(package_id, "injected failure"));
        }
        Ok(self.dependents.get(package_id).cloned().unwrap_or_default())
    }

    fn raw_size(&self, package_id: &str) -> Result<u64> {
        self.count_query();
        if self.failing_sizes.contains(package_id) {
            return Err(TrackerError::size_lookup(package_id, "injected failure"));
        }
        Ok(self.sizes.get(package_id).copied().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumeration_preserves_insertion_order() {
        let repo = InMemoryRepository::new()
            .with_package("zlib", 1, ["curl"])
            .with_package("bash", 2, Vec::<String>::new());
        assert_eq!(repo.list_installed().unwrap(), vec!["zlib", "bash"]);
    }

    #[test]
    fn test_unknown_package_queries() {
        let repo = InMemoryRepository::new();
        assert!(repo.list_reverse_dependents("ghost-package").unwrap().is_empty());
        assert_eq!(repo.raw_size("ghost-package").unwrap(), 0);
        assert_eq!(repo.query_count(), 2);
    }

    #[test]
    fn test_injected_failures() {
        let repo = InMemoryRepository::new()
            .with_package("libfoo", 5, ["bar"])
            .failing_size("libfoo")
            .failing_dependents("libfoo")
            .failing_enumeration();

        assert!(repo.list_installed().is_err());
        assert!(repo.list_reverse_dependents("libfoo").is_err());
        assert!(repo.raw_size("libfoo").is_err());
    }
}
