//! Reverse-dependency resolution.
//!
//! Wraps [`PackageRepository::list_reverse_dependents`] with the two rules
//! every caller needs:
//!
//! - the queried package never appears in its own dependents
//! - a failed query means "no dependents"; it is logged and counted but
//!   never propagated

use crate::repository::PackageRepository;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{trace, warn};

pub struct DependencyResolver<'a> {
    repo: &'a dyn PackageRepository,
    failures: AtomicUsize,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(repo: &'a dyn PackageRepository) -> Self {
        Self {
            repo,
            failures: AtomicUsize::new(0),
        }
    }

    /// Packages depending on `package_id`, in repository order.
    pub fn reverse_dependents(&self, package_id: &str) -> Vec<String> {
        match self.repo.list_reverse_dependents(package_id) {
            Ok(dependents) => {
                let dependents: Vec<String> = dependents
                    .into_iter()
                    .filter(|d| d != package_id)
                    .collect();
                trace!(package = package_id, count = dependents.len(), "reverse dependents");
                dependents
            }
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!(package = package_id, "treating as no dependents: {}", e);
                Vec::new()
            }
        }
    }

    /// Queries that failed and were recovered as empty
    pub fn failure_count(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }
}
