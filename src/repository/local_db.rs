//! Size lookups against the pacman local database.
//!
//! Each installed package owns a directory `<db>/local/<name>-<ver>-<rel>/`
//! whose `desc` file lists `%FIELD%` headers followed by value lines. The
//! installed size is the line after `%SIZE%`.
//!
//! Lookup order for a package name:
//!
//! 1. a directory named exactly `<name>`
//! 2. the first directory, in lexical order, whose name starts with `<name>-`
//!
//! Rule 2 can match a different package of the same family (`python-` also
//! prefixes `python-requests-...`). Sorting makes the choice deterministic but
//! does not resolve the ambiguity; when more than one candidate exists it is
//! logged at debug level.
//!
//! Names that are not a single path component (`..`, `/etc`, `a/b`) never
//! match an entry. An entry without `%SIZE%` has an unknown size of 0.

use crate::error::{Result, TrackerError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const SIZE_FIELD: &str = "%SIZE%";

/// Read-only view of `<db_path>/local`
#[derive(Debug, Clone)]
pub struct LocalDb {
    local_dir: PathBuf,
}

impl LocalDb {
    /// `db_path` is the pacman database root, e.g. `/var/lib/pacman`.
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self {
            local_dir: db_path.as_ref().join("local"),
        }
    }

    /// Locate the metadata directory for `package_id`.
    pub fn find_entry(&self, package_id: &str) -> Result<Option<PathBuf>> {
        if !is_entry_name(package_id) {
            debug!(package = package_id, "not a package name, no entry");
            return Ok(None);
        }

        let exact = self.local_dir.join(package_id);
        if exact.is_dir() {
            return Ok(Some(exact));
        }

        let prefix = format!("{}-", package_id);
        let mut candidates: Vec<String> = fs::read_dir(&self.local_dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.starts_with(&prefix))
            .collect();
        candidates.sort();

        if candidates.len() > 1 {
            debug!(
                package = package_id,
                ?candidates,
                "ambiguous version-suffixed entries, using first"
            );
        }

        Ok(candidates
            .into_iter()
            .next()
            .map(|name| self.local_dir.join(name)))
    }

    /// Installed size of `package_id`; 0 when no entry exists or the entry
    /// carries no `%SIZE%` field.
    ///
    /// An unreadable `desc` or a malformed size value is an error.
    pub fn installed_size(&self, package_id: &str) -> Result<u64> {
        let Some(entry) = self.find_entry(package_id)? else {
            return Ok(0);
        };

        let desc = fs::read_to_string(entry.join("desc"))?;
        let Some(value) = size_field(&desc) else {
            debug!(package = package_id, "no {} in desc, size unknown", SIZE_FIELD);
            return Ok(0);
        };
        value.parse::<u64>().map_err(|e| {
            TrackerError::size_lookup(
                package_id,
                format!("malformed {} value {:?}: {}", SIZE_FIELD, value, e),
            )
        })
    }
}

/// A single non-empty path component other than `.` and `..`
fn is_entry_name(package_id: &str) -> bool {
    !package_id.is_empty()
        && !package_id.contains('/')
        && package_id != "."
        && package_id != ".."
}

/// The raw value line following `%SIZE%` in a `desc` file body.
pub fn size_field(desc: &str) -> Option<&str> {
    let mut lines = desc.lines();
    while let Some(line) = lines.next() {
        if line.trim() == SIZE_FIELD {
            return lines.next().map(str::trim);
        }
    }
    None
}
