//! Size aggregation and formatting.
//!
//! Byte arithmetic stays in integers; formatting into display units is a
//! separate step so callers (and tests) can work with raw byte counts.
//!
//! # Degenerate totals
//!
//! With a zero total the catalog is empty or every size is unknown.
//! [`percentage`] defines the share as 0 in that case.

use crate::repository::PackageRepository;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{trace, warn};

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Resolves and sums package sizes, absorbing lookup failures as 0 bytes.
pub struct SizeAggregator<'a> {
    repo: &'a dyn PackageRepository,
    failures: AtomicUsize,
}

impl<'a> SizeAggregator<'a> {
    pub fn new(repo: &'a dyn PackageRepository) -> Self {
        Self {
            repo,
            failures: AtomicUsize::new(0),
        }
    }

    /// Installed size of `package_id`; 0 when unknown or when the lookup fails.
    pub fn raw_size(&self, package_id: &str) -> u64 {
        match self.repo.raw_size(package_id) {
            Ok(bytes) => {
                trace!(package = package_id, bytes, "size resolved");
                bytes
            }
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!(package = package_id, "treating size as 0: {}", e);
                0
            }
        }
    }

    /// Sum of `raw_size` over `package_ids`.
    pub fn aggregate<I, S>(&self, package_ids: I) -> u64
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        aggregate_sizes(package_ids.into_iter().map(|id| self.raw_size(id.as_ref())))
    }

    /// Lookups that failed and were recovered as 0 bytes
    pub fn failure_count(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }
}

/// Sum already-resolved sizes, saturating instead of overflowing.
pub fn aggregate_sizes<I: IntoIterator<Item = u64>>(sizes: I) -> u64 {
    sizes.into_iter().fold(0u64, u64::saturating_add)
}

/// Megabytes with two decimals, e.g. `"2.00 MB"` (1 MB = 1024 * 1024 bytes).
pub fn to_display_unit(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / MB as f64)
}

/// Convert bytes to the largest fitting unit, same 1024 base and labels as
/// [`to_display_unit`].
pub fn humanize_size(bytes: u64) -> String {
    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        to_display_unit(bytes)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// `round(100 * part / whole)`, clamped to 0..=100.
///
/// A `whole` of 0 yields 0.
pub fn percentage(part_bytes: u64, whole_bytes: u64) -> u8 {
    if whole_bytes == 0 {
        return 0;
    }
    let part = u128::from(part_bytes);
    let whole = u128::from(whole_bytes);
    let rounded = (200 * part + whole) / (2 * whole);
    rounded.min(100) as u8
}
