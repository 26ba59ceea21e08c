//! Package repository adapters
//!
//! The catalog pipeline only talks to the package database through the
//! [`PackageRepository`] trait. Implementations:
//!
//! - [`PacmanRepository`]: shells out to `pacman`/`pactree` and reads sizes
//!   from the local database directory
//! - [`InMemoryRepository`]: fixed data with failure injection
//! - `AlpmRepository` (feature `alpm`): reads the local database via libalpm

#[cfg(feature = "alpm")]
pub mod alpm_db;
pub mod local_db;
pub mod memory;
pub mod pacman;

#[cfg(feature = "alpm")]
pub use alpm_db::AlpmRepository;
pub use local_db::LocalDb;
pub use memory::InMemoryRepository;
pub use pacman::PacmanRepository;

use crate::error::Result;

/// Abstract access to the installed-package database.
///
/// Implementations must be shareable across the builder's worker threads.
pub trait PackageRepository: Send + Sync {
    /// Installed package identifiers, in database order.
    ///
    /// Failure here is fatal for a catalog build and should be reported as
    /// [`TrackerError::Enumeration`](crate::error::TrackerError::Enumeration).
    fn list_installed(&self) -> Result<Vec<String>>;

    /// Packages that depend on `package_id`.
    ///
    /// The output may contain `package_id` itself; callers filter it out.
    /// Unknown packages yield an empty list or an error, never a panic.
    fn list_reverse_dependents(&self, package_id: &str) -> Result<Vec<String>>;

    /// Installed size in bytes; `Ok(0)` when the package is unknown.
    fn raw_size(&self, package_id: &str) -> Result<u64>;
}
