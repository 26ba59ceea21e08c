//! lftracker library
//!
//! Inventories installed packages, resolves which of them other packages
//! depend on, classifies them into sectors and reports disk usage.
//!
//! Data flows one way:
//!
//! ```text
//! PackageRepository → DependencyResolver / SectorClassifier / SizeAggregator
//!                   → CatalogBuilder → Catalog → view::apply → DisplayView
//! ```

pub mod catalog;
pub mod cli;
pub mod command_runner;
pub mod config_file;
pub mod error;
pub mod process_guard;
pub mod report;
pub mod repository;
pub mod resolver;
pub mod sector;
pub mod size;
pub mod store;
pub mod view;

// Re-export main types for convenience
pub use catalog::{BuildStats, Catalog, CatalogBuilder, PackageRecord};
pub use config_file::{Backend, TrackerConfig};
pub use error::{CommandError, Result, TrackerError};
pub use process_guard::{QueryProcessGroup, TrackedQuery};
pub use repository::{InMemoryRepository, LocalDb, PackageRepository, PacmanRepository};
pub use resolver::DependencyResolver;
pub use sector::{ALL_SECTORS, CanonicalSector, SectorClassifier};
pub use size::{SizeAggregator, percentage, to_display_unit};
pub use store::{CatalogStore, PublishOutcome, RebuildTicket};
pub use view::{DisplayView, SectorFilter, apply};

#[cfg(feature = "alpm")]
pub use repository::AlpmRepository;
