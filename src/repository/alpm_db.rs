//! Repository adapter reading the local database through libalpm.
//!
//! No processes are spawned, so no timeouts apply. Reverse dependents are
//! the direct `required_by` set of each package, not the transitive closure
//! `pactree -r` reports.
//!
//! The ALPM handle is neither `Send` nor `Sync`; each query opens its own
//! handle so the repository can be shared by the builder's workers.

use super::PackageRepository;
use crate::error::{Result, TrackerError};
use alpm::Alpm;
use anyhow::Context;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct AlpmRepository {
    root: String,
    db_path: String,
}

impl AlpmRepository {
    pub fn new(root: impl Into<String>, db_path: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            db_path: db_path.into(),
        }
    }

    /// Take root and database path from a `pacman.conf`.
    pub fn from_pacman_conf<P: AsRef<Path>>(conf_path: P) -> anyhow::Result<Self> {
        let conf_path = conf_path.as_ref();
        let conf = pacmanconf::Config::from_file(conf_path)
            .with_context(|| format!("Failed to parse pacman.conf at {}", conf_path.display()))?;
        debug!(root = %conf.root_dir, db_path = %conf.db_path, "alpm repository configured");
        Ok(Self::new(conf.root_dir, conf.db_path))
    }

    fn open(&self) -> std::result::Result<Alpm, alpm::Error> {
        Alpm::new(self.root.as_str(), self.db_path.as_str())
    }
}

impl PackageRepository for AlpmRepository {
    fn list_installed(&self) -> Result<Vec<String>> {
        let handle = self
            .open()
            .map_err(|e| TrackerError::enumeration(format!("Failed to initialize ALPM: {}", e)))?;
        let names = handle
            .localdb()
            .pkgs()
            .iter()
            .map(|pkg| pkg.name().to_string())
            .collect();
        Ok(names)
    }

    fn list_reverse_dependents(&self, package_id: &str) -> Result<Vec<String>> {
        let handle = self
            .open()
            .map_err(|e| TrackerError::dependency_query(package_id, e))?;
        // Unknown packages have no dependents
        let Ok(pkg) = handle.localdb().pkg(package_id) else {
            return Ok(Vec::new());
        };
        Ok(pkg.required_by().iter().map(|name| name.to_string()).collect())
    }

    fn raw_size(&self, package_id: &str) -> Result<u64> {
        let handle = self
            .open()
            .map_err(|e| TrackerError::size_lookup(package_id, e))?;
        let Ok(pkg) = handle.localdb().pkg(package_id) else {
            return Ok(0);
        };
        Ok(u64::try_from(pkg.isize()).unwrap_or(0))
    }
}
