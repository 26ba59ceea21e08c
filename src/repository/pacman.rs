//! Repository adapter backed by the pacman command-line tools.
//!
//! - enumeration: `pacman -Qq`
//! - reverse dependents: `pactree -r -u [-d N] <pkg>` (flat, unique; the
//!   first line is the queried package itself)
//! - sizes: the `desc` files of the local database, see [`LocalDb`]

use super::{LocalDb, PackageRepository};
use crate::command_runner::run_with_timeout;
use crate::error::{Result, TrackerError};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_DB_PATH: &str = "/var/lib/pacman";

#[derive(Debug, Clone)]
pub struct PacmanRepository {
    local_db: LocalDb,
    timeout: Duration,
    reverse_depth: Option<u32>,
}

impl PacmanRepository {
    pub fn new(db_path: impl AsRef<Path>, timeout: Duration) -> Self {
        Self {
            local_db: LocalDb::new(db_path),
            timeout,
            reverse_depth: None,
        }
    }

    /// Limit the reverse-dependency closure to `depth` levels.
    pub fn with_reverse_depth(mut self, depth: Option<u32>) -> Self {
        self.reverse_depth = depth;
        self
    }

    fn pactree_args<'a>(&self, package_id: &'a str, depth: &'a str) -> Vec<&'a str> {
        let mut args = vec!["-r", "-u"];
        if self.reverse_depth.is_some() {
            args.extend(["-d", depth]);
        }
        args.push(package_id);
        args
    }
}

impl Default for PacmanRepository {
    fn default() -> Self {
        Self::new(DEFAULT_DB_PATH, Duration::from_secs(10))
    }
}

impl PackageRepository for PacmanRepository {
    fn list_installed(&self) -> Result<Vec<String>> {
        let stdout = run_with_timeout("pacman", &["-Qq"], self.timeout)
            .map_err(|e| TrackerError::enumeration(e.to_string()))?;
        Ok(parse_lines(&stdout))
    }

    fn list_reverse_dependents(&self, package_id: &str) -> Result<Vec<String>> {
        let depth = self.reverse_depth.unwrap_or_default().to_string();
        let args = self.pactree_args(package_id, &depth);
        let stdout = run_with_timeout("pactree", &args, self.timeout)
            .map_err(|e| TrackerError::dependency_query(package_id, e))?;
        Ok(parse_lines(&stdout))
    }

    fn raw_size(&self, package_id: &str) -> Result<u64> {
        self.local_db
            .installed_size(package_id)
            .map_err(|e| match e {
                TrackerError::SizeLookup { .. } => e,
                other => TrackerError::size_lookup(package_id, other),
            })
    }
}

/// One identifier per non-blank line, surrounding whitespace removed.
fn parse_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
