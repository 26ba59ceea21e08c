//! Configuration file handling.
//!
//! lftracker runs fine without a configuration file; a JSON file only
//! overrides the defaults below. Missing fields fall back to their defaults,
//! so a file may contain nothing but a custom `sectors` table.

use crate::error::TrackerError;
use crate::repository::pacman::DEFAULT_DB_PATH;
use crate::sector::{CanonicalSector, SectorClassifier, default_sector_table};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use strum::{Display, EnumString};

const MAX_DEFAULT_WORKERS: usize = 16;

/// Which repository adapter to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Backend {
    /// `pacman` / `pactree` subprocesses plus the local database
    #[default]
    Pacman,
    /// libalpm (requires the `alpm` feature)
    Alpm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Package id → sector label
    pub sectors: IndexMap<String, String>,
    /// Display order of sector labels
    pub sector_order: Vec<String>,
    /// Label for packages missing from `sectors`
    pub default_sector: String,
    /// Concurrent repository queries during a build
    pub workers: usize,
    /// Per-query timeout
    pub query_timeout_secs: u64,
    /// pacman database root
    pub db_path: PathBuf,
    /// pacman.conf read by the alpm backend
    pub pacman_conf: PathBuf,
    /// Depth limit for reverse-dependency closures
    pub reverse_depth: Option<u32>,
    /// Include packages nothing depends on
    pub include_unreferenced: bool,
    pub backend: Backend,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
            .min(MAX_DEFAULT_WORKERS);

        Self {
            sectors: default_sector_table(),
            sector_order: CanonicalSector::named_labels(),
            default_sector: CanonicalSector::DEFAULT.to_string(),
            workers,
            query_timeout_secs: 10,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            pacman_conf: PathBuf::from("/etc/pacman.conf"),
            reverse_depth: None,
            include_unreferenced: true,
            backend: Backend::Pacman,
        }
    }
}

impl TrackerConfig {
    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize configuration to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse configuration JSON")?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), TrackerError> {
        if self.workers == 0 {
            return Err(TrackerError::config("workers must be at least 1"));
        }
        if self.query_timeout_secs == 0 {
            return Err(TrackerError::config("query_timeout_secs must be greater than 0"));
        }
        if self.default_sector.trim().is_empty() {
            return Err(TrackerError::config("default_sector must not be empty"));
        }
        if self.default_sector == crate::sector::ALL_SECTORS {
            return Err(TrackerError::config(
                "\"All\" is reserved for the filter and cannot be a sector",
            ));
        }

        for (package, sector) in &self.sectors {
            if package.trim().is_empty() {
                return Err(TrackerError::config("sector table contains an empty package name"));
            }
            if sector.trim().is_empty() {
                return Err(TrackerError::config(format!(
                    "package {} is mapped to an empty sector",
                    package
                )));
            }
            if sector == crate::sector::ALL_SECTORS {
                return Err(TrackerError::config(format!(
                    "package {} is mapped to the reserved sector \"All\"",
                    package
                )));
            }
        }

        if self.reverse_depth == Some(0) {
            return Err(TrackerError::config("reverse_depth must be at least 1 when set"));
        }

        if self.backend == Backend::Alpm && !cfg!(feature = "alpm") {
            return Err(TrackerError::config(
                "backend \"alpm\" requires lftracker built with the alpm feature",
            ));
        }

        Ok(())
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    /// Classifier over this configuration's table
    pub fn classifier(&self) -> SectorClassifier {
        SectorClassifier::new(
            self.sectors.clone(),
            self.sector_order.clone(),
            self.default_sector.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = TrackerConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.workers >= 1 && config.workers <= MAX_DEFAULT_WORKERS);
        assert_eq!(config.sectors.get("bash").map(String::as_str), Some("System"));
        assert!(config.include_unreferenced);
        assert_eq!(config.backend, Backend::Pacman);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let mut config = TrackerConfig::default();
        config.workers = 3;
        config.sectors.insert("steam".to_string(), "Games".to_string());

        let temp_file = NamedTempFile::new().unwrap();
        config.save_to_file(temp_file.path()).unwrap();

        let loaded = TrackerConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(br#"{ "sectors": { "zsh": "System" }, "workers": 2 }"#)
            .unwrap();
        temp_file.flush().unwrap();

        let config = TrackerConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.workers, 2);
        assert_eq!(config.sectors.len(), 1);
        assert_eq!(config.default_sector, "Others");
        assert_eq!(config.query_timeout_secs, 10);

        let classifier = config.classifier();
        assert_eq!(classifier.classify("zsh"), "System");
        assert_eq!(classifier.classify("bash"), "Others");
    }

    #[test]
    fn test_backend_serializes_lowercase() {
        let json = serde_json::to_string(&Backend::Alpm).unwrap();
        assert_eq!(json, "\"alpm\"");
        assert_eq!("pacman".parse::<Backend>().unwrap(), Backend::Pacman);
    }

    #[test]
    fn test_load_nonexistent_file() {
        assert!(TrackerConfig::load_from_file("/nonexistent/lftracker.json").is_err());
    }

    #[test]
    fn test_load_invalid_json() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"{ invalid json }").unwrap();
        temp_file.flush().unwrap();

        assert!(TrackerConfig::load_from_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_validation_zero_workers() {
        let config = TrackerConfig {
            workers: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(TrackerError::Config(_))));
    }

    #[test]
    fn test_validation_zero_timeout() {
        let config = TrackerConfig {
            query_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_reserved_all_sector() {
        let mut config = TrackerConfig::default();
        config.sectors.insert("bash".to_string(), "All".to_string());
        assert!(config.validate().is_err());

        let config = TrackerConfig {
            default_sector: "All".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_empty_labels() {
        let mut config = TrackerConfig::default();
        config.sectors.insert("bash".to_string(), "  ".to_string());
        assert!(config.validate().is_err());

        let config = TrackerConfig {
            default_sector: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_depth() {
        let config = TrackerConfig {
            reverse_depth: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
