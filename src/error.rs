//! Error handling module for lftracker
//!
//! Provides centralized error handling with proper error types using thiserror.
//!
//! Only [`TrackerError::Enumeration`] crosses the catalog builder boundary.
//! Dependency and size lookups fail softly: the resolver and the size
//! aggregator log them, count them and carry on with empty/zero values.

use std::time::Duration;
use thiserror::Error;

/// Main error type for lftracker
#[derive(Error, Debug)]
pub enum TrackerError {
    /// The installed package list could not be obtained
    #[error("Cannot enumerate installed packages: {0}")]
    Enumeration(String),

    /// A reverse-dependency query failed (recovered as "no dependents")
    #[error("Reverse dependency query failed for {package}: {reason}")]
    DependencyQuery { package: String, reason: String },

    /// A size lookup failed (recovered as 0 bytes)
    #[error("Size lookup failed for {package}: {reason}")]
    SizeLookup { package: String, reason: String },

    /// External command errors (spawn, non-zero exit, timeout)
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Configuration errors (loading, parsing, validation)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors (file operations, database reads)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General errors (catch-all for edge cases)
    #[error("{0}")]
    General(String),
}

/// Failures of a single external command invocation.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },

    #[error("{program} exited with code {code:?}: {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Result type alias for lftracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;

// Convenient error constructors
impl TrackerError {
    /// Create an enumeration failure
    pub fn enumeration(msg: impl Into<String>) -> Self {
        Self::Enumeration(msg.into())
    }

    /// Create a dependency query failure for `package`
    pub fn dependency_query(package: impl Into<String>, reason: impl ToString) -> Self {
        Self::DependencyQuery {
            package: package.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a size lookup failure for `package`
    pub fn size_lookup(package: impl Into<String>, reason: impl ToString) -> Self {
        Self::SizeLookup {
            package: package.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a general error
    pub fn general(msg: impl Into<String>) -> Self {
        Self::General(msg.into())
    }

    /// Whether this error aborts a catalog build.
    pub fn is_fatal_for_build(&self) -> bool {
        matches!(self, Self::Enumeration(_))
    }
}
