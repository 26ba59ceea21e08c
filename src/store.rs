//! The currently active catalog.
//!
//! Rebuilds are versioned. Each rebuild takes a [`RebuildTicket`] before it
//! starts; when it finishes, its catalog is only published if no newer
//! ticket has been issued in the meantime. A slow rebuild therefore can
//! never overwrite the result of a newer one.
//!
//! A failed rebuild leaves the active catalog untouched and records the
//! error for the presentation layer to show next to the old data.

use crate::catalog::{Catalog, CatalogBuilder};
use crate::error::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Permission to publish the outcome of one rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RebuildTicket(u64);

impl RebuildTicket {
    pub fn version(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Published,
    /// A newer rebuild was requested; the result was discarded
    Superseded,
}

#[derive(Debug, Default)]
struct Active {
    catalog: Option<Arc<Catalog>>,
    version: u64,
    last_error: Option<String>,
}

/// Holder of the active catalog with replace-on-success semantics.
#[derive(Debug, Default)]
pub struct CatalogStore {
    issued: AtomicU64,
    active: Mutex<Active>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a rebuild; supersedes every ticket issued before.
    pub fn begin_rebuild(&self) -> RebuildTicket {
        let version = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(version, "rebuild started");
        RebuildTicket(version)
    }

    /// Whether `ticket` is still the newest rebuild
    pub fn is_current(&self, ticket: RebuildTicket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Install `catalog` if `ticket` has not been superseded.
    pub fn publish(&self, ticket: RebuildTicket, catalog: Catalog) -> PublishOutcome {
        let mut active = self.lock();
        if !self.is_current(ticket) || ticket.0 <= active.version {
            info!(version = ticket.0, "discarding superseded catalog");
            return PublishOutcome::Superseded;
        }
        active.catalog = Some(Arc::new(catalog));
        active.version = ticket.0;
        active.last_error = None;
        debug!(version = ticket.0, "catalog published");
        PublishOutcome::Published
    }

    /// Record a failed rebuild; the active catalog stays in place.
    pub fn record_failure(&self, ticket: RebuildTicket, error: &dyn std::fmt::Display) {
        let mut active = self.lock();
        if !self.is_current(ticket) {
            debug!(version = ticket.0, "ignoring failure of superseded rebuild");
            return;
        }
        warn!(version = ticket.0, "rebuild failed, keeping previous catalog: {}", error);
        active.last_error = Some(error.to_string());
    }

    /// Build and publish in one step.
    ///
    /// Returns the build error if the build failed; the previous catalog
    /// remains active in that case.
    pub fn rebuild(
        &self,
        builder: &CatalogBuilder,
        include_unreferenced: bool,
    ) -> Result<PublishOutcome> {
        let ticket = self.begin_rebuild();
        match builder.build(include_unreferenced) {
            Ok(catalog) => Ok(self.publish(ticket, catalog)),
            Err(e) => {
                self.record_failure(ticket, &e);
                Err(e)
            }
        }
    }

    /// The active catalog, if any rebuild has succeeded
    pub fn current(&self) -> Option<Arc<Catalog>> {
        self.lock().catalog.clone()
    }

    /// Version of the active catalog, 0 before the first publish
    pub fn current_version(&self) -> u64 {
        self.lock().version
    }

    /// Error of the most recent failed rebuild, cleared by the next publish
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Active> {
        // Active holds plain data; a poisoned lock still carries a valid state
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
