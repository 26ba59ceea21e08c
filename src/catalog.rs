//! Catalog construction
//!
//! A [`Catalog`] is the immutable result of one full pass over the installed
//! packages: every included package classified into exactly one sector,
//! with its reverse dependents and its size resolved once.
//!
//! # Pipeline
//!
//! 1. enumerate installed packages (fatal on failure)
//! 2. per package, on the worker pool: reverse dependents, then the size of
//!    every package that will be included
//! 3. single-threaded assembly in enumeration order: classification,
//!    sector grouping, totals
//!
//! The parallel stage uses an indexed collect, so step 3 sees results in
//! exactly the order the repository enumerated them.

use crate::error::{Result, TrackerError};
use crate::repository::PackageRepository;
use crate::resolver::DependencyResolver;
use crate::sector::SectorClassifier;
use crate::size::{SizeAggregator, aggregate_sizes};
use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// One included package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageRecord {
    pub id: String,
    pub sector: String,
    /// Installed size in bytes, 0 when unknown
    pub size: u64,
    /// Packages requiring this one, in repository order
    pub dependents: Vec<String>,
}

/// Counters describing one build pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// Packages reported by the repository
    pub installed: usize,
    /// Packages left out because nothing depends on them
    pub skipped_unreferenced: usize,
    pub dependency_query_failures: usize,
    pub size_lookup_failures: usize,
}

/// Immutable snapshot of classified, sized packages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    sectors: IndexMap<String, Vec<PackageRecord>>,
    total_count: usize,
    total_size: u64,
    include_unreferenced: bool,
    stats: BuildStats,
}

impl Catalog {
    /// Group `records` into sectors.
    ///
    /// Sectors follow `sector_order`; labels not listed there come after, in
    /// order of first appearance. Only non-empty sectors are kept. Records
    /// keep their relative order inside each sector.
    pub fn assemble(
        records: Vec<PackageRecord>,
        sector_order: &[String],
        include_unreferenced: bool,
        stats: BuildStats,
    ) -> Self {
        let mut sectors: IndexMap<String, Vec<PackageRecord>> = sector_order
            .iter()
            .map(|label| (label.clone(), Vec::new()))
            .collect();

        for record in records {
            sectors.entry(record.sector.clone()).or_default().push(record);
        }
        sectors.retain(|_, records| !records.is_empty());

        let total_count = sectors.values().map(Vec::len).sum();
        let total_size = aggregate_sizes(sectors.values().flatten().map(|r| r.size));

        Self {
            sectors,
            total_count,
            total_size,
            include_unreferenced,
            stats,
        }
    }

    /// An empty catalog (zero packages installed, or none included).
    pub fn empty() -> Self {
        Self::assemble(Vec::new(), &[], true, BuildStats::default())
    }

    /// Sector labels present in this catalog, in display order
    pub fn sector_labels(&self) -> impl Iterator<Item = &str> {
        self.sectors.keys().map(String::as_str)
    }

    /// Records of `sector`; empty for sectors without packages
    pub fn records(&self, sector: &str) -> &[PackageRecord] {
        self.sectors.get(sector).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `(sector, records)` pairs in display order
    pub fn sectors(&self) -> impl Iterator<Item = (&str, &[PackageRecord])> {
        self.sectors
            .iter()
            .map(|(label, records)| (label.as_str(), records.as_slice()))
    }

    /// Every record, sector by sector
    pub fn all_records(&self) -> impl Iterator<Item = &PackageRecord> {
        self.sectors.values().flatten()
    }

    pub fn find(&self, package_id: &str) -> Option<&PackageRecord> {
        self.all_records().find(|r| r.id == package_id)
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Whether packages without dependents were included in this build
    pub fn include_unreferenced(&self) -> bool {
        self.include_unreferenced
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }
}

/// Builds catalogs from a repository on a bounded worker pool.
pub struct CatalogBuilder {
    repo: Arc<dyn PackageRepository>,
    classifier: SectorClassifier,
    pool: rayon::ThreadPool,
}

impl CatalogBuilder {
    /// Create a builder running at most `workers` concurrent queries.
    pub fn new(
        repo: Arc<dyn PackageRepository>,
        classifier: SectorClassifier,
        workers: usize,
    ) -> Result<Self> {
        if workers == 0 {
            return Err(TrackerError::config("workers must be at least 1"));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("lftracker-query-{}", i))
            .build()
            .map_err(|e| TrackerError::general(format!("Failed to start worker pool: {}", e)))?;

        Ok(Self {
            repo,
            classifier,
            pool,
        })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run one full pass.
    ///
    /// With `include_unreferenced == false`, packages without reverse
    /// dependents are left out entirely: no record, no count, no size.
    ///
    /// Only [`TrackerError::Enumeration`] is returned; per-package failures
    /// are recovered and reported through [`Catalog::stats`].
    pub fn build(&self, include_unreferenced: bool) -> Result<Catalog> {
        let started = Instant::now();
        info!(include_unreferenced, "building catalog");

        let listed = self.repo.list_installed().map_err(|e| {
            if e.is_fatal_for_build() {
                e
            } else {
                TrackerError::enumeration(e.to_string())
            }
        })?;
        // First occurrence wins; ids stay unique across the catalog
        let listed_count = listed.len();
        let installed: Vec<String> = listed
            .into_iter()
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();
        if installed.len() < listed_count {
            warn!(
                duplicates = listed_count - installed.len(),
                "repository listed packages more than once"
            );
        }
        debug!(count = installed.len(), "installed packages enumerated");

        let repo: &dyn PackageRepository = self.repo.as_ref();
        let resolver = DependencyResolver::new(repo);
        let sizes = SizeAggregator::new(repo);

        let lookups: Vec<Option<(Vec<String>, u64)>> = self.pool.install(|| {
            installed
                .par_iter()
                .map(|id| {
                    let dependents = resolver.reverse_dependents(id);
                    if dependents.is_empty() && !include_unreferenced {
                        return None;
                    }
                    Some((dependents, sizes.raw_size(id)))
                })
                .collect()
        });

        let mut stats = BuildStats {
            installed: installed.len(),
            ..BuildStats::default()
        };
        let mut records = Vec::with_capacity(installed.len());
        for (id, lookup) in installed.into_iter().zip(lookups) {
            let Some((dependents, size)) = lookup else {
                stats.skipped_unreferenced += 1;
                continue;
            };
            records.push(PackageRecord {
                sector: self.classifier.classify(&id).to_string(),
                id,
                size,
                dependents,
            });
        }
        stats.dependency_query_failures = resolver.failure_count();
        stats.size_lookup_failures = sizes.failure_count();

        if stats.dependency_query_failures + stats.size_lookup_failures > 0 {
            warn!(
                dependency_failures = stats.dependency_query_failures,
                size_failures = stats.size_lookup_failures,
                "catalog built with partial data"
            );
        }

        let catalog = Catalog::assemble(
            records,
            self.classifier.sector_order(),
            include_unreferenced,
            stats,
        );
        info!(
            packages = catalog.total_count(),
            bytes = catalog.total_size(),
            skipped = stats.skipped_unreferenced,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "catalog built"
        );
        Ok(catalog)
    }
}
