//! Filtered projections of a catalog.
//!
//! [`apply`] is a pure function of the catalog and the selected filter: it
//! never touches the repository, so switching filters costs one pass over
//! already-materialized records.

use crate::catalog::{Catalog, PackageRecord};
use crate::sector::ALL_SECTORS;
use crate::size::{aggregate_sizes, percentage, to_display_unit};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Sector selection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SectorFilter {
    #[default]
    All,
    Sector(String),
}

impl SectorFilter {
    fn matches(&self, sector: &str) -> bool {
        match self {
            Self::All => true,
            Self::Sector(label) => label == sector,
        }
    }
}

impl FromStr for SectorFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == ALL_SECTORS {
            Self::All
        } else {
            Self::Sector(s.to_string())
        })
    }
}

impl fmt::Display for SectorFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_SECTORS),
            Self::Sector(label) => f.write_str(label),
        }
    }
}

impl Serialize for SectorFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One displayed sector and its records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectorGroup<'a> {
    pub sector: &'a str,
    pub records: &'a [PackageRecord],
}

/// What the presentation layer renders for one filter selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayView<'a> {
    pub filter: SectorFilter,
    pub groups: Vec<SectorGroup<'a>>,
    pub count: usize,
    pub size: u64,
    /// Share of the catalog total, 0..=100
    pub percentage: u8,
    pub total_size: u64,
}

impl<'a> DisplayView<'a> {
    /// Displayed records in sector order
    pub fn records(&self) -> impl Iterator<Item = &'a PackageRecord> + '_ {
        self.groups.iter().flat_map(|g| g.records.iter())
    }

    /// Displayed size, e.g. `"3.00 MB"`
    pub fn formatted_size(&self) -> String {
        to_display_unit(self.size)
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Project `catalog` onto `filter`.
///
/// A sector without records yields an empty view rather than an error.
pub fn apply<'a>(catalog: &'a Catalog, filter: &SectorFilter) -> DisplayView<'a> {
    let groups: Vec<SectorGroup<'a>> = catalog
        .sectors()
        .filter(|(sector, _)| filter.matches(sector))
        .map(|(sector, records)| SectorGroup { sector, records })
        .collect();

    let count = groups.iter().map(|g| g.records.len()).sum();
    let size = aggregate_sizes(groups.iter().flat_map(|g| g.records.iter().map(|r| r.size)));

    DisplayView {
        filter: filter.clone(),
        count,
        size,
        percentage: percentage(size, catalog.total_size()),
        total_size: catalog.total_size(),
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BuildStats;
    use crate::sector::SectorClassifier;

    fn record(id: &str, sector: &str, size: u64) -> PackageRecord {
        PackageRecord {
            id: id.to_string(),
            sector: sector.to_string(),
            size,
            dependents: Vec::new(),
        }
    }

    fn sample_catalog() -> Catalog {
        Catalog::assemble(
            vec![
                record("bash", "System", 2_097_152),
                record("libfoo", "Others", 1_048_576),
                record("vlc", "Media", 1_048_576),
            ],
            SectorClassifier::default().sector_order(),
            true,
            BuildStats::default(),
        )
    }

    #[test]
    fn test_filter_parse_and_display() {
        assert_eq!("All".parse::<SectorFilter>().unwrap(), SectorFilter::All);
        assert_eq!(
            "Media".parse::<SectorFilter>().unwrap(),
            SectorFilter::Sector("Media".to_string())
        );
        assert_eq!(SectorFilter::All.to_string(), "All");
        assert_eq!(SectorFilter::Sector("System".into()).to_string(), "System");
    }

    #[test]
    fn test_all_matches_catalog_totals() {
        let catalog = sample_catalog();
        let view = apply(&catalog, &SectorFilter::All);

        assert_eq!(view.count, catalog.total_count());
        assert_eq!(view.size, catalog.total_size());
        assert_eq!(view.percentage, 100);
        let ids: Vec<&str> = view.records().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["vlc", "bash", "libfoo"]);
    }

    #[test]
    fn test_single_sector() {
        let catalog = sample_catalog();
        let view = apply(&catalog, &SectorFilter::Sector("System".into()));

        assert_eq!(view.count, 1);
        assert_eq!(view.size, 2_097_152);
        assert_eq!(view.percentage, 50);
        assert_eq!(view.formatted_size(), "2.00 MB");
    }

    #[test]
    fn test_empty_sector_is_not_an_error() {
        let catalog = sample_catalog();
        let view = apply(&catalog, &SectorFilter::Sector("Development".into()));

        assert!(view.is_empty());
        assert!(view.groups.is_empty());
        assert_eq!(view.size, 0);
        assert_eq!(view.percentage, 0);
    }

    #[test]
    fn test_empty_catalog_percentage_is_zero() {
        let catalog = Catalog::empty();
        let view = apply(&catalog, &SectorFilter::All);
        assert_eq!(view.count, 0);
        assert_eq!(view.percentage, 0);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let catalog = sample_catalog();
        let filter = SectorFilter::Sector("Others".into());
        assert_eq!(apply(&catalog, &filter), apply(&catalog, &filter));
    }

    #[test]
    fn test_view_serializes_filter_as_label() {
        let catalog = sample_catalog();
        let view = apply(&catalog, &SectorFilter::All);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["filter"], "All");
        assert_eq!(json["count"], 3);
        assert_eq!(json["groups"][0]["sector"], "Media");
    }
}
