//! Sector classification
//!
//! Maps a package identifier to a coarse functional sector through a lookup
//! table. The table is configuration data: it lives in [`TrackerConfig`]
//! and is handed to the classifier at construction.
//!
//! [`TrackerConfig`]: crate::config_file::TrackerConfig

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Label that selects every sector in a filter
pub const ALL_SECTORS: &str = "All";

/// The canonical sector vocabulary, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
pub enum CanonicalSector {
    Media,
    Network,
    System,
    Development,
    Others,
}

impl CanonicalSector {
    /// The catch-all sector for unmapped packages
    pub const DEFAULT: CanonicalSector = CanonicalSector::Others;

    /// Canonical labels excluding the catch-all
    pub fn named_labels() -> Vec<String> {
        Self::iter()
            .filter(|s| *s != Self::DEFAULT)
            .map(|s| s.to_string())
            .collect()
    }
}

/// Built-in package → sector table
pub fn default_sector_table() -> IndexMap<String, String> {
    use CanonicalSector::*;

    [
        ("vlc", Media),
        ("ffmpeg", Media),
        ("libx264", Media),
        ("curl", Network),
        ("wget", Network),
        ("openssl", Network),
        ("pacman", System),
        ("bash", System),
        ("python", Development),
        ("gcc", Development),
        ("make", Development),
    ]
    .into_iter()
    .map(|(pkg, sector)| (pkg.to_string(), sector.to_string()))
    .collect()
}

/// Pure, total classifier over a configured table.
#[derive(Debug, Clone)]
pub struct SectorClassifier {
    table: IndexMap<String, String>,
    order: Vec<String>,
    default_sector: String,
}

impl SectorClassifier {
    /// Build a classifier.
    ///
    /// `order` fixes the sector display order. Labels used in `table` but
    /// missing from `order` are appended in table order, and the default
    /// sector always comes last.
    pub fn new(
        table: IndexMap<String, String>,
        order: Vec<String>,
        default_sector: impl Into<String>,
    ) -> Self {
        let default_sector = default_sector.into();
        let mut full_order: Vec<String> = Vec::new();
        for label in order.iter().chain(table.values()) {
            if *label != default_sector && !full_order.contains(label) {
                full_order.push(label.clone());
            }
        }
        full_order.push(default_sector.clone());

        Self {
            table,
            order: full_order,
            default_sector,
        }
    }

    /// Sector label for `package_id`, or the default sector on a miss.
    pub fn classify(&self, package_id: &str) -> &str {
        self.table
            .get(package_id)
            .map(String::as_str)
            .unwrap_or(&self.default_sector)
    }

    /// Every sector label in display order, default sector last
    pub fn sector_order(&self) -> &[String] {
        &self.order
    }

    pub fn default_sector(&self) -> &str {
        &self.default_sector
    }

    pub fn table(&self) -> &IndexMap<String, String> {
        &self.table
    }
}

impl Default for SectorClassifier {
    fn default() -> Self {
        Self::new(
            default_sector_table(),
            CanonicalSector::named_labels(),
            CanonicalSector::DEFAULT.to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_packages() {
        let classifier = SectorClassifier::default();
        assert_eq!(classifier.classify("bash"), "System");
        assert_eq!(classifier.classify("vlc"), "Media");
        assert_eq!(classifier.classify("curl"), "Network");
        assert_eq!(classifier.classify("gcc"), "Development");
    }

    #[test]
    fn test_classify_miss_defaults_to_others() {
        let classifier = SectorClassifier::default();
        assert_eq!(classifier.classify("libfoo"), "Others");
        assert_eq!(classifier.classify(""), "Others");
    }

    #[test]
    fn test_exact_match_only() {
        let classifier = SectorClassifier::default();
        assert_eq!(classifier.classify("bash-completion"), "Others");
        assert_eq!(classifier.classify("Bash"), "Others");
    }

    #[test]
    fn test_default_order_is_canonical() {
        let classifier = SectorClassifier::default();
        assert_eq!(
            classifier.sector_order(),
            ["Media", "Network", "System", "Development", "Others"]
        );
    }

    #[test]
    fn test_custom_labels_are_ordered_before_default() {
        let mut table = IndexMap::new();
        table.insert("steam".to_string(), "Games".to_string());
        table.insert("bash".to_string(), "System".to_string());
        let classifier = SectorClassifier::new(table, vec!["System".to_string()], "Misc");

        assert_eq!(classifier.sector_order(), ["System", "Games", "Misc"]);
        assert_eq!(classifier.classify("zsh"), "Misc");
    }

    #[test]
    fn test_canonical_sector_parses() {
        let sector: CanonicalSector = "Network".parse().unwrap();
        assert_eq!(sector, CanonicalSector::Network);
        assert!("Nope".parse::<CanonicalSector>().is_err());
    }
}
