//! Terminal rendering of a [`DisplayView`].
//!
//! Output layout:
//!
//! ```text
//! 📦 Packages Found: 2 | 💾 Space used: 3.00 MB
//! [##############################] 100%
//!
//! 🗂 System
//!   📦 bash (2.00 MB)
//!       ↳ systemd
//! ```

use crate::catalog::BuildStats;
use crate::error::Result;
use crate::size::humanize_size;
use crate::view::DisplayView;
use serde::Serialize;
use std::fmt::Write;

const BAR_WIDTH: usize = 30;

/// Header line with count and formatted size
pub fn header_line(view: &DisplayView<'_>) -> String {
    format!(
        "📦 Packages Found: {} | 💾 Space used: {}",
        view.count,
        view.formatted_size()
    )
}

/// Fixed-width usage bar followed by the percentage
pub fn usage_bar(percentage: u8) -> String {
    let filled = usize::from(percentage.min(100)) * BAR_WIDTH / 100;
    format!(
        "[{}{}] {}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percentage
    )
}

/// Full text report; dependents are listed under each package when
/// `show_dependents` is set.
pub fn render_text(view: &DisplayView<'_>, show_dependents: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", header_line(view));
    let _ = writeln!(out, "{}", usage_bar(view.percentage));

    if view.is_empty() {
        let _ = writeln!(out, "\nNo packages in {}", view.filter);
        return out;
    }

    for group in &view.groups {
        let _ = writeln!(out, "\n🗂 {}", group.sector);
        for record in group.records {
            let _ = writeln!(out, "  📦 {} ({})", record.id, humanize_size(record.size));
            if show_dependents {
                for dependent in &record.dependents {
                    let _ = writeln!(out, "      ↳ {}", dependent);
                }
            }
        }
    }
    out
}

/// Summary of recovered failures, if there were any
pub fn soft_failure_note(stats: &BuildStats) -> Option<String> {
    if stats.dependency_query_failures == 0 && stats.size_lookup_failures == 0 {
        return None;
    }
    Some(format!(
        "⚠ partial data: {} dependency queries and {} size lookups failed",
        stats.dependency_query_failures, stats.size_lookup_failures
    ))
}

#[derive(Serialize)]
struct JsonReport<'a, 'v> {
    #[serde(flatten)]
    view: &'v DisplayView<'a>,
    formatted_size: String,
    stats: BuildStats,
}

/// Machine-readable report
pub fn render_json(view: &DisplayView<'_>, stats: BuildStats) -> Result<String> {
    let report = JsonReport {
        view,
        formatted_size: view.formatted_size(),
        stats,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, PackageRecord};
    use crate::view::{SectorFilter, apply};

    fn catalog() -> Catalog {
        Catalog::assemble(
            vec![
                PackageRecord {
                    id: "bash".to_string(),
                    sector: "System".to_string(),
                    size: 2_097_152,
                    dependents: vec!["systemd".to_string()],
                },
                PackageRecord {
                    id: "libfoo".to_string(),
                    sector: "Others".to_string(),
                    size: 1_048_576,
                    dependents: Vec::new(),
                },
            ],
            &["System".to_string()],
            true,
            BuildStats::default(),
        )
    }

    #[test]
    fn test_usage_bar() {
        assert_eq!(usage_bar(0), format!("[{}] 0%", "-".repeat(BAR_WIDTH)));
        assert_eq!(usage_bar(100), format!("[{}] 100%", "#".repeat(BAR_WIDTH)));
        assert_eq!(usage_bar(50).matches('#').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn test_render_text_lists_sectors_and_dependents() {
        let catalog = catalog();
        let view = apply(&catalog, &SectorFilter::All);

        let text = render_text(&view, true);
        assert!(text.starts_with("📦 Packages Found: 2 | 💾 Space used: 3.00 MB\n"));
        assert!(text.contains("🗂 System\n  📦 bash (2.00 MB)\n      ↳ systemd\n"));
        assert!(text.contains("🗂 Others\n  📦 libfoo (1.00 MB)\n"));

        let text = render_text(&view, false);
        assert!(!text.contains("systemd"));
    }

    #[test]
    fn test_render_text_empty_view() {
        let catalog = catalog();
        let view = apply(&catalog, &SectorFilter::Sector("Media".into()));
        let text = render_text(&view, false);
        assert!(text.contains("Packages Found: 0"));
        assert!(text.contains("No packages in Media"));
    }

    #[test]
    fn test_render_json() {
        let catalog = catalog();
        let view = apply(&catalog, &SectorFilter::Sector("System".into()));
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&view, catalog.stats()).unwrap()).unwrap();

        assert_eq!(json["filter"], "System");
        assert_eq!(json["count"], 1);
        assert_eq!(json["size"], 2_097_152);
        assert_eq!(json["percentage"], 67);
        assert_eq!(json["formatted_size"], "2.00 MB");
        assert_eq!(json["groups"][0]["records"][0]["dependents"][0], "systemd");
    }

    #[test]
    fn test_soft_failure_note() {
        assert!(soft_failure_note(&BuildStats::default()).is_none());
        let stats = BuildStats {
            size_lookup_failures: 2,
            ..BuildStats::default()
        };
        assert!(soft_failure_note(&stats).unwrap().contains("2 size lookups"));
    }
}
