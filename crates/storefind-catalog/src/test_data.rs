//! Test catalog generation.
//!
//! Produces authored rows for unit and integration tests so they never depend
//! on the embedded fixture's exact contents.

use serde_json::json;
use tracing::info;

use crate::raw::RawStoreRow;

/// Configuration for test catalog generation.
#[derive(Debug, Clone)]
pub struct TestCatalogConfig {
    /// Number of valid rows to generate.
    pub rows: usize,
    /// Whether to use realistic store data or minimal placeholder rows.
    pub realistic: bool,
    /// Whether to append rows that must be dropped by validation.
    pub include_invalid_rows: bool,
}

impl Default for TestCatalogConfig {
    fn default() -> Self {
        Self {
            rows: 10,
            realistic: true,
            include_invalid_rows: false,
        }
    }
}

impl TestCatalogConfig {
    /// Minimal data for unit tests.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            rows: 3,
            realistic: false,
            include_invalid_rows: false,
        }
    }

    /// Sample data for integration tests, including rows that fail
    /// validation.
    #[must_use]
    pub fn sample() -> Self {
        Self {
            rows: 12,
            realistic: true,
            include_invalid_rows: true,
        }
    }
}

const SERVICE_SETS: [&str; 4] = [
    "grocery, deli",
    "pharmacy, vaccinations",
    "grocery, bakery, coffee",
    "deli, catering",
];

/// Generate authored rows based on the provided configuration.
#[must_use]
pub fn create_test_rows(config: &TestCatalogConfig) -> Vec<RawStoreRow> {
    info!(?config, "creating test catalog rows");

    let mut rows: Vec<RawStoreRow> = (0..config.rows)
        .map(|i| {
            let name = if config.realistic {
                format!("Market {} on {}th Ave", (b'A' + (i % 26) as u8) as char, i + 1)
            } else {
                format!("Store {}", i + 1)
            };
            // Spread stores roughly a kilometer apart heading north-east.
            let lat = 45.50 + 0.01 * i as f64;
            let lng = -122.68 + 0.01 * i as f64;
            let hours = if i % 3 == 0 { "24 hours" } else { "unparsed text" };

            vec![
                json!(name),
                json!(format!("{} Test St, Portland, OR, 97201", 100 + i)),
                json!(format!("{lat},{lng}")),
                json!(format!("503-555-{:04}", i)),
                json!(hours),
                json!(SERVICE_SETS[i % SERVICE_SETS.len()]),
            ]
        })
        .collect();

    if config.include_invalid_rows {
        // Staged future store: too few fields.
        rows.push(vec![json!("Future Site"), json!(""), json!("")]);
        // Placeholder coordinates.
        rows.push(vec![
            json!("Unplaced Store"),
            json!("1 Nowhere Rd, Portland, OR, 97201"),
            json!("0,0"),
            json!(""),
            json!("24 hours"),
            json!("grocery"),
        ]);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::build_catalog;

    #[test]
    fn minimal_rows_all_survive() {
        let rows = create_test_rows(&TestCatalogConfig::minimal());
        let catalog = build_catalog(&rows);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.dropped(), 0);
    }

    #[test]
    fn sample_rows_include_dropped() {
        let config = TestCatalogConfig::sample();
        let rows = create_test_rows(&config);
        let catalog = build_catalog(&rows);
        assert_eq!(catalog.len(), config.rows);
        assert_eq!(catalog.dropped(), 2);
    }
}
