//! Search configuration.

use std::time::Duration;

use crate::{
    locate::{DEVICE_LOCATION_TIMEOUT, SUGGESTION_DEBOUNCE},
    pipeline::SortKey,
};

/// Tunables for the search flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Maximum number of stores in a result set (at least 1).
    pub max_results: usize,
    /// Sort key used when no preference has been persisted yet.
    pub default_sort: SortKey,
    /// Bound on device-location acquisition.
    pub device_location_timeout: Duration,
    /// Debounce applied to autocomplete suggestion lookups.
    pub suggestion_debounce: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 10,
            default_sort: SortKey::Distance,
            device_location_timeout: DEVICE_LOCATION_TIMEOUT,
            suggestion_debounce: SUGGESTION_DEBOUNCE,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::new()
    }
}

/// Builder for creating search configurations with ergonomic defaults.
#[derive(Debug, Clone, Default)]
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    /// Create a new builder with sensible defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    /// A short list of the closest stores, for compact map views.
    #[must_use]
    pub fn nearby() -> Self {
        let mut builder = Self::new();
        builder.config.max_results = 5;
        builder
    }

    /// A longer alphabetical list, for browsing without a location.
    #[must_use]
    pub fn directory() -> Self {
        let mut builder = Self::new();
        builder.config.max_results = 25;
        builder.config.default_sort = SortKey::Name;
        builder
    }

    /// Set the maximum number of results to return (clamped to at least 1).
    #[must_use]
    pub fn max_results(mut self, max: usize) -> Self {
        self.config.max_results = max.max(1);
        self
    }

    /// Set the sort key used before any preference is persisted.
    #[must_use]
    pub fn default_sort(mut self, sort: SortKey) -> Self {
        self.config.default_sort = sort;
        self
    }

    /// Set the device-location acquisition timeout.
    #[must_use]
    pub fn device_location_timeout(mut self, timeout: Duration) -> Self {
        self.config.device_location_timeout = timeout;
        self
    }

    /// Set the autocomplete suggestion debounce delay.
    #[must_use]
    pub fn suggestion_debounce(mut self, delay: Duration) -> Self {
        self.config.suggestion_debounce = delay;
        self
    }

    /// Build the final configuration.
    #[must_use]
    pub fn build(self) -> SearchConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_builder() {
        let config = SearchConfigBuilder::new().build();
        assert_eq!(config.max_results, 10);
        assert_eq!(config.default_sort, SortKey::Distance);
        assert_eq!(config.device_location_timeout, Duration::from_secs(10));
        assert_eq!(config.suggestion_debounce, Duration::from_millis(300));
    }

    #[test]
    fn test_presets() {
        let nearby = SearchConfigBuilder::nearby().build();
        assert_eq!(nearby.max_results, 5);

        let directory = SearchConfigBuilder::directory().build();
        assert_eq!(directory.max_results, 25);
        assert_eq!(directory.default_sort, SortKey::Name);
    }

    #[test]
    fn test_method_chaining() {
        let config = SearchConfigBuilder::new()
            .max_results(3)
            .default_sort(SortKey::Recent)
            .suggestion_debounce(Duration::from_millis(150))
            .build();

        assert_eq!(config.max_results, 3);
        assert_eq!(config.default_sort, SortKey::Recent);
        assert_eq!(config.suggestion_debounce, Duration::from_millis(150));
    }

    #[test]
    fn test_max_results_clamps_to_one() {
        let config = SearchConfigBuilder::new().max_results(0).build();
        assert_eq!(config.max_results, 1);
    }

    #[test]
    fn test_preset_values_can_be_overridden() {
        let config = SearchConfigBuilder::nearby().max_results(8).build();
        assert_eq!(config.max_results, 8);
    }
}
