//! Search orchestration.
//!
//! The [`StoreLocator`] is the single owner of all mutable search state: the
//! current anchor, sort key, filter selections, and the visible result list.
//! It reconciles competing asynchronous inputs (typed addresses, device
//! geolocation, filter toggles) into one consistent result set, with a
//! monotonically increasing request sequence so a superseded resolution can
//! never clobber a newer one.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use storefind::{SearchConfig, SearchIntent, StoreLocator};
//! use storefind::locate::NoDeviceLocation;
//! use storefind::prefs::MemoryKeyValueStore;
//! # use storefind::locate::{AddressGeocoder, Suggestion};
//! # use storefind_catalog::Coordinates;
//! # #[derive(Clone)] struct Geo;
//! # impl AddressGeocoder for Geo {
//! #     async fn geocode(&self, _t: &str) -> storefind::locate::Result<Coordinates> {
//! #         Ok(Coordinates::new(45.5, -122.6))
//! #     }
//! #     async fn suggest(&self, _t: &str) -> storefind::locate::Result<Vec<Suggestion>> {
//! #         Ok(vec![])
//! #     }
//! # }
//!
//! # async fn run() -> Result<(), storefind::StorefindError> {
//! let catalog = storefind_catalog::load_embedded_catalog()?;
//! let mut locator = StoreLocator::new(
//!     catalog,
//!     Geo,
//!     NoDeviceLocation,
//!     MemoryKeyValueStore::new(),
//!     SearchConfig::default(),
//! )?;
//!
//! let results = locator
//!     .handle_intent(SearchIntent::Address("Portland, OR".to_string()))
//!     .await;
//! println!("{} stores near the anchor", results.stores.len());
//! # Ok(())
//! # }
//! ```

use chrono::NaiveDateTime;
use storefind_catalog::{Catalog, Coordinates, Store};
use tracing::{debug, info, instrument, warn};

use crate::{
    config::SearchConfig,
    error::StorefindError,
    geo::distance_miles,
    locate::{
        self, AddressGeocoder, DeviceLocationProvider, Suggestion, SuggestionDebouncer,
        resolve_device_location,
    },
    pipeline::{self, FilterOptions, SortKey},
    prefs::{KeyValueStore, Preferences, PreferenceStore, PreferencesPatch},
    status::{StatusResult, classify},
};

/// A user-triggered request to change the visible result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchIntent {
    /// Anchor on the device's own position.
    Geolocation,
    /// Anchor on a typed address, resolved through the geocoder.
    Address(String),
    /// Change filter selections without touching the anchor.
    Filter {
        services: Vec<String>,
        open_now: bool,
    },
}

/// Where the orchestrator is in its intent-handling cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    ResolvingLocation,
    ApplyingFilters,
    Settled,
    /// A resolution failed; the next filter pass still runs.
    Error,
}

/// The outcome of one intent: the visible stores and the anchor they were
/// ranked against, plus a non-fatal notice when resolution degraded.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub stores: Vec<Store>,
    pub anchor: Option<Coordinates>,
    pub notice: Option<String>,
}

type Clock = fn() -> NaiveDateTime;

fn wall_clock() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// The search orchestrator.
///
/// Constructed once per session with an immutable [`Catalog`] and the three
/// injected capabilities: an [`AddressGeocoder`], a
/// [`DeviceLocationProvider`], and a [`KeyValueStore`] for preferences.
/// Persisted preferences are read once here and merged over defaults; every
/// user-initiated change writes back incrementally.
pub struct StoreLocator<G, D, K>
where
    G: AddressGeocoder,
    D: DeviceLocationProvider,
    K: KeyValueStore,
{
    catalog: Catalog,
    config: SearchConfig,
    geocoder: G,
    device: D,
    prefs: PreferenceStore<K>,
    debouncer: SuggestionDebouncer,
    clock: Clock,

    anchor: Option<Coordinates>,
    sort_key: SortKey,
    services: Vec<String>,
    open_now: bool,
    preferred_store_id: Option<String>,
    results: Vec<Store>,
    phase: SearchPhase,
    seq: u64,
}

impl<G, D, K> StoreLocator<G, D, K>
where
    G: AddressGeocoder,
    D: DeviceLocationProvider,
    K: KeyValueStore,
{
    /// Create a locator over a loaded catalog.
    ///
    /// An empty catalog is terminal: there is nothing to show and no search
    /// can fix that.
    pub fn new(
        catalog: Catalog,
        geocoder: G,
        device: D,
        store: K,
        config: SearchConfig,
    ) -> Result<Self, StorefindError> {
        if catalog.is_empty() {
            return Err(storefind_catalog::CatalogError::NoStores.into());
        }

        let prefs = PreferenceStore::new(store);
        let persisted = prefs.stored();
        let sort_key = persisted
            .as_ref()
            .map_or(config.default_sort, |p| p.sort_by);
        let initial = persisted.unwrap_or_default();
        info!(
            stores = catalog.len(),
            restored_prefs = !initial.last_search.is_empty() || initial.last_location.is_some(),
            "store locator ready"
        );

        Ok(Self {
            catalog,
            debouncer: SuggestionDebouncer::new(config.suggestion_debounce),
            config,
            geocoder,
            device,
            prefs,
            clock: wall_clock,
            anchor: initial.last_location,
            sort_key,
            services: initial.selected_services,
            open_now: initial.open_now,
            preferred_store_id: initial.preferred_store_id,
            results: Vec::new(),
            phase: SearchPhase::Idle,
            seq: 0,
        })
    }

    /// Replace the time source, for tests that pin `now`.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Handle one search intent end to end.
    ///
    /// Filter intents skip location resolution entirely; geolocation and
    /// address intents resolve first and fall back to a degraded result on
    /// failure rather than an empty state.
    #[instrument(name = "Handle Search Intent", level = "debug", skip(self))]
    pub async fn handle_intent(&mut self, intent: SearchIntent) -> ResultSet {
        match intent {
            SearchIntent::Filter { services, open_now } => {
                self.services = normalize_services(services);
                self.open_now = open_now;
                self.apply_filters(self.anchor, None)
            }
            SearchIntent::Geolocation => {
                let ticket = self.begin_resolution();
                let result =
                    resolve_device_location(&self.device, self.config.device_location_timeout)
                        .await;
                self.complete_geolocation(ticket, result)
            }
            SearchIntent::Address(text) => {
                let ticket = self.begin_resolution();
                let result = self.geocoder.geocode(&text).await;
                self.complete_address(ticket, &text, result)
            }
        }
    }

    /// Start a location resolution, superseding any still in flight.
    ///
    /// Returns the ticket that must accompany the matching `complete_*`
    /// call. [`handle_intent`](Self::handle_intent) does this internally;
    /// drivers that race their own resolution futures can use the split API
    /// directly.
    pub fn begin_resolution(&mut self) -> u64 {
        self.seq += 1;
        self.phase = SearchPhase::ResolvingLocation;
        self.seq
    }

    /// Apply a finished device-location resolution.
    ///
    /// A stale ticket (a newer resolution has started since) is discarded
    /// and the current results are returned untouched.
    pub fn complete_geolocation(
        &mut self,
        ticket: u64,
        result: locate::Result<Coordinates>,
    ) -> ResultSet {
        if self.is_stale(ticket) {
            return self.current_result_set();
        }
        match result {
            Ok(coords) => {
                self.anchor = Some(coords);
                self.prefs.merge(PreferencesPatch {
                    last_location: Some(Some(coords)),
                    ..Default::default()
                });
                self.apply_filters(self.anchor, None)
            }
            Err(error) => {
                warn!(%error, "device location unavailable");
                self.phase = SearchPhase::Error;
                // No anchor change; show the same stores with a notice.
                self.apply_filters(self.anchor, Some("Location unavailable".to_string()))
            }
        }
    }

    /// Apply a finished address geocode.
    ///
    /// On failure the pipeline still runs without an anchor, so the user
    /// sees the full truncated catalog instead of an empty state.
    pub fn complete_address(
        &mut self,
        ticket: u64,
        text: &str,
        result: locate::Result<Coordinates>,
    ) -> ResultSet {
        if self.is_stale(ticket) {
            return self.current_result_set();
        }
        match result {
            Ok(coords) => {
                self.anchor = Some(coords);
                self.prefs.merge(PreferencesPatch {
                    last_location: Some(Some(coords)),
                    last_search: Some(text.to_string()),
                    ..Default::default()
                });
                self.apply_filters(self.anchor, None)
            }
            Err(error) => {
                warn!(%error, text, "address geocoding failed");
                self.phase = SearchPhase::Error;
                self.apply_filters(None, Some(format!("No results for \"{text}\"")))
            }
        }
    }

    /// Change the result ordering and recompute.
    pub fn set_sort_key(&mut self, sort_key: SortKey) -> ResultSet {
        self.sort_key = sort_key;
        self.apply_filters(self.anchor, None)
    }

    /// Pin (or unpin) the preferred store and recompute.
    ///
    /// The id is persisted as given; it only produces a hero entry while it
    /// matches a catalog entry.
    pub fn set_preferred_store(&mut self, id: Option<String>) -> ResultSet {
        self.preferred_store_id = id.clone();
        self.prefs.merge(PreferencesPatch {
            preferred_store_id: Some(id),
            ..Default::default()
        });
        self.apply_filters(self.anchor, None)
    }

    /// Debounced autocomplete suggestions for a partially typed address.
    ///
    /// Independent of the main search flow; a superseded lookup yields
    /// `Ok(None)`.
    pub async fn suggest(&self, text: &str) -> locate::Result<Option<Vec<Suggestion>>> {
        self.debouncer.suggest(&self.geocoder, text).await
    }

    /// Status annotations for a slice of stores, evaluated at the same
    /// instant.
    #[must_use]
    pub fn annotate(&self, stores: &[Store]) -> Vec<StatusResult> {
        let now = (self.clock)();
        stores.iter().map(|s| classify(s, now)).collect()
    }

    /// Status of a single store right now.
    #[must_use]
    pub fn status_of(&self, store: &Store) -> StatusResult {
        classify(store, (self.clock)())
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn anchor(&self) -> Option<Coordinates> {
        self.anchor
    }

    #[must_use]
    pub const fn phase(&self) -> SearchPhase {
        self.phase
    }

    #[must_use]
    pub fn results(&self) -> &[Store] {
        &self.results
    }

    /// The persisted preferences as of now.
    #[must_use]
    pub fn preferences(&self) -> Preferences {
        self.prefs.get()
    }

    fn is_stale(&self, ticket: u64) -> bool {
        if ticket == self.seq {
            return false;
        }
        debug!(ticket, current = self.seq, "stale resolution discarded");
        true
    }

    fn current_result_set(&self) -> ResultSet {
        ResultSet {
            stores: self.results.clone(),
            anchor: self.anchor,
            notice: None,
        }
    }

    /// Run the pipeline against `anchor` and settle.
    ///
    /// `anchor` is usually the owned anchor but is deliberately `None` for
    /// the degraded pass after a geocode failure.
    fn apply_filters(&mut self, anchor: Option<Coordinates>, notice: Option<String>) -> ResultSet {
        self.phase = SearchPhase::ApplyingFilters;
        let now = (self.clock)();
        let filter = FilterOptions {
            services: self.services.clone(),
            open_now: self.open_now,
        };

        let mut stores = pipeline::process(
            self.catalog.stores(),
            &filter,
            Some(self.sort_key),
            anchor,
            self.config.max_results,
            now,
        );
        stores = self.place_hero(stores, anchor);

        self.results = stores.clone();
        self.phase = SearchPhase::Settled;
        self.persist_filter_state();

        ResultSet {
            stores,
            anchor,
            notice,
        }
    }

    /// Move the preferred store to the front, with its own distance against
    /// the anchor used for this pass.
    fn place_hero(&self, mut stores: Vec<Store>, anchor: Option<Coordinates>) -> Vec<Store> {
        let Some(id) = &self.preferred_store_id else {
            return stores;
        };
        let Some(hero) = self.catalog.get(id) else {
            return stores;
        };

        stores.retain(|s| &s.id != id);
        let mut hero = hero.clone();
        if let Some(anchor) = anchor {
            hero.distance = Some(distance_miles(anchor, hero.coordinates()));
        }
        stores.insert(0, hero);
        stores.truncate(self.config.max_results);
        stores
    }

    /// Persist whichever of services/open-now/sort-by changed this pass.
    fn persist_filter_state(&mut self) {
        let current = self.prefs.get();
        let mut patch = PreferencesPatch::default();
        if current.selected_services != self.services {
            patch.selected_services = Some(self.services.clone());
        }
        if current.open_now != self.open_now {
            patch.open_now = Some(self.open_now);
        }
        if current.sort_by != self.sort_key {
            patch.sort_by = Some(self.sort_key);
        }
        self.prefs.merge(patch);
    }
}

fn normalize_services(services: Vec<String>) -> Vec<String> {
    services
        .into_iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use storefind_catalog::build_catalog;

    use super::*;
    use crate::{
        locate::{LocateError, NoDeviceLocation},
        prefs::{MemoryKeyValueStore, PREFS_KEY},
    };

    const DOWNTOWN: Coordinates = Coordinates::new(45.5152, -122.6784);

    #[derive(Clone)]
    struct FixedGeocoder(Option<Coordinates>);

    impl AddressGeocoder for FixedGeocoder {
        async fn geocode(&self, text: &str) -> locate::Result<Coordinates> {
            self.0
                .ok_or_else(|| LocateError::GeocodeFailed(format!("no match for {text:?}")))
        }

        async fn suggest(&self, text: &str) -> locate::Result<Vec<Suggestion>> {
            Ok(vec![Suggestion {
                label: text.to_string(),
                value: text.to_string(),
            }])
        }
    }

    struct FixedDevice(locate::Result<Coordinates>);

    impl DeviceLocationProvider for FixedDevice {
        async fn current_position(&self) -> locate::Result<Coordinates> {
            match &self.0 {
                Ok(c) => Ok(*c),
                Err(LocateError::LocationUnavailable(m)) => {
                    Err(LocateError::LocationUnavailable(m.clone()))
                }
                Err(LocateError::GeocodeFailed(m)) => Err(LocateError::GeocodeFailed(m.clone())),
            }
        }
    }

    fn test_catalog() -> Catalog {
        let row = |name: &str, coords: &str, services: &str| {
            vec![
                json!(name),
                json!("1 Test St, Portland, OR, 97201"),
                json!(coords),
                json!(""),
                json!("24 hours"),
                json!(services),
            ]
        };
        build_catalog(&[
            row("Near Grocery", "45.52,-122.68", "grocery"),
            row("Mid Pharmacy", "45.55,-122.70", "pharmacy"),
            row("Far Deli", "45.60,-122.75", "deli, grocery"),
        ])
    }

    fn noon() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2026, 8, 24)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn locator(
        geocoder: FixedGeocoder,
        store: MemoryKeyValueStore,
    ) -> StoreLocator<FixedGeocoder, NoDeviceLocation, MemoryKeyValueStore> {
        StoreLocator::new(
            test_catalog(),
            geocoder,
            NoDeviceLocation,
            store,
            SearchConfig::default(),
        )
        .unwrap()
        .with_clock(noon)
    }

    #[test]
    fn empty_catalog_is_terminal() {
        let result = StoreLocator::new(
            Catalog::default(),
            FixedGeocoder(None),
            NoDeviceLocation,
            MemoryKeyValueStore::new(),
            SearchConfig::default(),
        );
        assert!(matches!(result, Err(StorefindError::Catalog(_))));
    }

    #[tokio::test]
    async fn filter_intent_skips_resolution_and_persists() {
        let mut locator = locator(FixedGeocoder(None), MemoryKeyValueStore::new());
        let results = locator
            .handle_intent(SearchIntent::Filter {
                services: vec![" Grocery ".to_string()],
                open_now: true,
            })
            .await;

        assert_eq!(locator.phase(), SearchPhase::Settled);
        assert_eq!(results.stores.len(), 2);
        assert!(results.anchor.is_none());

        let prefs = locator.preferences();
        assert_eq!(prefs.selected_services, vec!["grocery".to_string()]);
        assert!(prefs.open_now);
    }

    #[tokio::test]
    async fn address_intent_anchors_sorts_and_persists() {
        let mut locator = locator(FixedGeocoder(Some(DOWNTOWN)), MemoryKeyValueStore::new());
        let results = locator
            .handle_intent(SearchIntent::Address("downtown portland".to_string()))
            .await;

        assert_eq!(results.anchor, Some(DOWNTOWN));
        assert_eq!(results.stores[0].name, "Near Grocery");
        assert!(results.stores.iter().all(|s| s.distance.is_some()));
        assert!(results.notice.is_none());

        let prefs = locator.preferences();
        assert_eq!(prefs.last_search, "downtown portland");
        assert_eq!(prefs.last_location, Some(DOWNTOWN));
    }

    #[tokio::test]
    async fn geocode_failure_degrades_to_full_truncated_catalog() {
        let mut locator = locator(FixedGeocoder(None), MemoryKeyValueStore::new());
        let results = locator
            .handle_intent(SearchIntent::Address("nowhere at all".to_string()))
            .await;

        assert_eq!(results.stores.len(), 3, "full catalog, not an empty state");
        assert!(results.anchor.is_none());
        assert!(results.stores.iter().all(|s| s.distance.is_none()));
        assert!(results.notice.unwrap().contains("nowhere at all"));
        assert_eq!(locator.phase(), SearchPhase::Settled);
        assert_eq!(locator.preferences().last_search, "", "failure persists nothing");
    }

    #[tokio::test]
    async fn geolocation_success_sets_anchor() {
        let mut locator = StoreLocator::new(
            test_catalog(),
            FixedGeocoder(None),
            FixedDevice(Ok(DOWNTOWN)),
            MemoryKeyValueStore::new(),
            SearchConfig::default(),
        )
        .unwrap()
        .with_clock(noon);

        let results = locator.handle_intent(SearchIntent::Geolocation).await;
        assert_eq!(results.anchor, Some(DOWNTOWN));
        assert_eq!(locator.preferences().last_location, Some(DOWNTOWN));
    }

    #[tokio::test]
    async fn geolocation_failure_keeps_anchor_and_notices() {
        let store = MemoryKeyValueStore::new();
        let mut locator = locator(FixedGeocoder(Some(DOWNTOWN)), store);

        // Anchor first via address, then fail a geolocation.
        locator
            .handle_intent(SearchIntent::Address("downtown".to_string()))
            .await;
        let results = locator.handle_intent(SearchIntent::Geolocation).await;

        assert_eq!(results.anchor, Some(DOWNTOWN), "anchor unchanged");
        assert_eq!(results.notice.as_deref(), Some("Location unavailable"));
        assert_eq!(locator.phase(), SearchPhase::Settled);
    }

    #[tokio::test]
    async fn stale_resolution_is_discarded() {
        let mut locator = locator(FixedGeocoder(None), MemoryKeyValueStore::new());
        locator
            .handle_intent(SearchIntent::Filter {
                services: vec![],
                open_now: false,
            })
            .await;

        let old = locator.begin_resolution();
        let newer = locator.begin_resolution();

        // The older, slower resolution lands after the newer one started.
        let stale = locator.complete_address(old, "old query", Ok(DOWNTOWN));
        assert!(stale.anchor.is_none(), "stale anchor discarded");
        assert_eq!(locator.anchor(), None);

        let fresh = locator.complete_address(
            newer,
            "new query",
            Ok(Coordinates::new(45.6, -122.7)),
        );
        assert_eq!(fresh.anchor, Some(Coordinates::new(45.6, -122.7)));
        assert_eq!(locator.preferences().last_search, "new query");
    }

    #[tokio::test]
    async fn preferred_store_leads_the_results() {
        let mut locator = locator(FixedGeocoder(Some(DOWNTOWN)), MemoryKeyValueStore::new());
        locator
            .handle_intent(SearchIntent::Address("downtown".to_string()))
            .await;

        // Far Deli would normally sort last by distance.
        let results = locator.set_preferred_store(Some("store-3".to_string()));
        assert_eq!(results.stores[0].name, "Far Deli");
        assert!(results.stores[0].distance.is_some());
        assert_eq!(
            locator.preferences().preferred_store_id.as_deref(),
            Some("store-3")
        );

        // Unknown ids persist but produce no hero.
        let results = locator.set_preferred_store(Some("store-99".to_string()));
        assert_eq!(results.stores[0].name, "Near Grocery");
    }

    #[tokio::test]
    async fn sort_key_change_reorders_and_persists() {
        let mut locator = locator(FixedGeocoder(None), MemoryKeyValueStore::new());
        let results = locator.set_sort_key(SortKey::Name);
        assert_eq!(results.stores[0].name, "Far Deli");
        assert_eq!(locator.preferences().sort_by, SortKey::Name);
    }

    #[tokio::test]
    async fn persisted_preferences_are_restored_at_startup() {
        let mut seed = MemoryKeyValueStore::new();
        seed.set(
            PREFS_KEY,
            r#"{"lastSearch":"burnside","sortBy":"name","selectedServices":["grocery"],
                "openNow":false,"lastLocation":{"lat":45.52,"lng":-122.68},
                "preferredStoreId":null}"#,
        );

        let mut locator = locator(FixedGeocoder(None), seed);
        let results = locator
            .handle_intent(SearchIntent::Filter {
                services: vec!["grocery".to_string()],
                open_now: false,
            })
            .await;

        assert_eq!(results.anchor, Some(Coordinates::new(45.52, -122.68)));
        assert_eq!(results.stores[0].name, "Far Deli", "name sort restored");
        assert!(results.stores.iter().all(|s| s.distance.is_some()));
    }

    #[tokio::test]
    async fn suggestions_flow_through_the_debouncer() {
        let locator = locator(FixedGeocoder(Some(DOWNTOWN)), MemoryKeyValueStore::new());
        let suggestions = locator.suggest("haw").await.unwrap().unwrap();
        assert_eq!(suggestions[0].value, "haw");
    }
}
