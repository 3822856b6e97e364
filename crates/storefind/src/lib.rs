//! Storefind - Store Locator Core Library
//!
//! Storefind turns raw authored store rows, a user's location intent, and
//! filter preferences into an ordered, annotated result set: the engine
//! behind a "find a store near you" page. Rendering, map tiles, and the
//! geocoding transport are external collaborators; this crate owns the hard
//! middle: geospatial ranking, a validate → filter → sort → truncate
//! pipeline, an open/closed status state machine, and the asynchronous
//! orchestration that keeps competing inputs converging on one result set.
//!
//! # Quick Start
//!
//! ```rust
//! use storefind::{FilterOptions, SortKey, pipeline};
//! use storefind_catalog::Coordinates;
//!
//! // Load the catalog embedded at compile time.
//! let catalog = storefind::catalog::load_embedded_catalog()?;
//!
//! // Rank everything against a downtown anchor.
//! let anchor = Coordinates::new(45.5152, -122.6784);
//! let now = chrono::Local::now().naive_local();
//! let nearby = pipeline::process(
//!     catalog.stores(),
//!     &FilterOptions::default(),
//!     Some(SortKey::Distance),
//!     Some(anchor),
//!     10,
//!     now,
//! );
//!
//! for store in &nearby {
//!     println!("{} ({:.1} mi)", store.name, store.distance.unwrap_or_default());
//! }
//! # Ok::<(), storefind::StorefindError>(())
//! ```
//!
//! # Features
//!
//! - **Catalog validation**: forgiving row parsing that drops and counts
//!   incomplete authored stores
//! - **Great-circle ranking**: haversine distances in miles, attached to
//!   result copies whenever an anchor is known
//! - **Status classification**: open / closing-soon / opening-soon / closed
//!   with exact remaining minutes, pure and clock-injectable
//! - **Search orchestration**: one [`StoreLocator`] owning all mutable
//!   search state, with sequence-fenced resolution so stale geocodes never
//!   clobber newer intents
//! - **Durable preferences**: shallow-merged key-value persistence that
//!   degrades to defaults instead of erroring
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod config;
mod core;
pub mod error;
pub mod geo;
pub mod locate;
pub mod pipeline;
pub mod prefs;
pub mod status;

pub use self::core::{ResultSet, SearchIntent, SearchPhase, StoreLocator};

pub use config::{SearchConfig, SearchConfigBuilder};
pub use error::{Result, StorefindError};
pub use geo::distance_miles;
pub use locate::{
    AddressGeocoder, DeviceLocationProvider, LocateError, NoDeviceLocation, Suggestion,
    SuggestionDebouncer,
};
pub use pipeline::{FilterOptions, SortKey};
pub use prefs::{
    FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, PreferenceStore, Preferences,
    PreferencesPatch,
};
pub use status::{StatusResult, StoreState, classify};
// Re-export the catalog data layer.
pub use storefind_catalog as catalog;
pub use storefind_catalog::{Catalog, CatalogSource, Coordinates, Store};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the storefind library.
///
/// This sets up structured logging with configurable levels and filtering.
/// Call this once at the start of your application to enable detailed
/// logging output from storefind operations.
///
/// # Arguments
///
/// * `level` - The minimum log level to display
///
/// # Examples
///
/// ```rust
/// use storefind::init_logging;
/// use tracing::Level;
///
/// // Initialize with info-level logging
/// init_logging(Level::INFO)?;
/// # Ok::<(), storefind::StorefindError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static ()> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("hyper_util=warn".parse().expect("static directive"))
            .add_directive("reqwest=warn".parse().expect("static directive"));

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .init();
        Ok(())
    })
}
