//! Store catalog data layer for the storefind library.
//!
//! This crate owns the store data model and everything that turns raw
//! authored content into a validated, immutable [`Catalog`]:
//!
//! - [`model`] — the [`Store`] record and its component types
//! - [`raw`] — positional-row parsing and catalog construction
//! - [`source`] — catalog sources (authored rows, embedded fixture, JSON
//!   file, remote JSON behind the `remote` feature), all normalized to the
//!   same catalog shape
//! - [`test_data`] — authored-row generation for tests
//!
//! Validation is deliberately forgiving: authored content may stage "future"
//! incomplete stores, so bad rows are silently dropped and counted rather
//! than reported individually. Only a source that yields *no* stores at all
//! is an error.
//!
//! ```rust
//! use storefind_catalog::build_catalog;
//! use serde_json::json;
//!
//! let rows = vec![vec![
//!     json!("Acme"),
//!     json!("123 Main St, Portland, OR, 97201"),
//!     json!("45.5,-122.6"),
//!     json!("555-1234"),
//!     json!("24 hours"),
//!     json!("pharmacy, deli"),
//! ]];
//! let catalog = build_catalog(&rows);
//! assert_eq!(catalog.len(), 1);
//! ```

pub mod embedded;
mod error;
pub mod model;
pub mod raw;
pub mod source;
pub mod test_data;

pub use embedded::load_embedded_catalog;
pub use error::{CatalogError, Result};
pub use model::{
    ContactInfo, Coordinates, DayHours, SpecialHours, Store, StoreAddress, WEEKDAY_NAMES,
    WeeklyHours, weekday_name,
};
pub use raw::{Catalog, RawStoreRow, build_catalog};
pub use source::{CatalogSource, catalog_from_json};
pub use test_data::{TestCatalogConfig, create_test_rows};
