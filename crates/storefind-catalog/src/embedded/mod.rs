//! Embedded store fixture.
//!
//! A small authored catalog ships with the library so it works out of the box
//! without any external data source. The fixture intentionally includes two
//! staged rows that fail validation, keeping the drop-counting path exercised
//! in every build.

use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::info;

use crate::{
    error::Result,
    raw::{Catalog, RawStoreRow, build_catalog},
};

const EMBEDDED_ROWS: &str = include_str!("stores.json");

/// Metadata about the embedded fixture.
#[derive(Debug, Clone)]
pub struct EmbeddedMetadata {
    pub source: &'static str,
    pub rows: usize,
}

pub static METADATA: Lazy<EmbeddedMetadata> = Lazy::new(|| EmbeddedMetadata {
    source: "embedded:stores.json",
    rows: serde_json::from_str::<Vec<Value>>(EMBEDDED_ROWS)
        .map(|rows| rows.len())
        .unwrap_or(0),
});

/// The raw authored rows embedded at compile time.
pub fn embedded_rows() -> Result<Vec<RawStoreRow>> {
    Ok(serde_json::from_str(EMBEDDED_ROWS)?)
}

/// Build a [`Catalog`] from the embedded fixture.
pub fn load_embedded_catalog() -> Result<Catalog> {
    let rows = embedded_rows()?;
    let catalog = build_catalog(&rows);
    info!(
        stores = catalog.len(),
        dropped = catalog.dropped(),
        source = METADATA.source,
        "loaded embedded catalog"
    );
    Ok(catalog)
}
