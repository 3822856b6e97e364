//! Catalog sources.
//!
//! A [`CatalogSource`] names where store data comes from; every variant is
//! normalized to the same [`Catalog`] shape before it reaches the search
//! core. Documents may contain either authored positional rows or pre-shaped
//! store objects.

use std::path::PathBuf;

use serde_json::Value;
use tracing::{info, instrument};

use crate::{
    embedded,
    error::{CatalogError, Result},
    model::Store,
    raw::{Catalog, RawStoreRow, build_catalog},
};

/// Where to load the store catalog from, selected by configuration.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    /// Authored rows passed in directly.
    Authored(Vec<RawStoreRow>),
    /// The fixture embedded at compile time.
    Embedded,
    /// A JSON file on disk.
    JsonFile(PathBuf),
    /// A remote JSON document fetched over HTTP.
    #[cfg(feature = "remote")]
    RemoteJson(String),
}

impl CatalogSource {
    /// Load and validate the catalog.
    ///
    /// A source that yields no usable stores is a terminal
    /// [`CatalogError::NoStores`]; everything downstream needs at least one
    /// store to work with.
    #[instrument(name = "Load Catalog", level = "info", skip(self))]
    pub async fn load(&self) -> Result<Catalog> {
        let catalog = match self {
            Self::Authored(rows) => build_catalog(rows),
            Self::Embedded => embedded::load_embedded_catalog()?,
            Self::JsonFile(path) => {
                let text = std::fs::read_to_string(path)?;
                catalog_from_json(&serde_json::from_str(&text)?)?
            }
            #[cfg(feature = "remote")]
            Self::RemoteJson(url) => {
                let value = reqwest::get(url)
                    .await?
                    .error_for_status()?
                    .json::<Value>()
                    .await?;
                catalog_from_json(&value)?
            }
        };

        if catalog.is_empty() {
            return Err(CatalogError::NoStores);
        }
        info!(
            stores = catalog.len(),
            dropped = catalog.dropped(),
            "catalog loaded"
        );
        Ok(catalog)
    }
}

/// Normalize a JSON document into a [`Catalog`].
///
/// Accepts an array of positional rows or an array of store objects.
pub fn catalog_from_json(value: &Value) -> Result<Catalog> {
    let Some(entries) = value.as_array() else {
        return Err(CatalogError::UnsupportedShape);
    };

    match entries.first() {
        None => Ok(Catalog::default()),
        Some(Value::Array(_)) => {
            let rows: Vec<RawStoreRow> = serde_json::from_value(value.clone())?;
            Ok(build_catalog(&rows))
        }
        Some(Value::Object(_)) => {
            let stores: Vec<Store> = serde_json::from_value(value.clone())?;
            Ok(Catalog::from_stores(stores))
        }
        Some(_) => Err(CatalogError::UnsupportedShape),
    }
}
