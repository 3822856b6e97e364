//! Raw-row parsing and catalog construction.
//!
//! Authored store data arrives as positional rows (JSON arrays). The builder
//! validates and normalizes each row into a [`Store`], silently dropping rows
//! that are not yet complete enough to show: authored content intentionally
//! stages "future" stores with missing fields, so a bad row is counted, not
//! reported individually.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::model::{ContactInfo, Coordinates, Store, StoreAddress, WeeklyHours};

/// One authored store row: a positional JSON array.
///
/// Field order: name, address text, coordinate text, phone, hours text (or a
/// structured weekly-hours object), services text, then optionally photo and
/// details text. Rows with fewer than six fields are dropped.
pub type RawStoreRow = Vec<Value>;

/// Minimum number of positional fields for a usable row.
pub const MIN_ROW_FIELDS: usize = 6;

static TWENTY_FOUR_HOURS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*24\s*hours?\s*$").expect("static pattern"));

/// The full, validated, immutable store set for a session.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    stores: Vec<Store>,
    dropped: usize,
}

impl Catalog {
    /// Build a catalog from pre-shaped stores, dropping entries with invalid
    /// coordinates or empty names the same way the row builder does.
    #[must_use]
    pub fn from_stores(stores: Vec<Store>) -> Self {
        let total = stores.len();
        let stores: Vec<Store> = stores
            .into_iter()
            .filter(|s| !s.name.trim().is_empty() && s.coordinates().is_valid())
            .collect();
        let dropped = total - stores.len();
        if dropped > 0 {
            warn!(dropped, kept = stores.len(), "dropped invalid store entries");
        }
        Self { stores, dropped }
    }

    #[must_use]
    pub fn stores(&self) -> &[Store] {
        &self.stores
    }

    /// Number of rows that failed validation during the build.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Look up a store by its stable id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Store> {
        self.stores.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Store> {
        self.stores.iter()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Store;
    type IntoIter = std::slice::Iter<'a, Store>;

    fn into_iter(self) -> Self::IntoIter {
        self.stores.iter()
    }
}

/// Build a [`Catalog`] from authored rows.
///
/// Runs exactly once per catalog load; the result is treated as immutable for
/// the remainder of the session. Ids are assigned ordinally over the rows
/// that survive validation.
#[must_use]
pub fn build_catalog(rows: &[RawStoreRow]) -> Catalog {
    let mut stores = Vec::with_capacity(rows.len());

    for row in rows {
        if let Some(store) = parse_row(row, stores.len() + 1) {
            stores.push(store);
        }
    }

    let dropped = rows.len() - stores.len();
    if dropped > 0 {
        warn!(dropped, kept = stores.len(), "dropped incomplete store rows");
    }
    debug!(stores = stores.len(), "catalog build complete");

    Catalog { stores, dropped }
}

fn parse_row(row: &RawStoreRow, ordinal: usize) -> Option<Store> {
    if row.len() < MIN_ROW_FIELDS {
        return None;
    }

    let name = text_field(&row[0])?;
    let address_text = text_field(&row[1])?;
    let coordinates = parse_coordinates(&text_field(&row[2])?)?;
    let phone = row.get(3).and_then(|v| v.as_str()).map(str::trim);
    let hours = parse_hours(&row[4]);
    let services = row
        .get(5)
        .and_then(|v| v.as_str())
        .map(|s| split_tags(s, true))
        .unwrap_or_default();

    let photo = row
        .get(6)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned);
    let details = row
        .get(7)
        .and_then(|v| v.as_str())
        .map(|s| split_details(s))
        .unwrap_or_default();

    let mut address = parse_address(&address_text);
    address.coordinates = coordinates;

    Some(Store {
        id: format!("store-{ordinal}"),
        name,
        address,
        contact: ContactInfo {
            phone: phone.filter(|p| !p.is_empty()).map(ToOwned::to_owned),
            email: None,
        },
        hours: Some(hours),
        services,
        photo,
        details,
        special_hours: Vec::new(),
        featured: false,
        distance: None,
    })
}

/// A non-empty trimmed string field, or `None` when the value is missing,
/// not a string, or blank.
fn text_field(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

/// Split address text positionally into street/city/state/zip.
///
/// Missing trailing parts become empty strings, never an error.
#[must_use]
pub fn parse_address(text: &str) -> StoreAddress {
    let mut parts = text.split(',').map(str::trim);
    let part = |p: Option<&str>| p.unwrap_or_default().to_string();
    StoreAddress {
        street: part(parts.next()),
        city: part(parts.next()),
        state: part(parts.next()),
        zip: part(parts.next()),
        coordinates: Coordinates::new(0.0, 0.0),
    }
}

/// Parse `"lat,lng"` text into valid [`Coordinates`].
///
/// Returns `None` for non-numeric or out-of-range values and for the
/// placeholder origin `(0,0)`, all of which invalidate the owning row.
#[must_use]
pub fn parse_coordinates(text: &str) -> Option<Coordinates> {
    let (lat, lng) = text.split_once(',')?;
    let coords = Coordinates::new(
        lat.trim().parse::<f64>().ok()?,
        lng.trim().parse::<f64>().ok()?,
    );
    coords.is_valid().then_some(coords)
}

/// Comma-split a tag list, trimming and discarding empty tokens.
#[must_use]
pub fn split_tags(text: &str, lowercase: bool) -> BTreeSet<String> {
    text.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            if lowercase {
                t.to_lowercase()
            } else {
                t.to_string()
            }
        })
        .collect()
}

fn split_details(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Normalize an hours field into [`WeeklyHours`].
///
/// Accepts a structured weekly-hours object (passed through as-is), the
/// literal `"24 hours"` pattern (open every day `00:00`–`23:59`), or anything
/// else, which is replaced by the fixed default schedule. Free-form textual
/// ranges are intentionally not parsed.
#[must_use]
pub fn parse_hours(value: &Value) -> WeeklyHours {
    if WeeklyHours::matches_shape(value) {
        if let Ok(hours) = serde_json::from_value(value.clone()) {
            return hours;
        }
    }
    if let Some(text) = value.as_str() {
        if TWENTY_FOUR_HOURS.is_match(text) {
            return WeeklyHours::around_the_clock();
        }
    }
    WeeklyHours::default_schedule()
}
