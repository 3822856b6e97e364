//! Filter/sort pipeline.
//!
//! Turns the shared catalog into the visible result list in four strictly
//! ordered stages: filter, distance attach, sort, truncate. The pipeline is
//! synchronous and side-effect-free; stores are cloned before distance is
//! attached so the catalog itself never mutates.

use std::cmp::Ordering;

use chrono::NaiveDateTime;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use storefind_catalog::{Coordinates, Store};
use tracing::debug;

use crate::{geo::distance_miles, status::is_open};

/// How the visible result list is ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Ascending distance from the anchor; input order when no anchor exists.
    #[default]
    Distance,
    /// Case-insensitive name, ascending.
    Name,
    /// Reverse catalog order, treating later-authored rows as newer.
    Recent,
}

impl SortKey {
    /// Parse a persisted sort key. Unknown keys yield `None`, which leaves
    /// the result order unchanged.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "distance" => Some(Self::Distance),
            "name" => Some(Self::Name),
            "recent" => Some(Self::Recent),
            _ => None,
        }
    }
}

/// Active filter selections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// A store must offer *every* selected service to pass.
    pub services: Vec<String>,
    /// When set, only stores open at evaluation time pass.
    pub open_now: bool,
}

/// Run the pipeline: filter, attach distances, sort, truncate.
///
/// Distance is attached to every surviving store whenever an anchor is known,
/// regardless of the chosen sort key, so it is always available for display.
/// The sort is stable, which makes the output exactly reproducible for a
/// fixed catalog, filter, sort key, and anchor (ties keep input order).
#[must_use]
pub fn process(
    stores: &[Store],
    filter: &FilterOptions,
    sort: Option<SortKey>,
    anchor: Option<Coordinates>,
    max_results: usize,
    now: NaiveDateTime,
) -> Vec<Store> {
    let mut visible = stores
        .iter()
        .filter(|store| store.has_all_services(&filter.services))
        .filter(|store| !filter.open_now || is_open(store, now))
        .cloned()
        .collect_vec();

    if let Some(anchor) = anchor {
        for store in &mut visible {
            store.distance = Some(distance_miles(anchor, store.coordinates()));
        }
    }

    match sort {
        Some(SortKey::Distance) if anchor.is_some() => {
            visible.sort_by(|a, b| {
                a.distance
                    .partial_cmp(&b.distance)
                    .unwrap_or(Ordering::Equal)
            });
        }
        Some(SortKey::Name) => visible.sort_by_cached_key(|s| s.name.to_lowercase()),
        Some(SortKey::Recent) => visible.reverse(),
        // Distance without an anchor and unknown keys keep input order.
        Some(SortKey::Distance) | None => {}
    }

    visible.truncate(max_results);
    debug!(
        visible = visible.len(),
        total = stores.len(),
        ?sort,
        anchored = anchor.is_some(),
        "pipeline pass complete"
    );
    visible
}
