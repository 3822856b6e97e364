//! Core store data model.
//!
//! Everything in here is plain data: a [`Store`] is an immutable record owned
//! by the [`Catalog`](crate::Catalog) once built, and the only derived field
//! is `distance`, which is attached to *copies* of a store when an anchor
//! location is known and never written back to the shared catalog.

use std::collections::BTreeSet;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether this pair is usable as a real location.
    ///
    /// Out-of-range values are invalid, and the exact origin `(0, 0)` is
    /// treated as "unset" rather than a point in the Gulf of Guinea, since
    /// authored data uses it as a placeholder.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        if self.lat == 0.0 && self.lng == 0.0 {
            return false;
        }
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// A postal address with its resolved coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub coordinates: Coordinates,
}

/// Optional ways to reach a store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Opening and closing times for a single day, as zero-padded 24-hour
/// `"HH:MM"` strings.
///
/// The string form is deliberate: zero-padded same-format times compare
/// correctly with plain lexicographic ordering, which is how the status
/// classifier evaluates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub open: String,
    pub close: String,
}

impl DayHours {
    #[must_use]
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// True for the canonical around-the-clock window `00:00`–`23:59`.
    #[must_use]
    pub fn is_around_the_clock(&self) -> bool {
        self.open == "00:00" && self.close == "23:59"
    }
}

/// Weekly opening hours keyed by lowercase weekday name
/// (`"monday"`..`"sunday"`). A missing day means "closed that day".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyHours(std::collections::BTreeMap<String, DayHours>);

/// Weekday names in catalog order, Monday first.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

impl WeeklyHours {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, day: &str, hours: DayHours) {
        self.0.insert(day.to_string(), hours);
    }

    /// Hours for a given weekday, or `None` when the store is closed that day.
    #[must_use]
    pub fn for_weekday(&self, day: Weekday) -> Option<&DayHours> {
        self.0.get(weekday_name(day))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Open every day, all day (`00:00`–`23:59`).
    #[must_use]
    pub fn around_the_clock() -> Self {
        let mut hours = Self::new();
        for day in WEEKDAY_NAMES {
            hours.set(day, DayHours::new("00:00", "23:59"));
        }
        hours
    }

    /// The fixed fallback schedule substituted for unparseable hours text:
    /// 09:00–21:00 Monday through Saturday, 10:00–20:00 Sunday.
    #[must_use]
    pub fn default_schedule() -> Self {
        let mut hours = Self::new();
        for day in &WEEKDAY_NAMES[..6] {
            hours.set(day, DayHours::new("09:00", "21:00"));
        }
        hours.set("sunday", DayHours::new("10:00", "20:00"));
        hours
    }

    /// Whether a JSON value already has the structured weekly-hours shape.
    #[must_use]
    pub fn matches_shape(value: &serde_json::Value) -> bool {
        let Some(map) = value.as_object() else {
            return false;
        };
        !map.is_empty()
            && map.keys().all(|k| WEEKDAY_NAMES.contains(&k.as_str()))
            && map
                .values()
                .all(|v| serde_json::from_value::<DayHours>(v.clone()).is_ok())
    }
}

/// Lowercase English name for a [`chrono::Weekday`].
#[must_use]
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// A dated override of the weekly schedule, e.g. a holiday closure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialHours {
    pub date: NaiveDate,
    pub status: String,
}

impl SpecialHours {
    /// Status value that forces a closed classification for the day.
    pub const CLOSED: &'static str = "closed";
}

/// A single validated store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    /// Stable ordinal-based identifier, unique within a catalog.
    pub id: String,
    pub name: String,
    pub address: StoreAddress,
    #[serde(default)]
    pub contact: ContactInfo,
    /// `None` means the store's hours are unknown, not that it is closed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<WeeklyHours>,
    /// Lowercase trimmed service tags, membership-tested by the filter stage.
    #[serde(default)]
    pub services: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub special_hours: Vec<SpecialHours>,
    #[serde(default)]
    pub featured: bool,
    /// Miles from the current anchor. Derived and non-persistent: present
    /// only on copies handed out by the pipeline, never on catalog entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl Store {
    #[must_use]
    pub const fn coordinates(&self) -> Coordinates {
        self.address.coordinates
    }

    /// Whether the store offers every one of the given service tags.
    #[must_use]
    pub fn has_all_services<S: AsRef<str>>(&self, wanted: &[S]) -> bool {
        wanted.iter().all(|s| self.services.contains(s.as_ref()))
    }

    /// The special-hours entry for a given date, if any.
    #[must_use]
    pub fn special_hours_for(&self, date: NaiveDate) -> Option<&SpecialHours> {
        self.special_hours.iter().find(|s| s.date == date)
    }
}
