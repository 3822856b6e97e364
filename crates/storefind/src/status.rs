//! Open/closed status classification.
//!
//! [`classify`] is a pure function of a store's hours, its special-hours
//! overrides, and an injected `now`; there is no hidden state, which keeps
//! every time-window edge case unit-testable.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use storefind_catalog::{DayHours, SpecialHours, Store};

/// Window before closing (and before opening) that counts as "soon".
pub const SOON_WINDOW_MINUTES: u32 = 60;

/// Display state of a store at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreState {
    Open,
    ClosingSoon,
    OpeningSoon,
    Closed,
    Unknown,
}

/// Classification outcome for one store, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResult {
    pub state: StoreState,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes_remaining: Option<u32>,
}

impl StatusResult {
    fn new(state: StoreState, message: impl Into<String>) -> Self {
        Self {
            state,
            message: message.into(),
            minutes_remaining: None,
        }
    }

    fn with_minutes(state: StoreState, message: String, minutes: u32) -> Self {
        Self {
            state,
            message,
            minutes_remaining: Some(minutes),
        }
    }
}

/// Classify a store's status at `now`.
///
/// Precedence: unknown hours, then a special-hours closure for today's date,
/// then the weekly schedule. Within the weekly schedule the open window is
/// half-open `[open, close)`, with a 60-minute "soon" edge on both sides.
#[must_use]
pub fn classify(store: &Store, now: NaiveDateTime) -> StatusResult {
    let Some(hours) = &store.hours else {
        return StatusResult::new(StoreState::Unknown, "Hours unknown");
    };

    if let Some(special) = store.special_hours_for(now.date()) {
        if special.status == SpecialHours::CLOSED {
            return StatusResult::new(StoreState::Closed, "Closed today");
        }
    }

    let Some(day) = hours.for_weekday(now.date().weekday()) else {
        return StatusResult::new(StoreState::Closed, "Closed today");
    };

    if day.is_around_the_clock() {
        return StatusResult::new(StoreState::Open, "Open 24 hours");
    }

    classify_window(day, now)
}

fn classify_window(day: &DayHours, now: NaiveDateTime) -> StatusResult {
    let now_hhmm = format!("{:02}:{:02}", now.time().hour(), now.time().minute());

    if window::contains(&day.open, &day.close, &now_hhmm) {
        if let Some(remaining) = window::minutes_until(&now_hhmm, &day.close) {
            if remaining <= SOON_WINDOW_MINUTES {
                return StatusResult::with_minutes(
                    StoreState::ClosingSoon,
                    format!("Closing soon: {remaining} min"),
                    remaining,
                );
            }
        }
        return StatusResult::new(StoreState::Open, format!("Open until {}", day.close));
    }

    if now_hhmm.as_str() < day.open.as_str() {
        if let Some(until) = window::minutes_until(&now_hhmm, &day.open) {
            if until <= SOON_WINDOW_MINUTES {
                return StatusResult::with_minutes(
                    StoreState::OpeningSoon,
                    format!("Opening soon: {until} min"),
                    until,
                );
            }
        }
    }

    StatusResult::new(StoreState::Closed, format!("Closed, opens at {}", day.open))
}

/// Whether the store counts as "open now" for filtering purposes.
///
/// Closing-soon still means the doors are open.
#[must_use]
pub fn is_open(store: &Store, now: NaiveDateTime) -> bool {
    matches!(
        classify(store, now).state,
        StoreState::Open | StoreState::ClosingSoon
    )
}

/// Time-of-day window comparisons on zero-padded `"HH:MM"` strings.
///
/// Lexicographic comparison is correct for same-day, same-format times, and
/// keeping it behind this module means the format cannot drift.
pub mod window {
    /// True when `now` lies in the half-open window `[open, close)`.
    #[must_use]
    pub fn contains(open: &str, close: &str, now: &str) -> bool {
        open <= now && now < close
    }

    /// Whole minutes from `from` until `to`, or `None` when `to` is not
    /// later within the same day or either time is malformed.
    #[must_use]
    pub fn minutes_until(from: &str, to: &str) -> Option<u32> {
        let diff = i64::from(minute_of_day(to)?) - i64::from(minute_of_day(from)?);
        u32::try_from(diff).ok()
    }

    fn minute_of_day(hhmm: &str) -> Option<u32> {
        let (h, m) = hhmm.split_once(':')?;
        let h: u32 = h.parse().ok()?;
        let m: u32 = m.parse().ok()?;
        (h < 24 && m < 60).then_some(h * 60 + m)
    }

}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use storefind_catalog::{DayHours, WeeklyHours, build_catalog};

    use super::*;

    fn monday(hhmm: &str) -> NaiveDateTime {
        // 2026-08-24 is a Monday.
        let (h, m) = hhmm.split_once(':').unwrap();
        NaiveDate::from_ymd_opt(2026, 8, 24)
            .unwrap()
            .and_hms_opt(h.parse().unwrap(), m.parse().unwrap(), 0)
            .unwrap()
    }

    fn store_with_monday_hours(open: &str, close: &str) -> Store {
        let mut hours = WeeklyHours::new();
        hours.set("monday", DayHours::new(open, close));
        store_with_hours(Some(hours))
    }

    fn store_with_hours(hours: Option<WeeklyHours>) -> Store {
        let row = vec![
            serde_json::json!("Acme"),
            serde_json::json!("123 Main St, Portland, OR, 97201"),
            serde_json::json!("45.5,-122.6"),
            serde_json::json!(""),
            serde_json::json!("24 hours"),
            serde_json::json!(""),
        ];
        let mut store = build_catalog(&[row]).stores()[0].clone();
        store.hours = hours;
        store
    }

    #[test]
    fn absent_hours_are_unknown() {
        let store = store_with_hours(None);
        let status = classify(&store, monday("12:00"));
        assert_eq!(status.state, StoreState::Unknown);
    }

    #[test]
    fn special_hours_closure_overrides_weekly_schedule() {
        let mut store = store_with_monday_hours("09:00", "21:00");
        store.special_hours.push(SpecialHours {
            date: NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(),
            status: SpecialHours::CLOSED.to_string(),
        });

        let status = classify(&store, monday("12:00"));
        assert_eq!(status.state, StoreState::Closed);
    }

    #[test]
    fn special_hours_on_other_dates_do_not_apply() {
        let mut store = store_with_monday_hours("09:00", "21:00");
        store.special_hours.push(SpecialHours {
            date: NaiveDate::from_ymd_opt(2026, 8, 25).unwrap(),
            status: SpecialHours::CLOSED.to_string(),
        });

        assert_eq!(classify(&store, monday("12:00")).state, StoreState::Open);
    }

    #[test]
    fn missing_weekday_means_closed_today() {
        let mut hours = WeeklyHours::new();
        hours.set("tuesday", DayHours::new("09:00", "21:00"));
        let store = store_with_hours(Some(hours));

        let status = classify(&store, monday("12:00"));
        assert_eq!(status.state, StoreState::Closed);
        assert_eq!(status.message, "Closed today");
    }

    #[test]
    fn around_the_clock_is_always_open() {
        let store = store_with_hours(Some(WeeklyHours::around_the_clock()));
        for time in ["00:00", "03:15", "12:00", "23:59"] {
            let status = classify(&store, monday(time));
            assert_eq!(status.state, StoreState::Open, "at {time}");
            assert_eq!(status.message, "Open 24 hours");
        }
    }

    #[test]
    fn open_within_window() {
        let store = store_with_monday_hours("09:00", "21:00");
        let status = classify(&store, monday("12:00"));
        assert_eq!(status.state, StoreState::Open);
        assert_eq!(status.message, "Open until 21:00");
        assert_eq!(status.minutes_remaining, None);
    }

    #[test]
    fn closing_soon_at_monday_2010_is_50_minutes() {
        let store = store_with_monday_hours("09:00", "21:00");
        let status = classify(&store, monday("20:10"));
        assert_eq!(status.state, StoreState::ClosingSoon);
        assert_eq!(status.minutes_remaining, Some(50));
        assert_eq!(status.message, "Closing soon: 50 min");
    }

    #[test]
    fn closing_soon_boundary_is_inclusive() {
        let store = store_with_monday_hours("09:00", "21:00");
        assert_eq!(
            classify(&store, monday("20:00")).state,
            StoreState::ClosingSoon
        );
        assert_eq!(classify(&store, monday("19:59")).state, StoreState::Open);
    }

    #[test]
    fn opening_soon_before_open() {
        let store = store_with_monday_hours("09:00", "21:00");
        let status = classify(&store, monday("08:30"));
        assert_eq!(status.state, StoreState::OpeningSoon);
        assert_eq!(status.minutes_remaining, Some(30));
    }

    #[test]
    fn closed_well_before_open_and_after_close() {
        let store = store_with_monday_hours("09:00", "21:00");

        let before = classify(&store, monday("06:00"));
        assert_eq!(before.state, StoreState::Closed);
        assert_eq!(before.message, "Closed, opens at 09:00");

        let after = classify(&store, monday("22:30"));
        assert_eq!(after.state, StoreState::Closed);
    }

    #[test]
    fn closing_time_itself_is_closed() {
        let store = store_with_monday_hours("09:00", "21:00");
        assert_eq!(classify(&store, monday("21:00")).state, StoreState::Closed);
    }

    #[test]
    fn classify_is_idempotent() {
        let store = store_with_monday_hours("09:00", "21:00");
        let now = monday("20:10");
        assert_eq!(classify(&store, now), classify(&store, now));
    }

    #[test]
    fn is_open_counts_closing_soon() {
        let store = store_with_monday_hours("09:00", "21:00");
        assert!(is_open(&store, monday("20:30")));
        assert!(!is_open(&store, monday("08:30")), "opening soon is not open");
        assert!(!is_open(&store, monday("22:00")));
    }
}
