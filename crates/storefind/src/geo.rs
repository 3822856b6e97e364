//! Great-circle distance.

use storefind_catalog::Coordinates;

/// Mean Earth radius in miles, matching the display unit of the result list.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Great-circle distance between two coordinate pairs, in miles.
///
/// Uses the haversine formula, which is symmetric, zero only for identical
/// points, and accurate to well under a percent for store-locator distances.
/// Sub-meter geodesic accuracy is explicitly not a goal.
#[must_use]
pub fn distance_miles(a: Coordinates, b: Coordinates) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();

    EARTH_RADIUS_MILES * c
}
