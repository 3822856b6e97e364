//! Location resolution capabilities.
//!
//! The engine never talks to a platform geolocation API or a geocoding
//! provider directly; it consumes the [`DeviceLocationProvider`] and
//! [`AddressGeocoder`] capabilities, which production code binds to real
//! transports and tests bind to stubs. Both are fallible and idempotent from
//! the caller's perspective: nothing here retries, the user re-triggers a
//! search to retry.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use serde::{Deserialize, Serialize};
use storefind_catalog::Coordinates;
use thiserror::Error;
use tracing::{debug, warn};

pub type Result<T> = std::result::Result<T, LocateError>;

/// Default bound on device-location acquisition.
pub const DEVICE_LOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Default debounce applied to autocomplete suggestion lookups.
pub const SUGGESTION_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Error, Debug)]
pub enum LocateError {
    /// The platform has no location capability, or the user denied the
    /// request or it timed out.
    #[error("device location unavailable: {0}")]
    LocationUnavailable(String),
    /// The geocoding provider returned no match or errored.
    #[error("geocoding failed: {0}")]
    GeocodeFailed(String),
}

/// An autocomplete suggestion for a partially typed address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub label: String,
    pub value: String,
}

/// Access to the device's own position.
#[allow(async_fn_in_trait)]
pub trait DeviceLocationProvider {
    async fn current_position(&self) -> Result<Coordinates>;
}

/// Forward geocoding of typed addresses, plus autocomplete suggestions.
#[allow(async_fn_in_trait)]
pub trait AddressGeocoder {
    async fn geocode(&self, text: &str) -> Result<Coordinates>;
    async fn suggest(&self, text: &str) -> Result<Vec<Suggestion>>;
}

/// A provider for platforms without any location capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDeviceLocation;

impl DeviceLocationProvider for NoDeviceLocation {
    async fn current_position(&self) -> Result<Coordinates> {
        Err(LocateError::LocationUnavailable(
            "no location capability".to_string(),
        ))
    }
}

/// Resolve the device location with the configured timeout.
///
/// An elapsed timeout is reported the same way as a denied request, as
/// [`LocateError::LocationUnavailable`].
pub async fn resolve_device_location<P: DeviceLocationProvider>(
    provider: &P,
    timeout: Duration,
) -> Result<Coordinates> {
    match tokio::time::timeout(timeout, provider.current_position()).await {
        Ok(result) => result,
        Err(_) => {
            warn!(?timeout, "device location request timed out");
            Err(LocateError::LocationUnavailable(format!(
                "timed out after {timeout:?}"
            )))
        }
    }
}

/// Debounces autocomplete suggestion lookups.
///
/// Each call waits out the debounce delay and then queries the geocoder only
/// if no newer call has started in the meantime; superseded calls resolve to
/// `Ok(None)` without touching the provider. The suggestion flow is
/// independent of the main search flow.
#[derive(Debug, Clone)]
pub struct SuggestionDebouncer {
    delay: Duration,
    latest: Arc<AtomicU64>,
}

impl Default for SuggestionDebouncer {
    fn default() -> Self {
        Self::new(SUGGESTION_DEBOUNCE)
    }
}

impl SuggestionDebouncer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn suggest<G: AddressGeocoder>(
        &self,
        geocoder: &G,
        text: &str,
    ) -> Result<Option<Vec<Suggestion>>> {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;

        if self.latest.load(Ordering::SeqCst) != ticket {
            debug!(text, "suggestion lookup superseded during debounce");
            return Ok(None);
        }
        geocoder.suggest(text).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowProvider;

    impl DeviceLocationProvider for SlowProvider {
        async fn current_position(&self) -> Result<Coordinates> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Coordinates::new(45.5, -122.6))
        }
    }

    struct InstantProvider(Coordinates);

    impl DeviceLocationProvider for InstantProvider {
        async fn current_position(&self) -> Result<Coordinates> {
            Ok(self.0)
        }
    }

    struct EchoGeocoder;

    impl AddressGeocoder for EchoGeocoder {
        async fn geocode(&self, _text: &str) -> Result<Coordinates> {
            Ok(Coordinates::new(45.5, -122.6))
        }

        async fn suggest(&self, text: &str) -> Result<Vec<Suggestion>> {
            Ok(vec![Suggestion {
                label: text.to_string(),
                value: text.to_string(),
            }])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out_as_unavailable() {
        let result = resolve_device_location(&SlowProvider, DEVICE_LOCATION_TIMEOUT).await;
        assert!(matches!(result, Err(LocateError::LocationUnavailable(_))));
    }

    #[tokio::test]
    async fn fast_provider_resolves() {
        let coords = Coordinates::new(45.5, -122.6);
        let result = resolve_device_location(&InstantProvider(coords), DEVICE_LOCATION_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(result, coords);
    }

    #[tokio::test]
    async fn no_device_location_always_fails() {
        let result = resolve_device_location(&NoDeviceLocation, DEVICE_LOCATION_TIMEOUT).await;
        assert!(matches!(result, Err(LocateError::LocationUnavailable(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn debouncer_serves_the_latest_call() {
        let debouncer = SuggestionDebouncer::new(Duration::from_millis(300));
        let geocoder = EchoGeocoder;

        let first = debouncer.suggest(&geocoder, "port");
        let second = debouncer.suggest(&geocoder, "portland");
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first.unwrap(), None, "superseded call yields nothing");
        let suggestions = second.unwrap().expect("latest call resolves");
        assert_eq!(suggestions[0].value, "portland");
    }

    #[tokio::test(start_paused = true)]
    async fn debouncer_single_call_resolves() {
        let debouncer = SuggestionDebouncer::default();
        let suggestions = debouncer.suggest(&EchoGeocoder, "main st").await.unwrap();
        assert!(suggestions.is_some());
    }
}
