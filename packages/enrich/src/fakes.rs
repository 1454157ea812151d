//! In-memory stand-ins for the geocoding and routing services.
//!
//! Enabled for this crate's tests and, through the `fakes` feature, for
//! downstream crates that drive the enrichment steps without network access.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use ltn_distance_geocoder::{GeocodeError, GeocodedPostcode, Geocoder, GeocodingProvider};
use ltn_distance_routing::{RouteError, Router};
use ltn_distance_street_models::Coordinate;

use crate::progress::ProgressCallback;

/// Resolves postcodes from a fixed table.
pub struct FakeGeocoder {
    pub known: BTreeMap<&'static str, Coordinate>,
    pub calls: AtomicUsize,
}

impl FakeGeocoder {
    #[must_use]
    pub fn new(known: &[(&'static str, Coordinate)]) -> Self {
        Self {
            known: known.iter().copied().collect(),
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    fn id(&self) -> &str {
        "fake"
    }

    async fn geocode(&self, postcode: &str) -> Result<Option<GeocodedPostcode>, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.known.get(postcode).map(|&coordinate| GeocodedPostcode {
            coordinate,
            matched_address: None,
            provider: GeocodingProvider::PostcodesIo,
        }))
    }
}

/// Returns `scale * |Δlat|` meters for every route.
pub struct FakeRouter {
    pub scale: f64,
    /// Calls at or past this index fail with [`RouteError::NoRoute`].
    pub fail_from: Option<usize>,
    pub calls: AtomicUsize,
}

impl FakeRouter {
    #[must_use]
    pub const fn new(scale: f64) -> Self {
        Self {
            scale,
            fail_from: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Succeeds for the first `successes` calls, then fails.
    #[must_use]
    pub const fn failing_after(scale: f64, successes: usize) -> Self {
        Self {
            scale,
            fail_from: Some(successes),
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Router for FakeRouter {
    fn id(&self) -> &str {
        "fake"
    }

    async fn estimate(&self, from: Coordinate, to: Coordinate) -> Result<f64, RouteError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_from.is_some_and(|limit| call >= limit) {
            return Err(RouteError::NoRoute {
                message: format!("no route on call {}", call + 1),
            });
        }
        Ok((from.latitude - to.latitude).abs() * self.scale)
    }
}

/// Remembers how a progress indicator was closed.
#[derive(Default)]
pub struct RecordingProgress {
    pub total: AtomicUsize,
    pub position: AtomicUsize,
    pub finished: Mutex<Option<String>>,
    pub cleared: AtomicBool,
}

impl RecordingProgress {
    #[must_use]
    pub fn finished_message(&self) -> Option<String> {
        self.finished
            .lock()
            .ok()
            .and_then(|message| message.clone())
    }

    #[must_use]
    pub fn was_cleared(&self) -> bool {
        self.cleared.load(Ordering::SeqCst)
    }
}

impl ProgressCallback for RecordingProgress {
    fn set_total(&self, total: u64) {
        self.total
            .store(usize::try_from(total).unwrap_or(usize::MAX), Ordering::SeqCst);
    }

    fn inc(&self, delta: u64) {
        self.position
            .fetch_add(usize::try_from(delta).unwrap_or(usize::MAX), Ordering::SeqCst);
    }

    fn set_message(&self, _msg: String) {}

    fn finish(&self, msg: String) {
        if let Ok(mut finished) = self.finished.lock() {
            *finished = Some(msg);
        }
    }

    fn finish_and_clear(&self) {
        self.cleared.store(true, Ordering::SeqCst);
    }
}
