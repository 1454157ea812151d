#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Postcode geocoding.
//!
//! Resolves UK postcodes to latitude/longitude using a multi-provider
//! strategy configured via TOML files in `services/`:
//!
//! 1. **Nominatim / OpenStreetMap** (priority 1): free, 1 req/sec rate
//!    limit, requires an identifying `User-Agent` (a contact e-mail).
//! 2. **postcodes.io** (priority 2): free UK postcode lookup, no key.
//!
//! Providers are loaded from the [`service_registry`] and tried in priority
//! order by [`chain::ChainGeocoder`]. The first provider to return a match
//! wins.

pub mod chain;
pub mod nominatim;
pub mod postcodes_io;
pub mod service_registry;

use async_trait::async_trait;
use ltn_distance_street_models::Coordinate;
use thiserror::Error;

/// A geocoding result with coordinates and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPostcode {
    /// Resolved position (WGS84).
    pub coordinate: Coordinate,
    /// The matched/canonical place name returned by the geocoder.
    pub matched_address: Option<String>,
    /// Which provider resolved this postcode.
    pub provider: GeocodingProvider,
}

/// Which geocoding provider resolved a postcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodingProvider {
    /// Nominatim / OpenStreetMap.
    Nominatim,
    /// postcodes.io.
    PostcodesIo,
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// No provider could resolve the postcode.
    #[error("Could not resolve postcode '{postcode}'")]
    NotFound {
        /// The unresolved postcode.
        postcode: String,
    },

    /// Geocoder construction failed.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

/// Resolves postcodes to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Short provider identifier for logging.
    fn id(&self) -> &str;

    /// Geocodes a postcode, returning `None` when the provider has no match.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request or response parsing fails.
    async fn geocode(&self, postcode: &str) -> Result<Option<GeocodedPostcode>, GeocodeError>;

    /// Geocodes a postcode, treating "no match" as an error.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::NotFound`] if the postcode is unresolvable, or
    /// any error from [`Geocoder::geocode`].
    async fn lookup(&self, postcode: &str) -> Result<Coordinate, GeocodeError> {
        self.geocode(postcode)
            .await?
            .map(|g| g.coordinate)
            .ok_or_else(|| GeocodeError::NotFound {
                postcode: postcode.to_string(),
            })
    }
}
