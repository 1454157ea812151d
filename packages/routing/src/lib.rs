#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Route distance estimation.
//!
//! Two routing services stand in for the road network before and after the
//! LTN went in, configured via TOML files in `services/`:
//!
//! - **Before**: Google Directions API in `bicycling` mode. Google misses
//!   some of the LTN filters, and cycling directions approximate pre-LTN
//!   driving well enough here. Requires an API key.
//! - **After**: Open Source Routing Machine, `driving` profile. OSRM knows
//!   about the filters but only routes driving, so it cannot serve the
//!   "before" state.
//!
//! Both implement [`Router`]; [`service_registry::build_router`] turns a
//! registry entry plus [`RouterCredentials`] into a boxed router.

pub mod google;
pub mod osrm;
pub mod service_registry;

use async_trait::async_trait;
use ltn_distance_street_models::Coordinate;
use serde::Deserialize;
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Which side of the intervention a router measures.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Before,
    After,
}

/// Secrets needed by routing providers, passed in explicitly by the caller.
#[derive(Debug, Clone, Default)]
pub struct RouterCredentials {
    /// Google Directions API key.
    pub google_api_key: Option<String>,
}

/// Errors from routing operations.
#[derive(Debug, Error)]
pub enum RouteError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// The provider found no route between the two points.
    #[error("No route found: {message}")]
    NoRoute {
        /// Provider-supplied detail.
        message: String,
    },

    /// The provider rejected the request.
    #[error("{provider} returned {status}: {message}")]
    Api {
        /// Provider identifier.
        provider: &'static str,
        /// Provider status code string.
        status: String,
        /// Provider error message, if any.
        message: String,
    },

    /// Router construction failed.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

/// Estimates route length between two points.
#[async_trait]
pub trait Router: Send + Sync {
    /// Short provider identifier for logging.
    fn id(&self) -> &str;

    /// Route length in meters from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] if the request fails or no route exists.
    async fn estimate(&self, from: Coordinate, to: Coordinate) -> Result<f64, RouteError>;
}
