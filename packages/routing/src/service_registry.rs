//! Compile-time registry of routing service configurations.
//!
//! Each router is defined in a TOML file under `services/` and tagged with
//! the [`Phase`] it measures.

use ltn_distance_street_models::TravelMode;
use serde::Deserialize;

use crate::google::GoogleDirectionsRouter;
use crate::osrm::OsrmRouter;
use crate::{Phase, RouteError, Router, RouterCredentials};

/// A routing service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingService {
    /// Unique identifier (e.g., `"osrm"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Which side of the intervention this service measures.
    pub phase: Phase,
    /// Minimum delay between requests in milliseconds.
    #[serde(default)]
    pub rate_limit_ms: u64,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Google Directions API.
    GoogleDirections {
        /// Endpoint URL.
        base_url: String,
        /// Travel mode requested from Google.
        mode: TravelMode,
    },
    /// Open Source Routing Machine.
    Osrm {
        /// Server root (e.g., `"http://router.project-osrm.org"`).
        base_url: String,
        /// Routing profile (e.g., `"driving"`).
        profile: String,
    },
}

// ── Compile-time embedded TOML files ────────────────────────────────

const SERVICE_TOMLS: &[(&str, &str)] = &[
    (
        "google_directions",
        include_str!("../services/google_directions.toml"),
    ),
    ("osrm", include_str!("../services/osrm.toml")),
];

/// Returns all routing service configurations.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_services() -> Vec<RoutingService> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse routing service '{name}': {e}"))
        })
        .collect()
}

/// Returns the service configured for `phase`.
#[must_use]
pub fn service_for_phase(phase: Phase) -> Option<RoutingService> {
    all_services().into_iter().find(|s| s.phase == phase)
}

/// Builds a router for a registry entry.
///
/// # Errors
///
/// Returns [`RouteError::Config`] if the provider needs a credential that
/// is not set, or [`RouteError::Http`] if the HTTP client cannot be built.
pub fn build_router(
    service: &RoutingService,
    credentials: &RouterCredentials,
) -> Result<Box<dyn Router>, RouteError> {
    let client = reqwest::Client::builder().build()?;

    match &service.provider {
        ProviderConfig::GoogleDirections { base_url, mode } => {
            let api_key =
                credentials
                    .google_api_key
                    .as_deref()
                    .ok_or_else(|| RouteError::Config {
                        message: format!(
                            "{} requires an API key (set GOOGLE_DIRECTIONS_API_KEY)",
                            service.name
                        ),
                    })?;
            Ok(Box::new(GoogleDirectionsRouter::new(
                client,
                base_url,
                api_key,
                *mode,
                service.rate_limit_ms,
            )?))
        }
        ProviderConfig::Osrm { base_url, profile } => Ok(Box::new(OsrmRouter::new(
            client,
            base_url,
            profile,
            service.rate_limit_ms,
        ))),
    }
}

/// Builds the router configured for `phase`.
///
/// # Errors
///
/// Returns [`RouteError::Config`] if no service is registered for `phase`,
/// or any error from [`build_router`].
pub fn router_for_phase(
    phase: Phase,
    credentials: &RouterCredentials,
) -> Result<Box<dyn Router>, RouteError> {
    let service = service_for_phase(phase).ok_or_else(|| RouteError::Config {
        message: format!("No routing service registered for phase '{phase}'"),
    })?;
    log::debug!("Using {} for the {phase} phase", service.name);
    build_router(&service, credentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn service_ids_are_unique() {
        let mut seen = BTreeSet::new();
        for svc in &all_services() {
            assert!(seen.insert(svc.id.clone()), "Duplicate service ID: {}", svc.id);
        }
    }

    #[test]
    fn each_phase_has_exactly_one_service() {
        let services = all_services();
        for phase in [Phase::Before, Phase::After] {
            let count = services.iter().filter(|s| s.phase == phase).count();
            assert_eq!(count, 1, "phase {phase} has {count} services");
        }
    }

    #[test]
    fn before_phase_uses_cycling_directions() {
        let before = service_for_phase(Phase::Before).unwrap();
        assert!(matches!(
            before.provider,
            ProviderConfig::GoogleDirections {
                mode: TravelMode::Bicycling,
                ..
            }
        ));
    }

    #[test]
    fn after_phase_uses_osrm_driving() {
        let after = service_for_phase(Phase::After).unwrap();
        assert!(matches!(
            after.provider,
            ProviderConfig::Osrm { ref profile, .. } if profile == "driving"
        ));
    }

    #[test]
    fn google_router_requires_api_key() {
        let result = router_for_phase(Phase::Before, &RouterCredentials::default());
        assert!(matches!(result, Err(RouteError::Config { .. })));
    }

    #[test]
    fn builds_routers_with_credentials() {
        let credentials = RouterCredentials {
            google_api_key: Some("test-key".to_string()),
        };
        assert_eq!(
            router_for_phase(Phase::Before, &credentials).unwrap().id(),
            "google_directions"
        );
        assert_eq!(
            router_for_phase(Phase::After, &credentials).unwrap().id(),
            "osrm"
        );
    }
}
