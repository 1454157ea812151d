//! Open Source Routing Machine client.
//!
//! OSRM takes coordinates as `longitude,latitude`, the reverse of most APIs.
//! The public demo server only offers the `driving` profile.
//!
//! See <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use std::time::Duration;

use async_trait::async_trait;
use ltn_distance_street_models::Coordinate;

use crate::{RouteError, Router};

/// Router backed by an OSRM `route` service.
pub struct OsrmRouter {
    client: reqwest::Client,
    base_url: String,
    profile: String,
    rate_limit: Duration,
}

impl OsrmRouter {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str, profile: &str, rate_limit_ms: u64) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            profile: profile.to_string(),
            rate_limit: Duration::from_millis(rate_limit_ms),
        }
    }

    fn route_url(&self, from: Coordinate, to: Coordinate) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}",
            self.base_url, self.profile, from.longitude, from.latitude, to.longitude, to.latitude,
        )
    }
}

#[async_trait]
impl Router for OsrmRouter {
    fn id(&self) -> &str {
        "osrm"
    }

    async fn estimate(&self, from: Coordinate, to: Coordinate) -> Result<f64, RouteError> {
        tokio::time::sleep(self.rate_limit).await;

        let resp = self
            .client
            .get(self.route_url(from, to))
            .query(&[("overview", "false")])
            .send()
            .await?;

        // OSRM reports routing failures as 400 with a JSON body, so read the
        // body before checking the status.
        let body: serde_json::Value = resp.json().await?;
        parse_response(&body)
    }
}

/// Extracts `routes[0].distance` (meters).
fn parse_response(body: &serde_json::Value) -> Result<f64, RouteError> {
    let code = body["code"].as_str().ok_or_else(|| RouteError::Parse {
        message: "Missing code in OSRM response".to_string(),
    })?;

    match code {
        "Ok" => {}
        "NoRoute" | "NoSegment" => {
            return Err(RouteError::NoRoute {
                message: body["message"].as_str().unwrap_or(code).to_string(),
            });
        }
        other => {
            return Err(RouteError::Api {
                provider: "osrm",
                status: other.to_string(),
                message: body["message"].as_str().unwrap_or_default().to_string(),
            });
        }
    }

    let Some(route) = body["routes"].as_array().and_then(|r| r.first()) else {
        return Err(RouteError::NoRoute {
            message: "OSRM response has no routes".to_string(),
        });
    };

    route["distance"].as_f64().ok_or_else(|| RouteError::Parse {
        message: "Missing routes[0].distance in OSRM response".to_string(),
    })
}
