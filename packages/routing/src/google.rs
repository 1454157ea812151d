//! Google Directions API client.
//!
//! See <https://developers.google.com/maps/documentation/directions/get-directions>

use std::time::Duration;

use async_trait::async_trait;
use ltn_distance_street_models::{Coordinate, TravelMode};

use crate::{RouteError, Router};

/// Router backed by the Google Directions API.
pub struct GoogleDirectionsRouter {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    mode: TravelMode,
    rate_limit: Duration,
}

impl GoogleDirectionsRouter {
    /// Creates a Directions client using `mode` for every request.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Config`] if `api_key` is empty.
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        api_key: &str,
        mode: TravelMode,
        rate_limit_ms: u64,
    ) -> Result<Self, RouteError> {
        if api_key.trim().is_empty() {
            return Err(RouteError::Config {
                message: "Google Directions API key is empty".to_string(),
            });
        }
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            mode,
            rate_limit: Duration::from_millis(rate_limit_ms),
        })
    }

    #[must_use]
    pub const fn mode(&self) -> TravelMode {
        self.mode
    }
}

fn format_point(point: Coordinate) -> String {
    format!("{},{}", point.latitude, point.longitude)
}

#[async_trait]
impl Router for GoogleDirectionsRouter {
    fn id(&self) -> &str {
        "google_directions"
    }

    async fn estimate(&self, from: Coordinate, to: Coordinate) -> Result<f64, RouteError> {
        tokio::time::sleep(self.rate_limit).await;

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("origin", format_point(from).as_str()),
                ("destination", format_point(to).as_str()),
                ("mode", self.mode.as_ref()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let body: serde_json::Value = resp.error_for_status()?.json().await?;
        parse_response(&body)
    }
}

/// Extracts `routes[0].legs[0].distance.value` (meters).
fn parse_response(body: &serde_json::Value) -> Result<f64, RouteError> {
    let status = body["status"].as_str().ok_or_else(|| RouteError::Parse {
        message: "Missing status in Directions response".to_string(),
    })?;

    match status {
        "OK" => {}
        "ZERO_RESULTS" | "NOT_FOUND" => {
            return Err(RouteError::NoRoute {
                message: status.to_string(),
            });
        }
        other => {
            return Err(RouteError::Api {
                provider: "google_directions",
                status: other.to_string(),
                message: body["error_message"].as_str().unwrap_or_default().to_string(),
            });
        }
    }

    let Some(route) = body["routes"].as_array().and_then(|r| r.first()) else {
        return Err(RouteError::NoRoute {
            message: "Directions response has no routes".to_string(),
        });
    };

    route["legs"][0]["distance"]["value"]
        .as_f64()
        .ok_or_else(|| RouteError::Parse {
            message: "Missing legs[0].distance.value in Directions response".to_string(),
        })
}
