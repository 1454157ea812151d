//! Nominatim / OpenStreetMap geocoder client.
//!
//! Nominatim has strict usage rules: **1 request per second** maximum and an
//! identifying `User-Agent` on every request.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use std::time::Duration;

use async_trait::async_trait;
use ltn_distance_street_models::Coordinate;

use crate::{GeocodeError, GeocodedPostcode, Geocoder, GeocodingProvider};

/// Geocoder backed by a Nominatim search endpoint.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    country_codes: String,
    rate_limit: Duration,
}

impl NominatimGeocoder {
    /// Creates a Nominatim client identifying itself with `user_agent`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Config`] if `user_agent` is empty, or
    /// [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        country_codes: &str,
        rate_limit_ms: u64,
        user_agent: &str,
    ) -> Result<Self, GeocodeError> {
        if user_agent.trim().is_empty() {
            return Err(GeocodeError::Config {
                message: "Nominatim requires a User-Agent (set USER_EMAIL)".to_string(),
            });
        }

        let client = reqwest::Client::builder().user_agent(user_agent).build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            country_codes: country_codes.to_string(),
            rate_limit: Duration::from_millis(rate_limit_ms),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    fn id(&self) -> &str {
        "nominatim"
    }

    async fn geocode(&self, postcode: &str) -> Result<Option<GeocodedPostcode>, GeocodeError> {
        tokio::time::sleep(self.rate_limit).await;

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", postcode),
                ("countrycodes", self.country_codes.as_str()),
                ("format", "jsonv2"),
                ("limit", "1"),
            ])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        let body: serde_json::Value = resp.error_for_status()?.json().await?;
        parse_response(&body)
    }
}

/// Parses Nominatim JSON response.
fn parse_response(body: &serde_json::Value) -> Result<Option<GeocodedPostcode>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = first["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lat in Nominatim response".to_string(),
        })?;

    let lon = first["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lon in Nominatim response".to_string(),
        })?;

    let display_name = first["display_name"].as_str().map(String::from);

    Ok(Some(GeocodedPostcode {
        coordinate: Coordinate::new(lat, lon),
        matched_address: display_name,
        provider: GeocodingProvider::Nominatim,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nominatim_result() {
        let body = serde_json::json!([{
            "lat": "51.7227",
            "lon": "-1.2141",
            "display_name": "Littlemore, Oxford, Oxfordshire, England, OX4 4PU, United Kingdom"
        }]);
        let result = parse_response(&body).unwrap().unwrap();
        assert!((result.coordinate.latitude - 51.7227).abs() < 1e-4);
        assert!((result.coordinate.longitude - -1.2141).abs() < 1e-4);
        assert_eq!(result.provider, GeocodingProvider::Nominatim);
        assert!(result.matched_address.unwrap().contains("OX4 4PU"));
    }

    #[test]
    fn parses_nominatim_empty() {
        let body = serde_json::json!([]);
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn rejects_non_array_response() {
        let body = serde_json::json!({"error": "Unable to geocode"});
        assert!(matches!(
            parse_response(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_unparseable_latitude() {
        let body = serde_json::json!([{ "lat": "north", "lon": "-1.2" }]);
        assert!(matches!(
            parse_response(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }

    #[test]
    fn requires_user_agent() {
        let result = NominatimGeocoder::new(
            "https://nominatim.openstreetmap.org/search",
            "gb",
            1000,
            "  ",
        );
        assert!(matches!(result, Err(GeocodeError::Config { .. })));
    }
}
