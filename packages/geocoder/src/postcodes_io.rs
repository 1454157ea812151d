//! postcodes.io client.
//!
//! Free UK postcode lookup, no API key. Unknown postcodes come back as HTTP
//! 404 with `{"status": 404, "error": "Postcode not found"}`.
//!
//! See <https://postcodes.io/docs>

use std::time::Duration;

use async_trait::async_trait;
use ltn_distance_street_models::Coordinate;
use serde::Deserialize;

use crate::{GeocodeError, GeocodedPostcode, Geocoder, GeocodingProvider};

/// Geocoder backed by the postcodes.io REST API.
pub struct PostcodesIoGeocoder {
    client: reqwest::Client,
    base_url: String,
    rate_limit: Duration,
}

#[derive(Deserialize)]
struct LookupResponse {
    status: u16,
    result: Option<LookupResult>,
}

#[derive(Deserialize)]
struct LookupResult {
    postcode: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl PostcodesIoGeocoder {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str, rate_limit_ms: u64) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limit: Duration::from_millis(rate_limit_ms),
        }
    }
}

#[async_trait]
impl Geocoder for PostcodesIoGeocoder {
    fn id(&self) -> &str {
        "postcodes_io"
    }

    async fn geocode(&self, postcode: &str) -> Result<Option<GeocodedPostcode>, GeocodeError> {
        tokio::time::sleep(self.rate_limit).await;

        let url = format!("{}/postcodes/{}", self.base_url, postcode.trim());
        let resp = self.client.get(&url).send().await?;

        match resp.status() {
            reqwest::StatusCode::NOT_FOUND => return Ok(None),
            reqwest::StatusCode::TOO_MANY_REQUESTS => return Err(GeocodeError::RateLimited),
            _ => {}
        }

        let body = resp.error_for_status()?.text().await?;
        parse_response(&body)
    }
}

fn parse_response(body: &str) -> Result<Option<GeocodedPostcode>, GeocodeError> {
    let parsed: LookupResponse = serde_json::from_str(body).map_err(|e| GeocodeError::Parse {
        message: format!("Invalid postcodes.io response: {e}"),
    })?;

    if parsed.status == 404 {
        return Ok(None);
    }

    let Some(result) = parsed.result else {
        return Ok(None);
    };

    // Terminated and non-geographic postcodes have null coordinates.
    let (Some(latitude), Some(longitude)) = (result.latitude, result.longitude) else {
        log::debug!("postcodes.io: no coordinates for {:?}", result.postcode);
        return Ok(None);
    };

    Ok(Some(GeocodedPostcode {
        coordinate: Coordinate::new(latitude, longitude),
        matched_address: result.postcode,
        provider: GeocodingProvider::PostcodesIo,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lookup_result() {
        let body = serde_json::json!({
            "status": 200,
            "result": {
                "postcode": "OX4 4PU",
                "latitude": 51.722_91,
                "longitude": -1.213_64,
                "admin_district": "Oxford"
            }
        })
        .to_string();
        let result = parse_response(&body).unwrap().unwrap();
        assert!((result.coordinate.latitude - 51.722_91).abs() < 1e-6);
        assert_eq!(result.matched_address.as_deref(), Some("OX4 4PU"));
        assert_eq!(result.provider, GeocodingProvider::PostcodesIo);
    }

    #[test]
    fn not_found_is_no_match() {
        let body = r#"{"status":404,"error":"Postcode not found"}"#;
        assert!(parse_response(body).unwrap().is_none());
    }

    #[test]
    fn null_coordinates_are_no_match() {
        let body = r#"{"status":200,"result":{"postcode":"BF1 1AA","latitude":null,"longitude":null}}"#;
        assert!(parse_response(body).unwrap().is_none());
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            parse_response("<html>"),
            Err(GeocodeError::Parse { .. })
        ));
    }
}
