//! Priority-ordered fallback across geocoding providers.

use async_trait::async_trait;

use crate::nominatim::NominatimGeocoder;
use crate::postcodes_io::PostcodesIoGeocoder;
use crate::service_registry::{GeocodingService, ProviderConfig};
use crate::{GeocodeError, GeocodedPostcode, Geocoder};

/// Tries each provider in order until one returns a match.
///
/// A provider that errors is logged and skipped. If no provider matches, the
/// last provider error is returned, or `Ok(None)` when every provider simply
/// had no match.
pub struct ChainGeocoder {
    providers: Vec<Box<dyn Geocoder>>,
}

impl ChainGeocoder {
    #[must_use]
    pub fn new(providers: Vec<Box<dyn Geocoder>>) -> Self {
        Self { providers }
    }

    /// Builds a chain from registry entries, in the order given.
    ///
    /// `user_agent` identifies this tool to providers that require it
    /// (Nominatim's usage policy asks for a contact e-mail).
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if any provider cannot be constructed.
    pub fn from_services(
        services: &[GeocodingService],
        user_agent: &str,
    ) -> Result<Self, GeocodeError> {
        let mut providers: Vec<Box<dyn Geocoder>> = Vec::with_capacity(services.len());

        for service in services {
            log::debug!(
                "Adding geocoder '{}' ({}) at {}",
                service.id,
                service.name,
                service.base_url()
            );
            match &service.provider {
                ProviderConfig::Nominatim {
                    base_url,
                    country_codes,
                    rate_limit_ms,
                } => providers.push(Box::new(NominatimGeocoder::new(
                    base_url,
                    country_codes,
                    *rate_limit_ms,
                    user_agent,
                )?)),
                ProviderConfig::PostcodesIo {
                    base_url,
                    rate_limit_ms,
                } => {
                    let client = reqwest::Client::builder().user_agent(user_agent).build()?;
                    providers.push(Box::new(PostcodesIoGeocoder::new(
                        client,
                        base_url,
                        *rate_limit_ms,
                    )));
                }
            }
        }

        Ok(Self::new(providers))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[async_trait]
impl Geocoder for ChainGeocoder {
    fn id(&self) -> &str {
        "chain"
    }

    async fn geocode(&self, postcode: &str) -> Result<Option<GeocodedPostcode>, GeocodeError> {
        let mut last_error = None;

        for provider in &self.providers {
            match provider.geocode(postcode).await {
                Ok(Some(geocoded)) => {
                    log::debug!(
                        "{}: '{postcode}' -> ({}, {})",
                        provider.id(),
                        geocoded.coordinate.latitude,
                        geocoded.coordinate.longitude
                    );
                    return Ok(Some(geocoded));
                }
                Ok(None) => log::debug!("{}: no match for '{postcode}'", provider.id()),
                Err(e) => {
                    log::warn!("{} error for '{postcode}': {e}", provider.id());
                    last_error = Some(e);
                }
            }
        }

        last_error.map_or(Ok(None), Err)
    }
}
