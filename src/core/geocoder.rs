use crate::domain::model::GeocodeResult;
use crate::domain::ports::Geocoder;
use crate::utils::error::{GeocodeError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_USER_AGENT: &str = concat!("geocode-etl/", env!("CARGO_PKG_VERSION"));

/// First candidate of a Nominatim `/search?format=json` response.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// Geocoder backed by a Nominatim-compatible search endpoint.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    endpoint: String,
}

impl NominatimGeocoder {
    pub fn new(endpoint: impl Into<String>, user_agent: &str) -> Result<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn search_url(&self, address: &str) -> std::result::Result<Url, GeocodeError> {
        Url::parse_with_params(
            &self.endpoint,
            &[("format", "json"), ("q", address), ("limit", "1")],
        )
        .map_err(|e| GeocodeError::InvalidUrl {
            address: address.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Extracts the first candidate's coordinates from a response body.
pub fn parse_search_response(
    address: &str,
    body: &[u8],
) -> std::result::Result<GeocodeResult, GeocodeError> {
    if body.is_empty() {
        return Err(GeocodeError::EmptyBody {
            address: address.to_string(),
        });
    }

    let json: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| GeocodeError::Parse {
            address: address.to_string(),
            message: e.to_string(),
        })?;

    let no_location = || GeocodeError::NoLocation {
        address: address.to_string(),
    };

    let first = json
        .as_array()
        .and_then(|candidates| candidates.first())
        .cloned()
        .ok_or_else(no_location)?;
    let place: Place = serde_json::from_value(first).map_err(|_| no_location())?;

    match (place.lat.parse::<f64>(), place.lon.parse::<f64>()) {
        (Ok(latitude), Ok(longitude)) => Ok(GeocodeResult {
            latitude,
            longitude,
        }),
        _ => Err(no_location()),
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn lookup(&self, address: &str) -> std::result::Result<GeocodeResult, GeocodeError> {
        let url = self.search_url(address)?;
        tracing::debug!("Making geocode request to: {}", url);

        let network_error = |message: String| GeocodeError::Network {
            address: address.to_string(),
            message,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| network_error(e.to_string()))?;

        tracing::debug!("Geocode response status for '{}': {}", address, response.status());
        if !response.status().is_success() {
            return Err(network_error(format!(
                "server responded with HTTP {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| network_error(e.to_string()))?;

        parse_search_response(address, &body)
    }
}
