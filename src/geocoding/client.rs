use async_trait::async_trait;
use serde::Deserialize;

use crate::{core::config::GeocoderConfig, core::geo::LngLat, storage::Credential, Result};

/// Remote forward geocoding
#[async_trait]
pub trait GeocodingClient: Send + Sync {
    /// Looks up `query` and returns the first result, if any
    async fn forward(&self, query: &str, credential: &Credential) -> Result<Option<LngLat>>;
}

/// Response body of the geocoding endpoint; only `features[].center` is read
#[derive(Debug, Deserialize)]
pub struct GeocodingResponse {
    #[serde(default)]
    pub features: Vec<GeocodingFeature>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodingFeature {
    pub center: LngLat,
}

impl GeocodingResponse {
    pub fn first_center(&self) -> Option<LngLat> {
        self.features.first().map(|f| f.center)
    }
}

/// Geocoding over HTTP: one GET per lookup
pub struct HttpGeocodingClient {
    http: reqwest::Client,
    endpoint: reqwest::Url,
}

impl HttpGeocodingClient {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        config.validate()?;
        let endpoint = reqwest::Url::parse(&config.endpoint)
            .map_err(|e| crate::MapError::Config(format!("invalid geocoder endpoint: {e}")))?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("tourmap/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()?;

        Ok(Self { http, endpoint })
    }

    /// `{endpoint}/{query}.json?access_token=..&limit=1`, with the query
    /// percent-encoded as a single path segment
    pub fn request_url(&self, query: &str, credential: &Credential) -> reqwest::Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&format!("{query}.json"));
        }
        url.query_pairs_mut()
            .append_pair("access_token", credential.as_str())
            .append_pair("limit", "1");
        url
    }
}

#[async_trait]
impl GeocodingClient for HttpGeocodingClient {
    async fn forward(&self, query: &str, credential: &Credential) -> Result<Option<LngLat>> {
        let url = self.request_url(query, credential);
        log::debug!("geocoding request for {query:?}");

        let response = self.http.get(url).send().await?.error_for_status()?;
        let body: GeocodingResponse = response.json().await?;
        Ok(body.first_center())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_encodes_query() {
        let client = HttpGeocodingClient::new(&GeocoderConfig::default()).unwrap();
        let url = client.request_url("Rua São José, 10", &Credential::new("pk.test"));

        assert_eq!(
            url.as_str(),
            "https://api.mapbox.com/geocoding/v5/mapbox.places/Rua%20S%C3%A3o%20Jos%C3%A9,%2010.json?access_token=pk.test&limit=1"
        );
    }

    #[test]
    fn test_response_first_center() {
        let body: GeocodingResponse = serde_json::from_str(
            r#"{ "type": "FeatureCollection", "features": [
                { "center": [-32.41, -3.84], "place_name": "A" },
                { "center": [-32.50, -3.90], "place_name": "B" }
            ] }"#,
        )
        .unwrap();
        assert_eq!(body.first_center(), Some(LngLat::new(-32.41, -3.84)));

        let empty: GeocodingResponse = serde_json::from_str(r#"{ "features": [] }"#).unwrap();
        assert_eq!(empty.first_center(), None);
    }
}
