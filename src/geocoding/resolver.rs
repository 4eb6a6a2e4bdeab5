use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use crate::{
    constants::HOME_REGION_MARKER,
    core::{config::GeocoderConfig, geo::LngLat},
    geocoding::{
        client::{GeocodingClient, HttpGeocodingClient},
        fallback, gazetteer,
    },
    storage::Credential,
    Result,
};

/// Where a resolved coordinate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Gazetteer,
    Remote,
    Cached,
    Fallback,
}

/// Location resolver: gazetteer, then remote lookup, then the deterministic
/// fallback. Never fails; remote errors degrade to the fallback.
pub struct Geocoder<C = HttpGeocodingClient> {
    client: C,
    cache: Mutex<LruCache<String, LngLat>>,
}

impl Geocoder<HttpGeocodingClient> {
    pub fn from_config(config: &GeocoderConfig) -> Result<Self> {
        Ok(Self::new(HttpGeocodingClient::new(config)?, config.cache_capacity))
    }
}

impl<C: GeocodingClient> Geocoder<C> {
    pub fn new(client: C, cache_capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            client,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub async fn resolve(&self, location: &str, credential: Option<&Credential>) -> LngLat {
        self.resolve_with_source(location, credential).await.0
    }

    /// Like [`Geocoder::resolve`], also reporting which step answered
    pub async fn resolve_with_source(
        &self,
        location: &str,
        credential: Option<&Credential>,
    ) -> (LngLat, Resolution) {
        if let Some(coordinates) = gazetteer::lookup(location) {
            return (coordinates, Resolution::Gazetteer);
        }

        let in_home_region = location.to_lowercase().contains(HOME_REGION_MARKER);
        if let (false, Some(credential)) = (in_home_region, credential) {
            let key = location.trim().to_lowercase();
            if let Some(cached) = self.cached(&key) {
                return (cached, Resolution::Cached);
            }

            match self.client.forward(location, credential).await {
                Ok(Some(coordinates)) => {
                    self.remember(key, coordinates);
                    return (coordinates, Resolution::Remote);
                }
                Ok(None) => log::debug!("no geocoding result for {location:?}"),
                Err(e) => log::warn!("geocoding failed for {location:?}: {e}"),
            }
        }

        (fallback::fallback_coordinates(location), Resolution::Fallback)
    }

    /// Resolves several locations concurrently, preserving input order
    pub async fn resolve_many(
        &self,
        locations: &[&str],
        credential: Option<&Credential>,
    ) -> Vec<LngLat> {
        futures::future::join_all(locations.iter().map(|l| self.resolve(l, credential))).await
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn cached(&self, key: &str) -> Option<LngLat> {
        self.cache.lock().ok()?.get(key).copied()
    }

    fn remember(&self, key: String, coordinates: LngLat) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, coordinates);
        }
    }
}
