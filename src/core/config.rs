//! Configuration for the map view and its collaborators
//!
//! Every section has sensible defaults for the island map, so a partial JSON
//! document (or none at all) is enough to build a working view.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{
    constants::{
        CLUSTER_MAX_ZOOM, CLUSTER_RADIUS, CLUSTER_TIER_LARGE, CLUSTER_TIER_MEDIUM, REGION_CENTER,
    },
    core::geo::LngLat,
    map::strategy::StrategyKind,
    widget::MapControl,
    MapError, Result,
};

/// Top-level configuration of a [`crate::MapView`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapViewConfig {
    /// Style URL passed through to the widget
    pub style_url: String,
    pub center: LngLat,
    pub zoom: f64,
    pub pitch: f64,
    pub fog: FogConfig,
    pub clustering: ClusterOptions,
    pub geocoder: GeocoderConfig,
    pub empty_categories: EmptyCategories,
    pub default_strategy: StrategyKind,
    pub controls: Vec<MapControl>,
    /// Where the credential store persists the token, if file-backed
    pub credential_path: Option<PathBuf>,
}

impl Default for MapViewConfig {
    fn default() -> Self {
        Self {
            style_url: "mapbox://styles/mapbox/satellite-streets-v12".to_string(),
            center: LngLat::new(REGION_CENTER.0, REGION_CENTER.1),
            zoom: 12.5,
            pitch: 45.0,
            fog: FogConfig::default(),
            clustering: ClusterOptions::default(),
            geocoder: GeocoderConfig::default(),
            empty_categories: EmptyCategories::default(),
            default_strategy: StrategyKind::Markers,
            controls: vec![
                MapControl::Navigation,
                MapControl::Fullscreen,
                MapControl::Geolocate,
                MapControl::Scale,
            ],
            credential_path: None,
        }
    }
}

impl MapViewConfig {
    /// Parses a JSON document, filling missing fields with defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        log::debug!("loaded map config from {}", path.display());
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.center.is_finite() {
            return Err(MapError::Config("center must be finite".to_string()));
        }
        if !(0.0..=22.0).contains(&self.zoom) {
            return Err(MapError::Config(format!(
                "zoom {} outside 0..=22",
                self.zoom
            )));
        }
        if !(0.0..=85.0).contains(&self.pitch) {
            return Err(MapError::Config(format!(
                "pitch {} outside 0..=85",
                self.pitch
            )));
        }
        self.clustering.validate()?;
        self.geocoder.validate()
    }
}

/// Atmosphere parameters applied once the style has loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FogConfig {
    pub color: String,
    pub high_color: String,
    pub horizon_blend: f64,
    pub space_color: String,
    pub star_intensity: f64,
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            color: "rgb(186, 210, 235)".to_string(),
            high_color: "rgb(36, 92, 223)".to_string(),
            horizon_blend: 0.02,
            space_color: "rgb(11, 11, 25)".to_string(),
            star_intensity: 0.6,
        }
    }
}

/// Clustering parameters of the point source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterOptions {
    /// Highest zoom at which points are still clustered
    pub max_zoom: u8,
    /// Cluster radius in pixels
    pub radius: f64,
    /// Point count where the medium tier starts
    pub medium_threshold: u64,
    /// Point count where the large tier starts
    pub large_threshold: u64,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            max_zoom: CLUSTER_MAX_ZOOM,
            radius: CLUSTER_RADIUS,
            medium_threshold: CLUSTER_TIER_MEDIUM,
            large_threshold: CLUSTER_TIER_LARGE,
        }
    }
}

impl ClusterOptions {
    pub fn validate(&self) -> Result<()> {
        if self.radius <= 0.0 {
            return Err(MapError::Config("cluster radius must be positive".to_string()));
        }
        if self.max_zoom > 24 {
            return Err(MapError::Config(format!(
                "cluster max zoom {} above 24",
                self.max_zoom
            )));
        }
        if self.medium_threshold >= self.large_threshold {
            return Err(MapError::Config(
                "cluster tiers must be increasing".to_string(),
            ));
        }
        Ok(())
    }
}

/// Remote geocoding settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub endpoint: String,
    pub timeout_ms: u64,
    /// Remote hits kept in memory
    pub cache_capacity: usize,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.mapbox.com/geocoding/v5/mapbox.places".to_string(),
            timeout_ms: 5_000,
            cache_capacity: 256,
        }
    }
}

impl GeocoderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            return Err(MapError::Config(
                "geocoder cache capacity must be at least 1".to_string(),
            ));
        }
        if reqwest::Url::parse(&self.endpoint).is_err() {
            return Err(MapError::Config(format!(
                "invalid geocoder endpoint: {}",
                self.endpoint
            )));
        }
        Ok(())
    }
}

/// What an empty category selection means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyCategories {
    /// No categories selected means no category constraint
    #[default]
    ShowAll,
    /// No categories selected hides every point
    ShowNone,
}
