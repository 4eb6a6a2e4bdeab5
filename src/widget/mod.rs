//! The map widget seam
//!
//! The interactive map is an external imperative library. [`MapWidget`] is the
//! handle the rest of the crate talks to, and [`MapFactory`] is the only place
//! a credential is handed to the library: instances are created with the
//! credential they should use instead of reading a process-wide token.

pub mod events;
pub mod headless;
pub mod style;

use serde::{Deserialize, Serialize};

use crate::{
    core::{
        config::{FogConfig, MapViewConfig},
        geo::{LngLat, ScreenPoint},
    },
    data::geojson::FeatureCollection,
    storage::Credential,
    Result,
};

pub use events::MapEvent;
pub use style::{GeoJsonSource, LayerSpec};

/// Identity of the DOM-like element a map is bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of one live map instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PopupHandle(pub u64);

/// Overlay controls attached to a fresh instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapControl {
    Navigation,
    Fullscreen,
    Geolocate,
    Scale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

/// Construction options of a map instance
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub container: ContainerId,
    pub style_url: String,
    pub center: LngLat,
    pub zoom: f64,
    pub pitch: f64,
}

impl MapOptions {
    pub fn from_config(container: ContainerId, config: &MapViewConfig) -> Self {
        Self {
            container,
            style_url: config.style_url.clone(),
            center: config.center,
            zoom: config.zoom,
            pitch: config.pitch,
        }
    }
}

/// Camera target for `ease_to` / `fly_to`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraOptions {
    pub center: LngLat,
    pub zoom: f64,
}

/// One marker to place on the map
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub point_id: String,
    pub coordinates: LngLat,
    pub color: String,
    pub title: String,
}

/// One popup to open on the map; `content` is the rendered detail view
#[derive(Debug, Clone, PartialEq)]
pub struct PopupSpec {
    pub coordinates: LngLat,
    pub anchor: ScreenPoint,
    pub content: String,
}

/// Imperative handle to a live map instance
pub trait MapWidget {
    fn instance_id(&self) -> InstanceId;
    fn container(&self) -> &ContainerId;
    fn is_style_loaded(&self) -> bool;

    fn add_control(&mut self, control: MapControl);
    fn set_fog(&mut self, fog: &FogConfig);

    fn has_source(&self, id: &str) -> bool;
    fn add_source(&mut self, id: &str, source: GeoJsonSource) -> Result<()>;
    fn set_source_data(&mut self, id: &str, data: FeatureCollection) -> Result<()>;
    /// Fails while any layer still references the source
    fn remove_source(&mut self, id: &str) -> Result<()>;

    fn has_layer(&self, id: &str) -> bool;
    /// Fails when the layer's source does not exist yet
    fn add_layer(&mut self, layer: LayerSpec) -> Result<()>;
    fn remove_layer(&mut self, id: &str) -> Result<()>;

    fn add_marker(&mut self, marker: MarkerSpec) -> MarkerHandle;
    fn remove_marker(&mut self, handle: MarkerHandle) -> Result<()>;

    fn open_popup(&mut self, popup: PopupSpec) -> PopupHandle;
    /// Closing an already closed popup is a no-op
    fn close_popup(&mut self, handle: PopupHandle);

    fn cluster_expansion_zoom(&self, source: &str, cluster_id: u64) -> Result<f64>;

    fn ease_to(&mut self, camera: CameraOptions);
    fn fly_to(&mut self, camera: CameraOptions);
    fn zoom(&self) -> f64;
    fn center(&self) -> LngLat;
    fn set_cursor(&mut self, cursor: Cursor);
    fn project(&self, coordinates: LngLat) -> ScreenPoint;

    /// Events raised since the last call, oldest first
    fn drain_events(&mut self) -> Vec<MapEvent>;

    /// Destroys the instance
    fn remove(&mut self);

    /// Dynamic casting support
    fn as_any(&self) -> &dyn std::any::Any;
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

/// Creates map instances bound to a credential
pub trait MapFactory {
    fn create_map_instance(
        &self,
        credential: &Credential,
        options: &MapOptions,
    ) -> Result<Box<dyn MapWidget>>;
}
