//! # tourmap
//!
//! Interactive map core for a tourism marketplace.
//!
//! The crate turns heterogeneous domain collections (accommodations, tours,
//! events and built-in points of interest) into a uniform set of map points,
//! filters them, and projects them onto a map widget through one of two
//! render strategies (individual markers or clustering). A popup controller
//! and a user location helper complete the interactive surface, and
//! [`MapView`] wires everything together.

pub mod core;
pub mod data;
pub mod filter;
pub mod geocoding;
pub mod map;
pub mod prelude;
pub mod spatial;
pub mod storage;
pub mod widget;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::MapViewConfig,
    geo::{LngLat, ScreenPoint},
};

pub use data::{
    aggregator::aggregate,
    point::{Category, MapPoint},
};

pub use filter::{
    adapter::adapt,
    predicate::{filter_points, PointFilter},
    state::FilterState,
};

pub use geocoding::resolver::Geocoder;

pub use map::{
    popup::{ActivePopup, PopupController},
    strategy::{RenderStrategy, StrategyKind},
    view::MapView,
};

pub use storage::{Credential, CredentialStore};

pub use widget::{headless::HeadlessMap, MapFactory, MapWidget};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("Source {source_id} is still used by layer {layer_id}")]
    SourceInUse { source_id: String, layer_id: String },

    #[error("Source already exists: {0}")]
    DuplicateSource(String),

    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Layer already exists: {0}")]
    DuplicateLayer(String),

    #[error("Marker not found: {0}")]
    MarkerNotFound(u64),

    #[error("Cluster not found: {0}")]
    ClusterNotFound(u64),

    #[error("Map credential is missing")]
    MissingCredential,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Error type alias for convenience
pub type Error = MapError;
