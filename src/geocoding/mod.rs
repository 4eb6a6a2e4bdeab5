//! Free-text location to coordinate resolution
//!
//! Resolution order: gazetteer, remote geocoding (when a credential is
//! available and the text is not already marked as inside the home region),
//! then a deterministic hash fallback around the region center.

pub mod client;
pub mod fallback;
pub mod gazetteer;
pub mod resolver;

use crate::core::geo::LngLat;

/// Gazetteer hit or deterministic fallback, without any network access
pub fn resolve_offline(location: &str) -> LngLat {
    gazetteer::lookup(location).unwrap_or_else(|| fallback::fallback_coordinates(location))
}
