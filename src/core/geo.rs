use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::constants::WORLD_TILE_SIZE;

/// Web Mercator latitude limit
const MAX_LATITUDE: f64 = 85.0511287798;

/// A geographical coordinate, longitude first.
///
/// Serialized as a `[lng, lat]` pair to match the GeoJSON and map widget
/// convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Both components are finite numbers
    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }

    /// Within the usual geographic ranges. Nothing in the pipeline rejects
    /// implausible points; they are kept and simply render in the wrong place.
    pub fn is_plausible(&self) -> bool {
        self.is_finite()
            && (-180.0..=180.0).contains(&self.lng)
            && (-90.0..=90.0).contains(&self.lat)
    }

    /// Clamps latitude to the Web Mercator range
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Projects into world pixel space at the given integer zoom.
    ///
    /// The world is `WORLD_TILE_SIZE * 2^zoom` pixels wide, origin top-left.
    pub fn to_world_pixels(&self, zoom: u8) -> ScreenPoint {
        let scale = WORLD_TILE_SIZE * 2_f64.powi(zoom as i32);
        let lat_rad = Self::clamp_lat(self.lat).to_radians();

        let x = (self.lng + 180.0) / 360.0 * scale;
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * scale;

        ScreenPoint::new(x, y)
    }
}

impl From<[f64; 2]> for LngLat {
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(coord: LngLat) -> Self {
        [coord.lng, coord.lat]
    }
}

impl std::fmt::Display for LngLat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lng, self.lat)
    }
}

/// A point in screen or projected pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lng_lat_serializes_longitude_first() {
        let coord = LngLat::new(-32.4250, -3.8540);
        let json = serde_json::to_string(&coord).unwrap();
        assert_eq!(json, "[-32.425,-3.854]");

        let back: LngLat = serde_json::from_str(&json).unwrap();
        assert_eq!(back, coord);
    }

    #[test]
    fn test_plausibility_is_informational() {
        assert!(LngLat::new(-32.4, -3.8).is_plausible());
        assert!(!LngLat::new(200.0, -3.8).is_plausible());
        assert!(LngLat::new(200.0, -3.8).is_finite());
        assert!(!LngLat::new(f64::NAN, 0.0).is_finite());
    }

    #[test]
    fn test_world_pixels_origin_and_scale() {
        let center = LngLat::new(0.0, 0.0).to_world_pixels(0);
        assert!((center.x - WORLD_TILE_SIZE / 2.0).abs() < 1e-9);
        assert!((center.y - WORLD_TILE_SIZE / 2.0).abs() < 1e-9);

        let zoomed = LngLat::new(0.0, 0.0).to_world_pixels(3);
        assert!((zoomed.x - WORLD_TILE_SIZE * 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_world_pixels_north_is_up() {
        let north = LngLat::new(0.0, 10.0).to_world_pixels(2);
        let south = LngLat::new(0.0, -10.0).to_world_pixels(2);
        assert!(north.y < south.y);
    }
}
