//! Core constants for the island map: region, geocoding, filters and widget
//! defaults. Keeping them in a single place makes the magic numbers easy to find.

/// Fernando de Noronha, the default map center and fallback anchor (lng, lat).
pub const REGION_CENTER: (f64, f64) = (-32.4250, -3.8540);

/// Lowercase token that marks a location string as already inside the region.
pub const HOME_REGION_MARKER: &str = "noronha";

/// Degrees per unit of fallback hash offset. Offsets are in `-99..=99`.
pub const FALLBACK_SCALE: f64 = 0.0005;

/// Upper bound of `|offset|` produced by the fallback hash, in degrees.
pub const FALLBACK_MAX_OFFSET: f64 = 99.0 * FALLBACK_SCALE;

/// Price bucket boundaries (inclusive upper bounds for low and medium).
pub const PRICE_LOW_MAX: f64 = 300.0;
pub const PRICE_MEDIUM_MAX: f64 = 800.0;

/// Storage key of the persisted map credential.
pub const MAPBOX_TOKEN_KEY: &str = "mapbox_token";

/// Clustering defaults.
pub const CLUSTER_MAX_ZOOM: u8 = 14;
pub const CLUSTER_RADIUS: f64 = 50.0;
pub const CLUSTER_TIER_MEDIUM: u64 = 10;
pub const CLUSTER_TIER_LARGE: u64 = 30;

/// Width of the zoom-0 world in pixels (vector tile convention).
pub const WORLD_TILE_SIZE: f64 = 512.0;

/// Widget ids used by the clustering strategy.
pub const POINTS_SOURCE_ID: &str = "points";
pub const CLUSTERS_LAYER_ID: &str = "clusters";
pub const CLUSTER_COUNT_LAYER_ID: &str = "cluster-count";
pub const UNCLUSTERED_LAYER_ID: &str = "unclustered-point";

/// Geolocation request timeout.
pub const GEOLOCATION_TIMEOUT_MS: u64 = 10_000;

/// Zoom used when flying to the user's position.
pub const USER_LOCATION_ZOOM: f64 = 15.0;
