use crate::{
    constants::{FALLBACK_SCALE, REGION_CENTER},
    core::geo::LngLat,
};

/// String hash over UTF-16 code units: `hash = hash * 31 + unit`, wrapping
/// on 32 bits.
pub fn location_hash(location: &str) -> i32 {
    location.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

/// Offsets in `-99..=99` derived from the hash (truncating remainder, so the
/// sign follows the hash)
pub fn hash_offsets(hash: i32) -> (i32, i32) {
    (hash % 100, (hash >> 8) % 100)
}

/// Deterministic pseudo-coordinate near the region center.
///
/// The same text always maps to the same point, and every point stays within
/// `FALLBACK_MAX_OFFSET` degrees of the center on both axes.
pub fn fallback_coordinates(location: &str) -> LngLat {
    let (dx, dy) = hash_offsets(location_hash(location));
    LngLat::new(
        REGION_CENTER.0 + f64::from(dx) * FALLBACK_SCALE,
        REGION_CENTER.1 + f64::from(dy) * FALLBACK_SCALE,
    )
}
