use once_cell::sync::Lazy;

use crate::core::geo::LngLat;

/// Named landmarks of the island. Keys are lowercase and matched as
/// substrings of the location text, in table order, so more specific names
/// must come before names they contain ("aeroporto" before "porto").
static GAZETTEER: Lazy<Vec<(&'static str, LngLat)>> = Lazy::new(|| {
    vec![
        ("sancho", LngLat::new(-32.4428, -3.8547)),
        ("baía dos porcos", LngLat::new(-32.4408, -3.8517)),
        ("praia do leão", LngLat::new(-32.4030, -3.8700)),
        ("sueste", LngLat::new(-32.4160, -3.8680)),
        ("conceição", LngLat::new(-32.4170, -3.8390)),
        ("cachorro", LngLat::new(-32.4100, -3.8380)),
        ("boldró", LngLat::new(-32.4280, -3.8440)),
        ("americano", LngLat::new(-32.4330, -3.8470)),
        ("vila dos remédios", LngLat::new(-32.4110, -3.8400)),
        ("morro do pico", LngLat::new(-32.4240, -3.8420)),
        ("aeroporto", LngLat::new(-32.4230, -3.8550)),
        ("porto", LngLat::new(-32.4030, -3.8330)),
        ("forte dos remédios", LngLat::new(-32.4095, -3.8385)),
        ("golfinhos", LngLat::new(-32.4470, -3.8560)),
    ]
});

/// First landmark whose name appears in `location`, case-insensitively
pub fn lookup(location: &str) -> Option<LngLat> {
    let haystack = location.to_lowercase();
    GAZETTEER
        .iter()
        .find(|(name, _)| haystack.contains(name))
        .map(|(_, coordinates)| *coordinates)
}
