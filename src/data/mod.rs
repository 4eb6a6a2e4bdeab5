pub mod aggregator;
pub mod geojson;
pub mod point;
pub mod pois;
pub mod sources;
