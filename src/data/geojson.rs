use serde::{Deserialize, Serialize};

use crate::{core::geo::LngLat, data::point::MapPoint};

type Properties = serde_json::Map<String, serde_json::Value>;

/// GeoJSON geometry. Map points only ever produce `Point`s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point { coordinates: LngLat },
}

impl GeoJsonGeometry {
    pub fn coordinates(&self) -> LngLat {
        match self {
            GeoJsonGeometry::Point { coordinates } => *coordinates,
        }
    }
}

/// GeoJSON feature with geometry and properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct GeoJsonFeature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    pub geometry: GeoJsonGeometry,
    #[serde(default)]
    pub properties: Properties,
}

impl GeoJsonFeature {
    pub fn point(coordinates: LngLat, properties: Properties) -> Self {
        Self {
            id: None,
            geometry: GeoJsonGeometry::Point { coordinates },
            properties,
        }
    }

    /// Builds the feature that represents a map point in a widget source
    pub fn from_map_point(point: &MapPoint) -> Self {
        let mut properties = Properties::new();
        properties.insert("id".into(), point.id.clone().into());
        properties.insert("name".into(), point.name.clone().into());
        properties.insert("category".into(), point.category.label().into());
        properties.insert("color".into(), point.color.clone().into());
        properties.insert("featured".into(), point.featured.into());
        if let Some(description) = &point.description {
            properties.insert("description".into(), description.clone().into());
        }
        if let Some(price) = point.price {
            properties.insert("price".into(), price.into());
        }
        if let Some(rating) = point.rating {
            properties.insert("rating".into(), rating.into());
        }
        if let Some(image) = &point.image {
            properties.insert("image".into(), image.clone().into());
        }
        if let Some(url) = &point.url {
            properties.insert("url".into(), url.clone().into());
        }

        Self::point(point.coordinates, properties)
    }

    pub fn coordinates(&self) -> LngLat {
        self.geometry.coordinates()
    }

    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(|v| v.as_str())
    }

    pub fn property_u64(&self, key: &str) -> Option<u64> {
        self.properties.get(key).and_then(|v| v.as_u64())
    }

    /// The map point id carried by an individual point feature
    pub fn point_id(&self) -> Option<&str> {
        self.property_str("id")
    }

    /// Set on cluster features produced by a clustered source
    pub fn is_cluster(&self) -> bool {
        self.properties
            .get("cluster")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    pub fn cluster_id(&self) -> Option<u64> {
        self.property_u64("cluster_id")
    }

    pub fn point_count(&self) -> Option<u64> {
        self.property_u64("point_count")
    }
}

/// Root object of a GeoJSON source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<GeoJsonFeature>,
}

impl FeatureCollection {
    pub fn from_points(points: &[MapPoint]) -> Self {
        Self {
            features: points.iter().map(GeoJsonFeature::from_map_point).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
