use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::geo::LngLat;

/// Semantic tag of a map point, used for both styling and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Passeio")]
    Tour,
    #[serde(rename = "Hospedagem")]
    Accommodation,
    #[serde(rename = "Evento")]
    Event,
    #[serde(rename = "Praia")]
    Beach,
    #[serde(rename = "Atração")]
    Attraction,
    #[serde(rename = "Mirante")]
    Viewpoint,
    #[serde(rename = "Mergulho")]
    Diving,
    #[serde(rename = "Restaurante")]
    Restaurant,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Tour,
        Category::Accommodation,
        Category::Event,
        Category::Beach,
        Category::Attraction,
        Category::Viewpoint,
        Category::Diving,
        Category::Restaurant,
    ];

    /// Display label, as shown in the filter panel
    pub fn label(&self) -> &'static str {
        match self {
            Category::Tour => "Passeio",
            Category::Accommodation => "Hospedagem",
            Category::Event => "Evento",
            Category::Beach => "Praia",
            Category::Attraction => "Atração",
            Category::Viewpoint => "Mirante",
            Category::Diving => "Mergulho",
            Category::Restaurant => "Restaurante",
        }
    }

    /// Marker color of the category
    pub fn color(&self) -> &'static str {
        match self {
            Category::Tour => "#10b981",
            Category::Accommodation => "#3b82f6",
            Category::Event => "#f59e0b",
            Category::Beach => "#06b6d4",
            Category::Attraction => "#8b5cf6",
            Category::Viewpoint => "#ec4899",
            Category::Diving => "#0ea5e9",
            Category::Restaurant => "#ef4444",
        }
    }

    fn english_alias(&self) -> &'static str {
        match self {
            Category::Tour => "tour",
            Category::Accommodation => "accommodation",
            Category::Event => "event",
            Category::Beach => "beach",
            Category::Attraction => "attraction",
            Category::Viewpoint => "viewpoint",
            Category::Diving => "diving",
            Category::Restaurant => "restaurant",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Accepts the display label or the English alias, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.label().to_lowercase() == needle || c.english_alias() == needle)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// The canonical map entity
///
/// Points are derived, never mutated: they are rebuilt from the source
/// collections whenever those change, and the `id` is reconstructed
/// deterministically from the source prefix and record id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub id: String,
    pub name: String,
    pub coordinates: LngLat,
    pub category: Category,
    #[serde(default)]
    pub description: Option<String>,
    pub color: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    /// Source fields carried through for the popup
    #[serde(default)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl MapPoint {
    /// Creates a point styled by its category
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        coordinates: LngLat,
        category: Category,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            coordinates,
            category,
            description: None,
            color: category.color().to_string(),
            price: None,
            rating: None,
            image: None,
            url: None,
            tags: Vec::new(),
            featured: false,
            date: None,
            time: None,
            details: serde_json::Map::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn featured(mut self, featured: bool) -> Self {
        self.featured = featured;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parses_labels_and_aliases() {
        assert_eq!("Praia".parse::<Category>(), Ok(Category::Beach));
        assert_eq!("praia".parse::<Category>(), Ok(Category::Beach));
        assert_eq!("beach".parse::<Category>(), Ok(Category::Beach));
        assert_eq!(" ATRAÇÃO ".parse::<Category>(), Ok(Category::Attraction));
        assert!("castle".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serializes_label() {
        let json = serde_json::to_string(&Category::Beach).unwrap();
        assert_eq!(json, "\"Praia\"");
    }

    #[test]
    fn test_new_point_takes_category_color() {
        let point = MapPoint::new("x-1", "X", LngLat::new(0.0, 0.0), Category::Event);
        assert_eq!(point.color, Category::Event.color());
        assert!(point.price.is_none());
    }
}
