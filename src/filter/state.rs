use serde::{Deserialize, Serialize};

/// Price buckets offered by the filter panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceBucket {
    #[default]
    All,
    Low,
    Medium,
    High,
}

/// Either a bucket name or an explicit `[min, max]` pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPriceRange {
    Bucket(PriceBucket),
    Range([f64; 2]),
}

impl Default for RawPriceRange {
    fn default() -> Self {
        RawPriceRange::Bucket(PriceBucket::All)
    }
}

/// User-adjustable filter as held by the page store
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterState {
    /// Category labels; see [`crate::core::config::EmptyCategories`] for the
    /// meaning of an empty list
    pub categories: Vec<String>,
    pub search_query: String,
    /// Minimum rating, `0` means unset
    pub rating: f64,
    pub price_range: RawPriceRange,
}

impl FilterState {
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search_query = query.into();
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_price(mut self, price_range: RawPriceRange) -> Self {
        self.price_range = price_range;
        self
    }

    /// True when nothing narrows the point set
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_price_shapes_deserialize() {
        let bucket: FilterState = serde_json::from_str(
            r#"{ "categories": ["Praia"], "priceRange": "medium", "rating": 4, "searchQuery": "" }"#,
        )
        .unwrap();
        assert_eq!(bucket.price_range, RawPriceRange::Bucket(PriceBucket::Medium));
        assert_eq!(bucket.rating, 4.0);

        let tuple: FilterState =
            serde_json::from_str(r#"{ "priceRange": [100, 500] }"#).unwrap();
        assert_eq!(tuple.price_range, RawPriceRange::Range([100.0, 500.0]));
        assert!(tuple.categories.is_empty());
    }

    #[test]
    fn test_default_state() {
        let state: FilterState = serde_json::from_str("{}").unwrap();
        assert!(state.is_default());
        assert!(!FilterState::default().with_search("sancho").is_default());
    }
}
