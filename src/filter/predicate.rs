use std::collections::BTreeSet;
use std::ops::{Bound, RangeBounds};

use crate::{
    constants::{PRICE_LOW_MAX, PRICE_MEDIUM_MAX},
    data::point::{Category, MapPoint},
    filter::state::PriceBucket,
};

/// Category constraint
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategorySelection {
    /// No constraint
    #[default]
    All,
    /// Membership is mandatory
    Only(BTreeSet<Category>),
    /// Every point is excluded
    Nothing,
}

impl CategorySelection {
    pub fn allows(&self, category: Category) -> bool {
        match self {
            CategorySelection::All => true,
            CategorySelection::Only(set) => set.contains(&category),
            CategorySelection::Nothing => false,
        }
    }
}

/// Price interval; only applied to points that carry a price
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: Bound<f64>,
    pub max: Bound<f64>,
}

impl PriceRange {
    pub const UNBOUNDED: PriceRange = PriceRange {
        min: Bound::Unbounded,
        max: Bound::Unbounded,
    };

    /// `low = (.., 300]`, `medium = (300, 800]`, `high = (800, ..)`
    pub fn from_bucket(bucket: PriceBucket) -> Self {
        match bucket {
            PriceBucket::All => Self::UNBOUNDED,
            PriceBucket::Low => Self {
                min: Bound::Unbounded,
                max: Bound::Included(PRICE_LOW_MAX),
            },
            PriceBucket::Medium => Self {
                min: Bound::Excluded(PRICE_LOW_MAX),
                max: Bound::Included(PRICE_MEDIUM_MAX),
            },
            PriceBucket::High => Self {
                min: Bound::Excluded(PRICE_MEDIUM_MAX),
                max: Bound::Unbounded,
            },
        }
    }

    /// Inclusive on both ends
    pub fn inclusive(min: f64, max: f64) -> Self {
        Self {
            min: Bound::Included(min),
            max: Bound::Included(max),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!((self.min, self.max), (Bound::Unbounded, Bound::Unbounded))
    }

    pub fn contains_price(&self, price: f64) -> bool {
        self.contains(&price)
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

impl RangeBounds<f64> for PriceRange {
    fn start_bound(&self) -> Bound<&f64> {
        self.min.as_ref()
    }

    fn end_bound(&self) -> Bound<&f64> {
        self.max.as_ref()
    }
}

/// Canonical predicate: all criteria are conjunctive
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointFilter {
    pub categories: CategorySelection,
    /// Lowercased search text; `None` passes everything
    pub search: Option<String>,
    pub min_rating: Option<f64>,
    pub price: PriceRange,
}

impl PointFilter {
    pub fn matches(&self, point: &MapPoint) -> bool {
        if !self.categories.allows(point.category) {
            return false;
        }

        if let Some(search) = &self.search {
            if !point.name.to_lowercase().contains(search.as_str()) {
                return false;
            }
        }

        if let (Some(min), Some(rating)) = (self.min_rating, point.rating) {
            if rating < min {
                return false;
            }
        }

        match point.price {
            Some(price) => self.price.contains_price(price),
            None => true,
        }
    }
}

/// Keeps the points that match, in their original order
pub fn filter_points(points: &[MapPoint], filter: &PointFilter) -> Vec<MapPoint> {
    points.iter().filter(|p| filter.matches(p)).cloned().collect()
}
