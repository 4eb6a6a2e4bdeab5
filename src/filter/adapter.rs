use std::collections::BTreeSet;

use crate::{
    core::config::EmptyCategories,
    data::point::Category,
    filter::{
        predicate::{CategorySelection, PointFilter, PriceRange},
        state::{FilterState, RawPriceRange},
    },
};

/// Normalizes the store's filter state into the canonical predicate.
///
/// An empty category list follows `empty`. A non-empty list whose labels are
/// all unknown selects nothing.
pub fn adapt(state: &FilterState, empty: EmptyCategories) -> PointFilter {
    PointFilter {
        categories: adapt_categories(&state.categories, empty),
        search: adapt_search(&state.search_query),
        min_rating: (state.rating > 0.0).then_some(state.rating),
        price: adapt_price(state.price_range),
    }
}

fn adapt_categories(labels: &[String], empty: EmptyCategories) -> CategorySelection {
    if labels.is_empty() {
        return match empty {
            EmptyCategories::ShowAll => CategorySelection::All,
            EmptyCategories::ShowNone => CategorySelection::Nothing,
        };
    }

    let selected: BTreeSet<Category> = labels
        .iter()
        .filter_map(|label| match label.parse::<Category>() {
            Ok(category) => Some(category),
            Err(e) => {
                log::warn!("ignoring filter category: {e}");
                None
            }
        })
        .collect();

    if selected.is_empty() {
        CategorySelection::Nothing
    } else {
        CategorySelection::Only(selected)
    }
}

fn adapt_search(query: &str) -> Option<String> {
    (!query.is_empty()).then(|| query.to_lowercase())
}

fn adapt_price(raw: RawPriceRange) -> PriceRange {
    match raw {
        RawPriceRange::Bucket(bucket) => PriceRange::from_bucket(bucket),
        RawPriceRange::Range([a, b]) => PriceRange::inclusive(a.min(b), a.max(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::geo::LngLat,
        data::point::MapPoint,
        filter::{predicate::filter_points, state::PriceBucket},
    };

    fn fixture() -> Vec<MapPoint> {
        let at = LngLat::new(-32.42, -3.85);
        vec![
            MapPoint::new("1", "Praia do Sancho", at, Category::Beach).with_rating(5.0),
            MapPoint::new("2", "Ilha Tour", at, Category::Tour).with_price(250.0),
            MapPoint::new("3", "Pousada Zé Maria", at, Category::Accommodation).with_price(900.0),
            MapPoint::new("4", "Baía dos Porcos", at, Category::Beach),
            MapPoint::new("5", "Festival Gastronômico", at, Category::Event).with_price(120.0),
        ]
    }

    #[test]
    fn test_category_fixture_keeps_order() {
        let state = FilterState {
            categories: vec!["Praia".to_string()],
            price_range: RawPriceRange::Bucket(PriceBucket::All),
            rating: 0.0,
            search_query: String::new(),
        };

        let filtered = filter_points(&fixture(), &adapt(&state, EmptyCategories::ShowAll));
        let ids: Vec<_> = filtered.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[test]
    fn test_empty_categories_policy_is_explicit() {
        let state = FilterState::default();

        let all = adapt(&state, EmptyCategories::ShowAll);
        assert_eq!(all.categories, CategorySelection::All);
        assert_eq!(filter_points(&fixture(), &all).len(), 5);

        let none = adapt(&state, EmptyCategories::ShowNone);
        assert_eq!(none.categories, CategorySelection::Nothing);
        assert!(filter_points(&fixture(), &none).is_empty());
    }

    #[test]
    fn test_unknown_labels_are_dropped() {
        let state = FilterState::default().with_categories(["Praia", "Castelo"]);
        let filter = adapt(&state, EmptyCategories::ShowAll);
        assert_eq!(
            filter.categories,
            CategorySelection::Only([Category::Beach].into_iter().collect())
        );

        let only_unknown = FilterState::default().with_categories(["Castelo"]);
        assert_eq!(
            adapt(&only_unknown, EmptyCategories::ShowAll).categories,
            CategorySelection::Nothing
        );
    }

    #[test]
    fn test_rating_zero_and_empty_search_are_unset() {
        let filter = adapt(&FilterState::default(), EmptyCategories::ShowAll);
        assert_eq!(filter.min_rating, None);
        assert_eq!(filter.search, None);

        let filter = adapt(
            &FilterState::default().with_search("SANCHO").with_rating(4.0),
            EmptyCategories::ShowAll,
        );
        assert_eq!(filter.min_rating, Some(4.0));
        assert_eq!(filter.search.as_deref(), Some("sancho"));
    }

    #[test]
    fn test_search_is_matched_untrimmed() {
        let filter = adapt(
            &FilterState::default().with_search("sancho "),
            EmptyCategories::ShowAll,
        );
        assert_eq!(filter.search.as_deref(), Some("sancho "));
        assert!(filter_points(&fixture(), &filter).is_empty());

        let filter = adapt(
            &FilterState::default().with_search("do sancho"),
            EmptyCategories::ShowAll,
        );
        let ids: Vec<_> = filter_points(&fixture(), &filter)
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[test]
    fn test_numeric_range_is_inclusive_and_ordered() {
        let filter = adapt(
            &FilterState::default().with_price(RawPriceRange::Range([900.0, 250.0])),
            EmptyCategories::ShowAll,
        );
        let ids: Vec<_> = filter_points(&fixture(), &filter)
            .into_iter()
            .map(|p| p.id)
            .collect();
        // unpriced points pass, 120 is below the range
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_bucket_shape_and_tuple_shape_agree_on_medium() {
        let bucket = adapt(
            &FilterState::default().with_price(RawPriceRange::Bucket(PriceBucket::Medium)),
            EmptyCategories::ShowAll,
        );
        let tuple = adapt(
            &FilterState::default().with_price(RawPriceRange::Range([300.0, 800.0])),
            EmptyCategories::ShowAll,
        );

        for price in [299.0, 300.5, 550.0, 800.0, 800.5] {
            assert_eq!(
                bucket.price.contains_price(price),
                tuple.price.contains_price(price),
                "price {price}"
            );
        }

        // the bucket is open at 300, the tuple is inclusive at both ends
        assert!(!bucket.price.contains_price(300.0));
        assert!(tuple.price.contains_price(300.0));
        assert!(bucket.price.contains_price(800.0));
        assert!(tuple.price.contains_price(800.0));
    }
}
