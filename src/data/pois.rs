//! Built-in points of interest shown on every map page

use crate::{
    core::geo::LngLat,
    data::point::{Category, MapPoint},
};

/// Static points, merged ahead of the source collections
pub fn static_points() -> Vec<MapPoint> {
    vec![
        MapPoint::new(
            "poi-sancho",
            "Praia do Sancho",
            LngLat::new(-32.4428, -3.8547),
            Category::Beach,
        )
        .with_description("Eleita várias vezes a praia mais bonita do mundo")
        .with_rating(5.0)
        .with_tags(["snorkel", "escadaria"])
        .featured(true),
        MapPoint::new(
            "poi-porcos",
            "Baía dos Porcos",
            LngLat::new(-32.4408, -3.8517),
            Category::Beach,
        )
        .with_description("Piscinas naturais com vista para o Morro Dois Irmãos")
        .with_rating(4.9)
        .with_tags(["piscinas naturais"]),
        MapPoint::new(
            "poi-sueste",
            "Baía do Sueste",
            LngLat::new(-32.4160, -3.8680),
            Category::Diving,
        )
        .with_description("Flutuação com tartarugas marinhas")
        .with_rating(4.8)
        .with_tags(["tartarugas", "flutuação"]),
        MapPoint::new("poi-leao", "Praia do Leão", LngLat::new(-32.4030, -3.8700), Category::Beach)
            .with_description("Área de desova de tartarugas")
            .with_rating(4.8),
        MapPoint::new(
            "poi-golfinhos",
            "Mirante dos Golfinhos",
            LngLat::new(-32.4470, -3.8560),
            Category::Viewpoint,
        )
        .with_description("Observação de golfinhos rotadores ao amanhecer")
        .with_rating(4.7),
        MapPoint::new(
            "poi-forte",
            "Forte dos Remédios",
            LngLat::new(-32.4095, -3.8385),
            Category::Attraction,
        )
        .with_description("Fortificação do século XVIII")
        .with_rating(4.5),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::HashSet;

    #[test]
    fn test_static_ids_are_unique_and_namespaced() {
        let points = static_points();
        let ids: HashSet<_> = points.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), points.len());
        assert!(points.iter().all(|p| p.id.starts_with("poi-")));
        assert!(points.iter().all(|p| p.coordinates.is_plausible()));
    }
}
