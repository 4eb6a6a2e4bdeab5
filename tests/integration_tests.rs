use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tourmap::{
    constants::{CLUSTERS_LAYER_ID, POINTS_SOURCE_ID, UNCLUSTERED_LAYER_ID, USER_LOCATION_ZOOM},
    data::pois::static_points,
    prelude::*,
    widget::{headless::CameraMove, CameraOptions},
};

/// Integration tests driving a whole map page the way a visitor would
#[cfg(test)]
mod integration_tests {
    use super::*;

    const SOURCES: &str = r#"{
        "accommodations": [
            { "id": 1, "name": "Pousada do Sancho", "location": "Estrada do Sancho", "price_per_night": 450.0, "rating": 4.7 },
            { "id": 2, "name": "Pousada Vista Mar", "location": "Rua das Flores 10", "price_per_night": 950.0 }
        ],
        "tours": [
            { "id": 7, "name": "Passeio de barco", "meeting_point": "Porto de Santo Antônio", "price": 200.0, "rating": 4.5 }
        ],
        "events": [
            { "id": 3, "name": "Festival Gastronômico", "venue": "Vila dos Remédios", "date": "2026-11-02", "time": "19:00" }
        ]
    }"#;

    type PageView = MapView<HeadlessFactory, MemoryCredentialStore>;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn page(config: MapViewConfig, token: Option<&str>) -> PageView {
        init_logging();
        let store = match token {
            Some(token) => MemoryCredentialStore::with_credential(Credential::new(token)),
            None => MemoryCredentialStore::new(),
        };
        let mut view = MapView::new(config, HeadlessFactory::new(), store);
        view.set_sources(&SourceCollections::from_json_str(SOURCES).unwrap())
            .unwrap();
        view
    }

    fn headless(view: &PageView) -> &HeadlessMap {
        view.map().unwrap().as_any().downcast_ref::<HeadlessMap>().unwrap()
    }

    fn headless_mut(view: &mut PageView) -> &mut HeadlessMap {
        view.map_mut()
            .unwrap()
            .as_any_mut()
            .downcast_mut::<HeadlessMap>()
            .unwrap()
    }

    fn visible_ids(view: &PageView) -> Vec<String> {
        view.visible_points().iter().map(|p| p.id.clone()).collect()
    }

    /// Built-in points come first, then the collections in source order
    #[tokio::test]
    async fn test_points_are_merged() {
        let view = page(MapViewConfig::default(), None);
        let statics = static_points().len();

        assert_eq!(view.points().len(), statics + 4);
        let ids: Vec<_> = view.points()[statics..].iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["accommodation-1", "accommodation-2", "tour-7", "event-3"]
        );
        assert_eq!(view.visible_points().len(), view.points().len());
    }

    /// Category plus price bucket narrows the markers on the map
    #[tokio::test]
    async fn test_filter_drives_markers() {
        let mut view = page(MapViewConfig::default(), Some("pk.test"));
        view.mount(ContainerId::new("map")).unwrap();
        assert_eq!(headless(&view).marker_count(), view.points().len());

        view.set_filter(
            FilterState::default()
                .with_categories(["Hospedagem"])
                .with_price(RawPriceRange::Bucket(PriceBucket::Medium)),
        )
        .unwrap();
        assert_eq!(visible_ids(&view), vec!["accommodation-1"]);
        assert_eq!(headless(&view).marker_count(), 1);

        view.set_filter(
            FilterState::default()
                .with_categories(["hospedagem"])
                .with_price(RawPriceRange::Range([1000.0, 900.0])),
        )
        .unwrap();
        assert_eq!(visible_ids(&view), vec!["accommodation-2"]);

        view.reset_filters().unwrap();
        assert_eq!(view.visible_points().len(), view.points().len());
        assert!(view.filter_state().is_default());
    }

    /// The popup survives a filter change that hides its point
    #[tokio::test]
    async fn test_popup_outlives_filter() {
        let mut view = page(MapViewConfig::default(), Some("pk.test"));
        view.mount(ContainerId::new("map")).unwrap();

        headless_mut(&mut view).click_marker_for("tour-7").unwrap();
        view.pump_events().unwrap();
        assert_eq!(view.active_popup().map(|p| p.id.as_str()), Some("tour-7"));

        view.set_filter(FilterState::default().with_categories(["Evento"]))
            .unwrap();
        assert_eq!(visible_ids(&view), vec!["event-3"]);
        assert_eq!(view.active_popup().map(|p| p.id.as_str()), Some("tour-7"));
        assert_eq!(headless(&view).open_popups().len(), 1);
        assert_eq!(view.popup().mounts(), 1);

        // closed from the widget's own close button
        let (handle, _) = headless(&view).open_popups()[0];
        headless_mut(&mut view).close_popup_natively(handle);
        view.pump_events().unwrap();
        assert!(view.active_popup().is_none());
        assert_eq!(view.popup().unmounts(), 1);
    }

    /// Opening and closing the same popup repeatedly leaves nothing mounted
    #[tokio::test]
    async fn test_popup_cycles_do_not_leak() {
        let mut view = page(MapViewConfig::default(), Some("pk.test"));
        view.mount(ContainerId::new("map")).unwrap();

        let cycles = 5;
        for _ in 0..cycles {
            headless_mut(&mut view).click_marker_for("accommodation-1").unwrap();
            view.pump_events().unwrap();
            assert_eq!(headless(&view).open_popups().len(), 1);

            let (handle, _) = headless(&view).open_popups()[0];
            headless_mut(&mut view).close_popup_natively(handle);
            view.pump_events().unwrap();
            assert!(view.active_popup().is_none());
        }

        assert_eq!(view.popup().mounts(), cycles);
        assert_eq!(view.popup().unmounts(), cycles);
        assert!(headless(&view).open_popups().is_empty());
    }

    /// Clustering waits for the style, then handles hover and point clicks
    #[tokio::test]
    async fn test_clustering_flow() {
        let config = MapViewConfig {
            default_strategy: StrategyKind::Clustering,
            ..MapViewConfig::default()
        };
        let mut view = page(config.clone(), Some("pk.test"));
        view.mount(ContainerId::new("map")).unwrap();

        assert!(headless(&view).source_ids().is_empty());
        assert!(headless(&view).fog().is_none());

        headless_mut(&mut view).load_style();
        view.pump_events().unwrap();
        assert_eq!(
            headless(&view).source_data(POINTS_SOURCE_ID).unwrap().len(),
            view.points().len()
        );
        assert_eq!(headless(&view).layer_ids().len(), 3);
        assert_eq!(headless(&view).fog(), Some(&config.fog));

        let map = headless_mut(&mut view);
        map.jump_to(map.center(), 20.0);
        let feature = map
            .rendered_features(UNCLUSTERED_LAYER_ID)
            .unwrap()
            .into_iter()
            .find(|f| f.point_id() == Some("event-3"))
            .unwrap();
        map.hover(UNCLUSTERED_LAYER_ID, true);
        map.click_feature(UNCLUSTERED_LAYER_ID, feature).unwrap();
        view.pump_events().unwrap();

        assert_eq!(headless(&view).cursor(), Cursor::Pointer);
        assert_eq!(view.active_popup().map(|p| p.id.as_str()), Some("event-3"));

        view.set_strategy(StrategyKind::Markers).unwrap();
        assert!(!headless(&view).layer_ids().contains(&CLUSTERS_LAYER_ID));
        assert!(headless(&view).source_ids().is_empty());
        assert_eq!(headless(&view).marker_count(), view.points().len());
    }

    /// Without a token the page asks for one; entering it creates the map
    #[tokio::test]
    async fn test_credential_prompt_and_persistence() {
        let path = std::env::temp_dir().join(format!(
            "tourmap-integration-{}-credential.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        init_logging();

        let mut view = MapView::new(
            MapViewConfig::default(),
            HeadlessFactory::new(),
            FileCredentialStore::new(&path),
        );
        assert_eq!(view.mount(ContainerId::new("map")).unwrap(), ViewStatus::NeedsCredential);
        assert!(matches!(view.set_credential("pk.saved").unwrap(), ViewStatus::Ready(_)));

        // a fresh page picks the stored token up
        let mut next = MapView::new(
            MapViewConfig::default(),
            HeadlessFactory::new(),
            FileCredentialStore::new(&path),
        );
        assert!(matches!(next.mount(ContainerId::new("map")).unwrap(), ViewStatus::Ready(_)));
        assert_eq!(
            next.factory().active_credential(),
            Some(Credential::new("pk.saved"))
        );

        assert_eq!(next.clear_credential().unwrap(), ViewStatus::NeedsCredential);
        assert!(next.factory().live_instances().is_empty());
        let _ = std::fs::remove_file(&path);
    }

    /// Locating the user flies there; a denial leaves the camera alone
    #[tokio::test]
    async fn test_locate_user() {
        let mut view = page(MapViewConfig::default(), Some("pk.test"));
        view.mount(ContainerId::new("map")).unwrap();

        let notifier = RecordingNotifier::new();
        let mut denied = UserLocation::with_notifier(
            FixedPosition(Err(GeolocationError::from_code(1))),
            notifier.clone(),
        );
        assert_eq!(view.locate_user(&mut denied).await, None);
        assert_eq!(headless(&view).last_move(), None);
        assert_eq!(denied.error().as_deref(), Some("Permissão de localização negada"));

        let here = LngLat::new(-32.4190, -3.8410);
        let mut found = UserLocation::with_notifier(FixedPosition(Ok(here)), notifier.clone());
        assert_eq!(view.locate_user(&mut found).await, Some(here));
        assert_eq!(
            headless(&view).last_move(),
            Some(CameraMove::Fly(CameraOptions {
                center: here,
                zoom: USER_LOCATION_ZOOM,
            }))
        );

        let levels: Vec<_> = notifier.notifications().iter().map(|n| n.level).collect();
        assert_eq!(levels, vec![NotificationLevel::Error, NotificationLevel::Success]);
    }

    struct FixedGeocoder {
        answer: LngLat,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GeocodingClient for FixedGeocoder {
        async fn forward(&self, _query: &str, _credential: &Credential) -> Result<Option<LngLat>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(self.answer))
        }
    }

    /// Remote geocoding only moves points the gazetteer does not know
    #[tokio::test]
    async fn test_geocode_points_with_credential() {
        let answer = LngLat::new(-32.4300, -3.8500);
        let geocoder = Geocoder::new(
            FixedGeocoder {
                answer,
                calls: AtomicUsize::new(0),
            },
            16,
        );

        let mut view = page(MapViewConfig::default(), Some("pk.test"));
        view.mount(ContainerId::new("map")).unwrap();
        let moved = view.geocode_points(&geocoder).await.unwrap();

        assert_eq!(moved, 1);
        let vista_mar = view
            .points()
            .iter()
            .find(|p| p.id == "accommodation-2")
            .unwrap();
        assert_eq!(vista_mar.coordinates, answer);
        assert_eq!(geocoder.cached_len(), 1);

        // a second pass hits the cache
        assert_eq!(view.geocode_points(&geocoder).await.unwrap(), 0);
    }

    /// Without a credential nothing goes to the network
    #[tokio::test]
    async fn test_geocode_points_offline() {
        let geocoder = Geocoder::new(
            FixedGeocoder {
                answer: LngLat::new(0.0, 0.0),
                calls: AtomicUsize::new(0),
            },
            16,
        );
        let mut view = page(MapViewConfig::default(), None);
        assert_eq!(view.geocode_points(&geocoder).await.unwrap(), 0);
        assert_eq!(geocoder.cached_len(), 0);
    }
}
