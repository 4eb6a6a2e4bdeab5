//! Clustered rendering
//!
//! All points go into one clustered GeoJSON source drawn by three layers:
//! cluster circles sized and colored by point count, the abbreviated count on
//! top of them, and a circle per unclustered point. Sources and layers can
//! only be added once the style has loaded, so data handed over earlier is
//! kept until the load event arrives.

use crate::{
    constants::{CLUSTERS_LAYER_ID, CLUSTER_COUNT_LAYER_ID, POINTS_SOURCE_ID, UNCLUSTERED_LAYER_ID},
    core::config::ClusterOptions,
    data::{
        geojson::{FeatureCollection, GeoJsonFeature},
        point::MapPoint,
    },
    map::{
        popup::ActivePopup,
        strategy::{RenderStrategy, StrategyKind},
    },
    widget::{
        events::MapEvent,
        style::{CirclePaint, GeoJsonSource, LayerFilter, LayerKind, LayerSpec, Step, SymbolLayout},
        CameraOptions, Cursor, InstanceId, MapWidget,
    },
    Result,
};

const CLUSTER_COLORS: [&str; 3] = ["#51bbd6", "#f1f075", "#f28cb1"];
const CLUSTER_RADII: [f64; 3] = [20.0, 30.0, 40.0];
const POINT_RADIUS: f64 = 8.0;
const POINT_FALLBACK_COLOR: &str = "#11b4da";

/// Layers drawn by the clustering strategy, bottom to top
pub fn cluster_layers(options: &ClusterOptions) -> Vec<LayerSpec> {
    let tiers = |values: [f64; 3]| {
        Step::new(values[0])
            .stop(options.medium_threshold, values[1])
            .stop(options.large_threshold, values[2])
    };
    let colors = Step::new(CLUSTER_COLORS[0].to_string())
        .stop(options.medium_threshold, CLUSTER_COLORS[1].to_string())
        .stop(options.large_threshold, CLUSTER_COLORS[2].to_string());

    vec![
        LayerSpec {
            id: CLUSTERS_LAYER_ID.to_string(),
            source: POINTS_SOURCE_ID.to_string(),
            kind: LayerKind::Circle(CirclePaint {
                color: colors,
                color_property: None,
                radius: tiers(CLUSTER_RADII),
                stroke_width: 2.0,
                stroke_color: "#ffffff".to_string(),
            }),
            filter: LayerFilter::Clustered,
        },
        LayerSpec {
            id: CLUSTER_COUNT_LAYER_ID.to_string(),
            source: POINTS_SOURCE_ID.to_string(),
            kind: LayerKind::Symbol(SymbolLayout {
                text_field: "point_count_abbreviated".to_string(),
                text_size: 12.0,
            }),
            filter: LayerFilter::Clustered,
        },
        LayerSpec {
            id: UNCLUSTERED_LAYER_ID.to_string(),
            source: POINTS_SOURCE_ID.to_string(),
            kind: LayerKind::Circle(CirclePaint {
                color: Step::new(POINT_FALLBACK_COLOR.to_string()),
                color_property: Some("color".to_string()),
                radius: Step::new(POINT_RADIUS),
                stroke_width: 1.0,
                stroke_color: "#ffffff".to_string(),
            }),
            filter: LayerFilter::Unclustered,
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterState {
    /// Nothing added to any instance
    Uninitialized,
    /// Data received before the style loaded
    AwaitingStyle,
    /// Source and layers are on the instance
    Initialized,
}

pub struct ClusterStrategy {
    options: ClusterOptions,
    state: ClusterState,
    instance: Option<InstanceId>,
    pending: FeatureCollection,
}

impl ClusterStrategy {
    pub fn new(options: ClusterOptions) -> Self {
        Self {
            options,
            state: ClusterState::Uninitialized,
            instance: None,
            pending: FeatureCollection::default(),
        }
    }

    pub fn state(&self) -> ClusterState {
        self.state
    }

    /// Adds or refreshes the source, then any missing layer
    fn setup(&mut self, map: &mut dyn MapWidget) -> Result<()> {
        if map.has_source(POINTS_SOURCE_ID) {
            map.set_source_data(POINTS_SOURCE_ID, self.pending.clone())?;
        } else {
            map.add_source(
                POINTS_SOURCE_ID,
                GeoJsonSource::clustered(self.pending.clone(), self.options.clone()),
            )?;
        }

        for layer in cluster_layers(&self.options) {
            if !map.has_layer(&layer.id) {
                map.add_layer(layer)?;
            }
        }

        self.state = ClusterState::Initialized;
        log::debug!(
            "clustered source ready with {} points on instance {}",
            self.pending.len(),
            map.instance_id().0
        );
        Ok(())
    }

    fn zoom_into_cluster(&self, map: &mut dyn MapWidget, feature: &GeoJsonFeature) {
        let Some(cluster_id) = feature.cluster_id() else {
            log::warn!("cluster feature without cluster_id");
            return;
        };
        match map.cluster_expansion_zoom(POINTS_SOURCE_ID, cluster_id) {
            Ok(zoom) => map.ease_to(CameraOptions {
                center: feature.coordinates(),
                zoom: zoom + 1.0,
            }),
            Err(e) => log::warn!("no expansion zoom for cluster {}: {}", cluster_id, e),
        }
    }
}

impl RenderStrategy for ClusterStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Clustering
    }

    fn apply(&mut self, map: &mut dyn MapWidget, points: &[MapPoint]) -> Result<()> {
        let id = map.instance_id();
        if self.instance != Some(id) {
            self.state = ClusterState::Uninitialized;
            self.instance = Some(id);
        }
        self.pending = FeatureCollection::from_points(points);

        if map.is_style_loaded() {
            self.setup(map)
        } else {
            if self.state != ClusterState::AwaitingStyle {
                log::debug!("style not loaded yet, deferring clustered source");
            }
            self.state = ClusterState::AwaitingStyle;
            Ok(())
        }
    }

    fn handle_event(
        &mut self,
        map: &mut dyn MapWidget,
        event: &MapEvent,
    ) -> Result<Option<ActivePopup>> {
        if self.instance != Some(map.instance_id()) {
            return Ok(None);
        }

        match event {
            MapEvent::StyleLoaded if self.state == ClusterState::AwaitingStyle => {
                self.setup(map)?;
                Ok(None)
            }
            MapEvent::LayerClicked { layer, feature, .. } if layer == CLUSTERS_LAYER_ID => {
                self.zoom_into_cluster(map, feature);
                Ok(None)
            }
            MapEvent::LayerClicked {
                layer,
                feature,
                anchor,
            } if layer == UNCLUSTERED_LAYER_ID => Ok(feature
                .point_id()
                .map(|id| ActivePopup::new(id.to_string(), *anchor))),
            MapEvent::LayerHover { layer, entered }
                if layer == CLUSTERS_LAYER_ID || layer == UNCLUSTERED_LAYER_ID =>
            {
                map.set_cursor(if *entered { Cursor::Pointer } else { Cursor::Default });
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn dispose(&mut self, map: &mut dyn MapWidget) -> Result<()> {
        if self.instance == Some(map.instance_id()) {
            // layers reference the source, so they go first
            for layer in [CLUSTER_COUNT_LAYER_ID, CLUSTERS_LAYER_ID, UNCLUSTERED_LAYER_ID] {
                if map.has_layer(layer) {
                    map.remove_layer(layer)?;
                }
            }
            if map.has_source(POINTS_SOURCE_ID) {
                map.remove_source(POINTS_SOURCE_ID)?;
            }
            map.set_cursor(Cursor::Default);
        }
        self.state = ClusterState::Uninitialized;
        self.instance = None;
        self.pending = FeatureCollection::default();
        Ok(())
    }
}
