//! Source and layer descriptions handed to the widget

use crate::{core::config::ClusterOptions, data::geojson::FeatureCollection};

/// A GeoJSON source, optionally clustered by the widget
#[derive(Debug, Clone, PartialEq)]
pub struct GeoJsonSource {
    pub data: FeatureCollection,
    pub cluster: Option<ClusterOptions>,
}

impl GeoJsonSource {
    pub fn new(data: FeatureCollection) -> Self {
        Self { data, cluster: None }
    }

    pub fn clustered(data: FeatureCollection, options: ClusterOptions) -> Self {
        Self {
            data,
            cluster: Some(options),
        }
    }
}

/// A value that steps at point-count thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct Step<T> {
    pub base: T,
    /// `(threshold, value)` pairs in increasing threshold order
    pub stops: Vec<(u64, T)>,
}

impl<T> Step<T> {
    pub fn new(base: T) -> Self {
        Self {
            base,
            stops: Vec::new(),
        }
    }

    pub fn stop(mut self, threshold: u64, value: T) -> Self {
        self.stops.push((threshold, value));
        self
    }

    /// Value of the highest stop whose threshold is `<= count`
    pub fn value_for(&self, count: u64) -> &T {
        self.stops
            .iter()
            .rev()
            .find(|(threshold, _)| count >= *threshold)
            .map(|(_, value)| value)
            .unwrap_or(&self.base)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CirclePaint {
    pub color: Step<String>,
    /// Feature property whose value overrides `color` when present
    pub color_property: Option<String>,
    pub radius: Step<f64>,
    pub stroke_width: f64,
    pub stroke_color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolLayout {
    /// Feature property rendered as text
    pub text_field: String,
    pub text_size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerKind {
    Circle(CirclePaint),
    Symbol(SymbolLayout),
}

/// Which features of a clustered source a layer draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerFilter {
    All,
    Clustered,
    Unclustered,
}

impl LayerFilter {
    pub fn accepts(&self, is_cluster: bool) -> bool {
        match self {
            LayerFilter::All => true,
            LayerFilter::Clustered => is_cluster,
            LayerFilter::Unclustered => !is_cluster,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: String,
    pub source: String,
    pub kind: LayerKind,
    pub filter: LayerFilter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_tiers() {
        let radius = Step::new(20.0).stop(10, 30.0).stop(30, 40.0);
        assert_eq!(*radius.value_for(2), 20.0);
        assert_eq!(*radius.value_for(9), 20.0);
        assert_eq!(*radius.value_for(10), 30.0);
        assert_eq!(*radius.value_for(29), 30.0);
        assert_eq!(*radius.value_for(30), 40.0);
        assert_eq!(*radius.value_for(500), 40.0);
    }

    #[test]
    fn test_layer_filter() {
        assert!(LayerFilter::Clustered.accepts(true));
        assert!(!LayerFilter::Clustered.accepts(false));
        assert!(LayerFilter::Unclustered.accepts(false));
        assert!(LayerFilter::All.accepts(true));
    }
}
