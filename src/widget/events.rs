use crate::{
    core::geo::ScreenPoint,
    data::geojson::GeoJsonFeature,
    widget::{MarkerHandle, PopupHandle},
};

/// Events raised by a map instance
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The style finished loading; sources and layers may be added
    StyleLoaded,
    MarkerClicked {
        marker: MarkerHandle,
        anchor: ScreenPoint,
    },
    /// A rendered feature of a layer was clicked
    LayerClicked {
        layer: String,
        feature: GeoJsonFeature,
        anchor: ScreenPoint,
    },
    /// Pointer entered (`entered == true`) or left a layer
    LayerHover { layer: String, entered: bool },
    /// A popup was closed by the widget itself (close button, click outside)
    PopupClosed { popup: PopupHandle },
}

impl MapEvent {
    /// Short name, used in logs
    pub fn name(&self) -> &'static str {
        match self {
            MapEvent::StyleLoaded => "load",
            MapEvent::MarkerClicked { .. } => "marker-click",
            MapEvent::LayerClicked { .. } => "click",
            MapEvent::LayerHover { entered: true, .. } => "mouseenter",
            MapEvent::LayerHover { entered: false, .. } => "mouseleave",
            MapEvent::PopupClosed { .. } => "close",
        }
    }
}
