//! One marker per point

use crate::{
    data::point::MapPoint,
    map::{
        popup::ActivePopup,
        strategy::{RenderStrategy, StrategyKind},
    },
    prelude::HashMap,
    widget::{events::MapEvent, InstanceId, MarkerHandle, MarkerSpec, MapWidget},
    Result,
};

/// Places an individual marker for every visible point
///
/// Handles are tracked per instance: markers created on an instance that has
/// since been destroyed are forgotten rather than removed.
#[derive(Debug, Default)]
pub struct MarkerStrategy {
    instance: Option<InstanceId>,
    markers: HashMap<MarkerHandle, String>,
}

impl MarkerStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    fn attach(&mut self, map: &dyn MapWidget) {
        let id = map.instance_id();
        if self.instance != Some(id) {
            if !self.markers.is_empty() {
                log::debug!(
                    "dropping {} marker handles of a previous map instance",
                    self.markers.len()
                );
            }
            self.markers.clear();
            self.instance = Some(id);
        }
    }

    fn clear(&mut self, map: &mut dyn MapWidget) {
        for (handle, point_id) in self.markers.drain() {
            if let Err(e) = map.remove_marker(handle) {
                log::warn!("marker for {} already gone: {}", point_id, e);
            }
        }
    }
}

impl RenderStrategy for MarkerStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Markers
    }

    fn apply(&mut self, map: &mut dyn MapWidget, points: &[MapPoint]) -> Result<()> {
        self.attach(map);
        self.clear(map);

        for point in points {
            let handle = map.add_marker(MarkerSpec {
                point_id: point.id.clone(),
                coordinates: point.coordinates,
                color: point.color.clone(),
                title: point.name.clone(),
            });
            self.markers.insert(handle, point.id.clone());
        }
        log::debug!("placed {} markers", self.markers.len());
        Ok(())
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
            MapEvent::MarkerClicked { marker, anchor } => Ok(self
                .markers
                .get(marker)
                .map(|point_id| ActivePopup::new(point_id.clone(), *anchor))),
            _ => Ok(None),
        }
    }

    fn dispose(&mut self, map: &mut dyn MapWidget) -> Result<()> {
        if self.instance == Some(map.instance_id()) {
            self.clear(map);
        } else {
            self.markers.clear();
        }
        self.instance = None;
        Ok(())
    }
}
