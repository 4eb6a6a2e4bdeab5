//! In-memory map widget
//!
//! `HeadlessMap` keeps the state a real map library would hold (sources,
//! layers, markers, popups, camera) and enforces the same ordering rules, so
//! strategies can be driven and inspected without a browser. User interaction
//! is simulated with the `click_*`, `hover` and `close_popup_natively`
//! methods, which queue [`MapEvent`]s exactly like the real widget would.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::{Arc, Mutex};

use crate::prelude::HashMap;
use crate::{
    core::{
        config::FogConfig,
        geo::{LngLat, ScreenPoint},
    },
    data::geojson::{FeatureCollection, GeoJsonFeature},
    spatial::clustering::ClusterIndex,
    storage::Credential,
    widget::{
        events::MapEvent,
        style::{GeoJsonSource, LayerSpec},
        CameraOptions, ContainerId, Cursor, InstanceId, MapControl, MapFactory, MapOptions,
        MapWidget, MarkerHandle, MarkerSpec, PopupHandle, PopupSpec,
    },
    MapError, Result,
};

/// Viewport size used for screen projection
const VIEWPORT: (f64, f64) = (800.0, 600.0);

/// Last camera movement requested
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraMove {
    Ease(CameraOptions),
    Fly(CameraOptions),
}

/// Shared record of what a factory created and what was destroyed
#[derive(Debug, Default)]
pub struct FactoryLog {
    pub created: Vec<(InstanceId, ContainerId, Credential)>,
    pub removed: Vec<InstanceId>,
}

impl FactoryLog {
    /// Instances created and not yet removed
    pub fn live(&self) -> Vec<InstanceId> {
        self.created
            .iter()
            .map(|(id, _, _)| *id)
            .filter(|id| !self.removed.contains(id))
            .collect()
    }
}

/// Creates [`HeadlessMap`]s and keeps the credential the library would use
#[derive(Debug, Default)]
pub struct HeadlessFactory {
    log: Arc<Mutex<FactoryLog>>,
    credential: Mutex<Option<Credential>>,
    /// When set, new instances start with their style loaded
    pub style_preloaded: bool,
}

impl HeadlessFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preloaded_style() -> Self {
        Self {
            style_preloaded: true,
            ..Self::default()
        }
    }

    /// Credential assigned by the most recent instance creation
    pub fn active_credential(&self) -> Option<Credential> {
        self.credential.lock().ok().and_then(|c| c.clone())
    }

    pub fn log(&self) -> Arc<Mutex<FactoryLog>> {
        Arc::clone(&self.log)
    }

    pub fn created_count(&self) -> usize {
        self.log.lock().map(|l| l.created.len()).unwrap_or(0)
    }

    pub fn live_instances(&self) -> Vec<InstanceId> {
        self.log.lock().map(|l| l.live()).unwrap_or_default()
    }
}

impl MapFactory for HeadlessFactory {
    fn create_map_instance(
        &self,
        credential: &Credential,
        options: &MapOptions,
    ) -> Result<Box<dyn MapWidget>> {
        if let Ok(mut current) = self.credential.lock() {
            *current = Some(credential.clone());
        }

        let id = {
            let mut log = self
                .log
                .lock()
                .map_err(|e| MapError::Storage(e.to_string()))?;
            let id = InstanceId(log.created.len() as u64 + 1);
            log.created
                .push((id, options.container.clone(), credential.clone()));
            id
        };

        log::debug!("created map instance {} in {}", id.0, options.container);
        let mut map = HeadlessMap::new(id, options.clone(), Arc::clone(&self.log));
        if self.style_preloaded {
            map.load_style();
        }
        Ok(Box::new(map))
    }
}

struct HeadlessSource {
    spec: GeoJsonSource,
}

impl HeadlessSource {
    fn index(&self) -> Option<ClusterIndex> {
        self.spec
            .cluster
            .clone()
            .map(|options| ClusterIndex::new(options, self.spec.data.features.clone()))
    }
}

pub struct HeadlessMap {
    id: InstanceId,
    options: MapOptions,
    factory_log: Arc<Mutex<FactoryLog>>,
    style_loaded: bool,
    controls: Vec<MapControl>,
    fog: Option<FogConfig>,
    sources: HashMap<String, HeadlessSource>,
    layers: Vec<LayerSpec>,
    markers: HashMap<MarkerHandle, MarkerSpec>,
    next_marker: u64,
    popups: HashMap<PopupHandle, PopupSpec>,
    next_popup: u64,
    popups_opened: usize,
    center: LngLat,
    zoom: f64,
    last_move: Option<CameraMove>,
    cursor: Cursor,
    removed: bool,
    events_tx: Sender<MapEvent>,
    events_rx: Receiver<MapEvent>,
}

impl HeadlessMap {
    pub fn new(id: InstanceId, options: MapOptions, factory_log: Arc<Mutex<FactoryLog>>) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            id,
            center: options.center,
            zoom: options.zoom,
            options,
            factory_log,
            style_loaded: false,
            controls: Vec::new(),
            fog: None,
            sources: HashMap::default(),
            layers: Vec::new(),
            markers: HashMap::default(),
            next_marker: 0,
            popups: HashMap::default(),
            next_popup: 0,
            popups_opened: 0,
            last_move: None,
            cursor: Cursor::Default,
            removed: false,
            events_tx,
            events_rx,
        }
    }

    /// Standalone instance, not tied to a factory
    pub fn standalone(options: MapOptions) -> Self {
        Self::new(InstanceId(0), options, Arc::default())
    }

    fn emit(&self, event: MapEvent) {
        // the receiver lives as long as `self`
        let _ = self.events_tx.send(event);
    }

    // --- simulation -------------------------------------------------------

    /// Finishes loading the style and raises `StyleLoaded`
    pub fn load_style(&mut self) {
        if !self.style_loaded {
            self.style_loaded = true;
            self.emit(MapEvent::StyleLoaded);
        }
    }

    pub fn click_marker(&self, handle: MarkerHandle) -> Result<()> {
        let marker = self
            .markers
            .get(&handle)
            .ok_or(MapError::MarkerNotFound(handle.0))?;
        self.emit(MapEvent::MarkerClicked {
            marker: handle,
            anchor: self.project(marker.coordinates),
        });
        Ok(())
    }

    /// Clicks the marker that shows `point_id`
    pub fn click_marker_for(&self, point_id: &str) -> Result<()> {
        let handle = self
            .markers
            .iter()
            .find(|(_, m)| m.point_id == point_id)
            .map(|(h, _)| *h)
            .ok_or_else(|| MapError::LayerNotFound(format!("marker for {point_id}")))?;
        self.click_marker(handle)
    }

    /// Clicks a feature of a layer, as returned by [`HeadlessMap::rendered_features`]
    pub fn click_feature(&self, layer: &str, feature: GeoJsonFeature) -> Result<()> {
        if !self.has_layer(layer) {
            return Err(MapError::LayerNotFound(layer.to_string()));
        }
        let anchor = self.project(feature.coordinates());
        self.emit(MapEvent::LayerClicked {
            layer: layer.to_string(),
            feature,
            anchor,
        });
        Ok(())
    }

    pub fn hover(&self, layer: &str, entered: bool) {
        self.emit(MapEvent::LayerHover {
            layer: layer.to_string(),
            entered,
        });
    }

    /// Closes a popup from inside the widget (close button)
    pub fn close_popup_natively(&mut self, handle: PopupHandle) {
        if self.popups.remove(&handle).is_some() {
            self.emit(MapEvent::PopupClosed { popup: handle });
        }
    }

    /// Moves the camera without raising events
    pub fn jump_to(&mut self, center: LngLat, zoom: f64) {
        self.center = center;
        self.zoom = zoom;
    }

    // --- inspection -------------------------------------------------------

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn controls(&self) -> &[MapControl] {
        &self.controls
    }

    pub fn fog(&self) -> Option<&FogConfig> {
        self.fog.as_ref()
    }

    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.id.as_str()).collect()
    }

    pub fn layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn source_ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.sources.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn source_data(&self, id: &str) -> Option<&FeatureCollection> {
        self.sources.get(id).map(|s| &s.spec.data)
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn markers(&self) -> impl Iterator<Item = (&MarkerHandle, &MarkerSpec)> {
        self.markers.iter()
    }

    pub fn open_popups(&self) -> Vec<(PopupHandle, &PopupSpec)> {
        let mut popups: Vec<_> = self.popups.iter().map(|(h, p)| (*h, p)).collect();
        popups.sort_by_key(|(h, _)| *h);
        popups
    }

    pub fn popups_opened(&self) -> usize {
        self.popups_opened
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn last_move(&self) -> Option<CameraMove> {
        self.last_move
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Features a layer draws at the current zoom
    pub fn rendered_features(&self, layer_id: &str) -> Result<Vec<GeoJsonFeature>> {
        let layer = self
            .layer(layer_id)
            .ok_or_else(|| MapError::LayerNotFound(layer_id.to_string()))?;
        let source = self
            .sources
            .get(&layer.source)
            .ok_or_else(|| MapError::SourceNotFound(layer.source.clone()))?;

        let features = match source.index() {
            Some(index) => index.render(self.zoom),
            None => source.spec.data.features.clone(),
        };
        Ok(features
            .into_iter()
            .filter(|f| layer.filter.accepts(f.is_cluster()))
            .collect())
    }
}

impl MapWidget for HeadlessMap {
    fn instance_id(&self) -> InstanceId {
        self.id
    }

    fn container(&self) -> &ContainerId {
        &self.options.container
    }

    fn is_style_loaded(&self) -> bool {
        self.style_loaded
    }

    fn add_control(&mut self, control: MapControl) {
        self.controls.push(control);
    }

    fn set_fog(&mut self, fog: &FogConfig) {
        self.fog = Some(fog.clone());
    }

    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn add_source(&mut self, id: &str, source: GeoJsonSource) -> Result<()> {
        if self.sources.contains_key(id) {
            return Err(MapError::DuplicateSource(id.to_string()));
        }
        self.sources
            .insert(id.to_string(), HeadlessSource { spec: source });
        Ok(())
    }

    fn set_source_data(&mut self, id: &str, data: FeatureCollection) -> Result<()> {
        let source = self
            .sources
            .get_mut(id)
            .ok_or_else(|| MapError::SourceNotFound(id.to_string()))?;
        source.spec.data = data;
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> Result<()> {
        if let Some(layer) = self.layers.iter().find(|l| l.source == id) {
            return Err(MapError::SourceInUse {
                source_id: id.to_string(),
                layer_id: layer.id.clone(),
            });
        }
        self.sources
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| MapError::SourceNotFound(id.to_string()))
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.iter().any(|l| l.id == id)
    }

    fn add_layer(&mut self, layer: LayerSpec) -> Result<()> {
        if self.has_layer(&layer.id) {
            return Err(MapError::DuplicateLayer(layer.id));
        }
        if !self.sources.contains_key(&layer.source) {
            return Err(MapError::SourceNotFound(layer.source));
        }
        self.layers.push(layer);
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> Result<()> {
        let position = self
            .layers
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| MapError::LayerNotFound(id.to_string()))?;
        self.layers.remove(position);
        Ok(())
    }

    fn add_marker(&mut self, marker: MarkerSpec) -> MarkerHandle {
        self.next_marker += 1;
        let handle = MarkerHandle(self.next_marker);
        self.markers.insert(handle, marker);
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) -> Result<()> {
        self.markers
            .remove(&handle)
            .map(|_| ())
            .ok_or(MapError::MarkerNotFound(handle.0))
    }

    fn open_popup(&mut self, popup: PopupSpec) -> PopupHandle {
        self.next_popup += 1;
        self.popups_opened += 1;
        let handle = PopupHandle(self.next_popup);
        self.popups.insert(handle, popup);
        handle
    }

    fn close_popup(&mut self, handle: PopupHandle) {
        self.popups.remove(&handle);
    }

    fn cluster_expansion_zoom(&self, source: &str, cluster_id: u64) -> Result<f64> {
        let index = self
            .sources
            .get(source)
            .ok_or_else(|| MapError::SourceNotFound(source.to_string()))?
            .index()
            .ok_or(MapError::ClusterNotFound(cluster_id))?;
        Ok(f64::from(index.expansion_zoom(cluster_id)?))
    }

    fn ease_to(&mut self, camera: CameraOptions) {
        self.center = camera.center;
        self.zoom = camera.zoom;
        self.last_move = Some(CameraMove::Ease(camera));
    }

    fn fly_to(&mut self, camera: CameraOptions) {
        self.center = camera.center;
        self.zoom = camera.zoom;
        self.last_move = Some(CameraMove::Fly(camera));
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn center(&self) -> LngLat {
        self.center
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn project(&self, coordinates: LngLat) -> ScreenPoint {
        let zoom = self.zoom.floor().clamp(0.0, 24.0) as u8;
        let point = coordinates.to_world_pixels(zoom);
        let center = self.center.to_world_pixels(zoom);
        ScreenPoint::new(
            point.x - center.x + VIEWPORT.0 / 2.0,
            point.y - center.y + VIEWPORT.1 / 2.0,
        )
    }

    fn drain_events(&mut self) -> Vec<MapEvent> {
        self.events_rx.try_iter().collect()
    }

    fn remove(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;
        self.layers.clear();
        self.sources.clear();
        self.markers.clear();
        self.popups.clear();
        if let Ok(mut log) = self.factory_log.lock() {
            log.removed.push(self.id);
        }
        log::debug!("removed map instance {}", self.id.0);
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
