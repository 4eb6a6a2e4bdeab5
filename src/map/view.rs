//! The map page
//!
//! [`MapView`] is the composition root: it obtains the credential, merges the
//! built-in points with the source collections, applies the filter, keeps one
//! render strategy active and routes widget events to the strategy, the
//! session and the popup controller.

use crate::{
    constants::USER_LOCATION_ZOOM,
    core::{config::MapViewConfig, geo::LngLat},
    data::{
        aggregator::{aggregate, source_location},
        point::MapPoint,
        pois::static_points,
        sources::SourceCollections,
    },
    filter::{
        adapter::adapt,
        predicate::{filter_points, PointFilter},
        state::FilterState,
    },
    geocoding::{client::GeocodingClient, resolver::Geocoder},
    map::{
        lifecycle::MapInitializer,
        location::{GeolocationProvider, UserLocation},
        notify::Notifier,
        popup::{ActivePopup, PopupController},
        strategy::{RenderStrategy, StrategyKind},
    },
    storage::{Credential, CredentialStore},
    widget::{CameraOptions, ContainerId, InstanceId, MapFactory, MapWidget},
    MapError, Result,
};

/// What the page shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus {
    /// No container yet
    Unmounted,
    /// A container but no credential: the page shows the token prompt
    NeedsCredential,
    /// A live map instance
    Ready(InstanceId),
}

pub struct MapView<F, S> {
    config: MapViewConfig,
    factory: F,
    store: S,
    container: Option<ContainerId>,
    credential: Option<Credential>,
    initializer: MapInitializer,
    points: Vec<MapPoint>,
    visible: Vec<MapPoint>,
    filter_state: FilterState,
    filter: PointFilter,
    strategy: Box<dyn RenderStrategy>,
    active_popup: Option<ActivePopup>,
    popup: PopupController,
}

impl<F: MapFactory, S: CredentialStore> MapView<F, S> {
    pub fn new(config: MapViewConfig, factory: F, store: S) -> Self {
        let strategy = config.default_strategy.build(&config.clustering);
        let filter_state = FilterState::default();
        let filter = adapt(&filter_state, config.empty_categories);
        let points = static_points();
        let visible = filter_points(&points, &filter);

        Self {
            initializer: MapInitializer::new(config.clone()),
            config,
            factory,
            store,
            container: None,
            credential: None,
            points,
            visible,
            filter_state,
            filter,
            strategy,
            active_popup: None,
            popup: PopupController::new(),
        }
    }

    // --- accessors --------------------------------------------------------

    pub fn status(&self) -> ViewStatus {
        match (self.initializer.session(), &self.container) {
            (Some(session), _) => ViewStatus::Ready(session.instance_id()),
            (None, Some(_)) => ViewStatus::NeedsCredential,
            (None, None) => ViewStatus::Unmounted,
        }
    }

    pub fn config(&self) -> &MapViewConfig {
        &self.config
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Every point, unfiltered
    pub fn points(&self) -> &[MapPoint] {
        &self.points
    }

    /// Points passing the current filter, in the same order
    pub fn visible_points(&self) -> &[MapPoint] {
        &self.visible
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filter_state
    }

    pub fn strategy_kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    pub fn active_popup(&self) -> Option<&ActivePopup> {
        self.active_popup.as_ref()
    }

    pub fn popup(&self) -> &PopupController {
        &self.popup
    }

    pub fn map(&self) -> Option<&dyn MapWidget> {
        self.initializer.session().map(|s| s.map())
    }

    pub fn map_mut(&mut self) -> Option<&mut dyn MapWidget> {
        self.initializer.session_mut().map(|s| s.map_mut())
    }

    // --- lifecycle --------------------------------------------------------

    /// Binds the view to a container, reading the stored credential
    pub fn mount(&mut self, container: ContainerId) -> Result<ViewStatus> {
        self.container = Some(container);
        if self.credential.is_none() {
            self.credential = match self.store.load() {
                Ok(credential) => credential,
                Err(e) => {
                    log::warn!("could not read stored credential: {}", e);
                    None
                }
            };
        }
        self.refresh()
    }

    /// Accepts a token from the prompt, persists it and (re)creates the map
    pub fn set_credential(&mut self, token: &str) -> Result<ViewStatus> {
        let credential = Credential::parse(token).ok_or(MapError::MissingCredential)?;
        self.store.store(&credential)?;
        self.credential = Some(credential);
        self.refresh()
    }

    /// Forgets the token; the map goes away and the prompt comes back
    pub fn clear_credential(&mut self) -> Result<ViewStatus> {
        self.store.clear()?;
        self.credential = None;
        self.refresh()
    }

    /// Tears the map down
    pub fn unmount(&mut self) {
        self.detach();
        self.active_popup = None;
        self.container = None;
        self.initializer.release();
    }

    // --- data and filters -------------------------------------------------

    pub fn set_sources(&mut self, sources: &SourceCollections) -> Result<()> {
        let mut points = static_points();
        points.extend(aggregate(
            &sources.accommodations,
            &sources.tours,
            &sources.events,
        ));
        self.points = points;
        self.refilter()
    }

    /// Re-resolves the coordinates of aggregated points through `geocoder`,
    /// using the view's credential for remote lookups. Returns how many
    /// points moved.
    pub async fn geocode_points<C: GeocodingClient>(
        &mut self,
        geocoder: &Geocoder<C>,
    ) -> Result<usize> {
        let targets: Vec<(usize, String)> = self
            .points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| source_location(p).map(|l| (i, l.to_string())))
            .collect();
        let locations: Vec<&str> = targets.iter().map(|(_, l)| l.as_str()).collect();
        let resolved = geocoder
            .resolve_many(&locations, self.credential.as_ref())
            .await;

        let mut moved = 0;
        for ((index, _), coordinates) in targets.iter().zip(resolved) {
            let point = &mut self.points[*index];
            if point.coordinates != coordinates {
                point.coordinates = coordinates;
                moved += 1;
            }
        }
        log::debug!("geocoded {} locations, {} points moved", targets.len(), moved);

        if moved > 0 {
            self.refilter()?;
        }
        Ok(moved)
    }

    pub fn set_filter(&mut self, state: FilterState) -> Result<()> {
        self.filter = adapt(&state, self.config.empty_categories);
        self.filter_state = state;
        self.refilter()
    }

    pub fn reset_filters(&mut self) -> Result<()> {
        self.set_filter(FilterState::default())
    }

    /// Swaps the render strategy; the old one is disposed first
    pub fn set_strategy(&mut self, kind: StrategyKind) -> Result<()> {
        if kind == self.strategy.kind() {
            return Ok(());
        }
        if let Some(session) = self.initializer.session_mut() {
            self.strategy.dispose(session.map_mut())?;
        }
        log::info!("switching render strategy to {}", kind);
        self.strategy = kind.build(&self.config.clustering);
        self.render()
    }

    // --- interaction ------------------------------------------------------

    /// Dispatches pending widget events. Returns how many were handled.
    ///
    /// A strategy failure does not stop the batch: every drained event is
    /// still dispatched and the popup resynced before the first error is
    /// returned.
    pub fn pump_events(&mut self) -> Result<usize> {
        let Some(session) = self.initializer.session_mut() else {
            return Ok(0);
        };

        let events = session.map_mut().drain_events();
        let mut first_error = None;
        for event in &events {
            log::trace!("map event {}", event.name());
            session.handle_event(event);
            match self.strategy.handle_event(session.map_mut(), event) {
                Ok(Some(selected)) => self.active_popup = Some(selected),
                Ok(None) => {}
                Err(e) => {
                    log::warn!(
                        "{} strategy failed on {}: {}",
                        self.strategy.kind(),
                        event.name(),
                        e
                    );
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
            if self.popup.handle_event(session.map_mut(), event) {
                self.active_popup = None;
            }
        }

        if !events.is_empty() {
            self.sync_popup();
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(events.len()),
        }
    }

    /// Selects a point by id, anchoring the popup at its projected position
    pub fn select_point(&mut self, id: &str) -> bool {
        let Some(point) = self.points.iter().find(|p| p.id == id) else {
            return false;
        };
        let Some(map) = self.initializer.session().map(|s| s.map()) else {
            return false;
        };
        self.active_popup = Some(ActivePopup::new(id, map.project(point.coordinates)));
        self.sync_popup();
        self.active_popup.is_some()
    }

    pub fn close_popup(&mut self) {
        self.active_popup = None;
        if let Some(session) = self.initializer.session_mut() {
            self.popup.close(session.map_mut());
        }
    }

    /// Locates the user and flies the camera there
    pub async fn locate_user<P, N>(&mut self, location: &mut UserLocation<P, N>) -> Option<LngLat>
    where
        P: GeolocationProvider,
        N: Notifier,
    {
        let coordinates = location.get_user_location().await?;
        if let Some(map) = self.map_mut() {
            map.fly_to(CameraOptions {
                center: coordinates,
                zoom: USER_LOCATION_ZOOM,
            });
        }
        Some(coordinates)
    }

    // --- internals --------------------------------------------------------

    fn refresh(&mut self) -> Result<ViewStatus> {
        if !self
            .initializer
            .is_current(self.container.as_ref(), self.credential.as_ref())
        {
            self.detach();
            self.initializer.sync(
                &self.factory,
                self.container.as_ref(),
                self.credential.as_ref(),
            )?;
        }
        self.render()?;

        let status = self.status();
        if status == ViewStatus::NeedsCredential {
            log::info!("map credential missing, showing token prompt");
        }
        Ok(status)
    }

    /// Removes what the strategy and popup put on the current instance
    fn detach(&mut self) {
        if let Some(session) = self.initializer.session_mut() {
            if let Err(e) = self.strategy.dispose(session.map_mut()) {
                log::warn!("failed to dispose {} strategy: {}", self.strategy.kind(), e);
            }
            self.popup.close(session.map_mut());
        }
    }

    fn refilter(&mut self) -> Result<()> {
        self.visible = filter_points(&self.points, &self.filter);
        log::debug!(
            "{} of {} points visible",
            self.visible.len(),
            self.points.len()
        );
        self.render()
    }

    fn render(&mut self) -> Result<()> {
        if let Some(session) = self.initializer.session_mut() {
            self.strategy.apply(session.map_mut(), &self.visible)?;
        }
        self.sync_popup();
        Ok(())
    }

    fn sync_popup(&mut self) {
        let Some(session) = self.initializer.session_mut() else {
            return;
        };
        let open = self
            .popup
            .sync(session.map_mut(), self.active_popup.as_ref(), &self.points);
        if !open {
            self.active_popup = None;
        }
    }
}

impl<F, S> Drop for MapView<F, S> {
    fn drop(&mut self) {
        if let Some(session) = self.initializer.session_mut() {
            self.popup.close(session.map_mut());
        }
    }
}
