//! Popup showing the selected point
//!
//! The selection itself ([`ActivePopup`]) lives in the view. The controller
//! mirrors it onto the widget: it mounts a detail view for the selected point
//! into a fresh popup and unmounts it whenever the selection changes, the
//! popup is closed from inside the widget, or the view goes away.

use std::fmt;

use crate::{
    core::geo::ScreenPoint,
    data::point::MapPoint,
    widget::{events::MapEvent, InstanceId, MapWidget, PopupHandle, PopupSpec},
};

/// The point whose popup is shown, and where it was clicked
#[derive(Debug, Clone, PartialEq)]
pub struct ActivePopup {
    pub id: String,
    pub anchor: ScreenPoint,
}

impl ActivePopup {
    pub fn new(id: impl Into<String>, anchor: ScreenPoint) -> Self {
        Self {
            id: id.into(),
            anchor,
        }
    }
}

/// Content of a popup, built from one point
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub title: String,
    pub category: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub schedule: Option<String>,
    pub url: Option<String>,
}

impl DetailView {
    pub fn from_point(point: &MapPoint) -> Self {
        let schedule = match (&point.date, &point.time) {
            (Some(date), Some(time)) => Some(format!("{date} {time}")),
            (Some(date), None) => Some(date.clone()),
            (None, Some(time)) => Some(time.clone()),
            (None, None) => None,
        };
        Self {
            title: point.name.clone(),
            category: point.category.label().to_string(),
            description: point.description.clone(),
            price: point.price,
            rating: point.rating,
            schedule,
            url: point.url.clone(),
        }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DetailView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} · {}", self.title, self.category)?;
        if let Some(description) = &self.description {
            writeln!(f, "{description}")?;
        }
        if let Some(schedule) = &self.schedule {
            writeln!(f, "Quando: {schedule}")?;
        }
        if let Some(price) = self.price {
            writeln!(f, "R$ {price:.2}")?;
        }
        if let Some(rating) = self.rating {
            writeln!(f, "★ {rating:.1}")?;
        }
        if let Some(url) = &self.url {
            write!(f, "Ver detalhes: {url}")?;
        }
        Ok(())
    }
}

#[derive(Debug)]
struct MountedPopup {
    point_id: String,
    anchor: ScreenPoint,
    handle: PopupHandle,
    instance: InstanceId,
    view: DetailView,
}

#[derive(Debug, Default)]
pub struct PopupController {
    mounted: Option<MountedPopup>,
    mounts: usize,
    unmounts: usize,
}

impl PopupController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn open_id(&self) -> Option<&str> {
        self.mounted.as_ref().map(|m| m.point_id.as_str())
    }

    pub fn detail(&self) -> Option<&DetailView> {
        self.mounted.as_ref().map(|m| &m.view)
    }

    /// Detail views mounted so far
    pub fn mounts(&self) -> usize {
        self.mounts
    }

    /// Detail views unmounted so far
    pub fn unmounts(&self) -> usize {
        self.unmounts
    }

    /// Mirrors `active` onto `map`. Returns whether a popup is open afterwards;
    /// `false` with an active selection means the point no longer exists.
    pub fn sync(
        &mut self,
        map: &mut dyn MapWidget,
        active: Option<&ActivePopup>,
        points: &[MapPoint],
    ) -> bool {
        let unchanged = match (&self.mounted, active) {
            (Some(mounted), Some(active)) => {
                mounted.instance == map.instance_id()
                    && mounted.point_id == active.id
                    && mounted.anchor == active.anchor
            }
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return self.mounted.is_some();
        }

        self.close(map);

        let Some(active) = active else {
            return false;
        };
        let Some(point) = points.iter().find(|p| p.id == active.id) else {
            log::debug!("selected point {} is gone, no popup", active.id);
            return false;
        };

        let view = DetailView::from_point(point);
        let handle = map.open_popup(PopupSpec {
            coordinates: point.coordinates,
            anchor: active.anchor,
            content: view.render(),
        });
        self.mounted = Some(MountedPopup {
            point_id: point.id.clone(),
            anchor: active.anchor,
            handle,
            instance: map.instance_id(),
            view,
        });
        self.mounts += 1;
        true
    }

    /// Returns true when the event closed the open popup
    pub fn handle_event(&mut self, map: &mut dyn MapWidget, event: &MapEvent) -> bool {
        match event {
            MapEvent::PopupClosed { popup }
                if self.mounted.as_ref().is_some_and(|m| m.handle == *popup) =>
            {
                self.close(map);
                true
            }
            _ => false,
        }
    }

    /// Closes the popup and unmounts its detail view
    pub fn close(&mut self, map: &mut dyn MapWidget) {
        if let Some(mounted) = self.mounted.take() {
            if mounted.instance == map.instance_id() {
                map.close_popup(mounted.handle);
            }
            self.unmounts += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{config::MapViewConfig, geo::LngLat},
        data::point::Category,
        widget::{headless::HeadlessMap, ContainerId, MapOptions},
    };

    fn map() -> HeadlessMap {
        HeadlessMap::standalone(MapOptions::from_config(
            ContainerId::new("map"),
            &MapViewConfig::default(),
        ))
    }

    fn points() -> Vec<MapPoint> {
        vec![
            MapPoint::new("tour-1", "Trilha do Atalaia", LngLat::new(-32.42, -3.85), Category::Tour)
                .with_price(250.0)
                .with_rating(4.8),
            MapPoint::new("poi-2", "Baía do Sancho", LngLat::new(-32.44, -3.85), Category::Beach),
        ]
    }

    #[test]
    fn test_detail_view_render() {
        let text = DetailView::from_point(&points()[0]).render();
        assert!(text.starts_with("Trilha do Atalaia · Passeio"));
        assert!(text.contains("R$ 250.00"));
        assert!(text.contains("★ 4.8"));
    }

    #[test]
    fn test_sync_opens_once_per_selection() {
        let mut map = map();
        let mut popups = PopupController::new();
        let active = ActivePopup::new("tour-1", ScreenPoint::new(10.0, 20.0));

        assert!(popups.sync(&mut map, Some(&active), &points()));
        assert!(popups.sync(&mut map, Some(&active), &points()));
        assert_eq!(map.popups_opened(), 1);
        assert_eq!(popups.open_id(), Some("tour-1"));

        let other = ActivePopup::new("poi-2", ScreenPoint::new(1.0, 2.0));
        assert!(popups.sync(&mut map, Some(&other), &points()));
        assert_eq!(map.open_popups().len(), 1);
        assert_eq!(popups.mounts(), 2);
        assert_eq!(popups.unmounts(), 1);
    }

    #[test]
    fn test_missing_point_opens_nothing() {
        let mut map = map();
        let mut popups = PopupController::new();
        let active = ActivePopup::new("tour-404", ScreenPoint::default());
        assert!(!popups.sync(&mut map, Some(&active), &points()));
        assert_eq!(map.popups_opened(), 0);
    }

    #[test]
    fn test_native_close_unmounts() {
        let mut map = map();
        let mut popups = PopupController::new();
        let active = ActivePopup::new("tour-1", ScreenPoint::default());
        popups.sync(&mut map, Some(&active), &points());

        let (handle, _) = map.open_popups()[0];
        map.close_popup_natively(handle);
        let events = map.drain_events();
        assert!(popups.handle_event(&mut map, &events[0]));
        assert!(!popups.is_open());
        assert_eq!(popups.mounts(), popups.unmounts());
    }

    #[test]
    fn test_deselect_closes() {
        let mut map = map();
        let mut popups = PopupController::new();
        let active = ActivePopup::new("tour-1", ScreenPoint::default());
        popups.sync(&mut map, Some(&active), &points());

        assert!(!popups.sync(&mut map, None, &points()));
        assert!(map.open_popups().is_empty());
        assert_eq!(popups.unmounts(), 1);
    }
}
