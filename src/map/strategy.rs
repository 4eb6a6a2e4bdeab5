use serde::{Deserialize, Serialize};

use crate::{
    core::config::ClusterOptions,
    data::point::MapPoint,
    map::popup::ActivePopup,
    widget::{events::MapEvent, MapWidget},
    Result,
};

pub use crate::map::{clustering::ClusterStrategy, markers::MarkerStrategy};

/// How points are drawn on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// One marker per point
    #[default]
    Markers,
    /// A clustered source with circle and count layers
    Clustering,
}

impl StrategyKind {
    pub fn build(self, options: &ClusterOptions) -> Box<dyn RenderStrategy> {
        match self {
            StrategyKind::Markers => Box::new(MarkerStrategy::new()),
            StrategyKind::Clustering => Box::new(ClusterStrategy::new(options.clone())),
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::Markers => f.write_str("markers"),
            StrategyKind::Clustering => f.write_str("clustering"),
        }
    }
}

/// Projects the visible points onto a map instance
///
/// Exactly one strategy is active on an instance at a time. A strategy keeps
/// track of the instance it last drew on and starts from scratch when it is
/// handed a different one.
pub trait RenderStrategy {
    fn kind(&self) -> StrategyKind;

    /// Draws `points`, replacing whatever this strategy drew before
    fn apply(&mut self, map: &mut dyn MapWidget, points: &[MapPoint]) -> Result<()>;

    /// Reacts to a widget event; returns the selection a click produced
    fn handle_event(
        &mut self,
        map: &mut dyn MapWidget,
        event: &MapEvent,
    ) -> Result<Option<ActivePopup>>;

    /// Removes everything this strategy added to `map`
    fn dispose(&mut self, map: &mut dyn MapWidget) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serde() {
        let kind: StrategyKind = serde_json::from_str("\"clustering\"").unwrap();
        assert_eq!(kind, StrategyKind::Clustering);
        assert_eq!(serde_json::to_string(&StrategyKind::Markers).unwrap(), "\"markers\"");
        assert_eq!(StrategyKind::default(), StrategyKind::Markers);
    }

    #[test]
    fn test_build_matches_kind() {
        let options = ClusterOptions::default();
        assert_eq!(StrategyKind::Markers.build(&options).kind(), StrategyKind::Markers);
        assert_eq!(
            StrategyKind::Clustering.build(&options).kind(),
            StrategyKind::Clustering
        );
    }
}
