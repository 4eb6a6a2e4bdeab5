//! Prelude module for common tourmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use tourmap::prelude::*;`

pub use crate::core::{
    config::{ClusterOptions, EmptyCategories, FogConfig, GeocoderConfig, MapViewConfig},
    geo::{LngLat, ScreenPoint},
};

pub use crate::data::{
    aggregator::aggregate,
    geojson::{FeatureCollection, GeoJsonFeature, GeoJsonGeometry},
    point::{Category, MapPoint},
    sources::{Accommodation, Event, SourceCollections, Tour},
};

pub use crate::filter::{
    adapter::adapt,
    predicate::{filter_points, CategorySelection, PointFilter, PriceRange},
    state::{FilterState, PriceBucket, RawPriceRange},
};

pub use crate::geocoding::{
    client::{GeocodingClient, HttpGeocodingClient},
    resolver::Geocoder,
};

pub use crate::map::{
    lifecycle::{MapInitializer, MapSession, SyncOutcome},
    location::{
        FixedPosition, GeolocationError, GeolocationProvider, LocationState, PositionOptions,
        UserLocation,
    },
    notify::{LogNotifier, Notification, NotificationLevel, Notifier, RecordingNotifier},
    popup::{ActivePopup, DetailView, PopupController},
    strategy::{ClusterStrategy, MarkerStrategy, RenderStrategy, StrategyKind},
    view::{MapView, ViewStatus},
};

pub use crate::storage::{Credential, CredentialStore, FileCredentialStore, MemoryCredentialStore};

pub use crate::widget::{
    events::MapEvent,
    headless::{HeadlessFactory, HeadlessMap},
    ContainerId, Cursor, MapControl, MapFactory, MapOptions, MapWidget,
};

pub use crate::{Error as MapError, Result};

pub use std::{sync::Arc, time::Duration};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};

pub use futures::Future;
