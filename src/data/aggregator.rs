//! Merges the source collections into one list of map points
//!
//! Each collection goes through its own adapter that assigns the id prefix,
//! the category and a coordinate resolved offline from the record's
//! location-like field. The result is a plain concatenation: accommodations,
//! then tours, then events, each segment in source order. No deduplication.

use crate::{
    data::{
        point::{Category, MapPoint},
        sources::{Accommodation, Event, Tour},
    },
    geocoding::resolve_offline,
};

pub const ACCOMMODATION_PREFIX: &str = "accommodation";
pub const TOUR_PREFIX: &str = "tour";
pub const EVENT_PREFIX: &str = "event";

pub fn aggregate(
    accommodations: &[Accommodation],
    tours: &[Tour],
    events: &[Event],
) -> Vec<MapPoint> {
    let mut points = Vec::with_capacity(accommodations.len() + tours.len() + events.len());
    points.extend(accommodations.iter().map(accommodation_point));
    points.extend(tours.iter().map(tour_point));
    points.extend(events.iter().map(event_point));

    log::debug!(
        "aggregated {} points ({} accommodations, {} tours, {} events)",
        points.len(),
        accommodations.len(),
        tours.len(),
        events.len()
    );
    points
}

pub fn accommodation_point(record: &Accommodation) -> MapPoint {
    let mut point = MapPoint::new(
        format!("{ACCOMMODATION_PREFIX}-{}", record.id),
        record.name.clone(),
        resolve_offline(&record.location),
        Category::Accommodation,
    );
    point.description = record.description.clone();
    point.price = record.price_per_night;
    point.rating = record.rating;
    point.image = record.image.clone();
    point.tags = record.amenities.clone();
    point.featured = record.featured;
    point.url = Some(format!("/hospedagens/{}", record.id));
    point.details = record.extra.clone();
    point
        .details
        .insert("location".into(), record.location.clone().into());
    point
}

pub fn tour_point(record: &Tour) -> MapPoint {
    let mut point = MapPoint::new(
        format!("{TOUR_PREFIX}-{}", record.id),
        record.name.clone(),
        resolve_offline(&record.meeting_point),
        Category::Tour,
    );
    point.description = record.description.clone();
    point.price = record.price;
    point.rating = record.rating;
    point.image = record.image.clone();
    point.featured = record.featured;
    point.url = Some(format!("/passeios/{}", record.id));
    point.details = record.extra.clone();
    point
        .details
        .insert("meeting_point".into(), record.meeting_point.clone().into());
    if let Some(duration) = &record.duration {
        point.details.insert("duration".into(), duration.clone().into());
    }
    point
}

pub fn event_point(record: &Event) -> MapPoint {
    let mut point = MapPoint::new(
        format!("{EVENT_PREFIX}-{}", record.id),
        record.name.clone(),
        resolve_offline(&record.venue),
        Category::Event,
    );
    point.description = record.description.clone();
    point.price = record.price;
    point.image = record.image.clone();
    point.date = record.date.clone();
    point.time = record.time.clone();
    point.url = Some(format!("/eventos/{}", record.id));
    point.details = record.extra.clone();
    point.details.insert("venue".into(), record.venue.clone().into());
    point
}

/// The location text a point's coordinates were resolved from
pub fn source_location(point: &MapPoint) -> Option<&str> {
    ["location", "meeting_point", "venue"]
        .iter()
        .find_map(|key| point.details.get(*key))
        .and_then(|value| value.as_str())
}
