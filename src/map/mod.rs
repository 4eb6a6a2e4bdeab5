//! Interactive map surface
//!
//! [`lifecycle`] owns the widget handle, [`strategy`] projects points onto it,
//! [`popup`] shows the selected point, [`location`] finds the user and
//! [`view`] composes all of them into one page.

pub mod clustering;
pub mod lifecycle;
pub mod location;
pub mod markers;
pub mod notify;
pub mod popup;
pub mod strategy;
pub mod view;
