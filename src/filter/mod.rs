//! Point filtering
//!
//! The store-facing [`state::FilterState`] accepts both raw price shapes seen
//! in the UI; [`adapter::adapt`] normalizes it into the single canonical
//! [`predicate::PointFilter`] evaluated by [`predicate::filter_points`].

pub mod adapter;
pub mod predicate;
pub mod state;
