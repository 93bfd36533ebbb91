//! Descriptive statistics used by the dashboard charts.
//!
//! Everything here works on plain slices of `f64` (or iterators of hashable labels) so that the
//! chart builders can stay focused on shaping figures.

pub mod errors;
pub mod frequency;
pub mod histogram;
pub mod regression;
pub mod stats;
