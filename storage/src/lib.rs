//! Loading and cleaning of the top-tracks snapshot.
//!
//! The snapshot is a CSV export with one row per (track, artist) pairing. This crate turns it into
//! an in-memory [`dataset::Dataset`] of one [`schemas::track::Track`] per identifier, with genre
//! tags normalized to plain lists and missing tags back-filled from a patch file.

pub mod dataset;
pub mod dates;
pub mod errors;
pub mod genres;
pub mod loader;
pub mod reconcile;
pub mod schemas;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
