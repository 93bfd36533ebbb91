//! Core library for trackdash.
//!
//! Provides configuration and logging, the memoizing [`cache::ChartCache`], the chart builders in
//! [`charts`], and the [`dashboard::Dashboard`] that renders all of them for a popularity range.

use std::{path::PathBuf, time::Duration};

use errors::DirectoryError;

pub mod cache;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod logger;

/// Get the location of the config directory.
///
/// # Errors
///
/// Returns an error if the platform's home directory could not be determined.
#[inline]
pub fn get_config_dir() -> Result<PathBuf, DirectoryError> {
    directories::ProjectDirs::from("", "", "trackdash")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(DirectoryError::Config)
}

/// Get the location of the data directory, where logs and rendered dashboards live by default.
///
/// # Errors
///
/// Returns an error if the platform's home directory could not be determined.
#[inline]
pub fn get_data_dir() -> Result<PathBuf, DirectoryError> {
    directories::ProjectDirs::from("", "", "trackdash")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(DirectoryError::Data)
}

/// Format a duration as `seconds.millis`, e.g. `12.034`.
#[must_use]
#[inline]
pub fn format_duration(duration: &Duration) -> String {
    format!("{}.{:03}", duration.as_secs(), duration.subsec_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(Duration::from_millis(0), "0.000")]
    #[case(Duration::from_millis(12_034), "12.034")]
    #[case(Duration::from_secs(300), "300.000")]
    fn test_format_duration(#[case] input: Duration, #[case] expected: &str) {
        assert_eq!(format_duration(&input), expected);
    }
}
