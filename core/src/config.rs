//! Handles the configuration of the dashboard.
//!
//! this module is responsible for parsing the Trackdash.toml file, layering environment variables
//! and cli arguments on top of it, and validating the result.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use std::{
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use trackdash_storage::{dataset::PopularityRange, loader::TextEncoding};

pub static DEFAULT_CONFIG: &str = include_str!("../Trackdash.toml");

#[derive(Clone, Debug, Deserialize, Default, PartialEq)]
pub struct Settings {
    /// Where the snapshot comes from
    #[serde(default)]
    pub data: DataSettings,
    /// Chart memoization
    #[serde(default)]
    pub cache: CacheSettings,
    /// Per chart parameters
    #[serde(default)]
    pub charts: ChartSettings,
    /// Dashboard defaults
    #[serde(default)]
    pub dashboard: DashboardSettings,
}

/// Values given on the command line, which take precedence over the config file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SettingsOverrides {
    pub data_path: Option<PathBuf>,
    pub patch_path: Option<PathBuf>,
    pub log_level: Option<log::LevelFilter>,
}

impl Settings {
    /// Load settings from the config file, environment variables, and CLI arguments.
    ///
    /// The environment variables are prefixed with `TRACKDASH_`, and nested keys are separated
    /// with `__`.
    ///
    /// # Errors
    ///
    /// This function will return an error if the config file is not found, if the config file is
    /// invalid, or if the default popularity range is inverted.
    #[inline]
    pub fn init(config: PathBuf, overrides: SettingsOverrides) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::from(config))
            .add_source(
                Environment::with_prefix("TRACKDASH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut settings: Self = s.try_deserialize()?;

        settings.data.path = expand(&settings.data.path);
        settings.data.patch_path = settings.data.patch_path.as_deref().map(expand);

        if let Some(path) = overrides.data_path {
            settings.data.path = path;
        }
        if let Some(path) = overrides.patch_path {
            settings.data.patch_path = Some(path);
        }
        if let Some(log_level) = overrides.log_level {
            settings.dashboard.log_level = log_level;
        }

        settings
            .dashboard
            .popularity_range()
            .map_err(|e| ConfigError::Message(format!("[dashboard] {e}")))?;
        if settings.data.encodings.is_empty() {
            return Err(ConfigError::Message(
                "[data] at least one encoding is required".into(),
            ));
        }

        Ok(settings)
    }

    /// Get the (default) path to the config file.
    /// If the config file does not exist at this path, it will be created with the default config.
    ///
    /// See [`crate::get_config_dir`] for more information about where this default path is located.
    ///
    /// # Errors
    ///
    /// This function will return an error if the system config directory (e.g., `~/.config` on linux) could not be found, or if the config file was missing and could not be created.
    #[inline]
    pub fn get_config_path() -> Result<PathBuf, std::io::Error> {
        match crate::get_config_dir() {
            Ok(config_dir) => {
                if !config_dir.exists() {
                    std::fs::create_dir_all(&config_dir)?;
                }
                let config_file = config_dir.join("Trackdash.toml");

                if !config_file.exists() {
                    std::fs::write(&config_file, DEFAULT_CONFIG)?;
                }

                Ok(config_file)
            }
            Err(e) => {
                eprintln!("Error: {e}");
                Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Unable to find the config directory for trackdash.",
                ))
            }
        }
    }
}

fn expand(path: &Path) -> PathBuf {
    shellexpand::tilde(&path.to_string_lossy()).into_owned().into()
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct DataSettings {
    /// The snapshot CSV.
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    /// The CSV that empty genre lists are back-filled from.
    /// Defaults to `path`.
    #[serde(default)]
    pub patch_path: Option<PathBuf>,
    /// Encodings tried, in order, when reading either file.
    #[serde(default = "default_encodings")]
    pub encodings: Vec<TextEncoding>,
}

impl DataSettings {
    /// The patch source, falling back to the snapshot itself.
    #[must_use]
    pub fn patch_path(&self) -> &Path {
        self.patch_path.as_deref().unwrap_or(&self.path)
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/top_500songs_with_fixed_genres.csv")
}

fn default_encodings() -> Vec<TextEncoding> {
    TextEncoding::DEFAULT_ORDER.to_vec()
}

impl Default for DataSettings {
    #[inline]
    fn default() -> Self {
        Self {
            path: default_data_path(),
            patch_path: None,
            encodings: default_encodings(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct CacheSettings {
    /// How long a memoized chart stays fresh, in seconds.
    /// Default is 300.
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

impl CacheSettings {
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

const fn default_ttl_seconds() -> u64 {
    300
}

impl Default for CacheSettings {
    #[inline]
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Hash)]
pub struct ChartSettings {
    /// How many genres the genre distribution shows.
    #[serde(default = "default_genre_distribution_top_n")]
    pub genre_distribution_top_n: usize,
    /// How many genres get a line in the genre evolution chart.
    #[serde(default = "default_genre_evolution_top_n")]
    pub genre_evolution_top_n: usize,
    /// How many genres get a violin in the duration by genre chart.
    #[serde(default = "default_duration_by_genre_top_n")]
    pub duration_by_genre_top_n: usize,
    /// How many artists the most frequent artists chart lists.
    #[serde(default = "default_frequent_artists_top_n")]
    pub frequent_artists_top_n: usize,
    /// How many main genres get their own color in the artist popularity chart,
    /// the rest are grouped as "Other".
    #[serde(default = "default_artist_genre_groups")]
    pub artist_genre_groups: usize,
    /// How many genres appear as nodes in the co-occurrence network.
    #[serde(default = "default_cooccurrence_top_n")]
    pub cooccurrence_top_n: usize,
    /// Number of bins in the duration histogram.
    #[serde(default = "default_duration_bins")]
    pub duration_bins: usize,
    /// Number of bins in the popularity histograms.
    #[serde(default = "default_popularity_bins")]
    pub popularity_bins: usize,
}

const fn default_genre_distribution_top_n() -> usize {
    20
}
const fn default_genre_evolution_top_n() -> usize {
    8
}
const fn default_duration_by_genre_top_n() -> usize {
    15
}
const fn default_frequent_artists_top_n() -> usize {
    15
}
const fn default_artist_genre_groups() -> usize {
    7
}
const fn default_cooccurrence_top_n() -> usize {
    15
}
const fn default_duration_bins() -> usize {
    40
}
const fn default_popularity_bins() -> usize {
    30
}

impl Default for ChartSettings {
    #[inline]
    fn default() -> Self {
        Self {
            genre_distribution_top_n: default_genre_distribution_top_n(),
            genre_evolution_top_n: default_genre_evolution_top_n(),
            duration_by_genre_top_n: default_duration_by_genre_top_n(),
            frequent_artists_top_n: default_frequent_artists_top_n(),
            artist_genre_groups: default_artist_genre_groups(),
            cooccurrence_top_n: default_cooccurrence_top_n(),
            duration_bins: default_duration_bins(),
            popularity_bins: default_popularity_bins(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DashboardSettings {
    /// Lower bound of the default popularity range.
    #[serde(default = "default_popularity_min")]
    pub popularity_min: f64,
    /// Upper bound of the default popularity range.
    #[serde(default = "default_popularity_max")]
    pub popularity_max: f64,
    /// What level of logging to use.
    /// Default is "info".
    #[serde(default = "default_log_level")]
    #[serde(deserialize_with = "de_log_level")]
    pub log_level: log::LevelFilter,
}

impl DashboardSettings {
    /// # Errors
    ///
    /// Returns an error if the configured bounds do not form a valid range.
    pub fn popularity_range(
        &self,
    ) -> Result<PopularityRange, trackdash_storage::errors::RangeError> {
        PopularityRange::new(self.popularity_min, self.popularity_max)
    }
}

fn de_log_level<'de, D>(deserializer: D) -> Result<log::LevelFilter, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(log::LevelFilter::from_str(&s).unwrap_or_else(|_| default_log_level()))
}

const fn default_popularity_min() -> f64 {
    0.0
}

const fn default_popularity_max() -> f64 {
    100.0
}

const fn default_log_level() -> log::LevelFilter {
    log::LevelFilter::Info
}

impl Default for DashboardSettings {
    #[inline]
    fn default() -> Self {
        Self {
            popularity_min: default_popularity_min(),
            popularity_max: default_popularity_max(),
            log_level: default_log_level(),
        }
    }
}
