//! Rendering every chart of the dashboard for one popularity range.

//----------------------------------------------------------------------------------------- std lib
use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
    time::{Duration, Instant},
};
//--------------------------------------------------------------------------------- other libraries
use log::{error, info};
use rayon::prelude::*;
use strum::IntoEnumIterator;
use tracing::instrument;
use trackdash_storage::dataset::{Dataset, PopularityRange};
//----------------------------------------------------------------------------------- local modules
use crate::{
    cache::ChartCache,
    charts::{ChartKind, artist, duration, genre, network, popularity, render::RenderedChart},
    config::ChartSettings,
    errors::ChartBuildError,
    format_duration,
};

/// Every chart of one dashboard render, in display order.
#[derive(Debug, Clone)]
pub struct DashboardCharts {
    pub popularity_range: PopularityRange,
    pub charts: Vec<Arc<Vec<RenderedChart>>>,
}

impl DashboardCharts {
    /// All charts, flattened in display order.
    pub fn iter(&self) -> impl Iterator<Item = &RenderedChart> {
        self.charts.iter().flat_map(|charts| charts.iter())
    }

    /// The chart for slot `name`, e.g. `genre_chart`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RenderedChart> {
        self.iter().find(|chart| chart.name == name)
    }

    /// How many slots hold a placeholder rather than a chart.
    #[must_use]
    pub fn placeholders(&self) -> usize {
        self.iter().filter(|chart| chart.placeholder).count()
    }
}

/// Owns the chart cache and renders all charts, each in its own failure domain.
#[derive(Debug)]
pub struct Dashboard {
    cache: ChartCache<Vec<RenderedChart>>,
    settings: ChartSettings,
}

impl Dashboard {
    #[must_use]
    pub fn new(ttl: Duration, settings: ChartSettings) -> Self {
        Self {
            cache: ChartCache::new(ttl),
            settings,
        }
    }

    #[must_use]
    pub const fn cache(&self) -> &ChartCache<Vec<RenderedChart>> {
        &self.cache
    }

    #[must_use]
    pub const fn settings(&self) -> &ChartSettings {
        &self.settings
    }

    /// Render every chart for `range`.
    ///
    /// Charts are built in parallel. A chart that fails, or whose builder panics, is replaced by a
    /// placeholder without affecting the others.
    #[instrument(skip(self, dataset), fields(tracks = dataset.len()))]
    pub fn render(&self, dataset: &Dataset, range: &PopularityRange) -> DashboardCharts {
        let range = *range;
        let start = Instant::now();
        let kinds: Vec<ChartKind> = ChartKind::iter().collect();
        let charts: Vec<Arc<Vec<RenderedChart>>> = kinds
            .into_par_iter()
            .map(|kind| isolate(kind, || self.render_kind(dataset, range, kind)))
            .collect();

        let rendered = DashboardCharts {
            popularity_range: range,
            charts,
        };
        info!(
            "Rendered dashboard for popularity {}-{} in {}s ({} placeholders)",
            range.min(),
            range.max(),
            format_duration(&start.elapsed()),
            rendered.placeholders()
        );
        rendered
    }

    /// Render one kind of chart through the cache.
    ///
    /// The dataset snapshot is part of every key, and the range only of the keys of charts that
    /// use it, so the other charts are shared between ranges.
    fn render_kind(
        &self,
        dataset: &Dataset,
        range: PopularityRange,
        kind: ChartKind,
    ) -> Arc<Vec<RenderedChart>> {
        let snapshot = dataset.snapshot();
        let s = &self.settings;
        let name: &'static str = kind.into();

        match kind {
            ChartKind::GenreDistribution => {
                self.cache
                    .memoize(name, &(snapshot, range, s.genre_distribution_top_n), || {
                        vec![genre::genre_distribution(
                            dataset,
                            Some(&range),
                            s.genre_distribution_top_n,
                        )]
                    })
            }
            ChartKind::PopularityDistribution => {
                self.cache
                    .memoize(name, &(snapshot, s.popularity_bins), || {
                        let (artist, track) =
                            popularity::popularity_distribution(dataset, s.popularity_bins);
                        vec![artist, track]
                    })
            }
            ChartKind::DurationDistribution => {
                self.cache.memoize(name, &(snapshot, s.duration_bins), || {
                    vec![duration::duration_distribution(dataset, s.duration_bins)]
                })
            }
            ChartKind::DurationByGenre => {
                self.cache
                    .memoize(name, &(snapshot, range, s.duration_by_genre_top_n), || {
                        vec![duration::duration_by_genre(
                            dataset,
                            Some(&range),
                            s.duration_by_genre_top_n,
                        )]
                    })
            }
            ChartKind::GenreEvolution => {
                self.cache
                    .memoize(name, &(snapshot, s.genre_evolution_top_n), || {
                        vec![genre::genre_evolution(dataset, s.genre_evolution_top_n)]
                    })
            }
            ChartKind::PopularityCorrelation => self.cache.memoize(name, &snapshot, || {
                vec![popularity::popularity_correlation(dataset)]
            }),
            ChartKind::FrequentArtists => {
                self.cache
                    .memoize(name, &(snapshot, s.frequent_artists_top_n), || {
                        vec![artist::frequent_artists(dataset, s.frequent_artists_top_n)]
                    })
            }
            ChartKind::ArtistPopularityByGenre => {
                self.cache
                    .memoize(name, &(snapshot, s.artist_genre_groups), || {
                        vec![artist::artist_popularity_by_genre(
                            dataset,
                            s.artist_genre_groups,
                        )]
                    })
            }
            ChartKind::GenreNetwork => {
                self.cache.memoize(name, &(snapshot, s.cooccurrence_top_n), || {
                    vec![network::genre_network(dataset, s.cooccurrence_top_n)]
                })
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned())
}

/// Run `render`, replacing its output with placeholders if it panics.
pub(crate) fn isolate(
    kind: ChartKind,
    render: impl FnOnce() -> Arc<Vec<RenderedChart>>,
) -> Arc<Vec<RenderedChart>> {
    catch_unwind(AssertUnwindSafe(render)).unwrap_or_else(|payload| {
        let e = ChartBuildError::Panicked(panic_message(payload.as_ref()));
        error!("Error creating {} chart: {e}", kind.label());
        Arc::new(kind.placeholders())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use trackdash_storage::test_utils::{TrackFixture, arb_dataset, dataset_from};

    const TTL: Duration = Duration::from_secs(300);

    fn slot_names(charts: &DashboardCharts) -> Vec<&'static str> {
        charts.iter().map(|c| c.name).collect()
    }

    #[test]
    fn test_renders_every_slot_in_order() {
        let dashboard = Dashboard::new(TTL, ChartSettings::default());
        let charts = dashboard.render(&arb_dataset(60), &PopularityRange::FULL);

        assert_eq!(
            slot_names(&charts),
            vec![
                "genre_chart",
                "artist_pop_dist",
                "track_pop_dist",
                "duration_chart",
                "duration_by_genre",
                "genre_evolution",
                "pop_chart",
                "most_frequent_artists",
                "artist_popularity_genre",
                "genre_network",
            ]
        );
        assert_eq!(charts.placeholders(), 0);
    }

    #[test]
    fn test_empty_dataset_renders_placeholders() {
        let dashboard = Dashboard::new(TTL, ChartSettings::default());
        let charts = dashboard.render(&dataset_from(vec![]), &PopularityRange::FULL);

        assert_eq!(charts.iter().count(), 10);
        assert_eq!(charts.placeholders(), 10);
        assert!(
            charts
                .get("pop_chart")
                .is_some_and(|c| c.html.contains("Error loading popularity comparison"))
        );
    }

    #[test]
    fn test_one_failure_does_not_affect_the_others() {
        // a single track: no trend line can be fit, everything else still works
        let dataset = dataset_from(vec![
            TrackFixture::new("a")
                .artist("A", Some(60.0))
                .genres(&["pop"])
                .release("2020-01-01")
                .build(),
        ]);
        let dashboard = Dashboard::new(TTL, ChartSettings::default());
        let charts = dashboard.render(&dataset, &PopularityRange::FULL);

        assert!(charts.get("pop_chart").is_some_and(|c| c.placeholder));
        assert!(charts.get("genre_chart").is_some_and(|c| !c.placeholder));
        assert_eq!(charts.placeholders(), 1);
    }

    #[test]
    fn test_reuses_cached_charts() {
        let dataset = arb_dataset(30);
        let dashboard = Dashboard::new(TTL, ChartSettings::default());

        let first = dashboard.render(&dataset, &PopularityRange::FULL);
        let entries = dashboard.cache().len();
        assert_eq!(entries, 9);

        let second = dashboard.render(&dataset, &PopularityRange::FULL);
        assert_eq!(dashboard.cache().len(), entries);
        assert!(
            first
                .charts
                .iter()
                .zip(&second.charts)
                .all(|(a, b)| Arc::ptr_eq(a, b))
        );
    }

    #[test]
    fn test_new_range_only_recomputes_filtered_charts() {
        let dataset = arb_dataset(30);
        let dashboard = Dashboard::new(TTL, ChartSettings::default());

        let full = dashboard.render(&dataset, &PopularityRange::FULL);
        let narrow = dashboard.render(&dataset, &PopularityRange::new(20.0, 80.0).unwrap());

        // genre distribution and duration by genre depend on the range
        assert_eq!(dashboard.cache().len(), 11);
        assert!(!Arc::ptr_eq(&full.charts[0], &narrow.charts[0]));
        assert!(Arc::ptr_eq(&full.charts[1], &narrow.charts[1]));
    }

    #[test]
    fn test_isolate_turns_panics_into_placeholders() {
        let charts = isolate(ChartKind::PopularityDistribution, || {
            panic!("histogram exploded")
        });
        let names: Vec<&str> = charts.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["artist_pop_dist", "track_pop_dist"]);
        assert!(charts.iter().all(|c| c.placeholder));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(payload.as_ref()), "static message");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(payload.as_ref()), "owned message");
        let payload: Box<dyn Any + Send> = Box::new(42);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
