//! The chart builders.
//!
//! Every builder comes in two layers: a fallible `build_*` function that returns a themed
//! [`Figure`] or a [`ChartBuildError`], and a total wrapper that renders the figure and falls back
//! to a placeholder reading "Error loading <chart>" when anything goes wrong. Callers only ever
//! see the total wrappers' [`RenderedChart`]s.

pub mod artist;
pub mod duration;
pub mod figure;
pub mod genre;
pub mod network;
pub mod popularity;
pub mod render;
pub mod theme;

use log::{debug, error};
use strum::{EnumIter, IntoStaticStr};
use trackdash_storage::schemas::track::Track;

use crate::errors::ChartBuildError;

use self::{
    figure::Figure,
    render::{RenderedChart, error_fragment, render},
};

/// The charts of the dashboard, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ChartKind {
    GenreDistribution,
    PopularityDistribution,
    DurationDistribution,
    DurationByGenre,
    GenreEvolution,
    PopularityCorrelation,
    FrequentArtists,
    ArtistPopularityByGenre,
    GenreNetwork,
}

impl ChartKind {
    /// The chart slots this kind fills; the popularity distribution fills two.
    #[must_use]
    pub const fn slots(self) -> &'static [&'static str] {
        match self {
            Self::GenreDistribution => &[genre::GENRE_DISTRIBUTION],
            Self::PopularityDistribution => &[
                popularity::ARTIST_POPULARITY_DISTRIBUTION,
                popularity::TRACK_POPULARITY_DISTRIBUTION,
            ],
            Self::DurationDistribution => &[duration::DURATION_DISTRIBUTION],
            Self::DurationByGenre => &[duration::DURATION_BY_GENRE],
            Self::GenreEvolution => &[genre::GENRE_EVOLUTION],
            Self::PopularityCorrelation => &[popularity::POPULARITY_CORRELATION],
            Self::FrequentArtists => &[artist::FREQUENT_ARTISTS],
            Self::ArtistPopularityByGenre => &[artist::ARTIST_POPULARITY_BY_GENRE],
            Self::GenreNetwork => &[network::GENRE_NETWORK],
        }
    }

    /// How the chart is referred to in placeholders and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::GenreDistribution => "genre distribution",
            Self::PopularityDistribution => "popularity distribution",
            Self::DurationDistribution => "duration distribution",
            Self::DurationByGenre => "duration by genre distribution",
            Self::GenreEvolution => "genre evolution",
            Self::PopularityCorrelation => "popularity comparison",
            Self::FrequentArtists => "most frequent artists chart",
            Self::ArtistPopularityByGenre => "artist popularity/genre chart",
            Self::GenreNetwork => "genre co-occurrence network",
        }
    }

    /// Placeholders for every slot of this kind.
    #[must_use]
    pub fn placeholders(self) -> Vec<RenderedChart> {
        self.slots()
            .iter()
            .map(|slot| placeholder_chart(slot, self.label()))
            .collect()
    }
}

/// Render a placeholder for `slot`, falling back to a bare error `<div>`.
#[must_use]
pub fn placeholder_chart(slot: &'static str, label: &str) -> RenderedChart {
    match render(slot, &theme::placeholder(label)) {
        Ok(mut chart) => {
            chart.placeholder = true;
            chart
        }
        Err(e) => {
            error!("Failed to render placeholder for {slot}: {e}");
            error_fragment(slot, label)
        }
    }
}

/// Render a built figure, or a placeholder if building or rendering failed.
pub(crate) fn finish(
    slot: &'static str,
    label: &str,
    built: Result<Figure, ChartBuildError>,
) -> RenderedChart {
    match built.and_then(|figure| render(slot, &figure).map_err(ChartBuildError::from)) {
        Ok(chart) => {
            debug!("Rendered {slot}");
            chart
        }
        Err(e) => {
            error!("Error creating {label} chart: {e}");
            placeholder_chart(slot, label)
        }
    }
}

/// Every (track, genre) pair, in dataset order.
pub(crate) fn explode_genres<'a>(
    tracks: impl IntoIterator<Item = &'a Track>,
) -> Vec<(&'a Track, &'a str)> {
    tracks
        .into_iter()
        .flat_map(|track| track.genres.iter().map(move |genre| (track, genre.as_str())))
        .collect()
}

/// Highest track popularity first, tracks without a score last, otherwise stable.
pub(crate) fn by_popularity_desc(a: &&Track, b: &&Track) -> std::cmp::Ordering {
    match (a.popularity, b.popularity) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    }
}

/// The `n` most popular of `tracks`.
pub(crate) fn most_popular<'a>(tracks: impl IntoIterator<Item = &'a Track>, n: usize) -> Vec<&'a Track> {
    let mut tracks: Vec<&Track> = tracks.into_iter().collect();
    tracks.sort_by(by_popularity_desc);
    tracks.truncate(n);
    tracks
}

/// Escape text interpolated into Plotly's HTML-ish tooltip markup.
pub(crate) fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// A link to the track on Spotify, or nothing if it has no URL.
pub(crate) fn spotify_link(track: &Track, text: &str) -> String {
    if track.spotify_url.is_empty() {
        String::new()
    } else {
        format!(
            "<a href='{}' target='_blank'>{text}</a>",
            escape(&track.spotify_url).replace('\'', "%27")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;
    use trackdash_storage::test_utils::TrackFixture;

    #[test]
    fn test_slots_are_unique() {
        let slots: Vec<&str> = ChartKind::iter().flat_map(|k| k.slots().iter().copied()).collect();
        let mut deduped = slots.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(slots.len(), deduped.len());
        assert_eq!(slots.len(), 10);
    }

    #[test]
    fn test_kind_names() {
        let name: &'static str = ChartKind::ArtistPopularityByGenre.into();
        assert_eq!(name, "artist_popularity_by_genre");
    }

    #[test]
    fn test_finish_falls_back_to_placeholder() {
        let chart = finish(
            "genre_chart",
            "genre distribution",
            Err(ChartBuildError::EmptySelection("genre distribution")),
        );
        assert!(chart.placeholder);
        assert_eq!(chart.name, "genre_chart");
        assert!(chart.html.contains("Error loading genre distribution"));
    }

    #[test]
    fn test_popularity_placeholders_fill_both_slots() {
        let charts = ChartKind::PopularityDistribution.placeholders();
        let names: Vec<&str> = charts.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["artist_pop_dist", "track_pop_dist"]);
        assert!(charts.iter().all(|c| c.placeholder));
    }

    #[test]
    fn test_explode_genres() {
        let tracks = [
            TrackFixture::new("a").genres(&["pop", "rock"]).build(),
            TrackFixture::new("b").build(),
            TrackFixture::new("c").genres(&["pop"]).build(),
        ];
        let pairs: Vec<(&str, &str)> = explode_genres(&tracks)
            .into_iter()
            .map(|(t, g)| (t.id.as_ref(), g))
            .collect();
        assert_eq!(pairs, vec![("a", "pop"), ("a", "rock"), ("c", "pop")]);
    }

    #[test]
    fn test_most_popular() {
        let tracks = [
            TrackFixture::new("a").popularity(Some(10.0)).build(),
            TrackFixture::new("b").popularity(None).build(),
            TrackFixture::new("c").popularity(Some(90.0)).build(),
            TrackFixture::new("d").popularity(Some(50.0)).build(),
        ];
        let ids: Vec<&str> = most_popular(&tracks, 3).iter().map(|t| t.id.as_ref()).collect();
        assert_eq!(ids, vec!["c", "d", "a"]);
    }

    #[test]
    fn test_spotify_link() {
        let track = TrackFixture::new("t1").build();
        assert_eq!(
            spotify_link(&track, "Spotify"),
            "<a href='https://open.spotify.com/track/t1' target='_blank'>Spotify</a>"
        );
    }
}
