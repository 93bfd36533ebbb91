//! Charts about genre tags: how often each appears, and how that changed over the years.

use std::collections::BTreeMap;

use serde_json::json;
use tracing::instrument;
use trackdash_analysis::{frequency::top_n, stats::mean};
use trackdash_storage::{
    dataset::{Dataset, PopularityRange},
    schemas::track::Track,
};

use crate::errors::ChartBuildError;

use super::{
    ChartKind, escape, explode_genres,
    figure::{Figure, Layout, Legend, Line, Marker, Trace},
    finish,
    render::RenderedChart,
    spotify_link, theme,
};

pub const GENRE_DISTRIBUTION: &str = "genre_chart";
pub const GENRE_EVOLUTION: &str = "genre_evolution";

/// Number of tracks per genre among `tracks`, most frequent first.
#[must_use]
pub fn genre_counts(tracks: &[&Track], n: usize) -> Vec<(String, usize)> {
    top_n(
        explode_genres(tracks.iter().copied()).into_iter().map(|(_, genre)| genre),
        n,
    )
    .into_iter()
    .map(|(genre, count)| (genre.to_owned(), count))
    .collect()
}

/// Mean track popularity, 0 if none of the tracks has a score.
fn mean_popularity<'a>(tracks: impl IntoIterator<Item = &'a Track>) -> f64 {
    let scores: Vec<f64> = tracks.into_iter().filter_map(|t| t.popularity).collect();
    mean(&scores).unwrap_or(0.0)
}

/// A bar per genre, for the `n` most frequent genres.
///
/// # Errors
///
/// Fails if no track in the selection has any genre.
pub fn build_genre_distribution(tracks: &[&Track], n: usize) -> Result<Figure, ChartBuildError> {
    let counts = genre_counts(tracks, n);
    if counts.is_empty() {
        return Err(ChartBuildError::EmptySelection("genre distribution"));
    }

    let customdata = counts
        .iter()
        .map(|(genre, count)| {
            let tagged = tracks.iter().copied().filter(|t| t.genres.contains(genre));
            json!([genre, count, mean_popularity(tagged)])
        })
        .collect();
    let (genres, values): (Vec<String>, Vec<usize>) = counts.into_iter().unzip();

    let trace = Trace::bar(genres, values)
        .marker(Marker::color(theme::GREEN).outline(Line::new(theme::LIGHT_GRAY).width(1.0)))
        .opacity(0.8)
        .customdata(customdata)
        .hovertemplate(
            "<b>%{customdata[0]}</b><br>Tracks: %{customdata[1]}<br>\
             Avg Popularity: %{customdata[2]:.1f}<br><extra></extra>",
        );

    let mut layout = Layout::titled(format!("Top {n} Genres in Your Music"))
        .axes("Genre", "Number of Tracks")
        .height(600)
        .bargap(0.3)
        .interactive();
    layout.xaxis.tickangle = Some(45.0);
    layout.hoverlabel = Some(theme::hoverlabel(theme::DARK_GRAY));

    let mut figure = Figure::new(layout).with_trace(trace);
    theme::apply_dark_theme(&mut figure);
    Ok(figure)
}

/// The genre distribution, restricted to `range` when one is given.
#[instrument(skip(dataset))]
pub fn genre_distribution(
    dataset: &Dataset,
    range: Option<&PopularityRange>,
    n: usize,
) -> RenderedChart {
    let tracks = dataset.select(range);
    finish(
        GENRE_DISTRIBUTION,
        ChartKind::GenreDistribution.label(),
        build_genre_distribution(&tracks, n),
    )
}

/// One year's worth of tracks for one genre.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyGenre {
    pub year: i32,
    pub tracks: usize,
    pub mean_popularity: f64,
    /// Up to three of the year's tracks, as tooltip lines.
    pub samples: Vec<String>,
}

/// Per-year statistics for each of the `n` most frequent genres, in order of frequency.
///
/// Tracks without a release year count towards genre frequency but appear in no year.
#[must_use]
pub fn genre_years(tracks: &[&Track], n: usize) -> Vec<(String, Vec<YearlyGenre>)> {
    let pairs = explode_genres(tracks.iter().copied());
    let top: Vec<&str> = top_n(pairs.iter().map(|(_, genre)| *genre), n)
        .into_iter()
        .map(|(genre, _)| genre)
        .collect();

    top.into_iter()
        .map(|genre| {
            let mut by_year: BTreeMap<i32, Vec<&Track>> = BTreeMap::new();
            for (track, _) in pairs.iter().filter(|(_, g)| *g == genre) {
                if let Some(year) = track.release_year() {
                    by_year.entry(year).or_default().push(*track);
                }
            }

            let years = by_year
                .into_iter()
                .map(|(year, tracks)| YearlyGenre {
                    year,
                    tracks: tracks.len(),
                    mean_popularity: mean_popularity(tracks.iter().copied()),
                    samples: tracks
                        .iter()
                        .take(3)
                        .map(|t| format!("• {} ({})", escape(&t.name), spotify_link(t, "Spotify")))
                        .collect(),
                })
                .collect();
            (genre.to_owned(), years)
        })
        .collect()
}

/// A line per genre tracing how many tracks of it were released each year.
///
/// # Errors
///
/// Fails if no track has both a genre and a release year.
pub fn build_genre_evolution(tracks: &[&Track], n: usize) -> Result<Figure, ChartBuildError> {
    let series = genre_years(tracks, n);
    if series.iter().all(|(_, years)| years.is_empty()) {
        return Err(ChartBuildError::EmptySelection("genre evolution"));
    }

    let mut layout = Layout::titled("Genre Evolution Over Time")
        .axes("Year", "Number of Tracks")
        .height(600);
    layout.hovermode = Some("closest");
    layout.legend = Some(Legend::top_right());
    layout.hoverlabel = Some(theme::hoverlabel(theme::DARK_GRAY));
    let mut figure = Figure::new(layout);

    for (i, (genre, years)) in series.into_iter().enumerate() {
        let color = theme::qualitative(i);
        let customdata = years
            .iter()
            .map(|y| json!([genre, y.mean_popularity, y.samples.join("<br>")]))
            .collect();
        let x: Vec<f64> = years.iter().map(|y| f64::from(y.year)).collect();
        let counts: Vec<usize> = years.iter().map(|y| y.tracks).collect();

        figure.add_trace(
            Trace::scatter(x, counts, "lines+markers")
                .name(genre)
                .marker(Marker::color(color).size(8.0))
                .line(Line::new(color).width(2.0))
                .customdata(customdata)
                .hovertemplate(
                    "<b>%{customdata[0]}</b><br>Year: %{x}<br>Tracks: %{y}<br>\
                     Avg Popularity: %{customdata[1]:.1f}<br><br>\
                     Sample tracks:<br>%{customdata[2]}<extra></extra>",
                ),
        );
    }

    theme::apply_dark_theme(&mut figure);
    Ok(figure)
}

#[instrument(skip(dataset))]
pub fn genre_evolution(dataset: &Dataset, n: usize) -> RenderedChart {
    let tracks = dataset.select(None);
    finish(GENRE_EVOLUTION, ChartKind::GenreEvolution.label(), build_genre_evolution(&tracks, n))
}
