//! How track popularity relates to artist popularity, and how both are distributed.

use serde_json::json;
use tracing::instrument;
use trackdash_analysis::{
    regression::{LinearFit, linear_fit},
    stats::{mean, min_max},
};
use trackdash_storage::{dataset::Dataset, schemas::track::Track};

use crate::errors::ChartBuildError;

use super::{
    ChartKind, escape,
    figure::{ColorSpec, Figure, Layout, Legend, Line, Marker, Trace},
    finish,
    render::RenderedChart,
    spotify_link, theme,
};

pub const POPULARITY_CORRELATION: &str = "pop_chart";
pub const ARTIST_POPULARITY_DISTRIBUTION: &str = "artist_pop_dist";
pub const TRACK_POPULARITY_DISTRIBUTION: &str = "track_pop_dist";

fn hover_text(track: &Track, artist_popularity: f64, popularity: f64) -> String {
    format!(
        "Track: {}<br>Artist: {}<br>Album: {}<br>Artist Popularity: {artist_popularity:.1}<br>\
         Track Popularity: {popularity:.1}<br>{}",
        escape(&track.name),
        escape(track.artist_name().unwrap_or_default()),
        escape(&track.album_name),
        spotify_link(track, "Open in Spotify"),
    )
}

/// The dashed least-squares line drawn across the observed artist popularity range.
fn trend_line(fit: LinearFit, (lo, hi): (f64, f64)) -> Trace {
    Trace::scatter(vec![lo, hi], vec![fit.predict(lo), fit.predict(hi)], "lines")
        .name("Trend Line")
        .line(Line::new(theme::GREEN).dash("dash").width(2.0))
        .hovertemplate(format!(
            "Correlation Line<br>y = {:.2}x + {:.2}<extra></extra>",
            fit.slope, fit.intercept
        ))
}

/// Artist popularity against track popularity, one point per track, with a trend line.
///
/// Tracks missing either score are left out.
///
/// # Errors
///
/// Fails if fewer than two tracks have both scores, or if all of them share one artist
/// popularity, since no line can be fit then.
pub fn build_popularity_correlation(tracks: &[&Track]) -> Result<Figure, ChartBuildError> {
    let points: Vec<(&Track, f64, f64)> = tracks
        .iter()
        .filter_map(|t| Some((*t, t.artist_popularity()?, t.popularity?)))
        .collect();
    let xs: Vec<f64> = points.iter().map(|(_, x, _)| *x).collect();
    let ys: Vec<f64> = points.iter().map(|(_, _, y)| *y).collect();

    let fit = linear_fit(&xs, &ys)?;
    let range = min_max(&xs)?;
    let text = points
        .iter()
        .map(|(track, x, y)| hover_text(track, *x, *y))
        .collect();

    let marker = Marker {
        color: Some(ColorSpec::Scaled(ys.clone())),
        colorscale: Some(theme::colorscale(&theme::SEQUENTIAL)),
        showscale: Some(true),
        colorbar: Some(json!({
            "title": {"text": "Track<br>Popularity", "side": "right"},
            "thickness": 15,
            "len": 0.7,
            "bgcolor": theme::TRANSPARENT,
        })),
        ..Marker::default()
    }
    .size(8.0)
    .opacity(0.8)
    .outline(Line::new(theme::DARK_GRAY).width(1.0));

    let scatter = Trace::scatter(xs, ys, "markers")
        .name("Artists")
        .marker(marker)
        .text(text)
        .hovertemplate("%{text}<extra></extra>");

    let mut layout = Layout::titled("Artist vs Track Popularity")
        .axes("Artist Popularity Score", "Track Popularity Score")
        .height(600)
        .interactive();
    layout.hoverlabel = Some(theme::hoverlabel(theme::TRANSLUCENT_BLACK));
    layout.legend = Some(Legend::top_left());

    let mut figure = Figure::new(layout)
        .with_trace(scatter)
        .with_trace(trend_line(fit, range));
    theme::apply_dark_theme(&mut figure);
    Ok(figure)
}

#[instrument(skip(dataset))]
pub fn popularity_correlation(dataset: &Dataset) -> RenderedChart {
    let tracks = dataset.select(None);
    finish(
        POPULARITY_CORRELATION,
        ChartKind::PopularityCorrelation.label(),
        build_popularity_correlation(&tracks),
    )
}

/// One popularity histogram with a dashed line at the mean.
fn popularity_histogram(
    values: Vec<f64>,
    bins: usize,
    what: &str,
    counted: &str,
) -> Result<Figure, ChartBuildError> {
    let mean = mean(&values)?;
    let trace = Trace::histogram(values, bins)
        .marker(Marker::color(theme::GREEN).outline(Line::new(theme::LIGHT_GRAY).width(1.0)))
        .opacity(0.8)
        .hovertemplate(format!(
            "Popularity Score: %{{x}}<br>Number of {counted}: %{{y}}<extra></extra>"
        ));

    let mut figure = Figure::new(
        Layout::titled(format!("Distribution of {what} Popularity"))
            .axes(format!("{what} Popularity Score"), format!("Number of {counted}"))
            .height(500)
            .bargap(0.1),
    )
    .with_trace(trace);
    figure.add_vline(mean, theme::LIGHT_GRAY, format!("Mean: {mean:.1}"));
    Ok(figure)
}

/// Histograms of artist popularity and of track popularity.
///
/// Artist popularity is counted once per track row, so an artist with many tracks weighs more.
///
/// # Errors
///
/// Fails if either histogram has no values to show.
pub fn build_popularity_distribution(
    tracks: &[&Track],
    bins: usize,
) -> Result<(Figure, Figure), ChartBuildError> {
    let artist_scores: Vec<f64> = tracks.iter().filter_map(|t| t.artist_popularity()).collect();
    let track_scores: Vec<f64> = tracks.iter().filter_map(|t| t.popularity).collect();

    let mut artist = popularity_histogram(artist_scores, bins, "Artist", "Artists")?;
    theme::apply_dark_theme(&mut artist);

    let mut track = popularity_histogram(track_scores, bins, "Track", "Tracks")?;
    track.layout = track.layout.interactive();
    track.layout.hoverlabel = Some(theme::hoverlabel(theme::TRANSLUCENT_BLACK));
    theme::apply_dark_theme(&mut track);

    Ok((artist, track))
}

/// Both popularity histograms; if either cannot be built, both become placeholders.
#[instrument(skip(dataset))]
pub fn popularity_distribution(dataset: &Dataset, bins: usize) -> (RenderedChart, RenderedChart) {
    let tracks = dataset.select(None);
    let label = ChartKind::PopularityDistribution.label();
    match build_popularity_distribution(&tracks, bins) {
        Ok((artist, track)) => (
            finish(ARTIST_POPULARITY_DISTRIBUTION, label, Ok(artist)),
            finish(TRACK_POPULARITY_DISTRIBUTION, label, Ok(track)),
        ),
        Err(e) => (
            finish(ARTIST_POPULARITY_DISTRIBUTION, label, Err(e)),
            super::placeholder_chart(TRACK_POPULARITY_DISTRIBUTION, label),
        ),
    }
}
