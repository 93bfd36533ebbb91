//! Track length charts.

use serde_json::{Value, json};
use tracing::instrument;
use trackdash_analysis::{
    frequency::top_n,
    histogram::Histogram,
    stats::{mean, quartiles},
};
use trackdash_storage::{
    dataset::{Dataset, PopularityRange},
    schemas::track::Track,
};

use crate::errors::ChartBuildError;

use super::{
    ChartKind, escape, explode_genres,
    figure::{Figure, Layout, Line, Marker, Trace},
    finish, most_popular,
    render::RenderedChart,
    spotify_link, theme,
};

pub const DURATION_DISTRIBUTION: &str = "duration_chart";
pub const DURATION_BY_GENRE: &str = "duration_by_genre";

const SAMPLES_PER_BIN: usize = 3;

fn sample_line(track: &Track) -> String {
    format!(
        "<b>{}</b> by {}<br>{}",
        escape(&track.name),
        escape(track.artist_name().unwrap_or_default()),
        spotify_link(track, "Open in Spotify"),
    )
}

/// For each bin of `histogram`, the most popular tracks in it as tooltip lines, padded with
/// empty strings so every bin has exactly [`SAMPLES_PER_BIN`] entries.
fn bin_samples(histogram: &Histogram, tracks: &[(&Track, f64)]) -> Vec<Value> {
    let mut bins: Vec<Vec<&Track>> = vec![Vec::new(); histogram.counts().len()];
    for (track, minutes) in tracks {
        if let Some(i) = histogram.bin_of(*minutes) {
            bins[i].push(*track);
        }
    }

    bins.into_iter()
        .map(|bin| {
            let mut lines: Vec<String> = most_popular(bin, SAMPLES_PER_BIN)
                .into_iter()
                .map(sample_line)
                .collect();
            lines.resize(SAMPLES_PER_BIN, String::new());
            json!(lines)
        })
        .collect()
}

/// A histogram of track lengths in minutes, with sample tracks for each bin.
///
/// # Errors
///
/// Fails if no track has a duration.
pub fn build_duration_distribution(tracks: &[&Track], bins: usize) -> Result<Figure, ChartBuildError> {
    let timed: Vec<(&Track, f64)> = tracks
        .iter()
        .filter_map(|t| Some((*t, t.duration_minutes()?)))
        .collect();
    if timed.is_empty() {
        return Err(ChartBuildError::EmptySelection("duration distribution"));
    }
    let minutes: Vec<f64> = timed.iter().map(|(_, m)| *m).collect();

    let histogram = Histogram::new(&minutes, bins)?;
    let mean = mean(&minutes)?;

    let trace = Trace::bar(histogram.centers(), histogram.counts().to_vec())
        .name("Duration Distribution")
        .marker(Marker::color(theme::GREEN).outline(Line::new(theme::LIGHT_GRAY).width(1.0)))
        .opacity(0.8)
        .width(histogram.bin_width() * 0.9)
        .customdata(bin_samples(&histogram, &timed))
        .hovertemplate(
            "Duration: %{x:.1f} min<br>Count: %{y}<br>Sample tracks:<br>%{customdata[0]}\
             ---<br>%{customdata[1]}---<br>%{customdata[2]}<extra></extra>",
        );

    let mut layout = Layout::titled("Distribution of Track Durations")
        .axes("Duration (minutes)", "Number of Tracks")
        .height(500)
        .bargap(0.0)
        .interactive();
    layout.showlegend = Some(false);
    layout.hoverlabel = Some(theme::hoverlabel(theme::DARK_GRAY));

    let mut figure = Figure::new(layout).with_trace(trace);
    figure.add_vline(mean, theme::LIGHT_GRAY, format!("Mean: {mean:.1} min"));
    theme::apply_dark_theme(&mut figure);
    Ok(figure)
}

#[instrument(skip(dataset))]
pub fn duration_distribution(dataset: &Dataset, bins: usize) -> RenderedChart {
    let tracks = dataset.select(None);
    finish(
        DURATION_DISTRIBUTION,
        ChartKind::DurationDistribution.label(),
        build_duration_distribution(&tracks, bins),
    )
}

/// Length statistics for one genre, durations in minutes.
#[derive(Debug, Clone, PartialEq)]
pub struct GenreDurations {
    pub genre: String,
    pub minutes: Vec<f64>,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
    pub count: usize,
    /// The genre's most popular tracks, as one tooltip block.
    pub samples: String,
}

/// Duration statistics for the `n` genres most frequent among `tracks`.
///
/// Genres are ranked and counted over every tagged track. Only the quartiles
/// and samples are restricted to tracks with a known duration.
///
/// # Errors
///
/// Fails if one of the top genres has no track with a duration.
pub fn genre_durations(tracks: &[&Track], n: usize) -> Result<Vec<GenreDurations>, ChartBuildError> {
    let pairs = explode_genres(tracks.iter().copied());

    top_n(pairs.iter().map(|(_, genre)| *genre), n)
        .into_iter()
        .map(|(genre, count)| {
            let timed: Vec<&Track> = pairs
                .iter()
                .filter(|(t, g)| *g == genre && t.duration_ms.is_some())
                .map(|(t, _)| *t)
                .collect();
            let minutes: Vec<f64> = timed.iter().filter_map(|t| t.duration_minutes()).collect();
            if minutes.is_empty() {
                return Err(ChartBuildError::EmptySelection("duration by genre"));
            }
            let stats = quartiles(&minutes)?;
            let samples = most_popular(timed, SAMPLES_PER_BIN)
                .into_iter()
                .map(|t| {
                    format!(
                        "<b>{}</b> by {} ({:.1} min)<br>{}",
                        escape(&t.name),
                        escape(t.artist_name().unwrap_or_default()),
                        t.duration_minutes().unwrap_or_default(),
                        spotify_link(t, "Open in Spotify"),
                    )
                })
                .collect::<Vec<_>>()
                .join("<br>");

            Ok::<_, ChartBuildError>(GenreDurations {
                genre: genre.to_owned(),
                minutes,
                median: stats.median,
                q1: stats.q1,
                q3: stats.q3,
                count,
                samples,
            })
        })
        .collect()
}

/// A one-sided violin of track lengths per genre for the `n` most frequent genres.
///
/// # Errors
///
/// Fails if no track in the selection has both a genre and a duration.
pub fn build_duration_by_genre(tracks: &[&Track], n: usize) -> Result<Figure, ChartBuildError> {
    let genres = genre_durations(tracks, n)?;
    if genres.is_empty() {
        return Err(ChartBuildError::EmptySelection("duration by genre"));
    }

    let mut layout = Layout::titled("Track Duration Distribution by Genre")
        .axes("Duration (minutes)", "Genre")
        .height(600)
        .interactive();
    layout.showlegend = Some(false);
    layout.violingap = Some(0.1);
    layout.violingroupgap = Some(0.0);
    layout.hoverlabel = Some(theme::hoverlabel(theme::DARK_GRAY));
    let mut figure = Figure::new(layout);

    for (i, stats) in genres.into_iter().enumerate() {
        let row = json!([
            stats.genre,
            stats.median,
            stats.q1,
            stats.q3,
            stats.count,
            stats.samples
        ]);
        let customdata = vec![row; stats.minutes.len()];
        figure.add_trace(
            Trace::violin(stats.minutes, stats.genre)
                .orientation("h")
                .side("positive")
                .width(2.0)
                .points("outliers")
                .meanline(json!({"visible": true, "color": theme::WHITE}))
                .fillcolor(theme::qualitative(i))
                .line(Line::new(theme::LIGHT_GRAY))
                .opacity(0.7)
                .customdata(customdata)
                .hovertemplate(
                    "<b>%{customdata[0]}</b><br>Median: %{customdata[1]:.1f} min<br>\
                     Q1-Q3: %{customdata[2]:.1f}-%{customdata[3]:.1f} min<br>\
                     Track count: %{customdata[4]}<br><br>\
                     Popular tracks in this genre:<br>%{customdata[5]}<extra></extra>",
                ),
        );
    }

    theme::apply_dark_theme(&mut figure);
    Ok(figure)
}

#[instrument(skip(dataset))]
pub fn duration_by_genre(
    dataset: &Dataset,
    range: Option<&PopularityRange>,
    n: usize,
) -> RenderedChart {
    let tracks = dataset.select(range);
    finish(
        DURATION_BY_GENRE,
        ChartKind::DurationByGenre.label(),
        build_duration_by_genre(&tracks, n),
    )
}
