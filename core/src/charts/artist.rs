//! Per-artist charts, aggregated by grouping tracks on their primary artist's name.

use std::collections::BTreeMap;

use serde_json::json;
use tracing::instrument;
use trackdash_analysis::frequency::top_n;
use trackdash_storage::{dataset::Dataset, schemas::track::Track};

use crate::errors::ChartBuildError;

use super::{
    ChartKind,
    figure::{Axis, Figure, Layout, Legend, Line, Marker, Trace},
    finish,
    render::RenderedChart,
    theme,
};

pub const FREQUENT_ARTISTS: &str = "most_frequent_artists";
pub const ARTIST_POPULARITY_BY_GENRE: &str = "artist_popularity_genre";

pub const UNKNOWN_GENRE: &str = "Unknown";
pub const OTHER_GENRES: &str = "Other";

/// The `n` artists with the most tracks, most tracks first.
#[must_use]
pub fn artist_counts(tracks: &[&Track], n: usize) -> Vec<(String, usize)> {
    top_n(tracks.iter().filter_map(|t| t.artist_name()), n)
        .into_iter()
        .map(|(name, count)| (name.to_owned(), count))
        .collect()
}

/// A horizontal bar per artist, most frequent at the top.
///
/// # Errors
///
/// Fails if no track has an artist.
pub fn build_frequent_artists(tracks: &[&Track], n: usize) -> Result<Figure, ChartBuildError> {
    let counts = artist_counts(tracks, n);
    if counts.is_empty() {
        return Err(ChartBuildError::EmptySelection("most frequent artists"));
    }
    let (names, values): (Vec<String>, Vec<usize>) = counts.into_iter().unzip();
    let customdata = names.iter().map(|name| json!(name)).collect();

    let trace = Trace::bar(values, names)
        .orientation("h")
        .marker(Marker::color(theme::GREEN).outline(Line::new(theme::LIGHT_GRAY).width(1.0)))
        .opacity(0.8)
        .customdata(customdata)
        .hovertemplate("<b>%{customdata}</b><br>Number of Tracks: %{x}<br><extra></extra>");

    let mut layout = Layout::titled("Most Frequent Artists")
        .height(400)
        .bargap(0.2);
    layout.xaxis = Axis::titled("Number of Tracks");
    layout.yaxis.autorange = Some("reversed");
    layout.showlegend = Some(false);

    let mut figure = Figure::new(layout).with_trace(trace);
    theme::apply_dark_theme(&mut figure);
    Ok(figure)
}

#[instrument(skip(dataset))]
pub fn frequent_artists(dataset: &Dataset, n: usize) -> RenderedChart {
    let tracks = dataset.select(None);
    finish(
        FREQUENT_ARTISTS,
        ChartKind::FrequentArtists.label(),
        build_frequent_artists(&tracks, n),
    )
}

/// What the dashboard knows about one artist, from the tracks crediting them first.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistSummary {
    pub name: String,
    /// The first popularity score recorded for the artist.
    pub popularity: Option<f64>,
    pub tracks: usize,
    /// The first genre of the artist's first track, or [`UNKNOWN_GENRE`].
    pub main_genre: String,
    pub spotify_url: String,
}

/// Summaries of every artist, sorted by name.
#[must_use]
pub fn artist_summaries(tracks: &[&Track]) -> Vec<ArtistSummary> {
    let mut by_artist: BTreeMap<&str, Vec<&Track>> = BTreeMap::new();
    for &track in tracks {
        if let Some(name) = track.artist_name() {
            by_artist.entry(name).or_default().push(track);
        }
    }

    by_artist
        .into_iter()
        .filter_map(|(name, tracks)| {
            let first = tracks.first()?;
            Some(ArtistSummary {
                name: name.to_owned(),
                popularity: tracks.iter().find_map(|t| t.artist_popularity()),
                tracks: tracks.len(),
                main_genre: first
                    .primary_artist()
                    .and_then(|artist| artist.genres.first())
                    .or_else(|| first.genres.first())
                    .map_or_else(|| UNKNOWN_GENRE.to_owned(), Clone::clone),
                spotify_url: first.spotify_url.to_string(),
            })
        })
        .collect()
}

/// The color groups: "Other" first so it is drawn underneath, then the `groups` most common
/// main genres.
fn color_groups(artists: &[ArtistSummary], groups: usize) -> Vec<String> {
    let top = top_n(artists.iter().map(|a| a.main_genre.as_str()), groups);
    std::iter::once(OTHER_GENRES.to_owned())
        .chain(top.into_iter().map(|(genre, _)| genre.to_owned()))
        .collect()
}

/// Artist popularity against track count, colored by the artist's main genre.
///
/// # Errors
///
/// Fails if no track has an artist.
pub fn build_artist_popularity_by_genre(
    tracks: &[&Track],
    groups: usize,
) -> Result<Figure, ChartBuildError> {
    let artists = artist_summaries(tracks);
    if artists.is_empty() {
        return Err(ChartBuildError::EmptySelection("artist popularity"));
    }
    let groups = color_groups(&artists, groups);
    let assigned: Vec<&str> = artists
        .iter()
        .map(|a| {
            if groups[1..].contains(&a.main_genre) {
                a.main_genre.as_str()
            } else {
                OTHER_GENRES
            }
        })
        .collect();

    let mut layout = Layout::titled("Artist Popularity vs Track Count by Genre")
        .axes("Artist Popularity Score", "Number of Tracks")
        .height(600)
        .interactive();
    layout.hoverlabel = Some(theme::hoverlabel(theme::TRANSLUCENT_BLACK));
    layout.legend = Some(Legend::top_right());
    let mut figure = Figure::new(layout);

    for (i, group) in groups.iter().enumerate() {
        let members: Vec<&ArtistSummary> = artists
            .iter()
            .zip(&assigned)
            .filter(|(_, assigned)| **assigned == group.as_str())
            .map(|(a, _)| a)
            .collect();
        let color = theme::qualitative(i);

        figure.add_trace(
            Trace::scatter(
                members.iter().map(|a| a.popularity).collect::<Vec<_>>(),
                members.iter().map(|a| a.tracks).collect::<Vec<_>>(),
                "markers",
            )
            .name(group.clone())
            .marker(
                Marker::color(color)
                    .size(10.0)
                    .opacity(0.7)
                    .outline(Line::new(theme::LIGHT_GRAY).width(1.0)),
            )
            .customdata(
                members
                    .iter()
                    .map(|a| json!([a.name, a.main_genre, a.spotify_url]))
                    .collect(),
            )
            .hovertemplate(
                "<b>%{customdata[0]}</b><br>Tracks: %{y}<br>Popularity: %{x:.1f}<br>\
                 Genre: %{customdata[1]}<br>\
                 <a href='%{customdata[2]}' target='_blank'>Open in Spotify</a><br><extra></extra>",
            ),
        );
    }

    theme::apply_dark_theme(&mut figure);
    Ok(figure)
}

#[instrument(skip(dataset))]
pub fn artist_popularity_by_genre(dataset: &Dataset, groups: usize) -> RenderedChart {
    let tracks = dataset.select(None);
    finish(
        ARTIST_POPULARITY_BY_GENRE,
        ChartKind::ArtistPopularityByGenre.label(),
        build_artist_popularity_by_genre(&tracks, groups),
    )
}
