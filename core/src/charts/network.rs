//! Which genres show up together on the same artist.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::instrument;
use trackdash_analysis::frequency::top_n;
use trackdash_storage::{dataset::Dataset, schemas::track::Track};

use crate::errors::ChartBuildError;

use super::{
    ChartKind, escape, explode_genres,
    figure::{Axis, ColorSpec, Figure, Layout, Line, Margin, Marker, Trace},
    finish,
    render::RenderedChart,
    theme,
};

pub const GENRE_NETWORK: &str = "genre_network";

/// Genres as nodes, joined by an edge whenever some artist has tracks in both.
#[derive(Debug, Clone, PartialEq)]
pub struct GenreGraph {
    /// In order of decreasing frequency.
    pub nodes: Vec<String>,
    /// `(a, b, artists)` with `a < b` by node index; `artists` is how many artists have both.
    pub edges: Vec<(usize, usize, usize)>,
}

impl GenreGraph {
    /// Build the graph over the `n` most frequent genres.
    #[must_use]
    pub fn new(tracks: &[&Track], n: usize) -> Self {
        let nodes: Vec<String> = top_n(
            explode_genres(tracks.iter().copied()).into_iter().map(|(_, g)| g),
            n,
        )
        .into_iter()
        .map(|(genre, _)| genre.to_owned())
        .collect();
        let index: BTreeMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, g)| (g.as_str(), i))
            .collect();

        // the node indexes each artist has tracks in
        let mut artists: BTreeMap<&str, BTreeSet<usize>> = BTreeMap::new();
        for track in tracks {
            let Some(artist) = track.artist_name() else {
                continue;
            };
            let genres = artists.entry(artist).or_default();
            genres.extend(track.genres.iter().filter_map(|g| index.get(g.as_str()).copied()));
        }

        let mut weights: BTreeMap<(usize, usize), usize> = BTreeMap::new();
        for genres in artists.values() {
            let genres: Vec<usize> = genres.iter().copied().collect();
            for (i, &a) in genres.iter().enumerate() {
                for &b in &genres[i + 1..] {
                    *weights.entry((a, b)).or_default() += 1;
                }
            }
        }

        Self {
            nodes,
            edges: weights.into_iter().map(|((a, b), w)| (a, b, w)).collect(),
        }
    }

    /// The genres sharing an edge with node `i`, in node order.
    #[must_use]
    pub fn neighbors(&self, i: usize) -> Vec<&str> {
        let linked: HashSet<usize> = self
            .edges
            .iter()
            .filter_map(|&(a, b, _)| match (a == i, b == i) {
                (true, _) => Some(b),
                (_, true) => Some(a),
                _ => None,
            })
            .collect();
        self.nodes
            .iter()
            .enumerate()
            .filter(|(j, _)| linked.contains(j))
            .map(|(_, g)| g.as_str())
            .collect()
    }
}

/// Evenly spaced points on the unit circle, starting at angle 0; a lone node sits at the origin.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn circular_layout(n: usize) -> Vec<(f64, f64)> {
    if n == 1 {
        return vec![(0.0, 0.0)];
    }
    (0..n)
        .map(|i| {
            let theta = std::f64::consts::TAU * i as f64 / n as f64;
            (theta.cos(), theta.sin())
        })
        .collect()
}

/// The co-occurrence network drawn on a circle.
///
/// # Errors
///
/// Fails if no track in the selection has a genre.
pub fn build_genre_network(tracks: &[&Track], n: usize) -> Result<Figure, ChartBuildError> {
    let graph = GenreGraph::new(tracks, n);
    if graph.nodes.is_empty() {
        return Err(ChartBuildError::EmptySelection("genre co-occurrence network"));
    }
    let positions = circular_layout(graph.nodes.len());

    // one segment per edge, separated by gaps
    let mut edge_x = Vec::with_capacity(graph.edges.len() * 3);
    let mut edge_y = Vec::with_capacity(graph.edges.len() * 3);
    for &(a, b, _) in &graph.edges {
        let ((x0, y0), (x1, y1)) = (positions[a], positions[b]);
        edge_x.extend([Some(x0), Some(x1), None]);
        edge_y.extend([Some(y0), Some(y1), None]);
    }
    let edges = Trace::scatter(edge_x, edge_y, "lines")
        .line(Line::new(theme::LIGHT_GRAY).width(1.0))
        .hoverinfo("none")
        .opacity(0.5);

    let hovertext = (0..graph.nodes.len())
        .map(|i| {
            format!(
                "<b>{}</b><br>Appears with: {}",
                escape(&graph.nodes[i]),
                escape(&graph.neighbors(i).join(", "))
            )
        })
        .collect();
    let colors = (0..graph.nodes.len())
        .map(|i| theme::qualitative(i).to_owned())
        .collect();
    let nodes = Trace::scatter(
        positions.iter().map(|(x, _)| *x).collect::<Vec<_>>(),
        positions.iter().map(|(_, y)| *y).collect::<Vec<_>>(),
        "markers+text",
    )
    .text(graph.nodes.clone())
    .textposition("bottom center")
    .hoverinfo("text")
    .hovertext(hovertext)
    .marker(Marker {
        color: Some(ColorSpec::Each(colors)),
        ..Marker::default()
    }
    .size(30.0)
    .outline(Line::new(theme::BLACK).width(2.0)));

    let mut figure = Figure::new(Layout {
        xaxis: Axis::hidden(),
        yaxis: Axis::hidden(),
        showlegend: Some(false),
        height: Some(700),
        margin: Some(Margin {
            l: 40,
            r: 40,
            t: 60,
            b: 40,
        }),
        hoverlabel: Some(theme::hoverlabel(theme::DARK_GRAY)),
        ..Layout::titled("Genre Combo Generator: Genre Co-occurrence Network")
    })
    .with_trace(edges)
    .with_trace(nodes);
    theme::apply_dark_theme(&mut figure);
    Ok(figure)
}

#[instrument(skip(dataset))]
pub fn genre_network(dataset: &Dataset, n: usize) -> RenderedChart {
    let tracks = dataset.select(None);
    finish(
        GENRE_NETWORK,
        ChartKind::GenreNetwork.label(),
        build_genre_network(&tracks, n),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::figure::Values;
    use pretty_assertions::assert_eq;
    use trackdash_storage::test_utils::{TrackFixture, dataset_from};

    fn sample() -> Dataset {
        dataset_from(vec![
            TrackFixture::new("1").artist("A", None).genres(&["pop", "rock"]).build(),
            TrackFixture::new("2").artist("A", None).genres(&["jazz"]).build(),
            TrackFixture::new("3").artist("B", None).genres(&["pop", "rock"]).build(),
            TrackFixture::new("4").artist("C", None).genres(&["pop"]).build(),
        ])
    }

    #[test]
    fn test_graph_counts_artists() {
        let dataset = sample();
        let graph = GenreGraph::new(&dataset.select(None), 15);

        assert_eq!(graph.nodes, vec!["pop", "rock", "jazz"]);
        // artist A links all three, B links pop and rock again
        assert_eq!(graph.edges, vec![(0, 1, 2), (0, 2, 1), (1, 2, 1)]);
        assert_eq!(graph.neighbors(2), vec!["pop", "rock"]);
    }

    #[test]
    fn test_graph_only_uses_top_genres() {
        let dataset = sample();
        let graph = GenreGraph::new(&dataset.select(None), 1);
        assert_eq!(graph.nodes, vec!["pop"]);
        assert!(graph.edges.is_empty());
        assert!(graph.neighbors(0).is_empty());
    }

    #[test]
    fn test_circular_layout() {
        assert_eq!(circular_layout(1), vec![(0.0, 0.0)]);
        let square = circular_layout(4);
        assert_eq!(square.len(), 4);
        assert!((square[1].0).abs() < 1e-12 && (square[1].1 - 1.0).abs() < 1e-12);
        assert!(square.iter().all(|(x, y)| (x.hypot(*y) - 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_network_figure() {
        let dataset = sample();
        let figure = build_genre_network(&dataset.select(None), 15).unwrap();

        let edges = &figure.data[0];
        assert_eq!(edges.x.as_ref().map(Values::len), Some(9));
        let nodes = &figure.data[1];
        assert_eq!(nodes.mode, Some("markers+text"));
        assert_eq!(
            nodes.hovertext.as_ref().unwrap()[0],
            "<b>pop</b><br>Appears with: rock, jazz"
        );
        assert_eq!(figure.layout.height, Some(700));
    }

    #[test]
    fn test_network_placeholder_without_genres() {
        let dataset = dataset_from(vec![TrackFixture::new("1").artist("A", None).build()]);
        assert!(genre_network(&dataset, 15).placeholder);
    }
}
