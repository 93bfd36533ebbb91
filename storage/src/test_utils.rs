//! Fixture builders for tests across the workspace.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    dataset::Dataset,
    schemas::track::{Artist, Track},
};

/// Builds a [`Track`] with sensible defaults.
#[derive(Debug, Clone)]
pub struct TrackFixture {
    track: Track,
}

impl TrackFixture {
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self {
            track: Track {
                id: id.into(),
                name: format!("Track {id}").into(),
                popularity: Some(50.0),
                duration_ms: Some(200_000),
                explicit: Some(false),
                release_date: None,
                album_name: format!("Album {id}").into(),
                artists: Vec::new(),
                spotify_url: format!("https://open.spotify.com/track/{id}").into(),
                genres: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.track.name = name.into();
        self
    }

    #[must_use]
    pub const fn popularity(mut self, popularity: Option<f64>) -> Self {
        self.track.popularity = popularity;
        self
    }

    #[must_use]
    pub const fn duration_ms(mut self, duration_ms: Option<u64>) -> Self {
        self.track.duration_ms = duration_ms;
        self
    }

    /// Append an artist; the first one added is the primary artist.
    #[must_use]
    pub fn artist(mut self, name: &str, popularity: Option<f64>) -> Self {
        self.track.artists.push(Artist {
            id: Some(Arc::from(format!("artist-{name}"))),
            name: name.into(),
            popularity,
            followers: Some(1_000),
            genres: Vec::new(),
        });
        self
    }

    #[must_use]
    pub fn genres(mut self, genres: &[&str]) -> Self {
        self.track.genres = genres.iter().map(ToString::to_string).collect();
        self
    }

    /// # Panics
    ///
    /// Panics if `date` is not a `%Y-%m-%d` date.
    #[must_use]
    pub fn release(mut self, date: &str) -> Self {
        self.track.release_date =
            Some(NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("fixture dates are valid"));
        self
    }

    #[must_use]
    /// Artists without genres of their own take the track's.
    pub fn build(mut self) -> Track {
        for artist in &mut self.track.artists {
            if artist.genres.is_empty() {
                artist.genres.clone_from(&self.track.genres);
            }
        }
        self.track
    }
}

#[must_use]
pub fn dataset_from(tracks: Vec<Track>) -> Dataset {
    Dataset::new(tracks)
}

/// A deterministic dataset of `n` tracks with varied popularity, durations, artists, genres and
/// release years.
#[must_use]
pub fn arb_dataset(n: usize) -> Dataset {
    const GENRES: [&str; 6] = ["pop", "rock", "hip hop", "edm", "indie", "jazz"];
    const ARTISTS: [&str; 5] = ["Alpha", "Bravo", "Charlie", "Delta", "Echo"];

    let tracks = (0..n).map(|i| {
        let genres: Vec<&str> = match i % 4 {
            0 => vec![GENRES[i % GENRES.len()]],
            1 => vec![GENRES[i % GENRES.len()], GENRES[(i + 1) % GENRES.len()]],
            2 => vec![GENRES[(i * 7) % GENRES.len()]],
            _ => vec![],
        };
        let artist = ARTISTS[i % ARTISTS.len()];
        #[allow(clippy::cast_precision_loss)]
        let popularity = (i * 37 % 101) as f64;
        #[allow(clippy::cast_precision_loss)]
        let artist_popularity = (i * 53 % 97) as f64;
        let year = 1990 + (i % 30);

        TrackFixture::new(&format!("track-{i}"))
            .popularity(Some(popularity))
            .duration_ms(Some(120_000 + (i as u64 * 7_919) % 240_000))
            .artist(artist, Some(artist_popularity))
            .genres(&genres)
            .release(&format!("{year}-0{}-15", 1 + i % 9))
            .build()
    });

    Dataset::new(tracks.collect::<Vec<_>>())
}
