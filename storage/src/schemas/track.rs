//----------------------------------------------------------------------------------------- std lib
use std::sync::Arc;
//--------------------------------------------------------------------------------- other libraries
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

pub type TrackId = Arc<str>;

/// One performing artist of a track, as recorded on the row that credited them.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Artist {
    pub id: Option<Arc<str>>,
    pub name: Arc<str>,
    /// The artist's popularity score (0-100), distinct from the track's.
    pub popularity: Option<f64>,
    pub followers: Option<u64>,
    /// Genre tags from the row that credited the artist.
    pub genres: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Track {
    /// Unique within a dataset.
    pub id: TrackId,
    pub name: Arc<str>,
    /// The track's popularity score (0-100).
    pub popularity: Option<f64>,
    pub duration_ms: Option<u64>,
    pub explicit: Option<bool>,
    pub release_date: Option<NaiveDate>,
    pub album_name: Arc<str>,
    /// The first entry is the primary artist.
    pub artists: Vec<Artist>,
    pub spotify_url: Arc<str>,
    /// Normalized genre tags, possibly empty.
    pub genres: Vec<String>,
}

impl Track {
    #[must_use]
    pub fn primary_artist(&self) -> Option<&Artist> {
        self.artists.first()
    }

    #[must_use]
    pub fn artist_name(&self) -> Option<&str> {
        self.primary_artist().map(|a| a.name.as_ref())
    }

    #[must_use]
    pub fn artist_popularity(&self) -> Option<f64> {
        self.primary_artist().and_then(|a| a.popularity)
    }

    /// The year of the release date.
    #[must_use]
    pub fn release_year(&self) -> Option<i32> {
        self.release_date.map(|d| d.year())
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_minutes(&self) -> Option<f64> {
        self.duration_ms.map(|ms| ms as f64 / 60_000.0)
    }

    /// Whether the track's popularity lies within `[min, max]`.
    ///
    /// Tracks without a popularity score are never within a range.
    #[must_use]
    pub fn popularity_within(&self, min: f64, max: f64) -> bool {
        self.popularity.is_some_and(|p| min <= p && p <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TrackFixture;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_primary_artist_is_first() {
        let track = TrackFixture::new("t1")
            .artist("Lead", Some(70.0))
            .artist("Feature", Some(40.0))
            .build();

        assert_eq!(track.artist_name(), Some("Lead"));
        assert_eq!(track.artist_popularity(), Some(70.0));
    }

    #[test]
    fn test_no_artist() {
        let track = TrackFixture::new("t1").build();
        assert_eq!(track.artist_name(), None);
        assert_eq!(track.artist_popularity(), None);
    }

    #[rstest]
    #[case(Some(180_000), Some(3.0))]
    #[case(Some(90_000), Some(1.5))]
    #[case(None, None)]
    fn test_duration_minutes(#[case] ms: Option<u64>, #[case] expected: Option<f64>) {
        let mut track = TrackFixture::new("t1").build();
        track.duration_ms = ms;
        assert_eq!(track.duration_minutes(), expected);
    }

    #[rstest]
    #[case(Some(0.0), true)]
    #[case(Some(100.0), true)]
    #[case(Some(50.0), true)]
    #[case(Some(100.5), false)]
    #[case(None, false)]
    fn test_popularity_within(#[case] popularity: Option<f64>, #[case] expected: bool) {
        let mut track = TrackFixture::new("t1").build();
        track.popularity = popularity;
        assert_eq!(track.popularity_within(0.0, 100.0), expected);
    }
}
