//! The in-memory snapshot every chart is built from.

//----------------------------------------------------------------------------------------- std lib
use std::collections::{HashMap, HashSet};
//--------------------------------------------------------------------------------- other libraries
use serde::{Deserialize, Serialize};
use ulid::Ulid;
//----------------------------------------------------------------------------------- local modules
use crate::{
    errors::RangeError,
    schemas::track::{Track, TrackId},
};

/// An ordered collection of tracks with unique identifiers.
///
/// Every dataset carries a snapshot id, which is regenerated whenever its contents change.
/// Anything memoized against a dataset should include the snapshot id in its key.
#[derive(Clone, Debug)]
pub struct Dataset {
    snapshot: Ulid,
    tracks: Vec<Track>,
}

impl Dataset {
    /// Build a dataset, merging rows that share a track identifier.
    ///
    /// The first row for an identifier wins. Artists credited on later rows are appended to the
    /// first row's artist list, so the primary artist is the one on the first row.
    #[must_use]
    pub fn new(rows: impl IntoIterator<Item = Track>) -> Self {
        let mut tracks: Vec<Track> = Vec::new();
        let mut index: HashMap<TrackId, usize> = HashMap::new();

        for row in rows {
            if let Some(&i) = index.get(&row.id) {
                let existing = &mut tracks[i];
                for artist in row.artists {
                    if !existing.artists.iter().any(|a| a.name == artist.name) {
                        existing.artists.push(artist);
                    }
                }
            } else {
                index.insert(row.id.clone(), tracks.len());
                tracks.push(row);
            }
        }

        Self {
            snapshot: Ulid::new(),
            tracks,
        }
    }

    #[must_use]
    pub const fn snapshot(&self) -> Ulid {
        self.snapshot
    }

    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Mutable access for in-place cleanup; takes a fresh snapshot id.
    pub(crate) fn tracks_mut(&mut self) -> &mut [Track] {
        self.snapshot = Ulid::new();
        &mut self.tracks
    }

    /// The tracks whose popularity lies within `range`, in dataset order.
    #[must_use]
    pub fn filter_popularity(&self, range: &PopularityRange) -> Vec<&Track> {
        self.iter().filter(|t| range.contains_track(t)).collect()
    }

    /// The tracks within `range` when one is given, otherwise all of them.
    #[must_use]
    pub fn select(&self, range: Option<&PopularityRange>) -> Vec<&Track> {
        range.map_or_else(|| self.iter().collect(), |r| self.filter_popularity(r))
    }

    #[must_use]
    pub fn summary(&self) -> DatasetSummary {
        let mut artists = HashSet::new();
        let mut genres = HashSet::new();
        let mut years: Option<(i32, i32)> = None;
        let mut without_genres = 0;

        for track in &self.tracks {
            artists.extend(track.artists.iter().map(|a| a.name.clone()));
            genres.extend(track.genres.iter().map(String::as_str));
            if track.genres.is_empty() {
                without_genres += 1;
            }
            if let Some(year) = track.release_year() {
                years = Some(years.map_or((year, year), |(lo, hi)| (lo.min(year), hi.max(year))));
            }
        }

        DatasetSummary {
            tracks: self.tracks.len(),
            artists: artists.len(),
            genres: genres.len(),
            tracks_without_genres: without_genres,
            earliest_year: years.map(|(lo, _)| lo),
            latest_year: years.map(|(_, hi)| hi),
        }
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub tracks: usize,
    pub artists: usize,
    pub genres: usize,
    pub tracks_without_genres: usize,
    pub earliest_year: Option<i32>,
    pub latest_year: Option<i32>,
}

/// An inclusive range of track popularity scores.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopularityRange {
    min: f64,
    max: f64,
}

impl PopularityRange {
    pub const FULL: Self = Self {
        min: 0.0,
        max: 100.0,
    };

    /// # Errors
    ///
    /// Returns an error if either bound is not finite, or if `min > max`.
    pub fn new(min: f64, max: f64) -> Result<Self, RangeError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(RangeError::NotFinite);
        }
        if min > max {
            return Err(RangeError::Inverted { min, max });
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    #[must_use]
    pub fn contains(&self, popularity: f64) -> bool {
        self.min <= popularity && popularity <= self.max
    }

    #[must_use]
    pub fn contains_track(&self, track: &Track) -> bool {
        track.popularity_within(self.min, self.max)
    }
}

impl Default for PopularityRange {
    fn default() -> Self {
        Self::FULL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TrackFixture, dataset_from};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_duplicate_ids_are_merged_first_wins() {
        let dataset = Dataset::new(vec![
            TrackFixture::new("t1")
                .name("First")
                .artist("A", Some(10.0))
                .genres(&["pop"])
                .build(),
            TrackFixture::new("t2").artist("B", None).build(),
            TrackFixture::new("t1")
                .name("Second")
                .artist("C", Some(90.0))
                .genres(&["rock"])
                .build(),
        ]);

        assert_eq!(dataset.len(), 2);
        let merged = &dataset.tracks()[0];
        assert_eq!(merged.name.as_ref(), "First");
        assert_eq!(merged.genres, vec!["pop".to_string()]);
        assert_eq!(merged.artist_name(), Some("A"));
        let names: Vec<&str> = merged.artists.iter().map(|a| a.name.as_ref()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_mutation_refreshes_snapshot() {
        let mut dataset = dataset_from(vec![TrackFixture::new("t1").build()]);
        let before = dataset.snapshot();
        dataset.tracks_mut()[0].genres.push("pop".into());
        assert_ne!(before, dataset.snapshot());
    }

    #[rstest]
    #[case(0.0, 100.0, Ok(()))]
    #[case(50.0, 50.0, Ok(()))]
    #[case(60.0, 40.0, Err(RangeError::Inverted { min: 60.0, max: 40.0 }))]
    #[case(f64::NAN, 40.0, Err(RangeError::NotFinite))]
    fn test_range_new(#[case] min: f64, #[case] max: f64, #[case] expected: Result<(), RangeError>) {
        assert_eq!(PopularityRange::new(min, max).map(|_| ()), expected);
    }

    #[test]
    fn test_filter_is_inclusive() {
        let dataset = dataset_from(vec![
            TrackFixture::new("low").popularity(Some(20.0)).build(),
            TrackFixture::new("min").popularity(Some(30.0)).build(),
            TrackFixture::new("mid").popularity(Some(45.5)).build(),
            TrackFixture::new("max").popularity(Some(60.0)).build(),
            TrackFixture::new("high").popularity(Some(60.1)).build(),
            TrackFixture::new("none").popularity(None).build(),
        ]);
        let range = PopularityRange::new(30.0, 60.0).unwrap();

        let ids: Vec<&str> = dataset
            .filter_popularity(&range)
            .into_iter()
            .map(|t| t.id.as_ref())
            .collect();
        assert_eq!(ids, vec!["min", "mid", "max"]);
        assert_eq!(dataset.select(None).len(), 6);
    }

    #[test]
    fn test_summary() {
        let dataset = dataset_from(vec![
            TrackFixture::new("t1")
                .artist("A", None)
                .genres(&["pop", "rock"])
                .release("2001-05-01")
                .build(),
            TrackFixture::new("t2")
                .artist("A", None)
                .artist("B", None)
                .genres(&["pop"])
                .release("1999-01-01")
                .build(),
            TrackFixture::new("t3").artist("C", None).build(),
        ]);

        assert_eq!(
            dataset.summary(),
            DatasetSummary {
                tracks: 3,
                artists: 3,
                genres: 2,
                tracks_without_genres: 1,
                earliest_year: Some(1999),
                latest_year: Some(2001),
            }
        );
    }
}
