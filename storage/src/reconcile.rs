//! Back-filling of empty genre lists from a patch source.
//!
//! The patch source is a second snapshot export (often a hand corrected copy of the first) from
//! which only the track identifier and genre columns are read.

//----------------------------------------------------------------------------------------- std lib
use std::{
    collections::{HashMap, hash_map::Entry},
    path::Path,
};
//--------------------------------------------------------------------------------- other libraries
use log::{info, warn};
use serde::Deserialize;
use tracing::instrument;
//----------------------------------------------------------------------------------- local modules
use crate::{
    dataset::Dataset,
    errors::ReconciliationWarning,
    genres::GenreField,
    loader::{TextEncoding, first_decodable},
    schemas::track::TrackId,
};

#[derive(Debug, Deserialize)]
struct PatchRow {
    #[serde(rename = "track_track_id", alias = "id")]
    id: String,
    #[serde(default)]
    genres: Option<String>,
}

/// A mapping from track identifier to genre tags.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenrePatch {
    genres: HashMap<TrackId, Vec<String>>,
}

impl GenrePatch {
    /// Build a patch from `(id, genres)` pairs. The first pair for an identifier wins.
    pub fn from_entries<I, S, G>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, G)>,
        S: AsRef<str>,
        G: Into<GenreField>,
    {
        let mut genres = HashMap::new();
        for (id, field) in entries {
            let id = id.as_ref().trim();
            if id.is_empty() {
                continue;
            }
            if let Entry::Vacant(entry) = genres.entry(TrackId::from(id)) {
                entry.insert(field.into().normalize());
            }
        }
        Self { genres }
    }

    /// Parse a patch out of decoded CSV text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a CSV with a track identifier column.
    pub fn from_csv(text: &str) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());
        let rows = reader
            .deserialize::<PatchRow>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_entries(rows.into_iter().map(|row| (row.id, row.genres))))
    }

    /// Read a patch file, trying `encodings` in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or no encoding yields a usable patch.
    pub fn load(path: &Path, encodings: &[TextEncoding]) -> Result<Self, ReconciliationWarning> {
        let bytes = std::fs::read(path).map_err(|source| ReconciliationWarning::Io {
            path: path.to_path_buf(),
            source,
        })?;
        first_decodable(&bytes, encodings, Self::from_csv)
            .map(|(_, patch)| patch)
            .map_err(|reason| ReconciliationWarning::PatchSource {
                path: path.to_path_buf(),
                reason,
            })
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&[String]> {
        self.genres.get(id).map(Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.genres.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BackfillReport {
    /// Tracks whose empty genre list was replaced by a non-empty one.
    pub filled: usize,
    /// Tracks that still have no genres afterwards.
    pub still_empty: usize,
}

/// Replace empty genre lists with the patch's tags for the same track.
///
/// Non-empty genre lists are never touched.
pub fn backfill_genres(dataset: &mut Dataset, patch: &GenrePatch) -> BackfillReport {
    let needs_patch = dataset.iter().any(|t| {
        t.genres.is_empty() && patch.get(&t.id).is_some_and(|genres| !genres.is_empty())
    });
    let mut report = BackfillReport::default();

    if needs_patch {
        for track in dataset.tracks_mut() {
            if !track.genres.is_empty() {
                continue;
            }
            if let Some(genres) = patch.get(&track.id).filter(|g| !g.is_empty()) {
                track.genres = genres.to_vec();
                for artist in &mut track.artists {
                    if artist.genres.is_empty() {
                        artist.genres = genres.to_vec();
                    }
                }
                report.filled += 1;
            }
        }
    }

    report.still_empty = dataset.iter().filter(|t| t.genres.is_empty()).count();
    report
}

/// Back-fill `dataset` from the patch file at `path`.
///
/// Any problem with the patch source is logged and the dataset is left exactly as it was.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn reconcile_from_path(
    dataset: &mut Dataset,
    path: &Path,
    encodings: &[TextEncoding],
) -> Option<BackfillReport> {
    match GenrePatch::load(path, encodings) {
        Ok(patch) => {
            let report = backfill_genres(dataset, &patch);
            info!(
                "Back-filled genres for {} tracks from {} ({} still without genres)",
                report.filled,
                path.display(),
                report.still_empty
            );
            Some(report)
        }
        Err(warning) => {
            warn!("Skipping genre back-fill: {warning}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TrackFixture, dataset_from};
    use pretty_assertions::assert_eq;

    fn genres_of(dataset: &Dataset, id: &str) -> Vec<String> {
        dataset
            .iter()
            .find(|t| t.id.as_ref() == id)
            .map(|t| t.genres.clone())
            .unwrap()
    }

    #[test]
    fn test_backfill_only_fills_empty_lists() {
        let mut dataset = dataset_from(vec![
            TrackFixture::new("t1").build(),
            TrackFixture::new("t2").genres(&["rock"]).build(),
            TrackFixture::new("t3").build(),
        ]);
        let patch = GenrePatch::from_entries([
            ("t1", "['pop']"),
            ("t2", "['jazz']"),
            ("t4", "['metal']"),
        ]);

        let report = backfill_genres(&mut dataset, &patch);

        assert_eq!(report, BackfillReport { filled: 1, still_empty: 1 });
        assert_eq!(genres_of(&dataset, "t1"), vec!["pop".to_string()]);
        assert_eq!(genres_of(&dataset, "t2"), vec!["rock".to_string()]);
        assert_eq!(genres_of(&dataset, "t3"), Vec::<String>::new());
    }

    #[test]
    fn test_backfill_fills_artist_genres_too() {
        let mut dataset = dataset_from(vec![
            TrackFixture::new("t1").artist("A", Some(10.0)).build(),
        ]);
        let patch = GenrePatch::from_entries([("t1", "['shoegaze']")]);

        backfill_genres(&mut dataset, &patch);

        let track = &dataset.tracks()[0];
        assert_eq!(track.genres, vec!["shoegaze".to_string()]);
        assert_eq!(track.artists[0].genres, vec!["shoegaze".to_string()]);
    }

    #[test]
    fn test_first_patch_entry_wins() {
        let patch = GenrePatch::from_entries([("t1", "['first']"), ("t1", "['second']")]);
        assert_eq!(patch.len(), 1);
        assert_eq!(patch.get("t1"), Some(&["first".to_string()][..]));
    }

    #[test]
    fn test_backfill_without_changes_keeps_snapshot() {
        let mut dataset = dataset_from(vec![TrackFixture::new("t1").genres(&["pop"]).build()]);
        let snapshot = dataset.snapshot();
        let patch = GenrePatch::from_entries([("t1", "['rock']")]);

        assert_eq!(backfill_genres(&mut dataset, &patch).filled, 0);
        assert_eq!(dataset.snapshot(), snapshot);
    }

    #[test]
    fn test_backfill_changes_snapshot() {
        let mut dataset = dataset_from(vec![TrackFixture::new("t1").build()]);
        let snapshot = dataset.snapshot();
        let patch = GenrePatch::from_entries([("t1", "edm")]);

        assert_eq!(backfill_genres(&mut dataset, &patch).filled, 1);
        assert_ne!(dataset.snapshot(), snapshot);
    }

    #[test]
    fn test_patch_from_csv() -> anyhow::Result<()> {
        let patch = GenrePatch::from_csv(
            "track_track_id,track_track_name,genres\n\
             t1,One,\"['pop', 'rock']\"\n\
             t2,Two,\n\
             t1,Dup,\"['ignored']\"\n",
        )?;
        assert_eq!(patch.len(), 2);
        assert_eq!(
            patch.get("t1"),
            Some(&["pop".to_string(), "rock".to_string()][..])
        );
        assert_eq!(patch.get("t2"), Some(&[][..]));
        Ok(())
    }

    #[test]
    fn test_unreadable_patch_leaves_dataset_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut dataset = dataset_from(vec![TrackFixture::new("t1").build()]);
        let snapshot = dataset.snapshot();

        let missing = reconcile_from_path(
            &mut dataset,
            &dir.path().join("missing.csv"),
            &TextEncoding::DEFAULT_ORDER,
        );
        assert_eq!(missing, None);

        let bad = dir.path().join("bad.csv");
        std::fs::write(&bad, "title\nfoo\n").unwrap();
        assert_eq!(
            reconcile_from_path(&mut dataset, &bad, &TextEncoding::DEFAULT_ORDER),
            None
        );

        assert_eq!(dataset.snapshot(), snapshot);
        assert!(dataset.tracks()[0].genres.is_empty());
    }

    #[test]
    fn test_malformed_patch_is_a_patch_source_warning() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.csv");
        std::fs::write(&bad, "title\nfoo\n").unwrap();

        let err = GenrePatch::load(&bad, &TextEncoding::DEFAULT_ORDER).unwrap_err();
        assert!(matches!(
            err,
            ReconciliationWarning::PatchSource { ref path, .. } if *path == bad
        ));
    }

    #[test]
    fn test_reconcile_from_path() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("patch.csv");
        std::fs::write(&path, "id,genres\nt1,\"['indie']\"\n")?;
        let mut dataset = dataset_from(vec![TrackFixture::new("t1").build()]);

        let report = reconcile_from_path(&mut dataset, &path, &TextEncoding::DEFAULT_ORDER);
        assert_eq!(report, Some(BackfillReport { filled: 1, still_empty: 0 }));
        assert_eq!(genres_of(&dataset, "t1"), vec!["indie".to_string()]);
        Ok(())
    }
}
