//! Reading the snapshot CSV.
//!
//! The file is read once, then decoded with each candidate encoding in turn until one of them
//! yields text that parses as a snapshot. Individual fields are parsed leniently: a malformed
//! number, flag, or date becomes a missing value instead of rejecting the row.

//----------------------------------------------------------------------------------------- std lib
use std::{borrow::Cow, fmt, path::Path, sync::Arc};
//--------------------------------------------------------------------------------- other libraries
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tracing::instrument;
//----------------------------------------------------------------------------------- local modules
use crate::{
    dataset::Dataset,
    dates::{ParsedDate, parse_release_date},
    errors::DataLoadError,
    genres::GenreField,
    schemas::track::{Artist, Track},
};

/// Text encodings the loader knows how to try.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextEncoding {
    /// UTF-8, with an optional byte order mark.
    #[serde(rename = "utf-8-sig", alias = "utf-8", alias = "utf8")]
    Utf8Sig,
    #[serde(rename = "latin1", alias = "latin-1")]
    Latin1,
    #[serde(rename = "iso-8859-1")]
    Iso8859_1,
    #[serde(rename = "cp1252", alias = "windows-1252")]
    Cp1252,
}

impl TextEncoding {
    /// The default order in which encodings are attempted.
    pub const DEFAULT_ORDER: [Self; 4] = [Self::Utf8Sig, Self::Latin1, Self::Iso8859_1, Self::Cp1252];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Utf8Sig => "utf-8-sig",
            Self::Latin1 => "latin1",
            Self::Iso8859_1 => "iso-8859-1",
            Self::Cp1252 => "cp1252",
        }
    }

    /// Decode `bytes`, returning `None` if they are not valid in this encoding.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> Option<Cow<'_, str>> {
        match self {
            Self::Utf8Sig => {
                let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                encoding_rs::UTF_8.decode_without_bom_handling_and_without_replacement(bytes)
            }
            // every byte maps to the code point of the same value
            Self::Latin1 | Self::Iso8859_1 => {
                Some(Cow::Owned(bytes.iter().copied().map(char::from).collect()))
            }
            Self::Cp1252 => {
                encoding_rs::WINDOWS_1252.decode_without_bom_handling_and_without_replacement(bytes)
            }
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A row of the snapshot exactly as exported.
///
/// Upstream column names are mapped onto the dataset's vocabulary here. Note that upstream
/// `popularity` is the *artist's* score while `track_popularity` is the track's.
#[derive(Debug, Deserialize)]
pub(crate) struct RawTrackRow {
    #[serde(rename = "track_track_id", alias = "id")]
    pub id: String,
    #[serde(rename = "track_track_name", default)]
    pub name: Option<String>,
    #[serde(rename = "popularity", default)]
    pub artist_popularity: Option<String>,
    #[serde(rename = "track_popularity", default)]
    pub popularity: Option<String>,
    #[serde(rename = "track_duration_ms", default)]
    pub duration_ms: Option<String>,
    #[serde(rename = "track_explicit", default)]
    pub explicit: Option<String>,
    #[serde(rename = "track_release_date", default)]
    pub release_date: Option<String>,
    #[serde(rename = "track_album_name", default)]
    pub album_name: Option<String>,
    #[serde(default)]
    pub artist_id: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(rename = "followers", default)]
    pub artist_followers: Option<String>,
    #[serde(rename = "track_spotify_url", default)]
    pub spotify_url: Option<String>,
    #[serde(default)]
    pub genres: Option<String>,
}

/// Counters describing how lenient the conversion had to be.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub rows: usize,
    pub skipped_without_id: usize,
    pub lenient_dates: usize,
    pub missing_dates: usize,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_number(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_count(value: Option<&str>) -> Option<u64> {
    parse_number(value).filter(|v| *v >= 0.0).map(|v| v as u64)
}

fn parse_flag(value: Option<&str>) -> Option<bool> {
    match value?.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

impl RawTrackRow {
    fn into_track(self, report: &mut LoadReport) -> Option<Track> {
        let id = self.id.trim();
        if id.is_empty() {
            report.skipped_without_id += 1;
            return None;
        }

        let release_date = match self.release_date.as_deref().map(parse_release_date) {
            Some(ParsedDate::Strict(date)) => Some(date),
            Some(ParsedDate::Lenient(date)) => {
                report.lenient_dates += 1;
                Some(date)
            }
            Some(ParsedDate::Missing) | None => {
                report.missing_dates += 1;
                None
            }
        };

        let genres = GenreField::from(self.genres).normalize();
        let artists = non_blank(self.artist_name)
            .map(|name| Artist {
                id: non_blank(self.artist_id).map(Arc::from),
                name: name.into(),
                popularity: parse_number(self.artist_popularity.as_deref()),
                followers: parse_count(self.artist_followers.as_deref()),
                genres: genres.clone(),
            })
            .into_iter()
            .collect();

        Some(Track {
            id: id.into(),
            name: self.name.unwrap_or_default().into(),
            popularity: parse_number(self.popularity.as_deref()),
            duration_ms: parse_count(self.duration_ms.as_deref()),
            explicit: parse_flag(self.explicit.as_deref()),
            release_date,
            album_name: self.album_name.unwrap_or_default().into(),
            artists,
            spotify_url: self.spotify_url.unwrap_or_default().into(),
            genres,
        })
    }
}

/// Try `parse` against the text produced by each encoding in order, returning the first success.
///
/// # Errors
///
/// Returns the message of the last failure if no encoding works.
pub(crate) fn first_decodable<T, E: fmt::Display>(
    bytes: &[u8],
    encodings: &[TextEncoding],
    mut parse: impl FnMut(&str) -> Result<T, E>,
) -> Result<(TextEncoding, T), String> {
    let mut reason = String::from("no encodings were attempted");
    for &encoding in encodings {
        let Some(text) = encoding.decode(bytes) else {
            debug!("Snapshot is not valid {encoding}");
            reason = format!("not valid {encoding}");
            continue;
        };
        match parse(&text) {
            Ok(parsed) => return Ok((encoding, parsed)),
            Err(e) => {
                debug!("Failed to parse snapshot as {encoding}: {e}");
                reason = e.to_string();
            }
        }
    }
    Err(reason)
}

/// Parse snapshot rows out of already decoded text.
///
/// # Errors
///
/// Returns an error if the text is not a CSV with the expected columns.
pub fn parse_rows(text: &str) -> Result<(Vec<Track>, LoadReport), csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut report = LoadReport::default();
    let mut tracks = Vec::new();

    for record in reader.deserialize::<RawTrackRow>() {
        report.rows += 1;
        if let Some(track) = record?.into_track(&mut report) {
            tracks.push(track);
        }
    }

    Ok((tracks, report))
}

/// Load the snapshot at `path` with the default encoding order.
///
/// # Errors
///
/// See [`load_with`].
pub fn load(path: impl AsRef<Path>) -> Result<Dataset, DataLoadError> {
    load_with(path, &TextEncoding::DEFAULT_ORDER)
}

/// Load the snapshot at `path`, trying `encodings` in order.
///
/// # Errors
///
/// Returns an error if the file cannot be read, or if no encoding produces a parseable snapshot.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_with(path: impl AsRef<Path>, encodings: &[TextEncoding]) -> Result<Dataset, DataLoadError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (encoding, (tracks, report)) =
        first_decodable(&bytes, encodings, parse_rows).map_err(|reason| {
            DataLoadError::NoUsableEncoding {
                path: path.to_path_buf(),
                attempted: encodings.to_vec(),
                reason,
            }
        })?;

    if report.skipped_without_id > 0 {
        warn!(
            "Skipped {} rows without a track id in {}",
            report.skipped_without_id,
            path.display()
        );
    }
    if report.missing_dates > 0 {
        debug!("{} rows have no usable release date", report.missing_dates);
    }

    let dataset = Dataset::new(tracks);
    info!(
        "Loaded {} tracks from {} rows of {} ({encoding}, {} lenient dates)",
        dataset.len(),
        report.rows,
        path.display(),
        report.lenient_dates,
    );
    Ok(dataset)
}
