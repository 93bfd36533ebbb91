use std::path::PathBuf;

use thiserror::Error;

use crate::loader::TextEncoding;

/// Errors that prevent the snapshot from being loaded at all.
#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("none of the encodings {attempted:?} could read {path}: {reason}")]
    NoUsableEncoding {
        path: PathBuf,
        attempted: Vec<TextEncoding>,
        /// The failure reported by the last encoding tried.
        reason: String,
    },
}

/// Problems with the genre patch source.
///
/// These are never fatal, the dataset is used without back-filling instead.
#[derive(Error, Debug)]
pub enum ReconciliationWarning {
    #[error("IO error reading patch source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unusable patch source {path}: {reason}")]
    PatchSource { path: PathBuf, reason: String },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GenreParseError {
    #[error("not a list literal: {0}")]
    Malformed(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum RangeError {
    #[error("popularity range is inverted: {min} > {max}")]
    Inverted { min: f64, max: f64 },
    #[error("popularity range bounds must be finite numbers")]
    NotFinite,
}
