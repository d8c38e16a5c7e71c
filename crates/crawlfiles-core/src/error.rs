//! Error types for listing, grouping and selection.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::artifact::{ArtifactKind, CrawlStream};

/// Errors that can occur while producing or reading file sets.
#[derive(Debug, Error)]
pub enum FilesetError {
    /// A step produced nothing from its input. Usually an upstream fault.
    #[error("{step} produced nothing for {} ({input} input records)", target_label(.stream, .kind))]
    EmptyResult {
        step: &'static str,
        stream: Option<CrawlStream>,
        kind: Option<ArtifactKind>,
        input: usize,
    },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot contents could not be encoded or decoded.
    #[error("Invalid snapshot JSON at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A file passed as a snapshot does not carry a snapshot name.
    #[error("Not a snapshot file name: {path}")]
    InvalidSnapshotName { path: PathBuf },

    /// A listing could not be read at all.
    #[error("Unreadable listing {path}: {message}")]
    Listing { path: PathBuf, message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

fn target_label(stream: &Option<CrawlStream>, kind: &Option<ArtifactKind>) -> String {
    match (stream, kind) {
        (Some(stream), Some(kind)) => format!("{stream} {kind}"),
        (Some(stream), None) => stream.to_string(),
        (None, Some(kind)) => kind.to_string(),
        (None, None) => "any input".to_string(),
    }
}

impl FilesetError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create an empty-result error for a step.
    pub fn empty(
        step: &'static str,
        stream: Option<CrawlStream>,
        kind: Option<ArtifactKind>,
        input: usize,
    ) -> Self {
        Self::EmptyResult {
            step,
            stream,
            kind,
            input,
        }
    }

    /// Check if this is an empty-result error.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::EmptyResult { .. })
    }
}

/// Kind of listing warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Row could not be decoded.
    MalformedRow,
    /// Error reading a file or directory while walking.
    ReadError,
    /// Error reading metadata.
    MetadataError,
    /// Path lies outside the mount being walked.
    OutsideMount,
}

/// Non-fatal problem encountered while reading a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingWarning {
    /// Where the problem occurred: a file path or `listing:line`.
    pub location: String,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ListingWarning {
    /// Create a new listing warning.
    pub fn new(location: impl Into<String>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a malformed row warning.
    pub fn malformed_row(listing: &std::path::Path, line: u64, error: impl std::fmt::Display) -> Self {
        Self {
            location: format!("{}:{line}", listing.display()),
            message: format!("Malformed row: {error}"),
            kind: WarningKind::MalformedRow,
        }
    }
}
