//! Core types and errors for crawlfiles.
//!
//! This crate provides the data model shared by the classifier, the listing
//! readers and the file set tools: listing entries, crawl streams, classified
//! artifacts, per-date snapshot names and configuration.

mod artifact;
mod config;
mod error;
mod snapshot;

pub use artifact::{
    ArtifactKind, ClassifiedArtifact, CrawlStream, RawEntry, TimestampSource, isoformat,
};
pub use config::{DEFAULT_LINE_CHUNK, FilesetConfig, FilesetConfigBuilder};
pub use error::{FilesetError, ListingWarning, WarningKind};
pub use snapshot::{Resolution, ResolvedSnapshot, SnapshotFile, SnapshotName};
