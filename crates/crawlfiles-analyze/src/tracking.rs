//! Per-file tracking records for the external crawl-files store.

use std::io::Write;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::info;

use crawlfiles_core::{ArtifactKind, ClassifiedArtifact, FilesetError, isoformat};

/// One row for the crawl-files store, keyed by `file_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingRecord {
    pub file_name: String,
    pub job_name: Option<String>,
    pub job_launch: Option<String>,
    pub full_path: String,
    pub extension: Option<String>,
    pub size: Option<u64>,
    pub kind: ArtifactKind,
    /// Derived creation timestamp of the file.
    pub created_at: Option<String>,
    /// When this export was taken.
    pub last_seen_at: String,
}

impl TrackingRecord {
    /// Build a record for a compressed WARC; other artifacts yield `None`.
    pub fn from_artifact(artifact: &ClassifiedArtifact, refreshed_at: NaiveDateTime) -> Option<Self> {
        if !artifact.recognised || artifact.kind != ArtifactKind::Warcs || !artifact.is_warc_gz() {
            return None;
        }

        Some(Self {
            file_name: artifact.file_name.to_string(),
            job_name: artifact.job.as_ref().map(ToString::to_string),
            job_launch: artifact.launch.as_ref().map(ToString::to_string),
            full_path: artifact.path.clone(),
            extension: file_extension(&artifact.file_name),
            size: artifact.size,
            kind: artifact.kind,
            created_at: artifact.timestamp(),
            last_seen_at: isoformat(&refreshed_at),
        })
    }
}

/// Tracking records sharing one refresh time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingExport {
    pub refreshed_at: NaiveDateTime,
    pub records: Vec<TrackingRecord>,
}

impl TrackingExport {
    /// Collect records for every qualifying artifact.
    ///
    /// Fails with [`FilesetError::EmptyResult`] when nothing qualifies.
    pub fn collect(
        artifacts: &[ClassifiedArtifact],
        refreshed_at: NaiveDateTime,
    ) -> Result<Self, FilesetError> {
        let records: Vec<_> = artifacts
            .iter()
            .filter_map(|a| TrackingRecord::from_artifact(a, refreshed_at))
            .collect();

        if records.is_empty() {
            return Err(FilesetError::empty(
                "track",
                None,
                Some(ArtifactKind::Warcs),
                artifacts.len(),
            ));
        }

        info!(
            input = artifacts.len(),
            records = records.len(),
            "collected tracking records"
        );
        Ok(Self {
            refreshed_at,
            records,
        })
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false for a collected export.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write one JSON object per line.
    pub fn write_jsonl<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        for record in &self.records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()
    }
}

/// Extension of an artifact name, keeping compound archive suffixes whole.
fn file_extension(file_name: &str) -> Option<String> {
    for compound in ["warc.gz", "arc.gz"] {
        if file_name.len() > compound.len() + 1
            && file_name.ends_with(compound)
            && file_name[..file_name.len() - compound.len()].ends_with('.')
        {
            return Some(compound.to_string());
        }
    }
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_string)
}
