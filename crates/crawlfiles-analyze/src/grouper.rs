//! Grouping of classified artifacts into per-date snapshot files.
//!
//! Every run writes a fresh set of snapshots, one per date. Names embed the
//! entry count, so a later, more complete run adds a new file beside the old
//! one instead of replacing it. Reconciliation happens at read time in
//! [`SnapshotSelector`](crate::SnapshotSelector).

use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crawlfiles_classify::PathClassifier;
use crawlfiles_core::{ArtifactKind, CrawlStream, FilesetConfig, FilesetError, RawEntry, SnapshotName};

/// A snapshot produced (or found already present) by a grouping run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenSnapshot {
    /// Parsed name.
    pub name: SnapshotName,
    /// Location on disk.
    pub path: PathBuf,
    /// False when an identical name already existed and was left untouched.
    pub created: bool,
}

/// Results from a grouping run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupReport {
    /// Stream the entries were filtered to.
    pub stream: CrawlStream,
    /// Kind the entries were filtered to.
    pub kind: ArtifactKind,
    /// Number of listing entries considered.
    pub input: usize,
    /// Number of entries that matched the filter.
    pub matched: usize,
    /// Snapshot per date (`YYYY-MM-DD`).
    pub snapshots: BTreeMap<String, WrittenSnapshot>,
}

impl GroupReport {
    /// Number of snapshot files this run actually created.
    pub fn created_count(&self) -> usize {
        self.snapshots.values().filter(|s| s.created).count()
    }
}

/// Buckets listing entries by derived date and writes snapshot files.
pub struct FilesetGrouper {
    config: FilesetConfig,
    classifier: PathClassifier,
}

impl FilesetGrouper {
    /// Create a new grouper.
    pub fn new(config: FilesetConfig) -> Self {
        Self {
            config,
            classifier: PathClassifier::new(),
        }
    }

    /// Classify, filter, bucket and write one snapshot per date.
    ///
    /// Fails with [`FilesetError::EmptyResult`] and writes nothing when no
    /// entry matches `stream` and `kind`.
    ///
    /// Every snapshot is staged as a temp file before any is given its final
    /// name, so an encode or write failure leaves no snapshot behind. A
    /// failure while renaming can still leave the dates already renamed in
    /// place; they are complete files and only ever add candidates for the
    /// selector.
    pub fn group(
        &self,
        entries: &[RawEntry],
        stream: CrawlStream,
        kind: ArtifactKind,
    ) -> Result<GroupReport, FilesetError> {
        let buckets = self.bucket(entries, stream, kind)?;
        let matched = buckets.values().map(Vec::len).sum();

        let dir = &self.config.snapshot_dir;
        std::fs::create_dir_all(dir).map_err(|e| FilesetError::io(dir, e))?;

        let staged = buckets
            .iter()
            .map(|(date, bucket)| {
                let name = SnapshotName::new(stream, kind, *date, bucket.len());
                stage_snapshot(dir, name, bucket)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut snapshots = BTreeMap::new();
        for staged in staged {
            let written = staged.persist()?;
            snapshots.insert(written.name.date_key(), written);
        }

        let report = GroupReport {
            stream,
            kind,
            input: entries.len(),
            matched,
            snapshots,
        };
        info!(
            %stream,
            %kind,
            input = report.input,
            matched = report.matched,
            dates = report.snapshots.len(),
            created = report.created_count(),
            "grouped file sets"
        );
        Ok(report)
    }

    /// Classify and bucket entries by date without writing anything.
    pub fn bucket(
        &self,
        entries: &[RawEntry],
        stream: CrawlStream,
        kind: ArtifactKind,
    ) -> Result<BTreeMap<NaiveDate, Vec<RawEntry>>, FilesetError> {
        let select = || -> Vec<(NaiveDate, &RawEntry)> {
            entries
                .par_iter()
                .filter_map(|entry| {
                    let artifact = self.classifier.classify(entry);
                    if !artifact.is(stream, kind) {
                        return None;
                    }
                    Some((artifact.timestamp_datetime?.date(), entry))
                })
                .collect()
        };

        let selected = match dedicated_pool_size(self.config.threads) {
            None => select(),
            Some(n) => rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| FilesetError::InvalidConfig {
                    message: format!("Cannot start {n} classifier threads: {e}"),
                })?
                .install(select),
        };

        if selected.is_empty() {
            return Err(FilesetError::empty(
                "group",
                Some(stream),
                Some(kind),
                entries.len(),
            ));
        }

        let mut buckets: BTreeMap<NaiveDate, Vec<RawEntry>> = BTreeMap::new();
        for (date, entry) in selected {
            buckets.entry(date).or_default().push(entry.clone());
        }
        Ok(buckets)
    }
}

/// Size of a pool to build for classification, if the current one won't do.
///
/// `threads == 0` means the ambient pool; so does a request matching the
/// ambient pool's size, e.g. when the caller already sized the global pool.
fn dedicated_pool_size(threads: usize) -> Option<usize> {
    match threads {
        0 => None,
        n if n == rayon::current_num_threads() => None,
        n => Some(n),
    }
}

/// A fully written snapshot that does not have its final name yet.
struct StagedSnapshot {
    name: SnapshotName,
    path: PathBuf,
    temp: NamedTempFile,
}

/// Write a snapshot's contents to a temp file beside its final location.
fn stage_snapshot(
    dir: &Path,
    name: SnapshotName,
    entries: &[RawEntry],
) -> Result<StagedSnapshot, FilesetError> {
    let path = dir.join(name.to_string());

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| FilesetError::io(dir, e))?;
    serde_json::to_writer_pretty(&mut temp, entries).map_err(|source| FilesetError::Json {
        path: path.clone(),
        source,
    })?;
    temp.flush().map_err(|e| FilesetError::io(temp.path(), e))?;

    Ok(StagedSnapshot { name, path, temp })
}

impl StagedSnapshot {
    /// Give the snapshot its final name unless that name is already taken.
    fn persist(self) -> Result<WrittenSnapshot, FilesetError> {
        let Self { name, path, temp } = self;

        let created = match temp.persist_noclobber(&path) {
            Ok(_) => true,
            // Same name means same count; the earlier snapshot stays.
            Err(err) if err.error.kind() == ErrorKind::AlreadyExists => false,
            Err(err) => return Err(FilesetError::io(&path, err.error)),
        };
        debug!(path = %path.display(), created, "snapshot");

        Ok(WrittenSnapshot {
            name,
            path,
            created,
        })
    }
}
