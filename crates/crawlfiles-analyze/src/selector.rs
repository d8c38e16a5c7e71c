//! Selection of the most complete snapshot for a date.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, trace};

use crawlfiles_core::{
    ArtifactKind, CrawlStream, FilesetConfig, FilesetError, Resolution, ResolvedSnapshot,
    SnapshotName,
};

/// Picks the authoritative snapshot for a `(stream, kind, date)` key.
///
/// Read-only: snapshots are never modified, so resolving while a grouping
/// run is in progress is safe and at worst sees fewer candidates.
#[derive(Debug, Clone)]
pub struct SnapshotSelector {
    snapshot_dir: PathBuf,
}

impl SnapshotSelector {
    /// Create a selector over a snapshot directory.
    pub fn new(snapshot_dir: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_dir: snapshot_dir.into(),
        }
    }

    /// Create a selector from a file set config.
    pub fn from_config(config: &FilesetConfig) -> Self {
        Self::new(&config.snapshot_dir)
    }

    /// Directory being searched.
    pub fn snapshot_dir(&self) -> &Path {
        &self.snapshot_dir
    }

    /// Resolve the WARC snapshot for a stream and date.
    pub fn resolve(&self, stream: CrawlStream, date: NaiveDate) -> Result<Resolution, FilesetError> {
        self.resolve_kind(stream, ArtifactKind::Warcs, date)
    }

    /// Resolve the snapshot with the highest count for a key.
    ///
    /// Equal counts are settled by the lexicographically smallest file name.
    /// No candidates, including a snapshot directory that does not exist yet,
    /// is [`Resolution::NoneForDate`].
    pub fn resolve_kind(
        &self,
        stream: CrawlStream,
        kind: ArtifactKind,
        date: NaiveDate,
    ) -> Result<Resolution, FilesetError> {
        let best = self
            .candidates(stream, kind, date)?
            .into_iter()
            .max_by(|a, b| {
                a.name
                    .count
                    .cmp(&b.name.count)
                    .then_with(|| b.path.cmp(&a.path))
            });

        let resolution = match best {
            Some(snapshot) => Resolution::Resolved(snapshot),
            None => Resolution::NoneForDate { stream, kind, date },
        };
        debug!(%stream, %kind, %date, ?resolution, "resolved snapshot");
        Ok(resolution)
    }

    /// All snapshots on disk for a key, sorted by file name.
    ///
    /// A missing snapshot directory has no candidates.
    pub fn candidates(
        &self,
        stream: CrawlStream,
        kind: ArtifactKind,
        date: NaiveDate,
    ) -> Result<Vec<ResolvedSnapshot>, FilesetError> {
        let dir = &self.snapshot_dir;
        let read_dir = match std::fs::read_dir(dir) {
            Ok(read_dir) => read_dir,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(dir = %dir.display(), "snapshot directory does not exist");
                return Ok(Vec::new());
            }
            Err(err) => return Err(FilesetError::io(dir, err)),
        };

        let mut candidates = Vec::new();
        for entry in read_dir {
            // Entries may vanish mid-scan; skip them.
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    trace!(dir = %dir.display(), %err, "skipping unreadable entry");
                    continue;
                }
            };
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str().and_then(SnapshotName::parse) else {
                continue;
            };
            if name.matches(stream, kind, date) {
                candidates.push(ResolvedSnapshot {
                    name,
                    path: entry.path(),
                });
            }
        }

        candidates.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(candidates)
    }
}
