//! Per-date snapshot files and resolution results.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::artifact::{ArtifactKind, CrawlStream, RawEntry};
use crate::error::FilesetError;

const NAME_SUFFIX: &str = "-for-date.txt";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parsed snapshot file name: `<stream>-<YYYY-MM-DD>-<count>-<kind>-for-date.txt`.
///
/// The count is part of the name so that successive runs never collide
/// unless they produced the same number of entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotName {
    /// Stream the entries were filtered to.
    pub stream: CrawlStream,
    /// Kind the entries were filtered to.
    pub kind: ArtifactKind,
    /// Calendar date of every entry in the snapshot.
    pub date: NaiveDate,
    /// Number of entries at creation time.
    pub count: usize,
}

impl SnapshotName {
    /// Create a new snapshot name.
    pub fn new(stream: CrawlStream, kind: ArtifactKind, date: NaiveDate, count: usize) -> Self {
        Self {
            stream,
            kind,
            date,
            count,
        }
    }

    /// Parse a file name. Returns `None` for anything that is not a snapshot.
    pub fn parse(file_name: &str) -> Option<Self> {
        let body = file_name.strip_suffix(NAME_SUFFIX)?;
        let (stream, rest) = body.split_once('-')?;
        let stream = CrawlStream::from_str(stream)
            .ok()
            .filter(|s| s.as_ref() == stream)?;

        let date_str = rest.get(..10)?;
        let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT).ok()?;
        if date.format(DATE_FORMAT).to_string() != date_str {
            return None;
        }

        let (count, kind) = rest.get(10..)?.strip_prefix('-')?.split_once('-')?;
        if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let count = count.parse().ok()?;
        let kind = ArtifactKind::from_str(kind)
            .ok()
            .filter(|k| k.as_ref() == kind)?;

        Some(Self::new(stream, kind, date, count))
    }

    /// Date portion formatted as `YYYY-MM-DD`.
    pub fn date_key(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// Check if this snapshot belongs to the given key.
    pub fn matches(&self, stream: CrawlStream, kind: ArtifactKind, date: NaiveDate) -> bool {
        self.stream == stream && self.kind == kind && self.date == date
    }
}

impl fmt::Display for SnapshotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}{NAME_SUFFIX}",
            self.stream,
            self.date.format(DATE_FORMAT),
            self.count,
            self.kind
        )
    }
}

/// A snapshot file together with its contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    /// Parsed name.
    pub name: SnapshotName,
    /// Location on disk.
    pub path: PathBuf,
    /// Entries in the order they were listed.
    pub entries: Vec<RawEntry>,
}

impl SnapshotFile {
    /// Read a snapshot file from disk.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, FilesetError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(SnapshotName::parse)
            .ok_or_else(|| FilesetError::InvalidSnapshotName {
                path: path.to_path_buf(),
            })?;
        let entries = read_entries(path)?;
        Ok(Self {
            name,
            path: path.to_path_buf(),
            entries,
        })
    }
}

/// The snapshot chosen as authoritative for a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSnapshot {
    /// Parsed name of the winning file.
    pub name: SnapshotName,
    /// Location on disk.
    pub path: PathBuf,
}

impl ResolvedSnapshot {
    /// Load the entries of the resolved snapshot.
    pub fn load(&self) -> Result<Vec<RawEntry>, FilesetError> {
        read_entries(&self.path)
    }
}

/// Result of resolving a `(stream, kind, date)` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Resolution {
    /// A snapshot exists; this is the most complete one.
    Resolved(ResolvedSnapshot),
    /// Grouping has run but produced no artifacts for this date.
    NoneForDate {
        stream: CrawlStream,
        kind: ArtifactKind,
        date: NaiveDate,
    },
}

impl Resolution {
    /// The resolved snapshot, if any.
    pub fn snapshot(&self) -> Option<&ResolvedSnapshot> {
        match self {
            Resolution::Resolved(snapshot) => Some(snapshot),
            Resolution::NoneForDate { .. } => None,
        }
    }

    /// Check if no snapshot exists for the date.
    pub fn is_none_for_date(&self) -> bool {
        matches!(self, Resolution::NoneForDate { .. })
    }
}

fn read_entries(path: &Path) -> Result<Vec<RawEntry>, FilesetError> {
    let data = std::fs::read(path).map_err(|e| FilesetError::io(path, e))?;
    serde_json::from_slice(&data).map_err(|source| FilesetError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_name_format() {
        let name = SnapshotName::new(CrawlStream::Frequent, ArtifactKind::Warcs, date(2017, 2, 20), 45);
        assert_eq!(name.to_string(), "frequent-2017-02-20-45-warcs-for-date.txt");
    }

    #[test]
    fn test_name_parse() {
        let name = SnapshotName::parse("domain-2016-08-10-3-warcs-for-date.txt").unwrap();
        assert_eq!(name.stream, CrawlStream::Domain);
        assert_eq!(name.kind, ArtifactKind::Warcs);
        assert_eq!(name.date, date(2016, 8, 10));
        assert_eq!(name.count, 3);

        let name = SnapshotName::parse("selective-2010-01-01-12-to-be-deleted-for-date.txt").unwrap();
        assert_eq!(name.kind, ArtifactKind::ToBeDeleted);
    }

    #[test]
    fn test_name_parse_rejects_foreign_files() {
        for name in [
            ".tmpA1b2C3",
            "frequent-warc-filesets.txt",
            "Frequent-2017-02-20-45-warcs-for-date.txt",
            "frequent-2017-2-20-45-warcs-for-date.txt",
            "frequent-2017-02-30-45-warcs-for-date.txt",
            "frequent-2017-02-20--warcs-for-date.txt",
            "frequent-2017-02-20-4x-warcs-for-date.txt",
            "frequent-2017-02-20-45-WARCS-for-date.txt",
            "frequent-2017-02-20-45-warcs-for-date.txt.tmp",
        ] {
            assert!(SnapshotName::parse(name).is_none(), "{name}");
        }
    }

    #[test]
    fn test_resolution_accessors() {
        let none = Resolution::NoneForDate {
            stream: CrawlStream::Frequent,
            kind: ArtifactKind::Warcs,
            date: date(2020, 1, 1),
        };
        assert!(none.is_none_for_date());
        assert!(none.snapshot().is_none());
    }
}
