//! Listing entries, crawl streams and classified artifacts.

use chrono::{NaiveDateTime, Timelike};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// One row of an external filesystem listing.
///
/// `modified_at` is kept exactly as the listing reported it. It is only
/// parsed during classification, so a bad value never rejects the row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawEntry {
    /// Absolute path of the file.
    pub filename: String,
    /// Modification time as reported by the listing (ISO-8601, naive).
    pub modified_at: String,
    /// Size in bytes, when the listing carries it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl RawEntry {
    /// Create a new entry without size information.
    pub fn new(filename: impl Into<String>, modified_at: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            modified_at: modified_at.into(),
            size: None,
        }
    }

    /// Attach a size to this entry.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}

/// Crawl collection policy an artifact belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CrawlStream {
    /// Permissions-based collection, e.g. pre-NPLD selective archiving.
    Selective,
    /// Recurring NPLD crawls of curated sites.
    Frequent,
    /// Broad NPLD domain crawls.
    Domain,
}

/// What sort of file an artifact is.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ArtifactKind {
    /// Web archive container files.
    Warcs,
    /// Content quarantined by virus scanning.
    Viral,
    /// Crawler logs.
    Logs,
    /// Selective-era DLX export folder.
    Dlx,
    /// Nothing more specific is known.
    #[default]
    Unknown,
    /// Parked under the pending-deletion root.
    ToBeDeleted,
}

/// Which signal a derived timestamp came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TimestampSource {
    /// 17-digit creation stamp embedded in a WARC file name.
    FileName,
    /// Launch time of the crawl job that wrote the file.
    Launch,
    /// Filesystem modification time from the listing.
    Modified,
}

/// Metadata derived from a single [`RawEntry`].
///
/// Built once by the classifier and never updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedArtifact {
    /// Absolute path the artifact was listed under.
    pub path: String,
    /// Whether any naming convention matched.
    pub recognised: bool,
    /// Crawl stream, if one could be determined.
    pub stream: Option<CrawlStream>,
    /// Crawl job (target id for selective content).
    pub job: Option<CompactString>,
    /// Launch within the job (instance id for selective content).
    pub launch: Option<CompactString>,
    /// Launch time parsed from the path, where the convention carries one.
    pub launch_datetime: Option<NaiveDateTime>,
    /// Kind of file.
    pub kind: ArtifactKind,
    /// Final path segment.
    pub file_name: CompactString,
    /// Size in bytes, copied from the listing.
    pub size: Option<u64>,
    /// Best available creation instant.
    pub timestamp_datetime: Option<NaiveDateTime>,
    /// Where `timestamp_datetime` came from.
    pub timestamp_source: Option<TimestampSource>,
}

impl ClassifiedArtifact {
    /// ISO-8601 rendering of the derived timestamp.
    pub fn timestamp(&self) -> Option<String> {
        self.timestamp_datetime.as_ref().map(isoformat)
    }

    /// Calendar date (`YYYY-MM-DD`) the artifact is bucketed under.
    pub fn date_key(&self) -> Option<String> {
        self.timestamp_datetime
            .map(|dt| dt.date().format("%Y-%m-%d").to_string())
    }

    /// Check if this artifact belongs to the given stream and kind.
    pub fn is(&self, stream: CrawlStream, kind: ArtifactKind) -> bool {
        self.recognised && self.stream == Some(stream) && self.kind == kind
    }

    /// Check if the file name follows the compressed WARC convention.
    pub fn is_warc_gz(&self) -> bool {
        self.file_name.ends_with(".warc.gz")
    }
}

/// Render a naive timestamp as ISO-8601.
///
/// Fractional seconds are only shown when non-zero, and then always with
/// six digits, e.g. `2017-02-20T09:00:24.966000`.
pub fn isoformat(dt: &NaiveDateTime) -> String {
    if dt.nanosecond() == 0 {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_stream_names() {
        assert_eq!(CrawlStream::Frequent.to_string(), "frequent");
        assert_eq!(CrawlStream::from_str("Domain").unwrap(), CrawlStream::Domain);
        assert!(CrawlStream::from_str("npld").is_err());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ArtifactKind::ToBeDeleted.as_ref(), "to-be-deleted");
        assert_eq!(ArtifactKind::from_str("warcs").unwrap(), ArtifactKind::Warcs);
        assert_eq!(ArtifactKind::default(), ArtifactKind::Unknown);
    }

    #[test]
    fn test_isoformat() {
        let whole = NaiveDate::from_ymd_opt(2011, 2, 12)
            .unwrap()
            .and_hms_opt(13, 14, 11)
            .unwrap();
        assert_eq!(isoformat(&whole), "2011-02-12T13:14:11");

        let millis = NaiveDate::from_ymd_opt(2017, 2, 20)
            .unwrap()
            .and_hms_milli_opt(9, 0, 24, 966)
            .unwrap();
        assert_eq!(isoformat(&millis), "2017-02-20T09:00:24.966000");
    }

    #[test]
    fn test_raw_entry_json_shape() {
        let entry = RawEntry::new("/data/1/2/f", "2011-02-12T13:14:11");
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"filename":"/data/1/2/f","modified_at":"2011-02-12T13:14:11"}"#
        );

        let sized: RawEntry =
            serde_json::from_str(r#"{"filename":"/x","modified_at":"t","size":12}"#).unwrap();
        assert_eq!(sized.size, Some(12));
    }
}
