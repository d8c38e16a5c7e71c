//! Listing entry classifier.

use tracing::trace;

use crawlfiles_core::{ArtifactKind, ClassifiedArtifact, RawEntry};

use crate::rules::{self, PathMatch};
use crate::timestamp;

/// Maps listing entries onto crawl streams, jobs, launches and kinds.
///
/// Classification is pure: the same entry always yields the same artifact,
/// and it never fails. Entries no convention recognises come back with
/// `recognised == false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathClassifier;

impl PathClassifier {
    /// Create a new classifier.
    pub fn new() -> Self {
        Self
    }

    /// Classify a single listing entry.
    pub fn classify(&self, entry: &RawEntry) -> ClassifiedArtifact {
        let path = entry.filename.as_str();

        let (rule, mut matched) = match rules::match_path(path) {
            Some((rule, matched)) => (Some(rule), matched),
            None => (None, PathMatch::unmatched(path)),
        };
        let mut recognised = rule.is_some();

        if rules::is_pending_deletion(path) {
            recognised = true;
            matched.kind = ArtifactKind::ToBeDeleted;
        }

        let Some((timestamp, source)) = timestamp::derive(
            &matched.file_name,
            matched.stream,
            matched.launch_datetime,
            &entry.modified_at,
        ) else {
            trace!(path, modified_at = %entry.modified_at, "no usable timestamp");
            // The deletion marker survives a lost timestamp; nothing else does.
            return ClassifiedArtifact {
                kind: if rules::is_pending_deletion(path) {
                    ArtifactKind::ToBeDeleted
                } else {
                    ArtifactKind::Unknown
                },
                ..unrecognised(entry)
            };
        };

        trace!(path, rule = rule.unwrap_or("none"), %source, "classified");

        if !recognised {
            return ClassifiedArtifact {
                timestamp_datetime: Some(timestamp),
                timestamp_source: Some(source),
                ..unrecognised(entry)
            };
        }

        ClassifiedArtifact {
            path: entry.filename.clone(),
            recognised,
            stream: matched.stream,
            job: matched.job,
            launch: matched.launch,
            launch_datetime: matched.launch_datetime,
            kind: matched.kind,
            file_name: matched.file_name,
            size: entry.size,
            timestamp_datetime: Some(timestamp),
            timestamp_source: Some(source),
        }
    }

    /// Classify a batch of entries, keeping their order.
    pub fn classify_all<'a>(
        &self,
        entries: impl IntoIterator<Item = &'a RawEntry>,
    ) -> Vec<ClassifiedArtifact> {
        entries.into_iter().map(|entry| self.classify(entry)).collect()
    }
}

fn unrecognised(entry: &RawEntry) -> ClassifiedArtifact {
    ClassifiedArtifact {
        path: entry.filename.clone(),
        recognised: false,
        stream: None,
        job: None,
        launch: None,
        launch_datetime: None,
        kind: ArtifactKind::Unknown,
        file_name: rules::basename(&entry.filename).into(),
        size: entry.size,
        timestamp_datetime: None,
        timestamp_source: None,
    }
}

/// Classify a single entry with the default classifier.
pub fn classify(entry: &RawEntry) -> ClassifiedArtifact {
    PathClassifier::new().classify(entry)
}

#[cfg(test)]
mod tests {
    use crawlfiles_core::{CrawlStream, TimestampSource};

    use super::*;

    #[test]
    fn test_unrecognised_keeps_modified_time() {
        let artifact = classify(&RawEntry::new("/user/root/notes.txt", "2011-02-12T13:14:11"));
        assert!(!artifact.recognised);
        assert_eq!(artifact.stream, None);
        assert_eq!(artifact.kind, ArtifactKind::Unknown);
        assert_eq!(artifact.file_name, "notes.txt");
        assert_eq!(artifact.timestamp().as_deref(), Some("2011-02-12T13:14:11"));
        assert_eq!(artifact.timestamp_source, Some(TimestampSource::Modified));
    }

    #[test]
    fn test_bad_modified_time_without_fallback() {
        let artifact = classify(&RawEntry::new("/data/12312/212312/WARCS/x.arc", "not a date"));
        assert!(!artifact.recognised);
        assert_eq!(artifact.stream, None);
        assert_eq!(artifact.job, None);
        assert_eq!(artifact.launch, None);
        assert_eq!(artifact.kind, ArtifactKind::Unknown);
        assert_eq!(artifact.timestamp(), None);
    }

    #[test]
    fn test_bad_modified_time_with_launch_fallback() {
        let artifact = classify(&RawEntry::new(
            "/heritrix/output/logs/weekly-20170220090024/crawl.log",
            "",
        ));
        assert!(artifact.recognised);
        assert_eq!(artifact.stream, Some(CrawlStream::Frequent));
        assert_eq!(artifact.timestamp().as_deref(), Some("2017-02-20T09:00:24"));
    }

    #[test]
    fn test_classify_all_keeps_order() {
        let entries = vec![
            RawEntry::new("/data/1/2/a", "2011-02-12T13:14:11"),
            RawEntry::new("/elsewhere/b", "2011-02-12T13:14:11"),
        ];
        let artifacts = PathClassifier::new().classify_all(&entries);
        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].file_name, "a");
        assert_eq!(artifacts[1].file_name, "b");
    }
}
