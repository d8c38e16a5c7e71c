use chrono::NaiveDate;
use crawlfiles_core::{
    ArtifactKind, CrawlStream, FilesetConfig, FilesetError, RawEntry, Resolution,
    ResolvedSnapshot, SnapshotFile, SnapshotName, isoformat,
};
use std::fs;
use std::str::FromStr;
use strum::IntoEnumIterator;
use tempfile::TempDir;

#[test]
fn test_stream_and_kind_names() {
    let streams: Vec<String> = CrawlStream::iter().map(|s| s.to_string()).collect();
    assert_eq!(streams, vec!["selective", "frequent", "domain"]);

    assert_eq!(ArtifactKind::ToBeDeleted.to_string(), "to-be-deleted");
    assert_eq!(ArtifactKind::from_str("WARCS").unwrap(), ArtifactKind::Warcs);
    assert_eq!(ArtifactKind::default(), ArtifactKind::Unknown);
    assert!(CrawlStream::from_str("weekly").is_err());
}

#[test]
fn test_raw_entry_serde() {
    let entry = RawEntry::new("/data/1/2/a.arc.gz", "2011-02-12T13:14:11");
    let json = serde_json::to_string(&entry).unwrap();
    assert_eq!(
        json,
        r#"{"filename":"/data/1/2/a.arc.gz","modified_at":"2011-02-12T13:14:11"}"#
    );

    let sized: RawEntry = serde_json::from_str(
        r#"{"filename":"/x","modified_at":"2011-02-12T13:14:11","size":12}"#,
    )
    .unwrap();
    assert_eq!(sized.size, Some(12));
}

#[test]
fn test_isoformat() {
    let date = NaiveDate::from_ymd_opt(2017, 2, 20).unwrap();
    assert_eq!(
        isoformat(&date.and_hms_opt(9, 0, 24).unwrap()),
        "2017-02-20T09:00:24"
    );
    assert_eq!(
        isoformat(&date.and_hms_milli_opt(9, 0, 24, 966).unwrap()),
        "2017-02-20T09:00:24.966000"
    );
}

#[test]
fn test_config_builder() {
    let config = FilesetConfig::builder()
        .snapshot_dir("/var/crawlfiles/warcs-by-day")
        .line_chunk(500usize)
        .threads(4usize)
        .build()
        .unwrap();
    assert_eq!(config.line_chunk, 500);
    assert_eq!(config.threads, 4);

    let default_config = FilesetConfig::builder().snapshot_dir("d").build().unwrap();
    assert_eq!(default_config.line_chunk, 10_000);
    assert_eq!(default_config.threads, 0);

    assert!(FilesetConfig::builder().build().is_err());
    assert!(FilesetConfig::builder().snapshot_dir("").build().is_err());
    assert!(
        FilesetConfig::builder()
            .snapshot_dir("d")
            .line_chunk(0usize)
            .build()
            .is_err()
    );
}

#[test]
fn test_config_from_toml_defaults() {
    let config: FilesetConfig = toml::from_str("snapshot_dir = \"/srv/snapshots\"\n").unwrap();
    assert_eq!(config.snapshot_dir.to_str(), Some("/srv/snapshots"));
    assert_eq!(config.line_chunk, 10_000);
    assert!(config.validate().is_ok());
}

#[test]
fn test_snapshot_name_roundtrip_every_kind() {
    let date = NaiveDate::from_ymd_opt(2019, 12, 31).unwrap();
    for stream in CrawlStream::iter() {
        for kind in ArtifactKind::iter() {
            let name = SnapshotName::new(stream, kind, date, 7);
            assert_eq!(SnapshotName::parse(&name.to_string()), Some(name));
        }
    }
}

#[test]
fn test_snapshot_file_read() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("frequent-2017-02-20-1-warcs-for-date.txt");
    let entries = vec![RawEntry::new("/a.warc.gz", "2017-02-20T00:00:00").with_size(3)];
    fs::write(&path, serde_json::to_vec_pretty(&entries).unwrap()).unwrap();

    let file = SnapshotFile::read(&path).unwrap();
    assert_eq!(file.name.count, 1);
    assert_eq!(file.entries, entries);

    let resolved = ResolvedSnapshot {
        name: file.name.clone(),
        path: path.clone(),
    };
    assert_eq!(resolved.load().unwrap(), entries);
}

#[test]
fn test_snapshot_file_errors() {
    let temp = TempDir::new().unwrap();

    let corrupt = temp.path().join("frequent-2017-02-20-1-warcs-for-date.txt");
    fs::write(&corrupt, "not json").unwrap();
    assert!(matches!(
        SnapshotFile::read(&corrupt),
        Err(FilesetError::Json { .. })
    ));

    let missing = temp.path().join("frequent-2017-02-21-1-warcs-for-date.txt");
    assert!(matches!(
        SnapshotFile::read(&missing),
        Err(FilesetError::NotFound { .. })
    ));

    let foreign = temp.path().join("notes.txt");
    fs::write(&foreign, "[]").unwrap();
    assert!(matches!(
        SnapshotFile::read(&foreign),
        Err(FilesetError::InvalidSnapshotName { path }) if path == foreign
    ));
}

#[test]
fn test_resolution_json() {
    let date = NaiveDate::from_ymd_opt(2017, 2, 20).unwrap();
    let none = Resolution::NoneForDate {
        stream: CrawlStream::Frequent,
        kind: ArtifactKind::Warcs,
        date,
    };
    let json = serde_json::to_value(&none).unwrap();
    assert_eq!(json["status"], "none-for-date");
    assert_eq!(json["date"], "2017-02-20");

    let back: Resolution = serde_json::from_value(json).unwrap();
    assert_eq!(back, none);
}
