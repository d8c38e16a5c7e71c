//! Per-date WARC file sets for crawlfiles.
//!
//! This crate turns a listing of crawl outputs into date-keyed file sets:
//!
//! - **Grouping** - Classify, filter and bucket entries by date, writing one
//!   snapshot file per date with [`FilesetGrouper`]
//! - **Selection** - Pick the most complete snapshot for a date with
//!   [`SnapshotSelector`]
//! - **Listings** - Format paths for bulk consumers with [`ListSerializer`]
//! - **Tracking** - Per-file rows for the crawl-files store with
//!   [`TrackingExport`]
//!
//! # Snapshots
//!
//! Listings arrive daily and are not always complete. Rather than rewriting a
//! date's file set, each run writes `<stream>-<date>-<count>-<kind>-for-date.txt`
//! alongside what is already there. The selector then trusts the snapshot
//! with the largest count.
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use crawlfiles_analyze::{FilesetGrouper, ListSerializer, SnapshotSelector};
//! use crawlfiles_core::{ArtifactKind, CrawlStream, FilesetConfig};
//! use crawlfiles_scan::ListingReader;
//!
//! let config = FilesetConfig::new("warcs-by-day");
//! let listing = ListingReader::new().read("all-files-list.csv.gz").unwrap();
//!
//! FilesetGrouper::new(config.clone())
//!     .group(&listing.entries, CrawlStream::Frequent, ArtifactKind::Warcs)
//!     .unwrap();
//!
//! let date = NaiveDate::from_ymd_opt(2017, 2, 20).unwrap();
//! let resolution = SnapshotSelector::from_config(&config)
//!     .resolve(CrawlStream::Frequent, date)
//!     .unwrap();
//!
//! if let Some(snapshot) = resolution.snapshot() {
//!     let entries = snapshot.load().unwrap();
//!     let paths = entries.iter().map(|e| e.filename.as_str());
//!     println!("{}", ListSerializer::new().serialize(paths).unwrap());
//! }
//! ```

mod grouper;
mod selector;
mod serialize;
pub mod tracking;

pub use grouper::{FilesetGrouper, GroupReport, WrittenSnapshot};
pub use selector::SnapshotSelector;
pub use serialize::{ListSerializer, warc_fileset_paths};
pub use tracking::{TrackingExport, TrackingRecord};

// Re-export core types
pub use crawlfiles_core::{FilesetConfig, FilesetError, Resolution, ResolvedSnapshot, SnapshotName};
