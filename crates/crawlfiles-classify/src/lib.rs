//! Path-convention classifier for crawl artifacts.
//!
//! Files written by the crawlers have landed on HDFS under several naming
//! schemes over the years. This crate recognises them and derives crawl
//! metadata from the path alone:
//!
//! | convention | example | stream |
//! |---|---|---|
//! | domain crawl | `/heritrix/output/warcs/dc1-20160810/…` | `domain` |
//! | frequent crawl | `/heritrix/output/warcs/weekly-20170220090024/…` | `frequent` |
//! | selective (WCT) | `/data/12312/212312/WARCS/…` | `selective` |
//! | pending deletion | `/_to_be_deleted/…` | none, kind `to-be-deleted` |
//!
//! ```rust
//! use crawlfiles_classify::PathClassifier;
//! use crawlfiles_core::{CrawlStream, RawEntry};
//!
//! let entry = RawEntry::new(
//!     "/heritrix/output/warcs/dc0-20160810/BL-20160810111111222-00001.warc.gz",
//!     "2016-08-11T02:00:00",
//! );
//! let artifact = PathClassifier::new().classify(&entry);
//!
//! assert_eq!(artifact.stream, Some(CrawlStream::Domain));
//! assert_eq!(artifact.job.as_deref(), Some("domain"));
//! assert_eq!(artifact.timestamp().as_deref(), Some("2016-08-10T11:11:11.222000"));
//! ```

mod classifier;
mod rules;
pub mod timestamp;

pub use classifier::{PathClassifier, classify};
pub use rules::{DOMAIN_JOB, PENDING_DELETION_ROOT};

// Re-export core types for convenience
pub use crawlfiles_core::{ArtifactKind, ClassifiedArtifact, CrawlStream, RawEntry, TimestampSource};
