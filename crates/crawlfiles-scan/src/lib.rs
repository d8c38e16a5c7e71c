//! Listing ingestion for crawlfiles.
//!
//! Everything downstream works on [`RawEntry`] records. This crate produces
//! them from two sources:
//!
//! - **CSV listings** exported from HDFS (optionally gzipped), read with
//!   [`ListingReader`]
//! - **Mounted filesystems**, walked in parallel with [`MountWalker`]
//!
//! # Example
//!
//! ```rust,no_run
//! use crawlfiles_scan::ListingReader;
//!
//! let listing = ListingReader::new().read("all-files-list.csv.gz").unwrap();
//!
//! println!("{} entries, {} skipped rows", listing.len(), listing.warnings.len());
//! ```

mod listing;
mod reader;
mod walker;

pub use listing::Listing;
pub use reader::{ListingReader, write_csv};
pub use walker::MountWalker;

// Re-export core types for convenience
pub use crawlfiles_core::{FilesetError, ListingWarning, RawEntry, WarningKind};
