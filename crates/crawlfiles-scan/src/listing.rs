//! Listing container.

use std::path::PathBuf;

use crawlfiles_core::{ListingWarning, RawEntry};

/// Entries read from one listing, plus anything that had to be skipped.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    /// Where the listing came from.
    pub source: PathBuf,
    /// Entries in listing order.
    pub entries: Vec<RawEntry>,
    /// Rows or files that could not be turned into entries.
    pub warnings: Vec<ListingWarning>,
}

impl Listing {
    /// Create an empty listing for a source.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            entries: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no entries were read.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of the sizes the listing reported.
    pub fn total_size(&self) -> u64 {
        self.entries.iter().filter_map(|e| e.size).sum()
    }
}
