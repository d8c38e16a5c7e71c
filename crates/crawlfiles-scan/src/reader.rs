//! CSV listing reader.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::{debug, info, warn};

use crawlfiles_core::{FilesetError, ListingWarning, RawEntry};

use crate::listing::Listing;

const REQUIRED_COLUMNS: [&str; 2] = ["filename", "modified_at"];

/// Reads `filename,modified_at[,size,...]` listings with a header row.
///
/// Files ending in `.gz` are decompressed on the fly. Extra columns are
/// ignored; rows that cannot be decoded are reported as warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListingReader;

impl ListingReader {
    /// Create a new reader.
    pub fn new() -> Self {
        Self
    }

    /// Read a listing from disk.
    pub fn read(&self, path: impl AsRef<Path>) -> Result<Listing, FilesetError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| FilesetError::io(path, e))?;
        let file = BufReader::new(file);

        if path.extension().is_some_and(|ext| ext == "gz") {
            debug!(path = %path.display(), "decompressing listing");
            self.read_from(GzDecoder::new(file), path)
        } else {
            self.read_from(file, path)
        }
    }

    /// Read a listing from any reader. `source` is only used for messages.
    pub fn read_from<R: Read>(&self, input: R, source: &Path) -> Result<Listing, FilesetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(input);

        let headers = reader.headers().map_err(|e| listing_error(source, e))?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(FilesetError::Listing {
                    path: source.to_path_buf(),
                    message: format!("missing required column '{column}'"),
                });
            }
        }

        let mut listing = Listing::new(source);
        for (index, row) in reader.deserialize::<RawEntry>().enumerate() {
            match row {
                Ok(entry) => listing.entries.push(entry),
                Err(err) if err.is_io_error() => return Err(listing_error(source, err)),
                Err(err) => {
                    // Header is line 1.
                    let line = err
                        .position()
                        .map(|p| p.line())
                        .unwrap_or(index as u64 + 2);
                    let warning = ListingWarning::malformed_row(source, line, &err);
                    warn!(location = %warning.location, "{}", warning.message);
                    listing.warnings.push(warning);
                }
            }
        }

        info!(
            source = %source.display(),
            entries = listing.entries.len(),
            skipped = listing.warnings.len(),
            "read listing"
        );
        Ok(listing)
    }
}

/// Write entries in the format [`ListingReader`] reads.
pub fn write_csv<W: Write>(entries: &[RawEntry], output: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(["filename", "modified_at", "size"])?;
    for entry in entries {
        let size = entry.size.map(|s| s.to_string()).unwrap_or_default();
        writer.write_record([entry.filename.as_str(), entry.modified_at.as_str(), size.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

fn listing_error(source: &Path, err: csv::Error) -> FilesetError {
    FilesetError::Listing {
        path: source.to_path_buf(),
        message: err.to_string(),
    }
}
