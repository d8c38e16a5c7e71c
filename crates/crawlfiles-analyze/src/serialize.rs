//! Plain-text path listings for bulk consumers.

use itertools::Itertools;

use crawlfiles_core::{
    ArtifactKind, ClassifiedArtifact, CrawlStream, DEFAULT_LINE_CHUNK, FilesetError,
};

/// Formats paths as sorted, space-separated text.
///
/// A newline is inserted every `line_chunk` paths so that line-oriented
/// tools do not choke on one enormous line. There is no trailing newline.
#[derive(Debug, Clone, Copy)]
pub struct ListSerializer {
    line_chunk: usize,
}

impl ListSerializer {
    /// Create a serializer with the default chunk of 10,000 paths per line.
    pub fn new() -> Self {
        Self {
            line_chunk: DEFAULT_LINE_CHUNK,
        }
    }

    /// Create a serializer with a custom chunk size (minimum 1).
    pub fn with_line_chunk(line_chunk: usize) -> Self {
        Self {
            line_chunk: line_chunk.max(1),
        }
    }

    /// Sort and format paths. Fails on an empty input.
    pub fn serialize<I, S>(&self, paths: I) -> Result<String, FilesetError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths: Vec<String> = paths
            .into_iter()
            .map(|p| p.as_ref().to_owned())
            .sorted()
            .collect();
        if paths.is_empty() {
            return Err(FilesetError::empty("serialize", None, None, 0));
        }

        Ok(paths
            .chunks(self.line_chunk)
            .map(|line| line.iter().join(" "))
            .join("\n"))
    }
}

impl Default for ListSerializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Paths of the compressed WARCs in one stream.
pub fn warc_fileset_paths(artifacts: &[ClassifiedArtifact], stream: CrawlStream) -> Vec<&str> {
    artifacts
        .iter()
        .filter(|a| a.is(stream, ArtifactKind::Warcs) && a.is_warc_gz())
        .map(|a| a.path.as_str())
        .collect()
}
