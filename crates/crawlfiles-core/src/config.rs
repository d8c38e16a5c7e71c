//! File set configuration.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Line length of the plain-text WARC listing.
pub const DEFAULT_LINE_CHUNK: usize = 10_000;

/// Configuration for grouping, selection and listing output.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct FilesetConfig {
    /// Directory holding the per-date snapshot files.
    pub snapshot_dir: PathBuf,

    /// Number of paths per line in serialized listings.
    #[builder(default = "DEFAULT_LINE_CHUNK")]
    #[serde(default = "default_line_chunk")]
    pub line_chunk: usize,

    /// Number of threads for classification (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,
}

fn default_line_chunk() -> usize {
    DEFAULT_LINE_CHUNK
}

impl FilesetConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.snapshot_dir {
            Some(ref dir) if dir.as_os_str().is_empty() => {
                return Err("Snapshot directory cannot be empty".to_string());
            }
            None => return Err("Snapshot directory is required".to_string()),
            _ => {}
        }
        if self.line_chunk == Some(0) {
            return Err("Line chunk must be at least 1".to_string());
        }
        Ok(())
    }
}

impl FilesetConfig {
    /// Create a new config builder.
    pub fn builder() -> FilesetConfigBuilder {
        FilesetConfigBuilder::default()
    }

    /// Create a simple config rooted at a snapshot directory.
    pub fn new(snapshot_dir: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_dir: snapshot_dir.into(),
            line_chunk: DEFAULT_LINE_CHUNK,
            threads: 0,
        }
    }

    /// Check values that serde cannot enforce.
    pub fn validate(&self) -> Result<(), String> {
        if self.snapshot_dir.as_os_str().is_empty() {
            return Err("Snapshot directory cannot be empty".to_string());
        }
        if self.line_chunk == 0 {
            return Err("Line chunk must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for FilesetConfig {
    fn default() -> Self {
        Self::new("warcs-by-day")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = FilesetConfig::builder()
            .snapshot_dir("/var/state/warcs-by-day")
            .threads(4usize)
            .build()
            .unwrap();

        assert_eq!(config.snapshot_dir, PathBuf::from("/var/state/warcs-by-day"));
        assert_eq!(config.threads, 4);
        assert_eq!(config.line_chunk, DEFAULT_LINE_CHUNK);
    }

    #[test]
    fn test_config_builder_rejects_bad_values() {
        assert!(FilesetConfig::builder().build().is_err());
        assert!(FilesetConfig::builder().snapshot_dir("").build().is_err());
        assert!(
            FilesetConfig::builder()
                .snapshot_dir("/tmp/x")
                .line_chunk(0usize)
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: FilesetConfig =
            serde_json::from_str(r#"{"snapshot_dir":"/state/warcs-by-day"}"#).unwrap();
        assert_eq!(config.line_chunk, 10_000);
        assert_eq!(config.threads, 0);
        assert!(config.validate().is_ok());
    }
}
