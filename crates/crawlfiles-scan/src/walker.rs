//! Listing producer for a locally mounted copy of the archive filesystem.

use std::path::{Component, Path, PathBuf};
use std::time::{Instant, SystemTime};

use chrono::{DateTime, Utc};
use jwalk::{Parallelism, WalkDir};
use tracing::{debug, info};

use crawlfiles_core::{FilesetError, ListingWarning, RawEntry, WarningKind};

use crate::listing::Listing;

/// Walks a mount point and lists every regular file below it.
///
/// Paths are re-rooted so that `<mount>/heritrix/output/...` is listed as
/// `/heritrix/output/...`, the form the classifier expects. Modification
/// times are rendered as naive UTC with second precision.
#[derive(Debug, Clone)]
pub struct MountWalker {
    mount: PathBuf,
    threads: usize,
}

impl MountWalker {
    /// Create a walker for a mount point.
    pub fn new(mount: impl Into<PathBuf>) -> Self {
        Self {
            mount: mount.into(),
            threads: 0,
        }
    }

    /// Number of walker threads (0 = auto-detect).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Walk the mount and collect a listing.
    pub fn walk(&self) -> Result<Listing, FilesetError> {
        let start = Instant::now();
        let root = self
            .mount
            .canonicalize()
            .map_err(|e| FilesetError::io(&self.mount, e))?;
        if !root.is_dir() {
            return Err(FilesetError::InvalidConfig {
                message: format!("Mount point is not a directory: {}", root.display()),
            });
        }

        let parallelism = match self.threads {
            // The global pool already has the requested size.
            n if n == 0 || n == rayon::current_num_threads() => {
                Parallelism::RayonDefaultPool {
                    busy_timeout: std::time::Duration::from_millis(100),
                }
            }
            n => Parallelism::RayonNewPool(n),
        };
        let walker = WalkDir::new(&root)
            .parallelism(parallelism)
            .skip_hidden(false)
            .follow_links(false)
            .sort(true);

        let mut listing = Listing::new(&root);
        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let location = err
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default();
                    listing
                        .warnings
                        .push(ListingWarning::new(location, err.to_string(), WarningKind::ReadError));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(err) => {
                    listing.warnings.push(ListingWarning::new(
                        path.display().to_string(),
                        err.to_string(),
                        WarningKind::MetadataError,
                    ));
                    continue;
                }
            };

            let Some(filename) = namespace_path(&root, &path) else {
                listing.warnings.push(ListingWarning::new(
                    path.display().to_string(),
                    "path is not valid UTF-8 below the mount",
                    WarningKind::OutsideMount,
                ));
                continue;
            };

            match listing_entry(&path, filename, metadata.modified(), metadata.len()) {
                Ok(entry) => listing.entries.push(entry),
                Err(warning) => listing.warnings.push(warning),
            }
        }

        debug!(warnings = listing.warnings.len(), "walk finished");
        info!(
            mount = %root.display(),
            files = listing.entries.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "walked mount"
        );
        Ok(listing)
    }
}

/// Map a path below `root` onto the absolute namespace path.
fn namespace_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut out = String::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                out.push('/');
                out.push_str(part.to_str()?);
            }
            _ => return None,
        }
    }
    if out.is_empty() { None } else { Some(out) }
}

/// Build an entry, or a warning when the platform cannot report an mtime.
fn listing_entry(
    path: &Path,
    filename: String,
    modified: std::io::Result<SystemTime>,
    size: u64,
) -> Result<RawEntry, ListingWarning> {
    let modified = modified.map_err(|err| {
        ListingWarning::new(
            path.display().to_string(),
            format!("no modification time: {err}"),
            WarningKind::MetadataError,
        )
    })?;
    Ok(RawEntry {
        filename,
        modified_at: format_modified(modified),
        size: Some(size),
    })
}

fn format_modified(modified: SystemTime) -> String {
    DateTime::<Utc>::from(modified)
        .naive_utc()
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn create_test_mount() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("heritrix/output/warcs/dc0-20160810")).unwrap();
        fs::create_dir_all(root.join("data/12312/212312/WARCS")).unwrap();

        fs::write(
            root.join("heritrix/output/warcs/dc0-20160810/BL-20160810111111222-00001.warc.gz"),
            "warc",
        )
        .unwrap();
        fs::write(root.join("data/12312/212312/WARCS/a.arc.gz"), "arc data").unwrap();

        temp
    }

    #[test]
    fn test_walk_reroots_paths() {
        let temp = create_test_mount();
        let listing = MountWalker::new(temp.path()).walk().unwrap();

        let names: Vec<_> = listing.entries.iter().map(|e| e.filename.as_str()).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"/data/12312/212312/WARCS/a.arc.gz"));
        assert!(names.contains(
            &"/heritrix/output/warcs/dc0-20160810/BL-20160810111111222-00001.warc.gz"
        ));
        assert!(listing.warnings.is_empty());
    }

    #[test]
    fn test_walk_records_size_and_mtime() {
        let temp = create_test_mount();
        let listing = MountWalker::new(temp.path()).with_threads(1).walk().unwrap();

        let arc = listing
            .entries
            .iter()
            .find(|e| e.filename.ends_with("a.arc.gz"))
            .unwrap();
        assert_eq!(arc.size, Some(8));
        assert!(arc.modified_at.parse::<chrono::NaiveDateTime>().is_ok());
    }

    #[test]
    fn test_walk_missing_mount() {
        let err = MountWalker::new("/definitely/not/mounted").walk().unwrap_err();
        assert!(matches!(err, FilesetError::NotFound { .. }));
    }

    #[test]
    fn test_namespace_path() {
        let root = Path::new("/mnt/hdfs");
        assert_eq!(
            namespace_path(root, Path::new("/mnt/hdfs/data/1/2/f")).as_deref(),
            Some("/data/1/2/f")
        );
        assert_eq!(namespace_path(root, Path::new("/mnt/hdfs")), None);
        assert_eq!(namespace_path(root, Path::new("/elsewhere/f")), None);
    }

    #[test]
    fn test_missing_mtime_becomes_warning() {
        let path = Path::new("/mnt/hdfs/data/1/2/f");
        let unsupported = std::io::Error::new(std::io::ErrorKind::Unsupported, "no mtime");

        let warning =
            listing_entry(path, "/data/1/2/f".to_string(), Err(unsupported), 10).unwrap_err();
        assert_eq!(warning.kind, WarningKind::MetadataError);
        assert_eq!(warning.location, "/mnt/hdfs/data/1/2/f");
        assert!(warning.message.contains("no mtime"));

        let time = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_297_516_451);
        let entry = listing_entry(path, "/data/1/2/f".to_string(), Ok(time), 10).unwrap();
        assert_eq!(entry.modified_at, "2011-02-12T13:14:11");
        assert_eq!(entry.size, Some(10));
    }

    #[test]
    fn test_format_modified() {
        let time = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_297_516_451);
        assert_eq!(format_modified(time), "2011-02-12T13:14:11");
    }
}
