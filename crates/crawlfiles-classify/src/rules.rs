//! Path naming conventions, in priority order.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use compact_str::CompactString;
use regex::Regex;

use crawlfiles_core::{ArtifactKind, CrawlStream};

use crate::timestamp::datetime_from_digits;

/// Job name every domain crawl is folded into, whatever its crawler was called.
pub const DOMAIN_JOB: &str = "domain";

/// Root under which files are parked before removal.
pub const PENDING_DELETION_ROOT: &str = "/_to_be_deleted/";

static DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^/heritrix/output/(warcs|viral|logs)/(?:dc|crawl)[0-3]-([0-9]{8}|[0-9]{14})/([^/]+)$",
    )
    .expect("domain pattern is valid")
});

static FREQUENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/heritrix/output/(warcs|viral|logs)/([a-z0-9-]+)[-/]([0-9]{12,14})/([^/]+)$")
        .expect("frequent pattern is valid")
});

static SELECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/data/([0-9]+)/([0-9]+)/(DLX/|Logs/|WARCS/|)([^/]+)$")
        .expect("selective pattern is valid")
});

/// What a naming convention extracted from a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PathMatch {
    pub stream: Option<CrawlStream>,
    pub job: Option<CompactString>,
    pub launch: Option<CompactString>,
    pub launch_datetime: Option<NaiveDateTime>,
    pub kind: ArtifactKind,
    pub file_name: CompactString,
}

impl PathMatch {
    /// Result for a path no convention recognises.
    pub fn unmatched(path: &str) -> Self {
        Self {
            stream: None,
            job: None,
            launch: None,
            launch_datetime: None,
            kind: ArtifactKind::Unknown,
            file_name: basename(path).into(),
        }
    }
}

pub(crate) type Matcher = fn(&str) -> Option<PathMatch>;

/// Conventions in the order they are tried. The first match wins.
///
/// Domain comes before frequent because a 14-digit domain launch folder also
/// fits the frequent shape.
pub(crate) const RULES: &[(&str, Matcher)] = &[
    ("domain", match_domain),
    ("frequent", match_frequent),
    ("selective", match_selective),
];

/// Try each convention in priority order.
pub(crate) fn match_path(path: &str) -> Option<(&'static str, PathMatch)> {
    RULES
        .iter()
        .find_map(|&(name, matcher)| matcher(path).map(|m| (name, m)))
}

/// Check if a path lives under the pending-deletion root.
pub(crate) fn is_pending_deletion(path: &str) -> bool {
    path.starts_with(PENDING_DELETION_ROOT)
}

fn match_domain(path: &str) -> Option<PathMatch> {
    let caps = DOMAIN.captures(path)?;
    // Crawlers launched on the same day used 8 or 14 digit folders.
    let launch = &caps[2][..8];
    Some(PathMatch {
        stream: Some(CrawlStream::Domain),
        job: Some(DOMAIN_JOB.into()),
        launch: Some(launch.into()),
        launch_datetime: datetime_from_digits(launch),
        kind: known_kind(&caps[1]),
        file_name: caps[3].into(),
    })
}

fn match_frequent(path: &str) -> Option<PathMatch> {
    let caps = FREQUENT.captures(path)?;
    Some(PathMatch {
        stream: Some(CrawlStream::Frequent),
        job: Some(caps[2].into()),
        launch: Some(caps[3].into()),
        launch_datetime: datetime_from_digits(&caps[3]),
        kind: known_kind(&caps[1]),
        file_name: caps[4].into(),
    })
}

fn match_selective(path: &str) -> Option<PathMatch> {
    let caps = SELECTIVE.captures(path)?;
    // Job is the WCT target id, launch the instance id.
    Some(PathMatch {
        stream: Some(CrawlStream::Selective),
        job: Some(caps[1].into()),
        launch: Some(caps[2].into()),
        launch_datetime: None,
        kind: known_kind(caps[3].to_lowercase().trim_matches('/')),
        file_name: caps[4].into(),
    })
}

fn known_kind(folder: &str) -> ArtifactKind {
    ArtifactKind::from_str(folder).unwrap_or_default()
}

/// Final path segment; empty for a path ending in `/`.
pub(crate) fn basename(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}
