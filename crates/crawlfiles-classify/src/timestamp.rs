//! Timestamp derivation.
//!
//! Three signals are tried, most precise first:
//! 1. a 17-digit creation stamp in a WARC file name,
//! 2. the launch time of the crawl, when the path carries one,
//! 3. the modification time reported by the listing.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

use crawlfiles_core::{CrawlStream, TimestampSource};

static WARC_STAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*-([12][0-9]{16})-.*\.warc\.gz$").expect("warc stamp pattern is valid")
});

/// Pick the best timestamp available for an artifact.
pub(crate) fn derive(
    file_name: &str,
    stream: Option<CrawlStream>,
    launch_datetime: Option<NaiveDateTime>,
    modified_at: &str,
) -> Option<(NaiveDateTime, TimestampSource)> {
    file_name_timestamp(file_name)
        .map(|ts| (ts, TimestampSource::FileName))
        .or_else(|| {
            stream
                .and(launch_datetime)
                .map(|ts| (ts, TimestampSource::Launch))
        })
        .or_else(|| parse_modified_at(modified_at).map(|ts| (ts, TimestampSource::Modified)))
}

/// Creation stamp from a name like `BL-20170220090024966-00001-3~h3w~8443.warc.gz`.
pub fn file_name_timestamp(file_name: &str) -> Option<NaiveDateTime> {
    let caps = WARC_STAMP.captures(file_name)?;
    datetime_from_digits(&caps[1])
}

/// Parse a listing modification time (naive, `T` or space separated).
pub fn parse_modified_at(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    value
        .parse::<NaiveDateTime>()
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").ok())
}

/// Parse a run of digits laid out as `YYYYMMDD[HHMM[SS[mmm]]]`.
///
/// Only 8, 12, 14 and 17 digit forms are accepted. Out-of-range fields give `None`.
pub fn datetime_from_digits(digits: &str) -> Option<NaiveDateTime> {
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let field = |start: usize, end: usize| -> Option<u32> { digits.get(start..end)?.parse().ok() };

    let year = digits.get(0..4)?.parse::<i32>().ok()?;
    let date = NaiveDate::from_ymd_opt(year, field(4, 6)?, field(6, 8)?)?;
    let (hour, minute, second, milli) = match digits.len() {
        8 => (0, 0, 0, 0),
        12 => (field(8, 10)?, field(10, 12)?, 0, 0),
        14 => (field(8, 10)?, field(10, 12)?, field(12, 14)?, 0),
        17 => (
            field(8, 10)?,
            field(10, 12)?,
            field(12, 14)?,
            field(14, 17)?,
        ),
        _ => return None,
    };
    date.and_hms_milli_opt(hour, minute, second, milli)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        s.parse().unwrap()
    }

    #[test]
    fn test_digits() {
        assert_eq!(datetime_from_digits("20160810"), Some(dt("2016-08-10T00:00:00")));
        assert_eq!(datetime_from_digits("201702200900"), Some(dt("2017-02-20T09:00:00")));
        assert_eq!(datetime_from_digits("20170220090024"), Some(dt("2017-02-20T09:00:24")));
        assert_eq!(
            datetime_from_digits("20170220090024966"),
            Some(dt("2017-02-20T09:00:24.966"))
        );
    }

    #[test]
    fn test_digits_rejects_bad_input() {
        assert_eq!(datetime_from_digits("2017022009002"), None);
        assert_eq!(datetime_from_digits("20171320"), None);
        assert_eq!(datetime_from_digits("2017022a"), None);
        assert_eq!(datetime_from_digits(""), None);
    }

    #[test]
    fn test_file_name_timestamp() {
        assert_eq!(
            file_name_timestamp("BL-20170220090024966-00001-3~h3w~8443.warc.gz"),
            Some(dt("2017-02-20T09:00:24.966"))
        );
        assert_eq!(file_name_timestamp("BL-20170220090024966-00001.warc"), None);
        assert_eq!(file_name_timestamp("BL-30170220090024966-00001.warc.gz"), None);
        assert_eq!(file_name_timestamp("crawl.log"), None);
    }

    #[test]
    fn test_parse_modified_at() {
        assert_eq!(parse_modified_at("2011-02-12T13:14:11"), Some(dt("2011-02-12T13:14:11")));
        assert_eq!(parse_modified_at("2011-02-12 13:14:11"), Some(dt("2011-02-12T13:14:11")));
        assert_eq!(parse_modified_at("yesterday"), None);
        assert_eq!(parse_modified_at(""), None);
    }

    #[test]
    fn test_derive_precedence() {
        let launch = Some(dt("2016-08-10T00:00:00"));
        let modified = "2011-02-12T13:14:11";

        let (ts, source) = derive(
            "BL-20170220090024966-00001.warc.gz",
            Some(CrawlStream::Domain),
            launch,
            modified,
        )
        .unwrap();
        assert_eq!(source, TimestampSource::FileName);
        assert_eq!(ts, dt("2017-02-20T09:00:24.966"));

        let (ts, source) = derive("crawl.log", Some(CrawlStream::Domain), launch, modified).unwrap();
        assert_eq!(source, TimestampSource::Launch);
        assert_eq!(ts, dt("2016-08-10T00:00:00"));

        let (_, source) = derive("crawl.log", None, launch, modified).unwrap();
        assert_eq!(source, TimestampSource::Modified);

        assert!(derive("crawl.log", None, None, "garbage").is_none());
    }
}
