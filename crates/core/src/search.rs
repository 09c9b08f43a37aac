//! Query-string filter helpers.
//!
//! Dashboards send every filter key, using an empty string for "no
//! filter". These helpers normalise that and evaluate the common
//! search/date-range predicates.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::error::CoreError;
use crate::types::Timestamp;

/// `None` for absent, empty or whitespace-only values; trimmed otherwise.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Case-insensitive substring match of `needle` against any haystack.
pub fn matches_search<'a>(needle: &str, haystacks: impl IntoIterator<Item = &'a str>) -> bool {
    let needle = needle.to_lowercase();
    haystacks
        .into_iter()
        .any(|h| h.to_lowercase().contains(&needle))
}

/// Which end of a range a date-only bound describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date.
///
/// A bare date resolves to midnight for [`Bound::Start`] and to the last
/// millisecond of the day for [`Bound::End`].
pub fn parse_date_bound(raw: &str, bound: Bound) -> Result<Timestamp, CoreError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| CoreError::Validation(format!("Invalid date '{raw}'")))?;
    let time = match bound {
        Bound::Start => NaiveTime::MIN,
        Bound::End => NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN),
    };
    Ok(date.and_time(time).and_utc())
}

/// Inclusive, optionally open-ended time range.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DateRange {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

impl DateRange {
    /// Build a range from raw query values; blank values leave the side open.
    pub fn parse(from: Option<String>, to: Option<String>) -> Result<Self, CoreError> {
        let from = non_blank(from)
            .map(|f| parse_date_bound(&f, Bound::Start))
            .transpose()?;
        let to = non_blank(to)
            .map(|t| parse_date_bound(&t, Bound::End))
            .transpose()?;
        Ok(Self { from, to })
    }

    pub fn contains(&self, ts: Timestamp) -> bool {
        self.from.map_or(true, |f| ts >= f) && self.to.map_or(true, |t| ts <= t)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn non_blank_treats_empty_as_absent() {
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(String::new())), None);
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(Some(" cs ".into())), Some("cs".into()));
    }

    #[test]
    fn search_is_case_insensitive() {
        assert!(matches_search("ALICE", ["alice@example.com", "Bob"]));
        assert!(!matches_search("carol", ["alice", "bob"]));
    }

    #[test]
    fn date_only_bounds_cover_whole_day() {
        let start = parse_date_bound("2024-03-01", Bound::Start).unwrap();
        let end = parse_date_bound("2024-03-01", Bound::End).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        assert!(end > Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 59).unwrap());
    }

    #[test]
    fn rfc3339_is_accepted() {
        let ts = parse_date_bound("2024-03-01T10:00:00+02:00", Bound::Start).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn invalid_date_is_validation_error() {
        assert!(matches!(
            parse_date_bound("yesterday", Bound::Start),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn range_contains_is_inclusive_and_open_ended() {
        let range = DateRange::parse(Some("2024-01-01".into()), Some(String::new())).unwrap();
        assert!(range.contains(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        assert!(range.contains(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2023, 12, 31, 23, 0, 0).unwrap()));
        assert!(DateRange::default().contains(Utc::now()));
    }
}
