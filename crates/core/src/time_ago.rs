//! Relative-time phrases such as "3 days ago".

use crate::types::Timestamp;

const MINUTE: i64 = 60;
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;
const MONTH: i64 = 2_592_000;
const YEAR: i64 = 31_536_000;

/// Describe how long before `now` the instant `then` was.
///
/// Instants in the future (clock skew) read as "just now".
pub fn time_ago(then: Timestamp, now: Timestamp) -> String {
    let seconds = (now - then).num_seconds();

    let units: [(i64, &str, &str); 5] = [
        (YEAR, "years", "a year ago"),
        (MONTH, "months", "a month ago"),
        (DAY, "days", "yesterday"),
        (HOUR, "hours", "an hour ago"),
        (MINUTE, "minutes", "a minute ago"),
    ];

    for (unit, plural, single) in units {
        let count = seconds / unit;
        if count > 1 {
            return format!("{count} {plural} ago");
        }
        if count == 1 {
            return single.to_string();
        }
    }

    "just now".to_string()
}
