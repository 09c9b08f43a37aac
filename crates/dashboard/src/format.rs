//! Display formatting for dates, times and GPA values.

use careers_core::grading::{gpa_color, gpa_percentage};
use careers_core::types::Timestamp;

/// `Mar 5, 2026`
pub fn format_date(ts: Timestamp) -> String {
    ts.format("%b %-d, %Y").to_string()
}

/// `Mar 5`
pub fn format_event_date(ts: Timestamp) -> String {
    ts.format("%b %-d").to_string()
}

/// `09:30 AM`
pub fn format_time(ts: Timestamp) -> String {
    ts.format("%I:%M %p").to_string()
}

/// Bar width (percent of the 4.0 scale), colour and label for a GPA.
#[derive(Debug, Clone, PartialEq)]
pub struct GpaIndicator {
    pub width: f64,
    pub color: &'static str,
    pub label: String,
}

impl GpaIndicator {
    pub fn new(gpa: f64) -> Self {
        Self {
            width: gpa_percentage(gpa),
            color: gpa_color(gpa),
            label: format!("{gpa:.2}"),
        }
    }
}

/// A rate already expressed in percent, e.g. `62.5%`.
pub fn format_percent(rate: f64) -> String {
    let rounded = (rate * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}%")
    } else {
        format!("{rounded:.1}%")
    }
}
