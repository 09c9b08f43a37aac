//! Shared query parameter types for API handlers.
//!
//! Dashboards send every filter key and use an empty string for "no
//! filter"; handlers normalise values with
//! [`non_blank`](careers_core::search::non_blank) before applying them.

use serde::Deserialize;

/// `GET /institution/courses?search&faculty&status`.
#[derive(Debug, Default, Deserialize)]
pub struct CourseFilter {
    pub search: Option<String>,
    /// Faculty id.
    pub faculty: Option<String>,
    pub status: Option<String>,
}

/// `GET /institution/applications?search&course&status&dateFrom&dateTo`,
/// also used by the CSV export.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationFilter {
    pub search: Option<String>,
    /// Course id.
    pub course: Option<String>,
    pub status: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// `GET /institution/students?search&course&year&status`.
#[derive(Debug, Default, Deserialize)]
pub struct StudentFilter {
    pub search: Option<String>,
    /// Course id the student applied to.
    pub course: Option<String>,
    pub year: Option<String>,
    /// Status of the student's latest application to the institution.
    pub status: Option<String>,
}

/// `GET /institution/admissions/recent?search&course&status`.
#[derive(Debug, Default, Deserialize)]
pub struct AdmissionFilter {
    pub search: Option<String>,
    pub course: Option<String>,
    pub status: Option<String>,
}

/// `GET /institution/admissions/trends?period=weekly|monthly`.
#[derive(Debug, Default, Deserialize)]
pub struct TrendParams {
    pub period: Option<String>,
}

/// `?limit=` for feed-style listings.
#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}
