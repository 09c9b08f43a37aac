//! Filter state held by the institution views and sent as query strings.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CourseFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Faculty id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faculty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Course id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// `YYYY-MM-DD`, inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StudentFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdmissionFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Aggregation period for the admissions trend chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendPeriod {
    #[default]
    Monthly,
    Weekly,
}

impl TrendPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            TrendPeriod::Monthly => "monthly",
            TrendPeriod::Weekly => "weekly",
        }
    }
}

/// Normalise a text input: trimmed, and `None` when blank.
pub fn input_value(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_filters_are_left_out_of_the_query() {
        let filters = ApplicationFilters {
            status: Some("PENDING".into()),
            date_from: Some("2026-01-01".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&filters).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "PENDING", "dateFrom": "2026-01-01"})
        );
    }

    #[test]
    fn blank_inputs_clear_the_filter() {
        assert_eq!(input_value("  "), None);
        assert_eq!(input_value(" phys "), Some("phys".to_string()));
    }
}
