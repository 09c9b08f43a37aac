use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use careers_core::roles::Role;

/// Errors raised while reading dashboard configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// The dashboard page to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    StudentDashboard,
    ManageCourses,
    ReviewApplications,
    TrackAdmissions,
    StudentConnections,
}

impl ViewKind {
    /// Role whose API the view talks to.
    pub fn role(self) -> Role {
        match self {
            ViewKind::StudentDashboard => Role::Student,
            _ => Role::Institution,
        }
    }
}

impl FromStr for ViewKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" | "student-dashboard" => Ok(ViewKind::StudentDashboard),
            "courses" | "manage-courses" => Ok(ViewKind::ManageCourses),
            "applications" | "review-applications" => Ok(ViewKind::ReviewApplications),
            "admissions" | "track-admissions" => Ok(ViewKind::TrackAdmissions),
            "connections" | "student-connections" => Ok(ViewKind::StudentConnections),
            other => Err(format!(
                "unknown view '{other}', expected student, courses, applications, admissions or connections"
            )),
        }
    }
}

/// Dashboard configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// API base URL without a trailing slash.
    pub api_url: String,
    /// Chat WebSocket endpoint.
    pub ws_url: String,
    /// Bearer token sent with every request.
    pub token: String,
    pub view: ViewKind,
    /// Where rendered HTML is written; stdout when unset.
    pub output: Option<PathBuf>,
    pub request_timeout: Duration,
    /// Keep running after the first render, re-rendering on live
    /// notifications and chat messages.
    pub follow: bool,
    /// Student whose chat thread the connections view opens.
    pub chat_student: Option<String>,
}

impl DashboardConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                  |
    /// |----------------------------------|--------------------------|
    /// | `DASHBOARD_API_URL`              | `http://localhost:5001`  |
    /// | `DASHBOARD_WS_URL`               | `ws://localhost:5001/ws` |
    /// | `DASHBOARD_TOKEN`                | **required**             |
    /// | `DASHBOARD_VIEW`                 | `student`                |
    /// | `DASHBOARD_OUTPUT`               | stdout                   |
    /// | `DASHBOARD_REQUEST_TIMEOUT_SECS` | `10`                     |
    /// | `DASHBOARD_FOLLOW`               | `false`                  |
    /// | `DASHBOARD_CHAT_STUDENT`         | none                     |
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = env_or("DASHBOARD_API_URL", "http://localhost:5001".to_string())?
            .trim_end_matches('/')
            .to_string();
        let ws_url = env_or("DASHBOARD_WS_URL", "ws://localhost:5001/ws".to_string())?;
        let token = std::env::var("DASHBOARD_TOKEN")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("DASHBOARD_TOKEN"))?;
        let view = env_or("DASHBOARD_VIEW", ViewKind::StudentDashboard)?;
        let output = std::env::var("DASHBOARD_OUTPUT")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        let timeout_secs = env_or("DASHBOARD_REQUEST_TIMEOUT_SECS", 10u64)?;
        let follow = env_or("DASHBOARD_FOLLOW", false)?;
        let chat_student = std::env::var("DASHBOARD_CHAT_STUDENT")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Ok(Self {
            api_url,
            ws_url,
            token,
            view,
            output,
            request_timeout: Duration::from_secs(timeout_secs),
            follow,
            chat_student,
        })
    }
}

fn env_or<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(var) {
        Ok(raw) => parse_value(var, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn view_names_parse_case_insensitively() {
        assert_eq!(
            parse_value::<ViewKind>("DASHBOARD_VIEW", "Admissions").unwrap(),
            ViewKind::TrackAdmissions
        );
        assert_eq!(
            "student-connections".parse::<ViewKind>().unwrap(),
            ViewKind::StudentConnections
        );
    }

    #[test]
    fn unknown_view_is_rejected() {
        assert_matches!(
            parse_value::<ViewKind>("DASHBOARD_VIEW", "reports"),
            Err(ConfigError::Invalid { var: "DASHBOARD_VIEW", .. })
        );
    }

    #[test]
    fn only_the_student_dashboard_uses_the_student_api() {
        assert_eq!(ViewKind::StudentDashboard.role(), Role::Student);
        assert_eq!(ViewKind::ManageCourses.role(), Role::Institution);
        assert_eq!(ViewKind::StudentConnections.role(), Role::Institution);
    }
}
