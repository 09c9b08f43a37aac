//! Status enums stored as upper-case strings in documents.
//!
//! Parsing is case-insensitive because the dashboards send lower-case
//! values from `<select>` elements (e.g. `"enrolled"`).

use crate::error::CoreError;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The stored string form.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $val ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($val) {
                        return Ok($name::$variant);
                    }
                )+
                Err(CoreError::Validation(format!(
                    "Unknown {} '{trimmed}'",
                    stringify!($name)
                )))
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

define_status_enum! {
    /// Whether a course accepts new applications.
    CourseStatus {
        Active = "ACTIVE",
        Inactive = "INACTIVE",
    }
}

impl CourseStatus {
    /// The opposite status. Applying it twice yields the original.
    pub fn toggled(self) -> Self {
        match self {
            CourseStatus::Active => CourseStatus::Inactive,
            CourseStatus::Inactive => CourseStatus::Active,
        }
    }
}

define_status_enum! {
    /// Review state of a student's application.
    ApplicationStatus {
        Pending = "PENDING",
        UnderReview = "UNDER_REVIEW",
        Accepted = "ACCEPTED",
        Rejected = "REJECTED",
        Waitlisted = "WAITLISTED",
    }
}

impl ApplicationStatus {
    /// Still awaiting a final decision.
    pub fn is_pending(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Pending | ApplicationStatus::UnderReview | ApplicationStatus::Waitlisted
        )
    }

    /// Counts against the one-application-per-course rule.
    pub fn is_active(self) -> bool {
        self != ApplicationStatus::Rejected
    }
}

define_status_enum! {
    /// Enrollment state of an admission.
    AdmissionStatus {
        Admitted = "ADMITTED",
        Enrolled = "ENROLLED",
        Deferred = "DEFERRED",
        Withdrawn = "WITHDRAWN",
    }
}

define_status_enum! {
    /// Whether a job posting is shown to students.
    JobStatus {
        Open = "OPEN",
        Closed = "CLOSED",
    }
}
