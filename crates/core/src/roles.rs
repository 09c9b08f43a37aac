//! Well-known role names carried in the identity token's `role` claim.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_STUDENT: &str = "student";
pub const ROLE_INSTITUTION: &str = "institution";
pub const ROLE_COMPANY: &str = "company";

/// The three account kinds. A user's role is fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Institution,
    Company,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::Institution, Role::Company];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => ROLE_STUDENT,
            Role::Institution => ROLE_INSTITUTION,
            Role::Company => ROLE_COMPANY,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_STUDENT => Ok(Role::Student),
            ROLE_INSTITUTION => Ok(Role::Institution),
            ROLE_COMPANY => Ok(Role::Company),
            other => Err(CoreError::Validation(format!("Invalid role '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_known_role() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn role_names_are_case_sensitive() {
        assert!("Student".parse::<Role>().is_err());
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Role::Institution).unwrap();
        assert_eq!(json, "\"institution\"");
    }
}
