//! User documents (`users/{uid}`).

use careers_core::roles::Role;
use careers_core::types::{DocId, Timestamp};
use serde::{Deserialize, Serialize};

pub const COLLECTION: &str = "users";

/// A user document. The id equals the identity-provider uid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: DocId,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub profile_data: ProfileData,
    pub created_at: Timestamp,
}

/// Free-form profile attributes. All optional; absent fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<f64>,
    /// Enrolment status shown on the institution's student list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub academics: Vec<AcademicRecord>,
}

impl ProfileData {
    /// Display name, falling back to the email address.
    pub fn display_name<'a>(&'a self, email: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(email)
    }
}

/// One semester of academic history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicRecord {
    pub semester: String,
    #[serde(default)]
    pub gpa: Option<f64>,
    #[serde(default)]
    pub courses: Vec<CourseGrade>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseGrade {
    pub name: String,
    pub grade: String,
}

/// Profile fields a student may change. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub interests: Option<Vec<String>>,
    pub photo: Option<String>,
}

impl UpdateProfile {
    pub fn apply(self, profile: &mut ProfileData) {
        if let Some(name) = self.name {
            profile.name = Some(name);
        }
        if let Some(phone) = self.phone {
            profile.phone = Some(phone);
        }
        if let Some(bio) = self.bio {
            profile.bio = Some(bio);
        }
        if let Some(skills) = self.skills {
            profile.skills = skills;
        }
        if let Some(interests) = self.interests {
            profile.interests = interests;
        }
        if let Some(photo) = self.photo {
            profile.photo = Some(photo);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_profile_serializes_to_empty_object() {
        let json = serde_json::to_value(ProfileData::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn update_only_touches_given_fields() {
        let mut profile = ProfileData {
            name: Some("Ann".into()),
            bio: Some("old".into()),
            ..Default::default()
        };
        UpdateProfile {
            bio: Some("new".into()),
            skills: Some(vec!["rust".into()]),
            ..Default::default()
        }
        .apply(&mut profile);
        assert_eq!(profile.name.as_deref(), Some("Ann"));
        assert_eq!(profile.bio.as_deref(), Some("new"));
        assert_eq!(profile.skills, vec!["rust"]);
    }
}
