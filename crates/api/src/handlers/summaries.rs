//! Compact student and course views embedded in list responses, plus the
//! batched lookups that build them.

use std::collections::HashMap;

use careers_core::types::DocId;
use careers_db::models::course::Course;
use careers_db::models::user::User;
use careers_db::repositories::{CourseRepo, UserRepo};
use careers_db::{DbPool, StoreError};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct StudentSummary {
    pub id: DocId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpa: Option<f64>,
}

impl StudentSummary {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.profile_data.display_name(&user.email).to_string(),
            email: user.email.clone(),
            photo: user.profile_data.photo.clone(),
            gpa: user.profile_data.gpa,
        }
    }

    /// Placeholder for a student whose user document is gone.
    pub fn unknown(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: "Unknown student".to_string(),
            email: String::new(),
            photo: None,
            gpa: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseSummary {
    pub id: DocId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faculty: Option<String>,
}

impl CourseSummary {
    pub fn from_course(course: &Course) -> Self {
        Self {
            id: course.id.clone(),
            name: course.name.clone(),
            faculty: course.faculty.clone(),
        }
    }

    pub fn unknown(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: "Unknown course".to_string(),
            faculty: None,
        }
    }
}

/// Users keyed by id for every distinct id in `ids`.
pub async fn users_by_id<'a>(
    pool: &DbPool,
    ids: impl IntoIterator<Item = &'a DocId>,
) -> Result<HashMap<DocId, User>, StoreError> {
    let mut unique: Vec<DocId> = ids.into_iter().cloned().collect();
    unique.sort();
    unique.dedup();
    Ok(UserRepo::find_by_ids(pool, &unique)
        .await?
        .into_iter()
        .map(|u| (u.id.clone(), u))
        .collect())
}

/// An institution's courses keyed by id.
pub async fn courses_by_id(
    pool: &DbPool,
    institution_id: &str,
) -> Result<HashMap<DocId, Course>, StoreError> {
    Ok(CourseRepo::list_for_institution(pool, institution_id)
        .await?
        .into_iter()
        .map(|c| (c.id.clone(), c))
        .collect())
}

pub fn student_summary(users: &HashMap<DocId, User>, id: &str) -> StudentSummary {
    users
        .get(id)
        .map(StudentSummary::from_user)
        .unwrap_or_else(|| StudentSummary::unknown(id))
}

pub fn course_summary(courses: &HashMap<DocId, Course>, id: &str) -> CourseSummary {
    courses
        .get(id)
        .map(CourseSummary::from_course)
        .unwrap_or_else(|| CourseSummary::unknown(id))
}
