//! Faculties group an institution's courses.

use careers_core::types::DocId;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const COLLECTION: &str = "faculties";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faculty {
    pub id: DocId,
    pub institution_id: DocId,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFaculty {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
}
