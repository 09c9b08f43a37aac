//! Repository for the `faculties` collection.

use careers_core::types::DocId;

use super::{fetch, fetch_all, insert};
use crate::models::faculty::{Faculty, COLLECTION};
use crate::store::{Direction, Query, StoreError};
use crate::DbPool;

pub struct FacultyRepo;

impl FacultyRepo {
    pub async fn create(
        pool: &DbPool,
        institution_id: &str,
        name: &str,
    ) -> Result<Faculty, StoreError> {
        let faculty = Faculty {
            id: DocId::new(),
            institution_id: institution_id.to_string(),
            name: name.trim().to_string(),
        };
        insert(pool, COLLECTION, &faculty).await
    }

    pub async fn find_owned(
        pool: &DbPool,
        id: &str,
        institution_id: &str,
    ) -> Result<Option<Faculty>, StoreError> {
        Ok(fetch::<Faculty>(pool, COLLECTION, id)
            .await?
            .filter(|f| f.institution_id == institution_id))
    }

    /// An institution's faculties in name order.
    pub async fn list_for_institution(
        pool: &DbPool,
        institution_id: &str,
    ) -> Result<Vec<Faculty>, StoreError> {
        let query = Query::new()
            .eq("institutionId", institution_id)
            .order_by("name", Direction::Asc);
        fetch_all(pool, COLLECTION, &query).await
    }
}
