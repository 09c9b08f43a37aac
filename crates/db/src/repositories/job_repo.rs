//! Repository for the `jobs` collection.

use careers_core::status::JobStatus;
use careers_core::types::DocId;
use serde_json::json;

use super::{fetch, fetch_all, insert};
use crate::models::job::{CreateJob, JobPosting, COLLECTION};
use crate::store::{Direction, Query, StoreError};
use crate::DbPool;

pub struct JobRepo;

impl JobRepo {
    pub async fn create(
        pool: &DbPool,
        company_id: &str,
        company: &str,
        input: &CreateJob,
    ) -> Result<JobPosting, StoreError> {
        let job = JobPosting {
            id: DocId::new(),
            company_id: company_id.to_string(),
            company: company.to_string(),
            title: input.title.trim().to_string(),
            description: input.description.clone(),
            skills: input.skills.clone(),
            status: JobStatus::Open,
            posted_at: chrono::Utc::now(),
        };
        insert(pool, COLLECTION, &job).await
    }

    pub async fn find_owned(
        pool: &DbPool,
        id: &str,
        company_id: &str,
    ) -> Result<Option<JobPosting>, StoreError> {
        Ok(fetch::<JobPosting>(pool, COLLECTION, id)
            .await?
            .filter(|j| j.company_id == company_id))
    }

    pub async fn list_for_company(
        pool: &DbPool,
        company_id: &str,
    ) -> Result<Vec<JobPosting>, StoreError> {
        let query = Query::new()
            .eq("companyId", company_id)
            .order_by("postedAt", Direction::Desc);
        fetch_all(pool, COLLECTION, &query).await
    }

    pub async fn list_open(pool: &DbPool) -> Result<Vec<JobPosting>, StoreError> {
        let query = Query::new().eq("status", JobStatus::Open.as_str());
        fetch_all(pool, COLLECTION, &query).await
    }

    pub async fn set_status(
        pool: &DbPool,
        id: &str,
        status: JobStatus,
    ) -> Result<JobPosting, StoreError> {
        pool.update(COLLECTION, id, json!({ "status": status }))
            .await?
            .decode()
    }
}
