//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&DbPool` as the first argument. Shared read/write helpers and
//! the optimistic-concurrency loop live in this module.

pub mod activity_repo;
pub mod admission_repo;
pub mod application_repo;
pub mod chat_repo;
pub mod course_repo;
pub mod event_repo;
pub mod faculty_repo;
pub mod job_repo;
pub mod notification_repo;
pub mod user_repo;

pub use activity_repo::ActivityRepo;
pub use admission_repo::AdmissionRepo;
pub use application_repo::ApplicationRepo;
pub use chat_repo::ChatRepo;
pub use course_repo::{CourseRepo, SeatReservation};
pub use event_repo::{EventRepo, RsvpOutcome};
pub use faculty_repo::FacultyRepo;
pub use job_repo::JobRepo;
pub use notification_repo::NotificationRepo;
pub use user_repo::UserRepo;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::store::{to_data, Query, StoreError};
use crate::DbPool;

/// Bounded retries for read-modify-write cycles that lose a version race.
pub const MAX_CAS_ATTEMPTS: usize = 5;

/// A decoded document together with the version it was read at.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub value: T,
    pub version: u64,
}

/// Result of [`modify`].
#[derive(Debug, Clone)]
pub enum Modified<T> {
    /// The closure accepted the change and it was written.
    Written(T),
    /// The closure declined; the current value is returned unchanged.
    Declined(T),
    /// No document with that id.
    Missing,
}

pub(crate) async fn fetch<T: DeserializeOwned>(
    pool: &DbPool,
    collection: &str,
    id: &str,
) -> Result<Option<T>, StoreError> {
    pool.get(collection, id)
        .await?
        .map(|doc| doc.decode())
        .transpose()
}

pub(crate) async fn fetch_versioned<T: DeserializeOwned>(
    pool: &DbPool,
    collection: &str,
    id: &str,
) -> Result<Option<Versioned<T>>, StoreError> {
    match pool.get(collection, id).await? {
        Some(doc) => Ok(Some(Versioned {
            value: doc.decode()?,
            version: doc.version,
        })),
        None => Ok(None),
    }
}

pub(crate) async fn fetch_all<T: DeserializeOwned>(
    pool: &DbPool,
    collection: &str,
    query: &Query,
) -> Result<Vec<T>, StoreError> {
    pool.query(collection, query)
        .await?
        .iter()
        .map(|doc| doc.decode())
        .collect()
}

/// Store `value` under a generated id and return it with that id.
pub(crate) async fn insert<T: Serialize + DeserializeOwned>(
    pool: &DbPool,
    collection: &str,
    value: &T,
) -> Result<T, StoreError> {
    pool.add(collection, to_data(value)?).await?.decode()
}

/// Replace a document if it is still at `expected_version`.
pub(crate) async fn replace<T: Serialize + DeserializeOwned>(
    pool: &DbPool,
    collection: &str,
    id: &str,
    expected_version: u64,
    value: &T,
) -> Result<T, StoreError> {
    pool.compare_and_set(collection, id, expected_version, to_data(value)?)
        .await?
        .decode()
}

/// Optimistic read-modify-write.
///
/// Reads the document, lets `apply` mutate it, and writes it back with
/// compare-and-set. A lost race re-reads and re-applies, up to
/// [`MAX_CAS_ATTEMPTS`] times. `apply` returns `false` to abort without
/// writing.
pub(crate) async fn modify<T, F>(
    pool: &DbPool,
    collection: &str,
    id: &str,
    mut apply: F,
) -> Result<Modified<T>, StoreError>
where
    T: Serialize + DeserializeOwned + Send,
    F: FnMut(&mut T) -> bool + Send,
{
    for attempt in 1..=MAX_CAS_ATTEMPTS {
        let Some(current) = fetch_versioned::<T>(pool, collection, id).await? else {
            return Ok(Modified::Missing);
        };
        let mut value = current.value;
        if !apply(&mut value) {
            return Ok(Modified::Declined(value));
        }
        match replace(pool, collection, id, current.version, &value).await {
            Ok(written) => return Ok(Modified::Written(written)),
            Err(StoreError::VersionConflict { .. }) => {
                tracing::debug!(collection, id, attempt, "Version conflict, retrying");
            }
            Err(e) => return Err(e),
        }
    }
    Err(StoreError::Contention {
        collection: collection.to_string(),
        id: id.to_string(),
    })
}
