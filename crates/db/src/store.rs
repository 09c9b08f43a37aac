//! The document-store interface.
//!
//! Documents are JSON objects grouped into named collections and keyed by
//! a string id. The id is not part of the stored body; [`Document::decode`]
//! injects it under `"id"` so models can carry it as a plain field. Every
//! write bumps the document's `version`, which
//! [`DocumentStore::compare_and_set`] uses for optimistic concurrency.

use async_trait::async_trait;
use careers_core::types::{DocId, Timestamp};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Field name under which the document id is exposed to models and filters.
pub const ID_FIELD: &str = "id";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document {collection}/{id} not found")]
    NotFound { collection: String, id: DocId },

    #[error("Document {collection}/{id} changed: expected version {expected}, found {actual}")]
    VersionConflict {
        collection: String,
        id: DocId,
        expected: u64,
        actual: u64,
    },

    #[error("Document {collection}/{id} is under contention, gave up after retries")]
    Contention { collection: String, id: DocId },

    #[error("Document body must be a JSON object")]
    NotAnObject,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Unsupported store URL '{0}'")]
    UnsupportedUrl(String),
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A stored document with its bookkeeping metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocId,
    /// Starts at 1 and increases by one on every write.
    pub version: u64,
    pub data: Value,
    pub create_time: Timestamp,
    pub update_time: Timestamp,
}

impl Document {
    /// Deserialize the body into `T`, with the id injected as `"id"`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut body = self.data.clone();
        if let Value::Object(map) = &mut body {
            map.insert(ID_FIELD.to_string(), Value::String(self.id.clone()));
        }
        Ok(serde_json::from_value(body)?)
    }

    /// Read a possibly dotted field path (`"profileData.gpa"`).
    pub fn field(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.data, |value, key| value.get(key))
    }
}

/// Serialize a model into a storable body, dropping its `"id"` field.
pub fn to_data<T: Serialize>(value: &T) -> Result<Value, StoreError> {
    let mut body = serde_json::to_value(value)?;
    match &mut body {
        Value::Object(map) => {
            map.remove(ID_FIELD);
            Ok(body)
        }
        _ => Err(StoreError::NotAnObject),
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    /// Value must be a JSON array; matches if the field equals any element.
    In,
    Gte,
    Lte,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    /// Dotted path, or [`ID_FIELD`] to match the document id.
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Conjunctive field filters with optional ordering and limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<FieldFilter>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    fn filter(mut self, field: &str, op: FilterOp, value: impl Into<Value>) -> Self {
        self.filters.push(FieldFilter {
            field: field.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Eq, value)
    }

    pub fn is_in(self, field: &str, values: Vec<Value>) -> Self {
        self.filter(field, FilterOp::In, Value::Array(values))
    }

    pub fn gte(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Gte, value)
    }

    pub fn lte(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Lte, value)
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

// ---------------------------------------------------------------------------
// DocumentStore
// ---------------------------------------------------------------------------

/// A collection-oriented document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document, or `None` if it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Create or fully replace the document at `id`.
    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<Document, StoreError>;

    /// Create a document under a generated id.
    async fn add(&self, collection: &str, data: Value) -> Result<Document, StoreError>;

    /// Merge the top-level keys of `patch` into an existing document.
    ///
    /// Fails with [`StoreError::NotFound`] if the document does not exist.
    async fn update(&self, collection: &str, id: &str, patch: Value)
        -> Result<Document, StoreError>;

    /// Delete a document. Returns `false` if it did not exist.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    /// Run a filtered, ordered query over one collection.
    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Replace the document only if its current version is `expected_version`.
    ///
    /// Fails with [`StoreError::VersionConflict`] otherwise.
    async fn compare_and_set(
        &self,
        collection: &str,
        id: &str,
        expected_version: u64,
        data: Value,
    ) -> Result<Document, StoreError>;

    /// Cheap reachability probe.
    async fn ping(&self) -> Result<(), StoreError>;
}
