//! In-process [`DocumentStore`] backed by nested maps.
//!
//! Writes are serialized per store behind one async `RwLock`. The store can
//! be switched offline to exercise error paths.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use async_trait::async_trait;
use careers_core::types::{new_doc_id, DocId};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::store::{
    Direction, Document, DocumentStore, FieldFilter, FilterOp, Query, StoreError, ID_FIELD,
};

type Collection = BTreeMap<DocId, Document>;

/// Document store that lives entirely in process memory.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".into()));
        }
        Ok(())
    }
}

fn ensure_object(data: &Value) -> Result<(), StoreError> {
    if data.is_object() {
        Ok(())
    } else {
        Err(StoreError::NotAnObject)
    }
}

fn not_found(collection: &str, id: &str) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    }
}

/// Insert a new document or replace an existing one, bumping its version.
fn write(collection: &mut Collection, id: &str, data: Value) -> Document {
    let now = Utc::now();
    let doc = match collection.get(id) {
        Some(existing) => Document {
            id: id.to_string(),
            version: existing.version + 1,
            data,
            create_time: existing.create_time,
            update_time: now,
        },
        None => Document {
            id: id.to_string(),
            version: 1,
            data,
            create_time: now,
            update_time: now,
        },
    };
    collection.insert(id.to_string(), doc.clone());
    doc
}

// ---------------------------------------------------------------------------
// Query evaluation
// ---------------------------------------------------------------------------

fn as_datetime(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
}

/// Order two JSON scalars of the same kind. Timestamps compare as instants.
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => match (as_datetime(a), as_datetime(b)) {
            (Some(dx), Some(dy)) => Some(dx.cmp(&dy)),
            _ => Some(x.cmp(y)),
        },
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn field_value<'a>(doc: &'a Document, field: &str, id_value: &'a Value) -> Option<&'a Value> {
    if field == ID_FIELD {
        Some(id_value)
    } else {
        doc.field(field)
    }
}

fn matches(doc: &Document, filter: &FieldFilter) -> bool {
    let id_value = Value::String(doc.id.clone());
    let Some(actual) = field_value(doc, &filter.field, &id_value) else {
        return false;
    };
    match filter.op {
        FilterOp::Eq => actual == &filter.value,
        FilterOp::In => filter
            .value
            .as_array()
            .is_some_and(|options| options.contains(actual)),
        FilterOp::Gte => matches!(
            compare_values(actual, &filter.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOp::Lte => matches!(
            compare_values(actual, &filter.value),
            Some(Ordering::Less | Ordering::Equal)
        ),
    }
}

fn run_query(collection: Option<&Collection>, query: &Query) -> Vec<Document> {
    let Some(collection) = collection else {
        return Vec::new();
    };

    let mut docs: Vec<Document> = collection
        .values()
        .filter(|doc| query.filters.iter().all(|f| matches(doc, f)))
        .cloned()
        .collect();

    if let Some((field, direction)) = &query.order_by {
        docs.sort_by(|a, b| {
            // Documents missing the field sort first in ascending order.
            let ord = match (a.field(field), b.field(field)) {
                (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            match direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            }
        });
    }

    if let Some(limit) = query.limit {
        docs.truncate(limit);
    }
    docs
}

// ---------------------------------------------------------------------------
// DocumentStore impl
// ---------------------------------------------------------------------------

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.ensure_online()?;
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|c| c.get(id)).cloned())
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<Document, StoreError> {
        self.ensure_online()?;
        ensure_object(&data)?;
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        Ok(write(docs, id, data))
    }

    async fn add(&self, collection: &str, data: Value) -> Result<Document, StoreError> {
        self.ensure_online()?;
        ensure_object(&data)?;
        let id = new_doc_id();
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        Ok(write(docs, &id, data))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
    ) -> Result<Document, StoreError> {
        self.ensure_online()?;
        let Value::Object(patch) = patch else {
            return Err(StoreError::NotAnObject);
        };
        let mut collections = self.collections.write().await;
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| not_found(collection, id))?;
        let mut data = docs
            .get(id)
            .map(|d| d.data.clone())
            .ok_or_else(|| not_found(collection, id))?;
        if let Value::Object(map) = &mut data {
            for (key, value) in patch {
                map.insert(key, value);
            }
        }
        Ok(write(docs, id, data))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        self.ensure_online()?;
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .is_some_and(|docs| docs.remove(id).is_some()))
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.ensure_online()?;
        let collections = self.collections.read().await;
        Ok(run_query(collections.get(collection), query))
    }

    async fn compare_and_set(
        &self,
        collection: &str,
        id: &str,
        expected_version: u64,
        data: Value,
    ) -> Result<Document, StoreError> {
        self.ensure_online()?;
        ensure_object(&data)?;
        let mut collections = self.collections.write().await;
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| not_found(collection, id))?;
        let actual = docs
            .get(id)
            .map(|d| d.version)
            .ok_or_else(|| not_found(collection, id))?;
        if actual != expected_version {
            return Err(StoreError::VersionConflict {
                collection: collection.to_string(),
                id: id.to_string(),
                expected: expected_version,
                actual,
            });
        }
        Ok(write(docs, id, data))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.ensure_online()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn set_get_and_version_bump() {
        let store = MemoryStore::new();
        let first = store.set("users", "u1", json!({"email": "a@b.com"})).await.unwrap();
        assert_eq!(first.version, 1);

        let second = store.set("users", "u1", json!({"email": "c@d.com"})).await.unwrap();
        assert_eq!(second.version, 2);
        assert_eq!(second.create_time, first.create_time);

        let fetched = store.get("users", "u1").await.unwrap().unwrap();
        assert_eq!(fetched.data["email"], "c@d.com");
        assert!(store.get("users", "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_merges_top_level_keys() {
        let store = MemoryStore::new();
        store
            .set("courses", "c1", json!({"name": "CS", "status": "ACTIVE"}))
            .await
            .unwrap();
        let doc = store
            .update("courses", "c1", json!({"status": "INACTIVE"}))
            .await
            .unwrap();
        assert_eq!(doc.data, json!({"name": "CS", "status": "INACTIVE"}));

        let err = store.update("courses", "nope", json!({})).await.unwrap_err();
        assert_matches!(err, StoreError::NotFound { .. });
    }

    #[tokio::test]
    async fn compare_and_set_rejects_stale_version() {
        let store = MemoryStore::new();
        let doc = store.add("courses", json!({"availableSeats": 1})).await.unwrap();

        store
            .compare_and_set("courses", &doc.id, doc.version, json!({"availableSeats": 0}))
            .await
            .unwrap();

        let err = store
            .compare_and_set("courses", &doc.id, doc.version, json!({"availableSeats": 0}))
            .await
            .unwrap_err();
        assert_matches!(err, StoreError::VersionConflict { expected: 1, actual: 2, .. });
    }

    #[tokio::test]
    async fn query_filters_orders_and_limits() {
        let store = MemoryStore::new();
        for (name, seats, created) in [
            ("a", 5, "2024-01-03T00:00:00Z"),
            ("b", 0, "2024-01-01T00:00:00.5Z"),
            ("c", 9, "2024-01-02T00:00:00Z"),
        ] {
            store
                .add(
                    "courses",
                    json!({"name": name, "seats": seats, "createdAt": created, "kind": "x"}),
                )
                .await
                .unwrap();
        }

        let q = Query::new()
            .eq("kind", "x")
            .gte("seats", 1)
            .order_by("createdAt", Direction::Desc);
        let names: Vec<_> = store
            .query("courses", &q)
            .await
            .unwrap()
            .iter()
            .map(|d| d.data["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a", "c"]);

        let q = Query::new().order_by("createdAt", Direction::Asc).limit(1);
        let first = store.query("courses", &q).await.unwrap();
        assert_eq!(first[0].data["name"], "b");
    }

    #[tokio::test]
    async fn query_by_id_and_in() {
        let store = MemoryStore::new();
        store.set("users", "u1", json!({"role": "student"})).await.unwrap();
        store.set("users", "u2", json!({"role": "company"})).await.unwrap();
        store.set("users", "u3", json!({"role": "student"})).await.unwrap();

        let q = Query::new()
            .is_in(ID_FIELD, vec![json!("u1"), json!("u2")])
            .eq("role", "student");
        let docs = store.query("users", &q).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "u1");

        assert!(store.query("empty", &Query::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_and_offline() {
        let store = MemoryStore::new();
        store.set("users", "u1", json!({})).await.unwrap();
        assert!(store.delete("users", "u1").await.unwrap());
        assert!(!store.delete("users", "u1").await.unwrap());

        store.set_offline(true);
        assert_matches!(store.ping().await, Err(StoreError::Unavailable(_)));
        assert_matches!(store.get("users", "u1").await, Err(StoreError::Unavailable(_)));
        store.set_offline(false);
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn rejects_non_object_bodies() {
        let store = MemoryStore::new();
        assert_matches!(
            store.set("users", "u1", json!([1, 2])).await,
            Err(StoreError::NotAnObject)
        );
    }
}
