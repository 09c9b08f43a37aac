/// Document ids are opaque strings assigned by the store or the identity provider.
pub type DocId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh document id (UUID v7, so ids sort by creation time).
pub fn new_doc_id() -> DocId {
    uuid::Uuid::now_v7().simple().to_string()
}
