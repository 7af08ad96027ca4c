use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use super::document::{Document, DocumentError, FieldPath, Precondition, Query, UpdateSet};

/// Document collections known to the marketplace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Courses,
    Enrollments,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Courses => "courses",
            Collection::Enrollments => "enrollments",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from DocumentStore implementations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document '{id}' not found in {collection}")]
    NotFound { collection: Collection, id: String },

    #[error("A document with the same {fields} already exists in {collection}")]
    UniqueViolation { collection: Collection, fields: String },

    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One write inside an all-or-nothing batch
#[derive(Debug, Clone)]
pub enum Write {
    /// Insert a new document. When `unique_on` is non-empty the insert fails
    /// with `UniqueViolation` if a document already has the same values there.
    Create {
        collection: Collection,
        data: Map<String, Value>,
        unique_on: Vec<FieldPath>,
    },
    /// Fails the batch with `NotFound` when the document is missing
    Update {
        collection: Collection,
        id: String,
        update: UpdateSet,
    },
    /// Fails the batch with `NotFound` when the document is missing
    Delete { collection: Collection, id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteResult {
    Created(Document),
    Updated(Document),
    Deleted(Document),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted(Document),
    NotFound,
    /// The guard did not hold; carries the document as it was
    PreconditionFailed(Document),
}

/// The document store the services run against. Implementations must make
/// every method atomic on its own, and `commit` atomic across its writes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>>;

    async fn query(&self, collection: Collection, query: &Query) -> StoreResult<Vec<Document>>;

    async fn insert(&self, collection: Collection, data: Map<String, Value>) -> StoreResult<Document>;

    /// Returns the updated document, or `None` when it does not exist
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        update: &UpdateSet,
    ) -> StoreResult<Option<Document>>;

    async fn delete(
        &self,
        collection: Collection,
        id: &str,
        precondition: Option<&Precondition>,
    ) -> StoreResult<DeleteOutcome>;

    /// Apply all writes or none. Results are returned in write order.
    async fn commit(&self, writes: Vec<Write>) -> StoreResult<Vec<WriteResult>>;

    async fn health_check(&self) -> StoreResult<()>;
}

/// New document ids: UUID v4 in simple (hyphen-free) form
pub fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Human readable list of unique fields for error messages
pub(crate) fn describe_fields(fields: &[FieldPath]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
