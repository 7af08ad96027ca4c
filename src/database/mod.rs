pub mod document;
pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod query_builder;
pub mod store;

pub use document::{Document, DocumentError, FieldOp, FieldPath, Precondition, Query, UpdateSet};
pub use manager::DatabaseManager;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{Collection, DeleteOutcome, DocumentStore, StoreError, StoreResult, Write, WriteResult};
