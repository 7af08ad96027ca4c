use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::document::{get_path, values_equal, Document, FieldPath, Precondition, Query, UpdateSet};
use super::store::{
    describe_fields, new_document_id, Collection, DeleteOutcome, DocumentStore, StoreError, StoreResult, Write,
    WriteResult,
};

type Collections = HashMap<Collection, BTreeMap<String, Map<String, Value>>>;

/// In-process document store for tests and local development.
///
/// A single lock guards every collection. Batches are applied to a staged
/// copy that replaces the live state only when every write succeeded.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently in a collection
    pub async fn count(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map_or(0, BTreeMap::len)
    }
}

fn insert_into(
    state: &mut Collections,
    collection: Collection,
    data: Map<String, Value>,
    unique_on: &[FieldPath],
) -> StoreResult<Document> {
    let docs = state.entry(collection).or_default();

    if !unique_on.is_empty() {
        let duplicate = docs.values().any(|existing| {
            unique_on.iter().all(|path| match (get_path(existing, path), get_path(&data, path)) {
                (Some(a), Some(b)) => values_equal(a, b),
                (None, None) => true,
                _ => false,
            })
        });
        if duplicate {
            return Err(StoreError::UniqueViolation {
                collection,
                fields: describe_fields(unique_on),
            });
        }
    }

    let doc = Document::new(new_document_id(), data);
    docs.insert(doc.id.clone(), doc.data.clone());
    Ok(doc)
}

fn update_in(
    state: &mut Collections,
    collection: Collection,
    id: &str,
    update: &UpdateSet,
) -> StoreResult<Option<Document>> {
    let Some(current) = state.get_mut(&collection).and_then(|docs| docs.get_mut(id)) else {
        return Ok(None);
    };
    let mut next = current.clone();
    update.apply(&mut next)?;
    *current = next.clone();
    Ok(Some(Document::new(id, next)))
}

fn remove_from(state: &mut Collections, collection: Collection, id: &str) -> Option<Document> {
    state
        .get_mut(&collection)
        .and_then(|docs| docs.remove(id))
        .map(|data| Document::new(id, data))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        let state = self.collections.read().await;
        Ok(state
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document::new(id, data.clone())))
    }

    async fn query(&self, collection: Collection, query: &Query) -> StoreResult<Vec<Document>> {
        let state = self.collections.read().await;
        Ok(state
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, data)| query.matches(data))
                    .map(|(id, data)| Document::new(id.clone(), data.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, collection: Collection, data: Map<String, Value>) -> StoreResult<Document> {
        let mut state = self.collections.write().await;
        insert_into(&mut state, collection, data, &[])
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        update: &UpdateSet,
    ) -> StoreResult<Option<Document>> {
        let mut state = self.collections.write().await;
        update_in(&mut state, collection, id, update)
    }

    async fn delete(
        &self,
        collection: Collection,
        id: &str,
        precondition: Option<&Precondition>,
    ) -> StoreResult<DeleteOutcome> {
        let mut state = self.collections.write().await;
        let Some(data) = state.get(&collection).and_then(|docs| docs.get(id)) else {
            return Ok(DeleteOutcome::NotFound);
        };
        if let Some(guard) = precondition {
            if !guard.holds(data) {
                return Ok(DeleteOutcome::PreconditionFailed(Document::new(id, data.clone())));
            }
        }
        Ok(remove_from(&mut state, collection, id).map_or(DeleteOutcome::NotFound, DeleteOutcome::Deleted))
    }

    async fn commit(&self, writes: Vec<Write>) -> StoreResult<Vec<WriteResult>> {
        let mut state = self.collections.write().await;
        let mut staged = state.clone();
        let mut results = Vec::with_capacity(writes.len());

        for write in writes {
            let result = match write {
                Write::Create {
                    collection,
                    data,
                    unique_on,
                } => WriteResult::Created(insert_into(&mut staged, collection, data, &unique_on)?),
                Write::Update { collection, id, update } => {
                    match update_in(&mut staged, collection, &id, &update)? {
                        Some(doc) => WriteResult::Updated(doc),
                        None => return Err(StoreError::NotFound { collection, id }),
                    }
                }
                Write::Delete { collection, id } => match remove_from(&mut staged, collection, &id) {
                    Some(doc) => WriteResult::Deleted(doc),
                    None => return Err(StoreError::NotFound { collection, id }),
                },
            };
            results.push(result);
        }

        *state = staged;
        Ok(results)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
