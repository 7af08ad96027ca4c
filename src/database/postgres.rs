use async_trait::async_trait;
use futures::TryStreamExt;
use serde_json::{Map, Value};
use sqlx::{postgres::PgRow, PgConnection, PgPool, Row};

use super::document::{get_path, Document, FieldPath, Precondition, Query, UpdateSet};
use super::query_builder::{bind_param, QueryBuilder};
use super::store::{
    describe_fields, new_document_id, Collection, DeleteOutcome, DocumentStore, StoreError, StoreResult, Write,
    WriteResult,
};

const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL-backed store: one JSONB row per document.
///
/// Updates read the row `FOR UPDATE`, apply the field ops in Rust and write
/// the body back inside one transaction, so increments are never lost.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_document(row: PgRow) -> StoreResult<Document> {
    let id: String = row.try_get("id")?;
    let data: Value = row.try_get("data")?;
    Ok(Document::from_value(id, data)?)
}

async fn lock_document(conn: &mut PgConnection, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
    let row = sqlx::query("SELECT id, data FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE")
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    row.map(row_to_document).transpose()
}

async fn update_locked(
    conn: &mut PgConnection,
    collection: Collection,
    id: &str,
    update: &UpdateSet,
) -> StoreResult<Option<Document>> {
    let Some(mut doc) = lock_document(conn, collection, id).await? else {
        return Ok(None);
    };
    update.apply(&mut doc.data)?;

    sqlx::query("UPDATE documents SET data = $3, updated_at = now() WHERE collection = $1 AND id = $2")
        .bind(collection.as_str())
        .bind(id)
        .bind(Value::Object(doc.data.clone()))
        .execute(&mut *conn)
        .await?;

    Ok(Some(doc))
}

async fn insert_locked(
    conn: &mut PgConnection,
    collection: Collection,
    data: Map<String, Value>,
    unique_on: &[FieldPath],
) -> StoreResult<Document> {
    if !unique_on.is_empty() {
        // Serialize check-then-insert for this key until the transaction ends
        let key = unique_on
            .iter()
            .map(|path| format!("{}={}", path, get_path(&data, path).unwrap_or(&Value::Null)))
            .collect::<Vec<_>>()
            .join("|");
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(format!("{}|{}", collection, key))
            .execute(&mut *conn)
            .await?;

        let query = unique_on.iter().fold(Query::new(), |query, path| {
            query.where_eq(path.clone(), get_path(&data, path).cloned().unwrap_or(Value::Null))
        });
        let sql = QueryBuilder::new(collection).filter(&query).exists_sql();
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param(q, p);
        }
        let found: bool = q.fetch_one(&mut *conn).await?.try_get("found")?;
        if found {
            return Err(StoreError::UniqueViolation {
                collection,
                fields: describe_fields(unique_on),
            });
        }
    }

    let doc = Document::new(new_document_id(), data);
    let inserted = sqlx::query("INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)")
        .bind(collection.as_str())
        .bind(&doc.id)
        .bind(Value::Object(doc.data.clone()))
        .execute(&mut *conn)
        .await;

    match inserted {
        Ok(_) => Ok(doc),
        Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            Err(StoreError::UniqueViolation {
                collection,
                fields: describe_fields(unique_on),
            })
        }
        Err(e) => Err(e.into()),
    }
}

async fn delete_returning(conn: &mut PgConnection, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
    let row = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2 RETURNING id, data")
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    row.map(row_to_document).transpose()
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        let row = sqlx::query("SELECT id, data FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_document).transpose()
    }

    async fn query(&self, collection: Collection, query: &Query) -> StoreResult<Vec<Document>> {
        let sql = QueryBuilder::new(collection).filter(query).select_sql();
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param(q, p);
        }

        let rows: Vec<PgRow> = q.fetch(&self.pool).try_collect().await?;
        rows.into_iter().map(row_to_document).collect()
    }

    async fn insert(&self, collection: Collection, data: Map<String, Value>) -> StoreResult<Document> {
        let mut conn = self.pool.acquire().await?;
        insert_locked(&mut conn, collection, data, &[]).await
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        update: &UpdateSet,
    ) -> StoreResult<Option<Document>> {
        let mut tx = self.pool.begin().await?;
        let updated = update_locked(&mut tx, collection, id, update).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(
        &self,
        collection: Collection,
        id: &str,
        precondition: Option<&Precondition>,
    ) -> StoreResult<DeleteOutcome> {
        let mut tx = self.pool.begin().await?;
        let Some(doc) = lock_document(&mut tx, collection, id).await? else {
            return Ok(DeleteOutcome::NotFound);
        };
        if let Some(guard) = precondition {
            if !guard.holds(&doc.data) {
                return Ok(DeleteOutcome::PreconditionFailed(doc));
            }
        }

        let deleted = delete_returning(&mut tx, collection, id).await?;
        tx.commit().await?;
        Ok(deleted.map_or(DeleteOutcome::NotFound, DeleteOutcome::Deleted))
    }

    async fn commit(&self, writes: Vec<Write>) -> StoreResult<Vec<WriteResult>> {
        // Any early return drops `tx`, which rolls the batch back
        let mut tx = self.pool.begin().await?;
        let mut results = Vec::with_capacity(writes.len());

        for write in writes {
            let result = match write {
                Write::Create {
                    collection,
                    data,
                    unique_on,
                } => WriteResult::Created(insert_locked(&mut tx, collection, data, &unique_on).await?),
                Write::Update { collection, id, update } => {
                    match update_locked(&mut tx, collection, &id, &update).await? {
                        Some(doc) => WriteResult::Updated(doc),
                        None => return Err(StoreError::NotFound { collection, id }),
                    }
                }
                Write::Delete { collection, id } => match delete_returning(&mut tx, collection, &id).await? {
                    Some(doc) => WriteResult::Deleted(doc),
                    None => return Err(StoreError::NotFound { collection, id }),
                },
            };
            results.push(result);
        }

        tx.commit().await?;
        Ok(results)
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
