use serde_json::Value;
use sqlx::{postgres::PgArguments, Postgres};

use super::document::{FieldPath, Query};
use super::store::Collection;

/// A positional SQL parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    /// Bound as `text[]` for the `#>` operator
    Path(Vec<String>),
    /// Bound as `jsonb`
    Json(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}

/// Builds statements against the `documents` table, one collection at a time.
pub struct QueryBuilder {
    collection: Collection,
    filters: Vec<(FieldPath, Value)>,
}

impl QueryBuilder {
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            filters: vec![],
        }
    }

    pub fn filter(mut self, query: &Query) -> Self {
        self.filters.extend(query.filters().iter().cloned());
        self
    }

    pub fn select_sql(&self) -> SqlResult {
        let (where_clause, params) = self.where_clause();
        SqlResult {
            query: format!("SELECT id, data FROM documents WHERE {} ORDER BY created_at, id", where_clause),
            params,
        }
    }

    pub fn exists_sql(&self) -> SqlResult {
        let (where_clause, params) = self.where_clause();
        SqlResult {
            query: format!("SELECT EXISTS (SELECT 1 FROM documents WHERE {}) AS found", where_clause),
            params,
        }
    }

    fn where_clause(&self) -> (String, Vec<SqlParam>) {
        let mut params = vec![SqlParam::Text(self.collection.as_str().to_string())];
        let mut conditions = vec!["collection = $1".to_string()];

        for (path, value) in &self.filters {
            params.push(SqlParam::Path(path.segments().to_vec()));
            let path_index = params.len();
            params.push(SqlParam::Json(value.clone()));
            let value_index = params.len();
            conditions.push(format!("data #> ${} = ${}", path_index, value_index));
        }

        (conditions.join(" AND "), params)
    }
}

pub fn bind_param<'q>(
    q: sqlx::query::Query<'q, Postgres, PgArguments>,
    p: &SqlParam,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match p {
        SqlParam::Text(s) => q.bind(s.clone()),
        SqlParam::Path(segments) => q.bind(segments.clone()),
        SqlParam::Json(v) => q.bind(v.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_collection_scoped_select() {
        let sql = QueryBuilder::new(Collection::Courses).select_sql();
        assert_eq!(
            sql.query,
            "SELECT id, data FROM documents WHERE collection = $1 ORDER BY created_at, id"
        );
        assert_eq!(sql.params, vec![SqlParam::Text("courses".to_string())]);
    }

    #[test]
    fn numbers_path_and_value_params() {
        let query = Query::new()
            .where_eq("studentId", "s1")
            .where_eq("metadata.isPublished", true);
        let sql = QueryBuilder::new(Collection::Enrollments).filter(&query).exists_sql();
        assert_eq!(
            sql.query,
            "SELECT EXISTS (SELECT 1 FROM documents WHERE collection = $1 AND data #> $2 = $3 AND data #> $4 = $5) AS found"
        );
        assert_eq!(
            sql.params[3],
            SqlParam::Path(vec!["metadata".to_string(), "isPublished".to_string()])
        );
        assert_eq!(sql.params[4], SqlParam::Json(json!(true)));
    }
}
