use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// A stored document: an opaque id plus a JSON object body.
///
/// Rendered on the wire as `{ "id": ..., ...fields }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

/// Errors raised while reading or mutating document bodies
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Expected a JSON object for document '{0}'")]
    NotAnObject(String),
    #[error("Field '{0}' is not an integer and cannot be incremented")]
    NotAnInteger(FieldPath),
    #[error("Empty field path")]
    EmptyPath,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Map<String, Value>) -> Self {
        let mut data = data;
        data.remove("id");
        Self { id: id.into(), data }
    }

    /// Build from a stored JSON value, which must be an object
    pub fn from_value(id: impl Into<String>, value: Value) -> Result<Self, DocumentError> {
        let id = id.into();
        match value {
            Value::Object(map) => Ok(Self::new(id, map)),
            _ => Err(DocumentError::NotAnObject(id)),
        }
    }

    /// Look up a nested field by dotted path, e.g. `metadata.enrollments`
    pub fn get(&self, path: &str) -> Option<&Value> {
        get_path(&self.data, &FieldPath::parse(path))
    }

    pub fn str_at(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    pub fn i64_at(&self, path: &str) -> Option<i64> {
        self.get(path).and_then(Value::as_i64)
    }

    pub fn bool_at(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    /// Full JSON rendering including the id
    pub fn to_value(&self) -> Value {
        let mut map = Map::with_capacity(self.data.len() + 1);
        map.insert("id".to_string(), Value::String(self.id.clone()));
        for (key, value) in &self.data {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map)
    }
}

/// A path into a nested document, one segment per object level.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Split a dotted path. Empty segments are dropped.
    pub fn parse(dotted: &str) -> Self {
        Self(
            dotted
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Build from explicit segments; segments may contain dots.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl From<&str> for FieldPath {
    fn from(dotted: &str) -> Self {
        Self::parse(dotted)
    }
}

impl From<String> for FieldPath {
    fn from(dotted: String) -> Self {
        Self::parse(&dotted)
    }
}

pub fn get_path<'a>(data: &'a Map<String, Value>, path: &FieldPath) -> Option<&'a Value> {
    let (first, rest) = path.segments().split_first()?;
    let mut current = data.get(first)?;
    for segment in rest {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Set a nested field, creating (or replacing non-object) intermediate levels
pub fn set_path(data: &mut Map<String, Value>, path: &FieldPath, value: Value) -> Result<(), DocumentError> {
    let (last, parents) = path.segments().split_last().ok_or(DocumentError::EmptyPath)?;
    let mut current = data;
    for segment in parents {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = match slot {
            Value::Object(map) => map,
            _ => unreachable!("slot was just made an object"),
        };
    }
    current.insert(last.clone(), value);
    Ok(())
}

/// JSON equality where numbers compare numerically (`0 == 0.0`)
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

/// One field-level write
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    Set(Value),
    /// Add to an integer field; a missing or null field counts as zero.
    Increment(i64),
}

/// A sparse set of field-path writes applied atomically to one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSet {
    ops: BTreeMap<FieldPath, FieldOp>,
}

impl UpdateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, path: impl Into<FieldPath>, value: impl Into<Value>) -> &mut Self {
        self.ops.insert(path.into(), FieldOp::Set(value.into()));
        self
    }

    pub fn increment(&mut self, path: impl Into<FieldPath>, by: i64) -> &mut Self {
        self.ops.insert(path.into(), FieldOp::Increment(by));
        self
    }

    pub fn with_set(mut self, path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        self.set(path, value);
        self
    }

    pub fn with_increment(mut self, path: impl Into<FieldPath>, by: i64) -> Self {
        self.increment(path, by);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn get(&self, path: &str) -> Option<&FieldOp> {
        self.ops.get(&FieldPath::parse(path))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &FieldOp)> {
        self.ops.iter()
    }

    /// Apply every op to `data`. On error `data` may be partially written, so
    /// callers apply to a copy.
    pub fn apply(&self, data: &mut Map<String, Value>) -> Result<(), DocumentError> {
        for (path, op) in &self.ops {
            match op {
                FieldOp::Set(value) => set_path(data, path, value.clone())?,
                FieldOp::Increment(by) => {
                    let current = match get_path(data, path) {
                        None | Some(Value::Null) => 0,
                        Some(value) => value
                            .as_i64()
                            .ok_or_else(|| DocumentError::NotAnInteger(path.clone()))?,
                    };
                    set_path(data, path, Value::from(current + by))?;
                }
            }
        }
        Ok(())
    }
}

/// Equality filters over field paths, AND-composed.
#[derive(Debug, Clone, Default)]
pub struct Query {
    filters: Vec<(FieldPath, Value)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        self.filters.push((path.into(), value.into()));
        self
    }

    pub fn filters(&self) -> &[(FieldPath, Value)] {
        &self.filters
    }

    pub fn matches(&self, data: &Map<String, Value>) -> bool {
        self.filters.iter().all(|(path, expected)| {
            get_path(data, path).is_some_and(|actual| values_equal(actual, expected))
        })
    }
}

/// A condition checked under the same lock as the write it guards.
/// A missing field compares as `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct Precondition {
    pub path: FieldPath,
    pub expected: Value,
}

impl Precondition {
    pub fn equals(path: impl Into<FieldPath>, expected: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            expected: expected.into(),
        }
    }

    pub fn holds(&self, data: &Map<String, Value>) -> bool {
        let actual = get_path(data, &self.path).unwrap_or(&Value::Null);
        values_equal(actual, &self.expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn document_serializes_id_alongside_fields() {
        let doc = Document::new("c1", object(json!({ "title": "Rust 101", "id": "ignored" })));
        let rendered = serde_json::to_value(&doc).unwrap();
        assert_eq!(rendered, json!({ "id": "c1", "title": "Rust 101" }));
        assert_eq!(doc.to_value(), rendered);
    }

    #[test]
    fn reads_nested_paths() {
        let doc = Document::new("c1", object(json!({ "metadata": { "enrollments": 3, "isPublished": true } })));
        assert_eq!(doc.i64_at("metadata.enrollments"), Some(3));
        assert_eq!(doc.bool_at("metadata.isPublished"), Some(true));
        assert!(doc.get("metadata.views").is_none());
        assert!(doc.get("metadata.enrollments.deeper").is_none());
    }

    #[test]
    fn sparse_update_preserves_sibling_fields() {
        let mut data = object(json!({ "category": { "name": "Design", "tags": ["ux"] } }));
        UpdateSet::new()
            .with_set("category.name", "Development")
            .apply(&mut data)
            .unwrap();
        assert_eq!(data["category"], json!({ "name": "Development", "tags": ["ux"] }));
    }

    #[test]
    fn set_creates_missing_parents() {
        let mut data = Map::new();
        UpdateSet::new().with_set("metadata.updatedAt", "now").apply(&mut data).unwrap();
        assert_eq!(Value::Object(data), json!({ "metadata": { "updatedAt": "now" } }));
    }

    #[test]
    fn increment_treats_missing_as_zero() {
        let mut data = object(json!({ "metadata": { "views": 4 } }));
        UpdateSet::new()
            .with_increment("metadata.views", 1)
            .with_increment("metadata.enrollments", -1)
            .apply(&mut data)
            .unwrap();
        assert_eq!(data["metadata"], json!({ "views": 5, "enrollments": -1 }));
    }

    #[test]
    fn increment_rejects_non_integers() {
        let mut data = object(json!({ "metadata": { "views": "many" } }));
        let err = UpdateSet::new()
            .with_increment("metadata.views", 1)
            .apply(&mut data)
            .unwrap_err();
        assert!(matches!(err, DocumentError::NotAnInteger(_)));
    }

    #[test]
    fn segments_may_contain_dots() {
        let mut data = Map::new();
        let path = FieldPath::from_segments(["category", "a.b"]);
        set_path(&mut data, &path, json!(1)).unwrap();
        assert_eq!(data["category"]["a.b"], json!(1));
    }

    #[test]
    fn query_and_precondition_compare_numbers_numerically() {
        let data = object(json!({ "metadata": { "enrollments": 0.0, "isPublished": true } }));
        assert!(Query::new().where_eq("metadata.isPublished", true).matches(&data));
        assert!(!Query::new().where_eq("metadata.featured", false).matches(&data));
        assert!(Precondition::equals("metadata.enrollments", 0).holds(&data));
        assert!(!Precondition::equals("metadata.views", 0).holds(&data));
    }
}
