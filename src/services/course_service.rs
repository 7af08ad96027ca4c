use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

use super::{now_timestamp, ServiceError, ServiceResult};
use crate::auth::Identity;
use crate::database::models::{default_category, default_specifications, enrollment_count, slugify};
use crate::database::{Collection, DeleteOutcome, Document, DocumentStore, FieldPath, Precondition, Query, UpdateSet};
use crate::validation::{sanitize_course, validate_course};

/// Course create, read, update and delete against the document store
#[derive(Clone)]
pub struct CourseService {
    store: Arc<dyn DocumentStore>,
}

impl CourseService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Published courses only
    pub async fn list_published(&self) -> ServiceResult<Vec<Document>> {
        let query = Query::new().where_eq("metadata.isPublished", true);
        Ok(self.store.query(Collection::Courses, &query).await?)
    }

    /// Every course owned by the instructor, published or not
    pub async fn list_by_instructor(&self, instructor_id: &str) -> ServiceResult<Vec<Document>> {
        let query = Query::new().where_eq("instructor.id", instructor_id);
        Ok(self.store.query(Collection::Courses, &query).await?)
    }

    /// Plain read without side effects
    pub async fn find(&self, id: &str) -> ServiceResult<Option<Document>> {
        Ok(self.store.get(Collection::Courses, id).await?)
    }

    /// Read by id, counting the view
    pub async fn view(&self, id: &str) -> ServiceResult<Document> {
        let update = UpdateSet::new().with_increment("metadata.views", 1);
        self.store
            .update(Collection::Courses, id, &update)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Course not found".to_string()))
    }

    pub async fn create(&self, payload: &Value, caller: &Identity) -> ServiceResult<Document> {
        let result = validate_course(payload, false);
        if !result.is_valid {
            return Err(ServiceError::Validation(result.errors));
        }

        let data = build_course(payload, caller, &now_timestamp());
        let course = self.store.insert(Collection::Courses, data).await?;
        info!("Course {} created by {}", course.id, caller.uid);
        Ok(course)
    }

    /// Partial update of a course the caller already owns
    pub async fn update(&self, course: &Document, payload: &Value) -> ServiceResult<Document> {
        let result = validate_course(payload, true);
        if !result.is_valid {
            return Err(ServiceError::Validation(result.errors));
        }

        let update = build_update(&sanitize_course(payload), &now_timestamp())?;
        debug!("Updating course {} with {} field(s)", course.id, update.len());

        self.store
            .update(Collection::Courses, &course.id, &update)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Course not found".to_string()))
    }

    /// Delete, refused while the course has live enrollments
    pub async fn delete(&self, id: &str) -> ServiceResult<Document> {
        let guard = Precondition::equals("metadata.enrollments", 0);
        match self.store.delete(Collection::Courses, id, Some(&guard)).await? {
            DeleteOutcome::Deleted(course) => {
                info!("Course {} deleted", id);
                Ok(course)
            }
            DeleteOutcome::NotFound => Err(ServiceError::NotFound("Course not found".to_string())),
            DeleteOutcome::PreconditionFailed(course) => {
                Err(ServiceError::ActiveEnrollments(enrollment_count(&course)))
            }
        }
    }
}

/// Overlay the supplied object's keys on top of the defaults
fn merge_over(defaults: Value, supplied: Option<&Value>) -> Value {
    match (defaults, supplied.and_then(Value::as_object)) {
        (Value::Object(mut merged), Some(supplied)) => {
            for (key, value) in supplied {
                merged.insert(key.clone(), value.clone());
            }
            Value::Object(merged)
        }
        (defaults, _) => defaults,
    }
}

/// Explicit `false` in `metadata.isPublished` or top-level `isPublished` unpublishes
fn flag(payload: &Value, key: &str) -> Option<bool> {
    payload
        .get("metadata")
        .and_then(|m| m.get(key))
        .and_then(Value::as_bool)
        .or_else(|| payload.get(key).and_then(Value::as_bool))
}

/// The stored body of a new course. The payload must already be valid.
pub fn build_course(payload: &Value, caller: &Identity, now: &str) -> Map<String, Value> {
    let mut sanitized = sanitize_course(payload);

    let title = sanitized.remove("title").unwrap_or_else(|| Value::String(String::new()));
    let slug = slugify(title.as_str().unwrap_or_default());

    let mut instructor = match sanitized.remove("instructor") {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    instructor.insert("id".to_string(), Value::String(caller.uid.clone()));
    let has_name = instructor
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|name| !name.trim().is_empty());
    if !has_name {
        instructor.insert("name".to_string(), Value::String(caller.name.clone()));
    }
    if let (false, Some(email)) = (instructor.contains_key("email"), caller.email.as_ref()) {
        instructor.insert("email".to_string(), Value::String(email.clone()));
    }

    let metadata = serde_json::json!({
        "createdAt": now,
        "updatedAt": now,
        "createdBy": caller.uid,
        "views": 0,
        "enrollments": 0,
        "avgRating": 0,
        "isPublished": flag(payload, "isPublished") != Some(false),
        "featured": flag(payload, "featured") == Some(true),
    });

    let mut course = Map::new();
    course.insert("title".to_string(), title);
    course.insert("slug".to_string(), Value::String(slug));
    course.insert("price".to_string(), sanitized.remove("price").unwrap_or(Value::from(0)));
    course.insert(
        "description".to_string(),
        sanitized.remove("description").unwrap_or_else(|| Value::String(String::new())),
    );
    course.insert(
        "category".to_string(),
        merge_over(default_category(), sanitized.get("category")),
    );
    course.insert("instructor".to_string(), Value::Object(instructor));
    course.insert(
        "syllabus".to_string(),
        sanitized.remove("syllabus").unwrap_or_else(|| Value::Array(vec![])),
    );
    course.insert(
        "specifications".to_string(),
        merge_over(default_specifications(), sanitized.get("specifications")),
    );
    course.insert("reviews".to_string(), Value::Array(vec![]));
    course.insert("metadata".to_string(), metadata);
    course
}

/// Sparse field-path update for a sanitized partial payload.
///
/// Nested objects are written key by key so omitted sub-fields survive.
/// Ownership and counters are never written from a payload.
pub fn build_update(sanitized: &Map<String, Value>, now: &str) -> ServiceResult<UpdateSet> {
    let mut update = UpdateSet::new();

    if let Some(title) = sanitized.get("title").and_then(Value::as_str) {
        update.set("title", title).set("slug", slugify(title));
    }
    for key in ["price", "description", "syllabus"] {
        if let Some(value) = sanitized.get(key) {
            update.set(key, value.clone());
        }
    }
    for parent in ["category", "specifications", "instructor"] {
        let Some(fields) = sanitized.get(parent).and_then(Value::as_object) else {
            continue;
        };
        for (key, value) in fields {
            if parent == "instructor" && key == "id" {
                continue;
            }
            update.set(FieldPath::from_segments([parent, key.as_str()]), value.clone());
        }
    }
    if let Some(metadata) = sanitized.get("metadata").and_then(Value::as_object) {
        for key in ["isPublished", "featured"] {
            if let Some(flag) = metadata.get(key).and_then(Value::as_bool) {
                update.set(FieldPath::from_segments(["metadata", key]), flag);
            }
        }
    }

    if update.is_empty() {
        return Err(ServiceError::BadRequest("No valid fields to update".to_string()));
    }
    update.set("metadata.updatedAt", now);
    Ok(update)
}
