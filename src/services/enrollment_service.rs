use chrono::{SubsecRound, Utc};
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{ServiceError, ServiceResult};
use crate::auth::Identity;
use crate::database::models::{clamp_progress, dedup_lessons, Enrollment, EnrollmentStatus};
use crate::database::{Collection, DocumentStore, FieldPath, Query, StoreError, UpdateSet, Write, WriteResult};
use crate::validation::parse_number;

/// Body of a progress update; both fields optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    /// A number or a numeric string
    #[serde(default, deserialize_with = "numeric_progress")]
    pub progress: Option<f64>,
    #[serde(default)]
    pub completed_lessons: Option<Vec<Value>>,
}

fn numeric_progress<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => parse_number(&value)
            .map(Some)
            .ok_or_else(|| de::Error::custom("progress must be a number")),
    }
}

/// Enrollment lifecycle and the course enrollment counter
#[derive(Clone)]
pub struct EnrollmentService {
    store: Arc<dyn DocumentStore>,
}

impl EnrollmentService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Enroll the caller. The enrollment and the counter bump commit together.
    pub async fn enroll(&self, student: &Identity, course_id: &str) -> ServiceResult<Enrollment> {
        if course_id.trim().is_empty() {
            return Err(ServiceError::BadRequest("Missing required field: courseId".to_string()));
        }

        let course = self
            .store
            .get(Collection::Courses, course_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Course not found".to_string()))?;

        let enrollment = Enrollment::new(
            student.uid.as_str(),
            course.id.as_str(),
            course.str_at("title").unwrap_or_default(),
            course.str_at("instructor.name").unwrap_or_default(),
            Utc::now().trunc_subsecs(3),
        );

        let writes = vec![
            Write::Create {
                collection: Collection::Enrollments,
                data: enrollment.to_data()?,
                unique_on: vec![FieldPath::parse("studentId"), FieldPath::parse("courseId")],
            },
            Write::Update {
                collection: Collection::Courses,
                id: course.id.clone(),
                update: UpdateSet::new().with_increment("metadata.enrollments", 1),
            },
        ];

        let results = self.store.commit(writes).await.map_err(|e| match e {
            StoreError::UniqueViolation { .. } => {
                ServiceError::Conflict("Student already enrolled in this course".to_string())
            }
            StoreError::NotFound { .. } => ServiceError::NotFound("Course not found".to_string()),
            other => other.into(),
        })?;

        let created = results
            .into_iter()
            .find_map(|result| match result {
                WriteResult::Created(doc) => Some(doc),
                _ => None,
            })
            .ok_or_else(|| ServiceError::NotFound("Enrollment not found".to_string()))?;

        info!("Student {} enrolled in course {}", student.uid, course.id);
        Ok(Enrollment::from_document(&created)?)
    }

    /// The student's enrollments, newest first
    pub async fn list_for_student(&self, student_id: &str) -> ServiceResult<Vec<Enrollment>> {
        self.list(Query::new().where_eq("studentId", student_id)).await
    }

    /// A course roster, newest first
    pub async fn list_for_course(&self, course_id: &str) -> ServiceResult<Vec<Enrollment>> {
        self.list(Query::new().where_eq("courseId", course_id)).await
    }

    async fn list(&self, query: Query) -> ServiceResult<Vec<Enrollment>> {
        let docs = self.store.query(Collection::Enrollments, &query).await?;
        let mut enrollments = docs
            .iter()
            .map(Enrollment::from_document)
            .collect::<Result<Vec<_>, _>>()?;
        enrollments.sort_by(|a, b| b.enrolled_at.cmp(&a.enrolled_at));
        Ok(enrollments)
    }

    async fn owned(&self, caller: &Identity, enrollment_id: &str) -> ServiceResult<Enrollment> {
        let doc = self
            .store
            .get(Collection::Enrollments, enrollment_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Enrollment not found".to_string()))?;
        let enrollment = Enrollment::from_document(&doc)?;

        if enrollment.student_id != caller.uid {
            warn!("{} tried to modify enrollment {} owned by {}", caller.uid, enrollment.id, enrollment.student_id);
            return Err(ServiceError::Forbidden("You can only modify your own enrollments".to_string()));
        }
        Ok(enrollment)
    }

    /// Remove the caller's enrollment and decrement the course counter together
    pub async fn unenroll(&self, caller: &Identity, enrollment_id: &str) -> ServiceResult<Enrollment> {
        let enrollment = self.owned(caller, enrollment_id).await?;

        let mut writes = vec![Write::Delete {
            collection: Collection::Enrollments,
            id: enrollment.id.clone(),
        }];
        if self.store.get(Collection::Courses, &enrollment.course_id).await?.is_some() {
            writes.push(Write::Update {
                collection: Collection::Courses,
                id: enrollment.course_id.clone(),
                update: UpdateSet::new().with_increment("metadata.enrollments", -1),
            });
        } else {
            debug!("Course {} is gone; removing enrollment {} only", enrollment.course_id, enrollment.id);
        }

        self.store.commit(writes).await.map_err(|e| match e {
            StoreError::NotFound {
                collection: Collection::Enrollments,
                ..
            } => ServiceError::NotFound("Enrollment not found".to_string()),
            StoreError::NotFound { .. } => ServiceError::NotFound("Course not found".to_string()),
            other => other.into(),
        })?;

        info!("Student {} unenrolled from course {}", caller.uid, enrollment.course_id);
        Ok(enrollment)
    }

    /// Record progress. Completion is sticky: lowering progress later
    /// leaves `status` at completed.
    pub async fn update_progress(
        &self,
        caller: &Identity,
        enrollment_id: &str,
        change: ProgressUpdate,
    ) -> ServiceResult<Enrollment> {
        let enrollment = self.owned(caller, enrollment_id).await?;
        let now = Utc::now().trunc_subsecs(3);

        let mut update = UpdateSet::new();
        update.set("lastAccessedAt", serde_json::to_value(now)?);
        if let Some(progress) = change.progress {
            let progress = clamp_progress(progress);
            update.set("progress", progress);
            if progress == 100 {
                update.set("status", EnrollmentStatus::Completed.as_str());
            }
        }
        if let Some(lessons) = change.completed_lessons {
            update.set("completedLessons", Value::Array(dedup_lessons(lessons)));
        }

        let updated = self
            .store
            .update(Collection::Enrollments, &enrollment.id, &update)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Enrollment not found".to_string()))?;
        Ok(Enrollment::from_document(&updated)?)
    }
}
