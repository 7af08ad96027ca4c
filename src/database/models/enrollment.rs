use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::database::document::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Active,
    Completed,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Active => "active",
            EnrollmentStatus::Completed => "completed",
        }
    }
}

/// A student's enrollment in one course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub student_id: String,
    pub course_id: String,
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub instructor_name: String,
    pub enrolled_at: DateTime<Utc>,
    #[serde(default)]
    pub progress: i64,
    #[serde(default)]
    pub completed_lessons: Vec<Value>,
    pub status: EnrollmentStatus,
    pub last_accessed_at: DateTime<Utc>,
}

impl Enrollment {
    /// Fresh enrollment snapshotting the course and instructor names
    pub fn new(
        student_id: impl Into<String>,
        course_id: impl Into<String>,
        course_name: impl Into<String>,
        instructor_name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: String::new(),
            student_id: student_id.into(),
            course_id: course_id.into(),
            course_name: course_name.into(),
            instructor_name: instructor_name.into(),
            enrolled_at: now,
            progress: 0,
            completed_lessons: vec![],
            status: EnrollmentStatus::Active,
            last_accessed_at: now,
        }
    }

    pub fn from_document(doc: &Document) -> Result<Self, serde_json::Error> {
        serde_json::from_value(doc.to_value())
    }

    /// Document body without the id, ready for the store
    pub fn to_data(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(mut map) => {
                map.remove("id");
                Ok(map)
            }
            _ => Ok(Map::new()),
        }
    }
}

/// Clamp to [0, 100] and round half away from zero
pub fn clamp_progress(progress: f64) -> i64 {
    if progress.is_nan() {
        return 0;
    }
    progress.clamp(0.0, 100.0).round() as i64
}

/// Drop repeated lesson ids, keeping the first occurrence
pub fn dedup_lessons(lessons: Vec<Value>) -> Vec<Value> {
    let mut unique: Vec<Value> = Vec::with_capacity(lessons.len());
    for lesson in lessons {
        if !unique.contains(&lesson) {
            unique.push(lesson);
        }
    }
    unique
}
