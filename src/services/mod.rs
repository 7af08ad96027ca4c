pub mod course_service;
pub mod enrollment_service;

pub use course_service::CourseService;
pub use enrollment_service::{EnrollmentService, ProgressUpdate};

use crate::database::StoreError;

/// Errors from course and enrollment operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Course has {0} active enrollment(s)")]
    ActiveEnrollments(i64),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// RFC 3339 UTC timestamp as stored in documents
pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
