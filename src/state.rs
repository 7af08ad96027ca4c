use std::sync::Arc;

use crate::auth::{IdentityVerifier, JwtVerifier, RolePolicy};
use crate::config::AppConfig;
use crate::database::DocumentStore;
use crate::services::{CourseService, EnrollmentService};

/// Shared handles for every request. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            verifier,
        }
    }

    /// State using the bundled HS256 verifier keyed by `security.jwt_secret`
    pub fn with_jwt(config: AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        let verifier = Arc::new(JwtVerifier::new(config.security.jwt_secret.clone()));
        Self::new(config, store, verifier)
    }

    pub fn courses(&self) -> CourseService {
        CourseService::new(self.store.clone())
    }

    pub fn enrollments(&self) -> EnrollmentService {
        EnrollmentService::new(self.store.clone())
    }

    pub fn role_policy(&self) -> RolePolicy {
        RolePolicy::from(&self.config.security)
    }
}
