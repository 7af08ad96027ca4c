pub mod auth;
pub mod require_owner;
pub mod require_role;
pub mod response;

pub use auth::{optional_auth, require_auth, MaybeIdentity};
pub use require_owner::{require_course_owner, OwnedCourse};
pub use require_role::require_instructor;
pub use response::{ApiResponse, ApiResult};
