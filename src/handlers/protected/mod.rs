// handlers/protected/mod.rs - bearer token required
//
// Middleware: require_auth on every route; course writes and the roster add
// require_instructor and require_course_owner
pub mod courses;
pub mod enrollments;

pub use courses::{course_delete, course_post, course_put};
pub use enrollments::{course_roster_get, enrollment_delete, enrollment_post, enrollments_me_get, progress_put};
