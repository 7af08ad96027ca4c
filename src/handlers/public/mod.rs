// handlers/public/mod.rs - catalog reads and identity echo
//
// Security Level: none; `whoami` runs behind `optional_auth`
pub mod auth;
pub mod courses;

pub use auth::whoami_get;
pub use courses::{course_get, courses_get, instructor_courses_get};
