pub mod course;
pub mod sanitize;

pub use course::{parse_number, parse_price, validate_course, ValidationResult};
pub use sanitize::{price_value, sanitize_course, COURSE_FIELDS};
