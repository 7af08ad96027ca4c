pub mod course;
pub mod enrollment;

pub use course::{
    default_category, default_specifications, enrollment_count, owner_id, slugify, Category, Course, CourseMetadata,
    Instructor, Level, Specifications, SyllabusModule,
};
pub use enrollment::{clamp_progress, dedup_lessons, Enrollment, EnrollmentStatus};
