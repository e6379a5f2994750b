// handlers/public/mod.rs - catalog browsing plus learning routes keyed by an
// explicit studentId

pub mod catalog;
pub mod courses;
pub mod lessons;

pub use catalog::{catalog_list, catalog_tags, course_detail, course_related};
pub use courses::{course_content, course_progress};
pub use lessons::{lesson_complete, lesson_progress};
