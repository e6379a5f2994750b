pub mod audit_log;
pub mod authoring;
pub mod catalog;
pub mod course;
pub mod enrollment;
pub mod feedback;
pub mod progress;
pub mod quiz;
pub mod review;
pub mod revenue;
pub mod system;
pub mod user;

pub use audit_log::AuditLogEntry;
pub use authoring::{CourseStudent, InstructorCourse, InstructorStudent, LessonRecord, ModuleRecord, OwnedCourse};
pub use catalog::{CatalogCourse, CourseDetailRow, CourseStats, EnrollmentState, RelatedCourse, TagSummary};
pub use course::{CourseSummary, LessonAsset, LessonRow, ModuleRow};
pub use enrollment::{CourseAvailability, EnrolledCourseRow, Enrollment};
pub use feedback::RecFeedback;
pub use progress::{CourseProgress, LessonProgress, LessonTiming};
pub use quiz::{AttemptAnswer, Quiz, QuizAttempt, QuizOption, QuizQuestion, QuizSummary};
pub use review::{CourseReview, PublicReview, RatingStats};
pub use revenue::{CourseRevenue, InstructorCourseRevenue, RevenuePoint, RevenueSummary, TagRevenue};
pub use system::SystemOverview;
pub use user::UserAccount;
