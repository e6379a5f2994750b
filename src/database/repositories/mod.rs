//! One module per table (or table pair) with thin `sqlx` query wrappers.

pub mod audit_log;
pub mod authoring;
pub mod catalog;
pub mod course;
pub mod enrollment;
pub mod feedback;
pub mod progress;
pub mod quiz;
pub mod revenue;
pub mod review;
pub mod system;
pub mod user;

pub use audit_log::AuditLogRepository;
pub use authoring::AuthoringRepository;
pub use catalog::CatalogRepository;
pub use course::CourseRepository;
pub use enrollment::EnrollmentRepository;
pub use feedback::FeedbackRepository;
pub use quiz::QuizRepository;
pub use revenue::RevenueRepository;
pub use review::ReviewRepository;
pub use system::SystemRepository;
pub use user::UserRepository;
