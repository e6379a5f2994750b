pub mod authoring;
pub mod catalog;
pub mod content;
pub mod enrollment;
pub mod progress;
pub mod quiz;
pub mod recommendation;
pub mod revenue;
pub mod review;
pub mod system;
pub mod users;

pub use authoring::AuthoringService;
pub use catalog::CatalogService;
pub use content::ContentService;
pub use enrollment::EnrollmentService;
pub use progress::{PgProgressStore, ProgressService, ProgressStore};
pub use quiz::QuizService;
pub use recommendation::RecommendationService;
pub use revenue::RevenueService;
pub use review::ReviewService;
pub use system::SystemService;
pub use users::UserService;

use crate::database::manager::DatabaseError;

/// Business-rule failures raised below the HTTP layer
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ServiceError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ServiceError::Forbidden(message.into())
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Database(DatabaseError::Sqlx(err))
    }
}

/// True when the error is a Postgres unique-constraint violation
pub(crate) fn is_unique_violation(err: &DatabaseError) -> bool {
    match err {
        DatabaseError::Sqlx(sqlx::Error::Database(db_err)) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
