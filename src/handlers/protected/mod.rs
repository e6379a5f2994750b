// handlers/protected/mod.rs - routes behind jwt_auth_middleware

pub mod enrollments;
pub mod instructor;
pub mod quizzes;
pub mod recommendations;
pub mod reviews;
