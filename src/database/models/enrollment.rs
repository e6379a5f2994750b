use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: i64,
    pub course_id: i64,
    pub student_id: i64,
    pub status: String,
    pub enrolled_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Flat row behind the "my courses" listing
#[derive(Debug, Clone, FromRow)]
pub struct EnrolledCourseRow {
    pub enrollment_id: i64,
    pub enrollment_status: String,
    pub enrolled_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub course_id: i64,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub price_cents: i64,
    pub currency: String,
    pub instructor_id: i64,
    pub instructor_name: String,
    pub instructor_avatar: Option<String>,
    pub progress_percent: i32,
    pub avg_rating: f64,
    pub review_count: i64,
}

/// Minimal course facts needed to accept an enrollment
#[derive(Debug, Clone, Copy, FromRow)]
pub struct CourseAvailability {
    pub id: i64,
    pub is_published: bool,
}
