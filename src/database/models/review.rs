use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CourseReview {
    pub id: i64,
    pub course_id: i64,
    pub student_id: i64,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Review as shown on the public course page
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PublicReview {
    pub id: i64,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub student_name: String,
    pub student_avatar: Option<String>,
}

/// Aggregate of every review of one course
#[derive(Debug, Clone, Copy, Default, FromRow)]
pub struct RatingStats {
    pub average_rating: f64,
    pub total_reviews: i64,
    pub rating_5: i64,
    pub rating_4: i64,
    pub rating_3: i64,
    pub rating_2: i64,
    pub rating_1: i64,
}
