use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Published course card with its review and enrollment aggregates
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CatalogCourse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub price_cents: i64,
    pub currency: String,
    pub lang: String,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub instructor_id: i64,
    pub instructor_name: String,
    pub instructor_avatar: Option<String>,
    pub avg_rating: f64,
    pub review_count: i64,
    pub enrollment_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetailRow {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub price_cents: i64,
    pub currency: String,
    pub lang: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub instructor_id: i64,
    pub instructor_name: String,
    pub instructor_avatar: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CourseStats {
    pub total_students: i64,
    pub total_lessons: i64,
    pub total_duration_s: i64,
    pub total_modules: i64,
}

/// Same-instructor courses come first (priority 1), popular ones after
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RelatedCourse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub thumbnail_url: Option<String>,
    pub instructor_name: String,
    pub total_students: i64,
    pub avg_rating: f64,
    pub priority: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TagSummary {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub course_count: i64,
}

/// The viewer's own enrollment row, whatever its status
#[derive(Debug, Clone, FromRow)]
pub struct EnrollmentState {
    pub status: String,
    pub enrolled_at: DateTime<Utc>,
}
