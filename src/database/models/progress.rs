use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// What the progress rules need to know about a lesson
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct LessonTiming {
    pub lesson_id: i64,
    pub course_id: i64,
    pub duration_s: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgress {
    pub student_id: i64,
    pub lesson_id: i64,
    pub watched_s: i32,
    pub is_completed: bool,
    pub last_seen_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    pub student_id: i64,
    pub course_id: i64,
    pub percent: i32,
    pub updated_at: DateTime<Utc>,
}
