use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Course as its instructor sees it, drafts included
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OwnedCourse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub price_cents: i64,
    pub currency: String,
    pub lang: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Row of the instructor's course list
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InstructorCourse {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub course: OwnedCourse,
    pub total_students: i64,
    pub total_modules: i64,
    pub total_lessons: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRecord {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LessonRecord {
    pub id: i64,
    pub module_id: i64,
    pub title: String,
    pub position: i32,
    pub duration_s: Option<i32>,
    pub requires_quiz_pass: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CourseStudent {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub enrollment_id: i64,
    pub status: String,
    pub enrolled_at: DateTime<Utc>,
    pub progress_percent: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InstructorStudent {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub enrolled_courses_count: i64,
}
