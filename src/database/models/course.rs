use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Published course header shown above the content tree
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub instructor_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ModuleRow {
    pub id: i64,
    pub title: String,
    pub position: i32,
}

/// Lesson joined with one student's progress (defaults when absent)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LessonRow {
    pub id: i64,
    pub module_id: i64,
    pub title: String,
    pub position: i32,
    pub duration_s: Option<i32>,
    pub requires_quiz_pass: bool,
    pub watched_s: i32,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LessonAsset {
    pub id: i64,
    #[serde(skip_serializing)]
    pub lesson_id: i64,
    pub asset_kind: String,
    pub url: String,
    pub meta: Option<Value>,
    pub position: i32,
}
