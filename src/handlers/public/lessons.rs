// POST /api/lessons/:lessonId/progress and /api/lessons/:lessonId/complete

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::{positive_id, required};
use crate::middleware::{ApiJson, ApiPath};
use crate::services::progress::{CompletionReport, ProgressReport};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressBody {
    pub student_id: Option<i64>,
    pub watched_seconds: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteBody {
    pub student_id: Option<i64>,
}

pub async fn lesson_progress(
    State(state): State<AppState>,
    ApiPath(lesson_id): ApiPath<i64>,
    ApiJson(body): ApiJson<ProgressBody>,
) -> Result<Json<ProgressReport>, ApiError> {
    let student_id = positive_id(body.student_id, "studentId")?;
    let watched_seconds = required(body.watched_seconds, "watchedSeconds")?;

    let report = state
        .progress
        .update_lesson_progress(student_id, lesson_id, watched_seconds)
        .await?;

    Ok(Json(report))
}

pub async fn lesson_complete(
    State(state): State<AppState>,
    ApiPath(lesson_id): ApiPath<i64>,
    ApiJson(body): ApiJson<CompleteBody>,
) -> Result<Json<CompletionReport>, ApiError> {
    let student_id = positive_id(body.student_id, "studentId")?;
    let report = state.progress.mark_lesson_complete(student_id, lesson_id).await?;
    Ok(Json(report))
}
