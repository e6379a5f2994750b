// GET /api/courses/:courseId/content and /api/courses/:courseId/progress

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::positive_id;
use crate::middleware::{ApiPath, ApiQuery};
use crate::services::content::CourseContent;
use crate::services::progress::CourseProgressView;
use crate::services::ContentService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentQuery {
    pub student_id: Option<i64>,
}

pub async fn course_content(
    State(state): State<AppState>,
    ApiPath(course_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<StudentQuery>,
) -> Result<Json<CourseContent>, ApiError> {
    let student_id = positive_id(query.student_id, "studentId")?;

    let content = ContentService::new(state.pool())
        .course_content(student_id, course_id)
        .await?;

    Ok(Json(content))
}

pub async fn course_progress(
    State(state): State<AppState>,
    ApiPath(course_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<StudentQuery>,
) -> Result<Json<CourseProgressView>, ApiError> {
    let student_id = positive_id(query.student_id, "studentId")?;
    let progress = state.progress.course_progress(student_id, course_id).await?;
    Ok(Json(progress))
}
