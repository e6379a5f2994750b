use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiPath, AuthUser};
use crate::services::authoring::QuizInput;
use crate::services::AuthoringService;

use super::deleted;

/// GET /api/courses/instructor/my-courses/:courseId/quizzes
pub async fn quiz_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(course_id): ApiPath<i64>,
) -> Result<Json<Value>, ApiError> {
    let quizzes = AuthoringService::new(state.pool())
        .course_quizzes(course_id, user.user_id)
        .await?;
    Ok(Json(json!({ "success": true, "quizzes": quizzes })))
}

/// GET /api/courses/instructor/quizzes/:quizId
pub async fn quiz_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(quiz_id): ApiPath<i64>,
) -> Result<Json<Value>, ApiError> {
    let quiz = AuthoringService::new(state.pool()).quiz(quiz_id, user.user_id).await?;
    Ok(Json(json!({ "success": true, "quiz": quiz })))
}

/// POST /api/courses/instructor/lessons/:lessonId/quizzes
pub async fn quiz_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(lesson_id): ApiPath<i64>,
    ApiJson(body): ApiJson<QuizInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let quiz = AuthoringService::new(state.pool())
        .create_quiz(lesson_id, user.user_id, &body)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "quiz": quiz }))))
}

/// PUT /api/courses/instructor/quizzes/:quizId
pub async fn quiz_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(quiz_id): ApiPath<i64>,
    ApiJson(body): ApiJson<QuizInput>,
) -> Result<Json<Value>, ApiError> {
    let quiz = AuthoringService::new(state.pool())
        .update_quiz(quiz_id, user.user_id, &body)
        .await?;
    Ok(Json(json!({ "success": true, "quiz": quiz })))
}

/// DELETE /api/courses/instructor/quizzes/:quizId
pub async fn quiz_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(quiz_id): ApiPath<i64>,
) -> Result<Json<Value>, ApiError> {
    AuthoringService::new(state.pool())
        .delete_quiz(quiz_id, user.user_id)
        .await?;
    Ok(deleted("Quiz"))
}
