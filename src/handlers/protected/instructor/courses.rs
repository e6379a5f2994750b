use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiPath, AuthUser};
use crate::services::authoring::CourseInput;
use crate::services::AuthoringService;

use super::deleted;

/// GET /api/courses/instructor/my-courses
pub async fn course_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let courses = AuthoringService::new(state.pool()).my_courses(user.user_id).await?;
    Ok(Json(json!({ "success": true, "courses": courses })))
}

/// POST /api/courses/instructor/my-courses
pub async fn course_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<CourseInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let course = AuthoringService::new(state.pool())
        .create_course(user.user_id, &body)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "course": course }))))
}

/// GET /api/courses/instructor/my-courses/:courseId
pub async fn course_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(course_id): ApiPath<i64>,
) -> Result<Json<Value>, ApiError> {
    let course = AuthoringService::new(state.pool()).course(course_id, user.user_id).await?;
    Ok(Json(json!({ "success": true, "course": course })))
}

/// PUT /api/courses/instructor/my-courses/:courseId
pub async fn course_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(course_id): ApiPath<i64>,
    ApiJson(body): ApiJson<CourseInput>,
) -> Result<Json<Value>, ApiError> {
    let course = AuthoringService::new(state.pool())
        .update_course(course_id, user.user_id, &body)
        .await?;
    Ok(Json(json!({ "success": true, "course": course })))
}

/// DELETE /api/courses/instructor/my-courses/:courseId
pub async fn course_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(course_id): ApiPath<i64>,
) -> Result<Json<Value>, ApiError> {
    AuthoringService::new(state.pool())
        .delete_course(course_id, user.user_id)
        .await?;
    Ok(deleted("Course"))
}
