use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiPath, AuthUser};
use crate::services::AuthoringService;

/// GET /api/courses/instructor/my-courses/:courseId/students
pub async fn course_students(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(course_id): ApiPath<i64>,
) -> Result<Json<Value>, ApiError> {
    let students = AuthoringService::new(state.pool())
        .course_students(course_id, user.user_id)
        .await?;
    Ok(Json(json!({ "success": true, "students": students })))
}

/// GET /api/courses/instructor/students
pub async fn student_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let students = AuthoringService::new(state.pool()).students(user.user_id).await?;
    Ok(Json(json!({ "success": true, "students": students })))
}
