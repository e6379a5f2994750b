// Modules, lessons and lesson assets of an owned course

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiPath, AuthUser};
use crate::services::authoring::{AssetInput, LessonInput, ModuleInput};
use crate::services::AuthoringService;

use super::deleted;

/// GET /api/courses/instructor/my-courses/:courseId/modules
pub async fn module_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(course_id): ApiPath<i64>,
) -> Result<Json<Value>, ApiError> {
    let modules = AuthoringService::new(state.pool()).modules(course_id, user.user_id).await?;
    Ok(Json(json!({ "success": true, "modules": modules })))
}

/// POST /api/courses/instructor/my-courses/:courseId/modules
pub async fn module_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(course_id): ApiPath<i64>,
    ApiJson(body): ApiJson<ModuleInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let module = AuthoringService::new(state.pool())
        .create_module(course_id, user.user_id, &body)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "module": module }))))
}

/// PUT /api/courses/instructor/modules/:moduleId
pub async fn module_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(module_id): ApiPath<i64>,
    ApiJson(body): ApiJson<ModuleInput>,
) -> Result<Json<Value>, ApiError> {
    let module = AuthoringService::new(state.pool())
        .update_module(module_id, user.user_id, &body)
        .await?;
    Ok(Json(json!({ "success": true, "module": module })))
}

/// DELETE /api/courses/instructor/modules/:moduleId
pub async fn module_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(module_id): ApiPath<i64>,
) -> Result<Json<Value>, ApiError> {
    AuthoringService::new(state.pool())
        .delete_module(module_id, user.user_id)
        .await?;
    Ok(deleted("Module"))
}

/// GET /api/courses/instructor/modules/:moduleId/lessons
pub async fn lesson_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(module_id): ApiPath<i64>,
) -> Result<Json<Value>, ApiError> {
    let lessons = AuthoringService::new(state.pool()).lessons(module_id, user.user_id).await?;
    Ok(Json(json!({ "success": true, "lessons": lessons })))
}

/// POST /api/courses/instructor/modules/:moduleId/lessons
pub async fn lesson_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(module_id): ApiPath<i64>,
    ApiJson(body): ApiJson<LessonInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let lesson = AuthoringService::new(state.pool())
        .create_lesson(module_id, user.user_id, &body)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "lesson": lesson }))))
}

/// PUT /api/courses/instructor/lessons/:lessonId
pub async fn lesson_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(lesson_id): ApiPath<i64>,
    ApiJson(body): ApiJson<LessonInput>,
) -> Result<Json<Value>, ApiError> {
    let lesson = AuthoringService::new(state.pool())
        .update_lesson(lesson_id, user.user_id, &body)
        .await?;
    Ok(Json(json!({ "success": true, "lesson": lesson })))
}

/// DELETE /api/courses/instructor/lessons/:lessonId
pub async fn lesson_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(lesson_id): ApiPath<i64>,
) -> Result<Json<Value>, ApiError> {
    AuthoringService::new(state.pool())
        .delete_lesson(lesson_id, user.user_id)
        .await?;
    Ok(deleted("Lesson"))
}

/// GET /api/courses/instructor/lessons/:lessonId/assets
pub async fn asset_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(lesson_id): ApiPath<i64>,
) -> Result<Json<Value>, ApiError> {
    let assets = AuthoringService::new(state.pool()).assets(lesson_id, user.user_id).await?;
    Ok(Json(json!({ "success": true, "assets": assets })))
}

/// POST /api/courses/instructor/lessons/:lessonId/assets
pub async fn asset_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(lesson_id): ApiPath<i64>,
    ApiJson(body): ApiJson<AssetInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let asset = AuthoringService::new(state.pool())
        .create_asset(lesson_id, user.user_id, &body)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "asset": asset }))))
}

/// PUT /api/courses/instructor/assets/:assetId
pub async fn asset_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(asset_id): ApiPath<i64>,
    ApiJson(body): ApiJson<AssetInput>,
) -> Result<Json<Value>, ApiError> {
    let asset = AuthoringService::new(state.pool())
        .update_asset(asset_id, user.user_id, &body)
        .await?;
    Ok(Json(json!({ "success": true, "asset": asset })))
}

/// DELETE /api/courses/instructor/assets/:assetId
pub async fn asset_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(asset_id): ApiPath<i64>,
) -> Result<Json<Value>, ApiError> {
    AuthoringService::new(state.pool())
        .delete_asset(asset_id, user.user_id)
        .await?;
    Ok(deleted("Asset"))
}
