// /api/admin/users/* handlers

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiPath, AuthUser};
use crate::services::users::{listed_role, AccountInput};
use crate::services::UserService;

/// GET /api/admin/users
pub async fn user_list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let users = UserService::new(state.pool()).list(None).await?;
    Ok(Json(json!({ "success": true, "users": users })))
}

/// GET /api/admin/users/role/:role
pub async fn users_by_role(
    State(state): State<AppState>,
    ApiPath(role): ApiPath<String>,
) -> Result<Json<Value>, ApiError> {
    let role = listed_role(&role)?;
    let users = UserService::new(state.pool()).list(Some(role)).await?;
    Ok(Json(json!({ "success": true, "users": users })))
}

/// GET /api/admin/users/:userId
pub async fn user_get(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<Json<Value>, ApiError> {
    let user = UserService::new(state.pool()).get(user_id).await?;
    Ok(Json(json!({ "success": true, "user": user })))
}

/// POST /api/admin/users
pub async fn user_create(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    ApiJson(body): ApiJson<AccountInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let user = UserService::new(state.pool()).create(admin.user_id, &body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "user": user }))))
}

/// PUT /api/admin/users/:userId
pub async fn user_update(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    ApiPath(user_id): ApiPath<i64>,
    ApiJson(body): ApiJson<AccountInput>,
) -> Result<Json<Value>, ApiError> {
    let user = UserService::new(state.pool())
        .update(admin.user_id, user_id, &body)
        .await?;
    Ok(Json(json!({ "success": true, "user": user })))
}

/// DELETE /api/admin/users/:userId
pub async fn user_delete(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<Json<Value>, ApiError> {
    UserService::new(state.pool()).delete(admin.user_id, user_id).await?;
    Ok(Json(json!({ "success": true, "message": "User deleted successfully" })))
}
