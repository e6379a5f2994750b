// /api/reviews/* - the author is always the authenticated user

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::required;
use crate::middleware::{ApiJson, ApiPath, AuthUser};
use crate::services::ReviewService;

#[derive(Debug, Deserialize)]
pub struct ReviewBody {
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

/// POST /api/reviews/courses/:courseId
pub async fn review_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(course_id): ApiPath<i64>,
    ApiJson(body): ApiJson<ReviewBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let rating = required(body.rating, "rating")?;
    let review = ReviewService::new(state.pool())
        .submit(course_id, user.user_id, rating, body.comment.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "success": true, "review": review }))))
}

/// GET /api/reviews/courses/:courseId/my-review
pub async fn review_mine(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(course_id): ApiPath<i64>,
) -> Result<Json<Value>, ApiError> {
    let review = ReviewService::new(state.pool()).my_review(course_id, user.user_id).await?;
    Ok(Json(json!({ "success": true, "review": review })))
}

/// PUT /api/reviews/:reviewId
pub async fn review_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(review_id): ApiPath<i64>,
    ApiJson(body): ApiJson<ReviewBody>,
) -> Result<Json<Value>, ApiError> {
    let review = ReviewService::new(state.pool())
        .update(review_id, user.user_id, body.rating, body.comment.as_deref())
        .await?;
    Ok(Json(json!({ "success": true, "review": review })))
}

/// DELETE /api/reviews/:reviewId
pub async fn review_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(review_id): ApiPath<i64>,
) -> Result<Json<Value>, ApiError> {
    ReviewService::new(state.pool()).delete(review_id, user.user_id).await?;
    Ok(Json(json!({ "success": true, "message": "Review deleted successfully" })))
}
