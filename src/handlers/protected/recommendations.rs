// /api/recommendations/feedback - STUDENT only

use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::models::RecFeedback;
use crate::error::ApiError;
use crate::middleware::{ApiJson, AuthUser};
use crate::services::recommendation::FeedbackAction;
use crate::services::RecommendationService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackBody {
    pub course_id: Option<i64>,
    pub action: Option<String>,
}

pub async fn feedback_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<FeedbackBody>,
) -> Result<Json<Value>, ApiError> {
    let (Some(course_id), Some(action)) = (body.course_id, body.action) else {
        return Err(ApiError::bad_request("courseId and action are required"));
    };
    let action: FeedbackAction = action.parse()?;

    let feedback = RecommendationService::new(state.pool())
        .submit_feedback(user.user_id, course_id, action)
        .await?;

    Ok(Json(json!({
        "message": "Feedback saved",
        "feedback": feedback
    })))
}

pub async fn feedback_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<RecFeedback>>, ApiError> {
    let feedback = RecommendationService::new(state.pool()).my_feedback(user.user_id).await?;
    Ok(Json(feedback))
}
