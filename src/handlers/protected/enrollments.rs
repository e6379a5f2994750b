// GET /api/enrollments/my-courses, POST /api/enrollments/enroll

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::positive_id;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::services::enrollment::MyCourses;
use crate::services::EnrollmentService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollBody {
    pub course_id: Option<i64>,
}

pub async fn my_courses(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<MyCourses> {
    let courses = EnrollmentService::new(state.pool()).my_courses(user.user_id).await?;
    Ok(ApiResponse::success(courses))
}

pub async fn enroll(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<EnrollBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let course_id = positive_id(body.course_id, "courseId")?;
    let enrollment = EnrollmentService::new(state.pool())
        .enroll(user.user_id, course_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Enrolled successfully",
            "enrollment": enrollment
        })),
    ))
}
