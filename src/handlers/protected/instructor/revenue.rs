use axum::{extract::State, Extension, Json};

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::elevated::admin::revenue::RevenueQuery;
use crate::middleware::{ApiQuery, AuthUser};
use crate::services::revenue::InstructorRevenue;
use crate::services::RevenueService;

/// GET /api/revenue/instructor/my-courses
pub async fn my_revenue(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(query): ApiQuery<RevenueQuery>,
) -> Result<Json<InstructorRevenue>, ApiError> {
    let range = query.range()?;
    let report = RevenueService::new(state.pool()).instructor(user.user_id, range).await?;
    Ok(Json(report))
}
