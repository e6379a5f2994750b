// /api/revenue/admin/* handlers

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::{CourseRevenue, RevenuePoint, TagRevenue};
use crate::error::ApiError;
use crate::middleware::ApiQuery;
use crate::services::revenue::{DateRange, GroupBy, RangeReport, SummaryReport};
use crate::services::RevenueService;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(alias = "group_by")]
    pub group_by: Option<String>,
}

impl RevenueQuery {
    pub fn range(&self) -> Result<DateRange, ApiError> {
        Ok(DateRange::resolve(self.from.as_deref(), self.to.as_deref(), chrono::Utc::now())?)
    }
}

/// GET /api/revenue/admin/summary
pub async fn summary(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RevenueQuery>,
) -> Result<Json<SummaryReport>, ApiError> {
    let range = query.range()?;
    Ok(Json(RevenueService::new(state.pool()).summary(range).await?))
}

/// GET /api/revenue/admin/by-date
pub async fn by_date(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RevenueQuery>,
) -> Result<Json<RangeReport<RevenuePoint>>, ApiError> {
    let range = query.range()?;
    let group_by = GroupBy::parse(query.group_by.as_deref())?;
    Ok(Json(RevenueService::new(state.pool()).by_date(range, group_by).await?))
}

/// GET /api/revenue/admin/by-course
pub async fn by_course(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RevenueQuery>,
) -> Result<Json<RangeReport<CourseRevenue>>, ApiError> {
    let range = query.range()?;
    Ok(Json(RevenueService::new(state.pool()).by_course(range).await?))
}

/// GET /api/revenue/admin/by-tag
pub async fn by_tag(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RevenueQuery>,
) -> Result<Json<RangeReport<TagRevenue>>, ApiError> {
    let range = query.range()?;
    Ok(Json(RevenueService::new(state.pool()).by_tag(range).await?))
}
