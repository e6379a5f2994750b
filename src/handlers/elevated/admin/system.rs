// /api/admin/system/* handlers

use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use crate::app::AppState;
use crate::config;
use crate::database::models::{AuditLogEntry, SystemOverview};
use crate::error::ApiError;
use crate::handlers::required;
use crate::middleware::{lenient_i64, ApiJson, ApiQuery, AuthUser};
use crate::services::system::{clamp_log_limit, MaintenanceMode};
use crate::services::SystemService;

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub limit: Option<i64>,
    pub action: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MaintenanceBody {
    pub enabled: Option<bool>,
}

pub async fn overview(State(state): State<AppState>) -> Result<Json<SystemOverview>, ApiError> {
    let overview = SystemService::new(state.pool()).overview().await?;
    Ok(Json(overview))
}

pub async fn logs(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LogsQuery>,
) -> Result<Json<Vec<AuditLogEntry>>, ApiError> {
    let limit = clamp_log_limit(query.limit, config::config().api.max_logs_limit);
    let entries = SystemService::new(state.pool())
        .logs(limit, query.action.as_deref())
        .await?;
    Ok(Json(entries))
}

pub async fn maintenance_get(State(state): State<AppState>) -> Result<Json<MaintenanceMode>, ApiError> {
    let mode = SystemService::new(state.pool()).maintenance_mode().await?;
    Ok(Json(mode))
}

pub async fn maintenance_put(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    ApiJson(body): ApiJson<MaintenanceBody>,
) -> Result<Json<MaintenanceMode>, ApiError> {
    let enabled = required(body.enabled, "enabled")?;
    let mode = SystemService::new(state.pool())
        .set_maintenance_mode(enabled, admin.user_id)
        .await?;
    Ok(Json(mode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::system::DEFAULT_LOG_LIMIT;
    use axum::extract::Query;
    use axum::http::Uri;

    fn logs_query(uri: &'static str) -> LogsQuery {
        let uri: Uri = uri.parse().unwrap();
        Query::<LogsQuery>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn non_numeric_limit_uses_default_page() {
        let query = logs_query("/api/admin/system/logs?limit=abc&action=ENROLL");
        assert_eq!(query.limit, None);
        assert_eq!(query.action.as_deref(), Some("ENROLL"));
        assert_eq!(clamp_log_limit(query.limit, 500), DEFAULT_LOG_LIMIT);
    }

    #[test]
    fn numeric_limit_is_kept() {
        assert_eq!(logs_query("/api/admin/system/logs?limit=7").limit, Some(7));
    }
}
