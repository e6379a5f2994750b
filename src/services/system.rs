//! Admin dashboard: platform counters, audit trail and maintenance switch.

use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::database::models::{AuditLogEntry, SystemOverview};
use crate::database::repositories::audit_log::{self, AuditEvent};
use crate::database::repositories::system as settings;
use crate::database::repositories::{AuditLogRepository, SystemRepository};

use super::ServiceResult;

pub const DEFAULT_LOG_LIMIT: i64 = 50;
pub const MAINTENANCE_MODE_KEY: &str = "maintenance_mode";

/// Requested log page size, defaulted and clamped to `1..=max`
pub fn clamp_log_limit(requested: Option<i64>, max: i64) -> i64 {
    match requested {
        Some(limit) if limit >= 1 => limit.min(max),
        Some(_) => 1,
        None => DEFAULT_LOG_LIMIT.min(max),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceMode {
    pub enabled: bool,
}

pub struct SystemService {
    pool: PgPool,
    system: SystemRepository,
    audit: AuditLogRepository,
}

impl SystemService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            system: SystemRepository::new(pool.clone()),
            audit: AuditLogRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn overview(&self) -> ServiceResult<SystemOverview> {
        Ok(self.system.overview().await?)
    }

    pub async fn logs(&self, limit: i64, action: Option<&str>) -> ServiceResult<Vec<AuditLogEntry>> {
        let action = action.map(str::trim).filter(|a| !a.is_empty());
        Ok(self.audit.list(limit, action).await?)
    }

    pub async fn maintenance_mode(&self) -> ServiceResult<MaintenanceMode> {
        let Some(value) = self.system.get_setting(MAINTENANCE_MODE_KEY).await? else {
            return Ok(MaintenanceMode::default());
        };

        match serde_json::from_value(value) {
            Ok(mode) => Ok(mode),
            Err(e) => {
                warn!("Ignoring malformed {} setting: {}", MAINTENANCE_MODE_KEY, e);
                Ok(MaintenanceMode::default())
            }
        }
    }

    pub async fn set_maintenance_mode(&self, enabled: bool, admin_id: i64) -> ServiceResult<MaintenanceMode> {
        let mode = MaintenanceMode { enabled };
        let mut tx = self.pool.begin().await?;
        settings::set_setting(&mut tx, MAINTENANCE_MODE_KEY, &json!(mode), Some(admin_id)).await?;
        audit_log::record(
            &mut tx,
            AuditEvent {
                actor_id: Some(admin_id),
                action: "MAINTENANCE_MODE",
                target_type: "system_settings",
                target_id: None,
                meta: Some(json!({ "enabled": enabled })),
            },
        )
        .await?;
        tx.commit().await?;

        info!("Admin {} set maintenance mode to {}", admin_id, enabled);
        Ok(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_limit_defaults_and_clamps() {
        assert_eq!(clamp_log_limit(None, 500), 50);
        assert_eq!(clamp_log_limit(Some(10), 500), 10);
        assert_eq!(clamp_log_limit(Some(0), 500), 1);
        assert_eq!(clamp_log_limit(Some(-3), 500), 1);
        assert_eq!(clamp_log_limit(Some(10_000), 500), 500);
    }

    #[test]
    fn maintenance_mode_reads_stored_json() {
        let mode: MaintenanceMode = serde_json::from_value(json!({ "enabled": true })).unwrap();
        assert!(mode.enabled);
        assert_eq!(json!(MaintenanceMode::default()), json!({ "enabled": false }));
    }
}
