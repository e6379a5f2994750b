use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub log_id: i64,
    pub user_id: Option<i64>,
    pub full_name: Option<String>,
    pub action: String,
    pub detail: Option<Value>,
    pub created_at: DateTime<Utc>,
}
