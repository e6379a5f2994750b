use serde_json::Value;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::database::manager::DatabaseError;
use crate::database::models::AuditLogEntry;

/// Audit row describing one state change
#[derive(Debug, Clone)]
pub struct AuditEvent<'a> {
    pub actor_id: Option<i64>,
    pub action: &'a str,
    pub target_type: &'a str,
    pub target_id: Option<i64>,
    pub meta: Option<Value>,
}

/// Written on the caller's connection so the row commits or rolls back
/// together with the change it describes
pub async fn record(conn: &mut PgConnection, event: AuditEvent<'_>) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (actor_id, action, target_type, target_id, meta)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(event.actor_id)
    .bind(event.action)
    .bind(event.target_type)
    .bind(event.target_id)
    .bind(event.meta)
    .execute(conn)
    .await?;

    Ok(())
}

pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Newest first, optionally restricted to one action name
    pub async fn list(&self, limit: i64, action: Option<&str>) -> Result<Vec<AuditLogEntry>, DatabaseError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT l.id AS log_id, l.actor_id AS user_id, u.full_name, l.action,
                   l.meta AS detail, l.created_at
            FROM audit_logs l
            LEFT JOIN users u ON u.id = l.actor_id
            "#,
        );

        if let Some(action) = action {
            builder.push(" WHERE l.action = ").push_bind(action.to_string());
        }

        builder
            .push(" ORDER BY l.created_at DESC, l.id DESC LIMIT ")
            .push_bind(limit);

        let entries = builder
            .build_query_as::<AuditLogEntry>()
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }
}
