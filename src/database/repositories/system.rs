//! `system_settings` key/value rows and the cross-table admin overview.

use serde_json::Value;
use sqlx::{PgConnection, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::SystemOverview;

pub struct SystemRepository {
    pool: PgPool,
}

impl SystemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn overview(&self) -> Result<SystemOverview, DatabaseError> {
        let overview = sqlx::query_as::<_, SystemOverview>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM users WHERE role = 'STUDENT') AS total_students,
                (SELECT COUNT(*) FROM users WHERE role = 'INSTRUCTOR') AS total_instructors,
                (SELECT COUNT(*) FROM courses) AS total_courses,
                (SELECT COUNT(*) FROM courses WHERE is_published = TRUE) AS published_courses,
                (SELECT COUNT(*) FROM payments
                    WHERE status = 'PAID' AND created_at::date = CURRENT_DATE) AS today_transactions,
                (SELECT COALESCE(SUM(amount_cents), 0)::BIGINT FROM payments
                    WHERE status = 'PAID'
                      AND date_trunc('month', created_at) = date_trunc('month', CURRENT_DATE)) AS month_revenue
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(overview)
    }

    pub async fn get_setting(&self, key: &str) -> Result<Option<Value>, DatabaseError> {
        let value = sqlx::query_scalar("SELECT value FROM system_settings WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }
}

pub async fn set_setting(
    conn: &mut PgConnection,
    key: &str,
    value: &Value,
    updated_by: Option<i64>,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO system_settings (key, value, updated_by, updated_at)
        VALUES ($1, $2, $3, NOW())
        ON CONFLICT (key)
        DO UPDATE SET value = EXCLUDED.value, updated_by = EXCLUDED.updated_by, updated_at = NOW()
        "#,
    )
    .bind(key)
    .bind(value)
    .bind(updated_by)
    .execute(conn)
    .await?;

    Ok(())
}
