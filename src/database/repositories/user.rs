//! `users` rows managed from the admin console.
//!
//! Writes take a `&mut PgConnection` so each one lands together with its
//! audit row.

use sqlx::{PgConnection, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::UserAccount;

const ACCOUNT_COLUMNS: &str = "id, email, full_name, role, avatar_url, is_active, created_at, updated_at";

/// Account fields written on update; `None` keeps the stored value
#[derive(Default)]
pub struct AccountChanges<'a> {
    pub full_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub role: Option<&'a str>,
    pub is_active: Option<bool>,
}

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, role: Option<&str>) -> Result<Vec<UserAccount>, DatabaseError> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users WHERE ($1::TEXT IS NULL OR role = $1) ORDER BY created_at DESC, id DESC"
        );
        let users = sqlx::query_as::<_, UserAccount>(&sql)
            .bind(role)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    pub async fn find(&self, user_id: i64) -> Result<Option<UserAccount>, DatabaseError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, UserAccount>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }
}

pub async fn insert(
    conn: &mut PgConnection,
    email: &str,
    full_name: &str,
    password_hash: &str,
    role: &str,
) -> Result<UserAccount, DatabaseError> {
    let sql = format!(
        r#"
        INSERT INTO users (email, full_name, password_hash, role)
        VALUES ($1, $2, $3, $4)
        RETURNING {ACCOUNT_COLUMNS}
        "#
    );
    let user = sqlx::query_as::<_, UserAccount>(&sql)
        .bind(email)
        .bind(full_name)
        .bind(password_hash)
        .bind(role)
        .fetch_one(conn)
        .await?;

    Ok(user)
}

pub async fn update(
    conn: &mut PgConnection,
    user_id: i64,
    changes: &AccountChanges<'_>,
) -> Result<Option<UserAccount>, DatabaseError> {
    let sql = format!(
        r#"
        UPDATE users SET
            full_name = COALESCE($2, full_name),
            email = COALESCE($3, email),
            password_hash = COALESCE($4, password_hash),
            role = COALESCE($5, role),
            is_active = COALESCE($6, is_active),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {ACCOUNT_COLUMNS}
        "#
    );
    let user = sqlx::query_as::<_, UserAccount>(&sql)
        .bind(user_id)
        .bind(changes.full_name)
        .bind(changes.email)
        .bind(changes.password_hash)
        .bind(changes.role)
        .bind(changes.is_active)
        .fetch_optional(conn)
        .await?;

    Ok(user)
}

/// Admin accounts are never deleted here
pub async fn delete_non_admin(conn: &mut PgConnection, user_id: i64) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1 AND role <> 'ADMIN'")
        .bind(user_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() == 1)
}
