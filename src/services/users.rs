//! Account management for admins.
//!
//! Passwords are stored as argon2 PHC strings. Admin accounts cannot be
//! created, promoted to or deleted through this service. Every write commits
//! together with its audit row.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::info;

use crate::database::manager::DatabaseError;
use crate::database::models::UserAccount;
use crate::database::repositories::audit_log::{self, AuditEvent};
use crate::database::repositories::user::{self as repo, AccountChanges, UserRepository};
use crate::types::Role;

use super::{is_unique_violation, ServiceError, ServiceResult};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInput {
    #[serde(alias = "fullName")]
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    #[serde(alias = "is_active")]
    pub is_active: Option<bool>,
}

/// Role an admin may assign; the legacy `teacher` spelling is accepted
pub fn assignable_role(raw: &str) -> ServiceResult<Role> {
    match raw.trim().to_lowercase().parse::<Role>() {
        Ok(role @ (Role::Student | Role::Instructor)) => Ok(role),
        _ => Err(ServiceError::validation("role", "Role must be student, instructor or teacher")),
    }
}

/// Any stored role, for filtering the account list
pub fn listed_role(raw: &str) -> ServiceResult<Role> {
    raw.trim()
        .to_lowercase()
        .parse::<Role>()
        .map_err(|_| ServiceError::validation("role", "Unknown role"))
}

fn normalize_email(raw: &str) -> ServiceResult<String> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.ends_with('.') => Ok(email),
        _ => Err(ServiceError::validation("email", "Invalid email address")),
    }
}

fn check_password(password: &str) -> ServiceResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::validation(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ServiceError::Internal(format!("Failed to hash password: {}", e)))?
        .to_string();
    Ok(hash)
}

fn email_taken(err: DatabaseError) -> ServiceError {
    if is_unique_violation(&err) {
        ServiceError::Conflict("Email already exists".to_string())
    } else {
        err.into()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub struct UserService {
    pool: PgPool,
    users: UserRepository,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn list(&self, role: Option<Role>) -> ServiceResult<Vec<UserAccount>> {
        Ok(self.users.list(role.as_ref().map(Role::as_str)).await?)
    }

    pub async fn get(&self, user_id: i64) -> ServiceResult<UserAccount> {
        self.users
            .find(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))
    }

    pub async fn create(&self, admin_id: i64, input: &AccountInput) -> ServiceResult<UserAccount> {
        let (Some(name), Some(email), Some(password)) = (
            non_blank(input.name.as_deref()),
            non_blank(input.email.as_deref()),
            input.password.as_deref().filter(|p| !p.is_empty()),
        ) else {
            return Err(ServiceError::BadRequest("Name, email and password are required".to_string()));
        };
        let email = normalize_email(email)?;
        check_password(password)?;
        let role = match non_blank(input.role.as_deref()) {
            Some(raw) => assignable_role(raw)?,
            None => Role::Student,
        };
        let password_hash = hash_password(password)?;

        let mut tx = self.pool.begin().await?;
        let user = repo::insert(&mut tx, &email, name, &password_hash, role.as_str())
            .await
            .map_err(email_taken)?;
        audit_log::record(
            &mut tx,
            AuditEvent {
                actor_id: Some(admin_id),
                action: "USER_CREATE",
                target_type: "user",
                target_id: Some(user.id),
                meta: Some(json!({ "role": role })),
            },
        )
        .await?;
        tx.commit().await?;

        info!("Admin {} created {} account {}", admin_id, role, user.id);
        Ok(user)
    }

    pub async fn update(&self, admin_id: i64, user_id: i64, input: &AccountInput) -> ServiceResult<UserAccount> {
        let email = non_blank(input.email.as_deref()).map(normalize_email).transpose()?;
        let password_hash = match input.password.as_deref() {
            Some(password) => {
                check_password(password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };
        let role = non_blank(input.role.as_deref()).map(assignable_role).transpose()?;

        let changes = AccountChanges {
            full_name: non_blank(input.name.as_deref()),
            email: email.as_deref(),
            password_hash: password_hash.as_deref(),
            role: role.as_ref().map(Role::as_str),
            is_active: input.is_active,
        };

        let mut tx = self.pool.begin().await?;
        let user = repo::update(&mut tx, user_id, &changes)
            .await
            .map_err(email_taken)?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;
        audit_log::record(
            &mut tx,
            AuditEvent {
                actor_id: Some(admin_id),
                action: "USER_UPDATE",
                target_type: "user",
                target_id: Some(user_id),
                meta: Some(json!({
                    "role": role,
                    "isActive": input.is_active,
                    "passwordChanged": changes.password_hash.is_some(),
                })),
            },
        )
        .await?;
        tx.commit().await?;

        Ok(user)
    }

    pub async fn delete(&self, admin_id: i64, user_id: i64) -> ServiceResult<()> {
        let user = self.get(user_id).await?;
        if user.role == Role::Admin.as_str() {
            return Err(ServiceError::forbidden("Cannot delete admin user"));
        }

        let mut tx = self.pool.begin().await?;
        if !repo::delete_non_admin(&mut tx, user_id).await? {
            return Err(ServiceError::not_found("User not found"));
        }
        audit_log::record(
            &mut tx,
            AuditEvent {
                actor_id: Some(admin_id),
                action: "USER_DELETE",
                target_type: "user",
                target_id: Some(user_id),
                meta: Some(json!({ "email": user.email })),
            },
        )
        .await?;
        tx.commit().await?;

        info!("Admin {} deleted user {}", admin_id, user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::{password_hash::PasswordHash, PasswordVerifier};

    #[test]
    fn admin_role_cannot_be_assigned() {
        assert_eq!(assignable_role("teacher").unwrap(), Role::Instructor);
        assert_eq!(assignable_role(" Student ").unwrap(), Role::Student);
        assert!(matches!(assignable_role("admin"), Err(ServiceError::Validation { field: "role", .. })));
        assert!(assignable_role("guest").is_err());
        assert_eq!(listed_role("ADMIN").unwrap(), Role::Admin);
    }

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Ana@Example.COM ").unwrap(), "ana@example.com");
        assert!(normalize_email("ana@example").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("ana.example.com").is_err());
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(check_password("12345").is_err());
        assert!(check_password("123456").is_ok());
    }

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default().verify_password(b"correct horse", &parsed).is_ok());
        assert!(Argon2::default().verify_password(b"wrong horse", &parsed).is_err());
    }
}
