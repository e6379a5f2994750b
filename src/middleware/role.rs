use axum::{extract::Request, middleware::Next, response::Response};

use super::auth::AuthUser;
use crate::error::ApiError;
use crate::types::Role;

fn require_role(request: &Request, role: Role) -> Result<AuthUser, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .copied()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if user.role != role {
        tracing::debug!("User {} with role {} denied {} route", user.user_id, user.role, role);
        return Err(ApiError::forbidden("Insufficient permissions"));
    }

    Ok(user)
}

/// Must run after `jwt_auth_middleware`
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    require_role(&request, Role::Admin)?;
    Ok(next.run(request).await)
}

pub async fn require_student(request: Request, next: Next) -> Result<Response, ApiError> {
    require_role(&request, Role::Student)?;
    Ok(next.run(request).await)
}

pub async fn require_instructor(request: Request, next: Next) -> Result<Response, ApiError> {
    require_role(&request, Role::Instructor)?;
    Ok(next.run(request).await)
}
