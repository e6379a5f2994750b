use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::types::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: i64,
    /// Kept as text so legacy lower-case roles still verify
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i64, role: Role) -> Self {
        Self::with_expiry(user_id, role, config::config().security.jwt_expiry_hours)
    }

    pub fn with_expiry(user_id: i64, role: Role, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            user_id,
            role: role.as_str().to_string(),
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    #[error("JWT secret not configured")]
    InvalidSecret,
}

pub fn generate_jwt(claims: &Claims) -> Result<String, JwtError> {
    generate_jwt_with_secret(claims, &config::config().security.jwt_secret)
}

pub fn generate_jwt_with_secret(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn verify_jwt(token: &str) -> Result<Claims, JwtError> {
    verify_jwt_with_secret(token, &config::config().security.jwt_secret)
}

pub fn verify_jwt_with_secret(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_claims() {
        let claims = Claims::with_expiry(42, Role::Admin, 1);
        let token = generate_jwt_with_secret(&claims, "s3cret").unwrap();
        let decoded = verify_jwt_with_secret(&token, "s3cret").unwrap();
        assert_eq!(decoded.user_id, 42);
        assert_eq!(decoded.role, "ADMIN");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let claims = Claims::with_expiry(1, Role::Student, 1);
        let token = generate_jwt_with_secret(&claims, "one").unwrap();
        assert!(matches!(
            verify_jwt_with_secret(&token, "two"),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut claims = Claims::with_expiry(1, Role::Student, 1);
        claims.iat -= 7200;
        claims.exp = claims.iat + 60;
        let token = generate_jwt_with_secret(&claims, "s3cret").unwrap();
        assert!(verify_jwt_with_secret(&token, "s3cret").is_err());
    }

    #[test]
    fn empty_secret_cannot_sign() {
        let claims = Claims::with_expiry(1, Role::Student, 1);
        assert!(matches!(
            generate_jwt_with_secret(&claims, ""),
            Err(JwtError::InvalidSecret)
        ));
    }
}
