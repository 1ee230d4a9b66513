//! Access token creation and verification

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::user::{Role, User};

/// JWT claims for an access token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub role: String,
    /// Store assignment for staff/store_admin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<i64>,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated identity extracted from a verified token.
///
/// Flows through handlers as a request extension; nothing downstream
/// re-validates credentials.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i64,
    pub role: Role,
    pub store_id: Option<i64>,
}

const ACCESS_TOKEN_EXPIRY_HOURS: i64 = 24;

/// Create an access token for a user
pub fn create_token(user: &User, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: user.role.as_str().to_string(),
        store_id: user.store_id,
        exp: (now + chrono::Duration::hours(ACCESS_TOKEN_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify an access token and extract the identity
pub fn verify_token(token: &str, secret: &str) -> AppResult<Identity> {
    let validation = Validation::default();
    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::new(ErrorCode::TokenExpired)
            }
            _ => AppError::new(ErrorCode::TokenInvalid),
        }
    })?;

    let claims = token_data.claims;
    let user_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| AppError::new(ErrorCode::TokenInvalid))?;
    let role = Role::parse(&claims.role).ok_or_else(|| AppError::new(ErrorCode::TokenInvalid))?;

    Ok(Identity {
        user_id,
        role,
        store_id: claims.store_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const SECRET: &str = "test-secret-at-least-32-bytes-long!!";

    fn user(role: Role, store_id: Option<i64>) -> User {
        User {
            id: 42,
            email: "staff@example.com".into(),
            name: "Staff".into(),
            role,
            store_id,
            skill_level: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_roundtrip() {
        let token = create_token(&user(Role::Staff, Some(7)), SECRET).unwrap();
        let identity = verify_token(&token, SECRET).unwrap();
        assert_eq!(identity.user_id, 42);
        assert_eq!(identity.role, Role::Staff);
        assert_eq!(identity.store_id, Some(7));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token(&user(Role::Customer, None), SECRET).unwrap();
        let err = verify_token(&token, "another-secret-that-is-long-enough").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn test_garbage_token_rejected() {
        let err = verify_token("not.a.token", SECRET).unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }
}
