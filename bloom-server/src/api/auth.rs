//! Credential endpoints: login, refresh, password change

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::user::User;

use super::{ApiResult, service};
use crate::auth::{Identity, jwt};
use crate::db;
use crate::state::AppState;
use crate::util::{hash_password, verify_password};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<TokenResponse> {
    let found = db::users::find_by_email(&state.pool, &payload.email)
        .await
        .map_err(service)?;

    let Some((user, password_hash)) = found else {
        return Err(AppError::new(ErrorCode::InvalidCredentials));
    };

    if !verify_password(&payload.password, &password_hash) {
        return Err(AppError::new(ErrorCode::InvalidCredentials));
    }
    if !user.is_active {
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    issue_tokens(&state, user).await
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// POST /api/auth/password — change the caller's own password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<()> {
    if payload.new_password.len() < 8 {
        return Err(AppError::validation("Password must be at least 8 characters"));
    }

    let current_hash = db::users::password_hash(&state.pool, identity.user_id)
        .await
        .map_err(service)?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    if !verify_password(&payload.current_password, &current_hash) {
        return Err(AppError::new(ErrorCode::InvalidCredentials));
    }

    let hashed = hash_password(&payload.new_password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
    db::users::update_password(&state.pool, identity.user_id, &hashed)
        .await
        .map_err(service)?;

    Ok(ApiResponse::ok())
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<TokenResponse> {
    let rotated = db::refresh_tokens::rotate(
        &state.pool,
        &payload.refresh_token,
        state.refresh_token_ttl_days,
    )
    .await
    .map_err(service)?;

    let Some((user_id, new_refresh)) = rotated else {
        return Err(AppError::new(ErrorCode::TokenInvalid));
    };

    let user = db::users::get(&state.pool, user_id)
        .await
        .map_err(service)?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    if !user.is_active {
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    let access_token = jwt::create_token(&user, &state.jwt_secret)
        .map_err(|e| AppError::internal(format!("Token signing failed: {e}")))?;

    Ok(ApiResponse::success(TokenResponse {
        access_token,
        refresh_token: new_refresh,
        user,
    }))
}

async fn issue_tokens(state: &AppState, user: User) -> ApiResult<TokenResponse> {
    let access_token = jwt::create_token(&user, &state.jwt_secret)
        .map_err(|e| AppError::internal(format!("Token signing failed: {e}")))?;
    let refresh_token =
        db::refresh_tokens::create(&state.pool, user.id, state.refresh_token_ttl_days)
            .await
            .map_err(service)?;

    Ok(ApiResponse::success(TokenResponse {
        access_token,
        refresh_token,
        user,
    }))
}
