//! Bearer authentication middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::error::AppError;

use super::jwt;
use crate::state::AppState;

/// Extracts and verifies the access token from the Authorization header,
/// placing the resulting [`jwt::Identity`] in request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::not_authenticated().into_response())?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::not_authenticated().into_response())?;

    let identity =
        jwt::verify_token(token, &state.jwt_secret).map_err(|e| e.into_response())?;

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
