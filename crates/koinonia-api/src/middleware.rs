use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use koinonia_types::api::Claims;

use crate::error::ApiError;
use crate::AppState;

/// Gate every protected route before its handler runs: a missing or invalid
/// token short-circuits here, so no data fetch ever happens for an
/// unauthenticated request. The secret comes from shared state, never from a
/// per-request env lookup.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Auth("Sign in to continue.".into()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Auth("Sign in to continue.".into()))?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Auth("Your session has expired. Sign in again.".into()))?;

    req.extensions_mut().insert(token_data.claims);
    Ok(next.run(req).await)
}
