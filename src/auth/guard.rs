use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::token::{Claims, TokenCodec};
use crate::errors::AppError;
use crate::AppState;

/// Middleware: requires a valid `Authorization: Bearer <jwt>` header.
///
/// On success the verified [`Claims`] are stored in the request extensions
/// for handlers to pick up with `Extension<Claims>`.
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = authenticate(req.headers(), &state.tokens)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

pub fn authenticate(headers: &HeaderMap, codec: &TokenCodec) -> Result<Claims, AppError> {
    let token = bearer_token(headers).ok_or_else(|| {
        tracing::warn!("protected route: missing bearer token");
        AppError::MissingCredentials
    })?;

    codec.verify(token).map_err(|e| {
        tracing::warn!(reason = %e, "protected route: token rejected");
        AppError::InvalidOrExpiredToken
    })
}

/// Token part of a `Bearer` authorization header. The scheme is matched
/// case-insensitively; other schemes and empty tokens yield `None`.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
