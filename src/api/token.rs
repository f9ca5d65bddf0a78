use std::sync::Arc;

use axum::{extract::State, Form, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::AppState;

/// OAuth2 password-grant form. Only `username` and `password` matter;
/// the remaining fields are accepted for client compatibility.
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub grant_type: Option<String>,
    pub scope: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

/// POST /api/token: exchange the configured credentials for a bearer token
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    match form.grant_type.as_deref() {
        None | Some("") | Some("password") => {}
        Some(other) => {
            return Err(AppError::InvalidParameter {
                name: "grant_type",
                reason: format!("unsupported grant type '{}', expected 'password'", other),
            });
        }
    }

    if !state.credentials.verify(&form.username, &form.password) {
        tracing::warn!(username = %form.username, "login rejected: bad credentials");
        return Err(AppError::InvalidCredentials);
    }

    let access_token = state.tokens.mint(&form.username, state.token_ttl)?;
    tracing::info!(username = %form.username, "access token issued");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.token_ttl.num_seconds(),
    }))
}
