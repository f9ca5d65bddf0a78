//! Work log query service library crate.
//!
//! Issues bearer tokens for the single configured login and serves
//! time-window queries over the `work_logs` table.

use std::sync::Arc;

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod models;
pub mod store;
pub mod worklog;

use auth::credentials::{CredentialVerifier, StaticCredential};
use auth::token::TokenCodec;
use store::WorklogStore;

/// Shared application state passed to handlers and middleware.
/// Immutable after startup.
pub struct AppState {
    pub store: Arc<dyn WorklogStore>,
    pub credentials: Box<dyn CredentialVerifier>,
    pub tokens: TokenCodec,
    pub token_ttl: chrono::Duration,
}

impl AppState {
    pub fn new(cfg: &config::Config, store: Arc<dyn WorklogStore>) -> Self {
        Self {
            store,
            credentials: Box::new(StaticCredential::new(
                cfg.auth_username.clone(),
                cfg.auth_password.clone(),
            )),
            tokens: TokenCodec::new(&cfg.jwt_secret),
            token_ttl: chrono::Duration::seconds(cfg.token_ttl_secs()),
        }
    }
}
