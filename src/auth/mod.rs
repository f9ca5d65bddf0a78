//! Login and bearer-token authentication.

pub mod credentials;
pub mod guard;
pub mod token;
