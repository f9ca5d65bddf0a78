/// Placeholder signing secret shipped as the default. Refused in production.
pub const PLACEHOLDER_SECRET: &str = "your-very-strong-secret-key-12345";

/// Upper bound on ACCESS_TOKEN_EXPIRE_MINUTES (one year).
pub const MAX_TOKEN_EXPIRE_MINUTES: i64 = 365 * 24 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// HS256 signing secret for bearer tokens.
    pub jwt_secret: String,
    /// The single static login. Compared verbatim, never hashed.
    pub auth_username: String,
    pub auth_password: String,
    /// Origins allowed by CORS. Set via CORS_ORIGINS (comma-separated).
    pub cors_origins: Vec<String>,
    pub token_expire_minutes: i64,
}

impl Config {
    /// Lifetime of an issued access token, in seconds.
    pub fn token_ttl_secs(&self) -> i64 {
        self.token_expire_minutes * 60
    }
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();
    from_lookup(|key| std::env::var(key).ok())
}

/// Builds the configuration from an arbitrary key lookup.
pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let jwt_secret = lookup("JWT_SECRET_KEY").unwrap_or_else(|| PLACEHOLDER_SECRET.into());

    if jwt_secret == PLACEHOLDER_SECRET {
        let env_mode = lookup("WORKLOG_ENV")
            .or_else(|| lookup("RUST_ENV"))
            .unwrap_or_default();
        if env_mode == "production" {
            anyhow::bail!(
                "JWT_SECRET_KEY is still the insecure placeholder. \
                 Set a strong random secret before running in production."
            );
        }
        tracing::warn!("JWT_SECRET_KEY is not set, using insecure placeholder secret");
    }

    let token_expire_minutes = match lookup("ACCESS_TOKEN_EXPIRE_MINUTES") {
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| anyhow::anyhow!("ACCESS_TOKEN_EXPIRE_MINUTES is not a number: {}", raw))?,
        None => 30,
    };
    if !(1..=MAX_TOKEN_EXPIRE_MINUTES).contains(&token_expire_minutes) {
        anyhow::bail!(
            "ACCESS_TOKEN_EXPIRE_MINUTES must be between 1 and {}, got {}",
            MAX_TOKEN_EXPIRE_MINUTES,
            token_expire_minutes
        );
    }

    Ok(Config {
        port: lookup("WORKLOG_PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(8000),
        database_url: lookup("DATABASE_URL")
            .unwrap_or_else(|| "postgres://localhost/worklog".into()),
        jwt_secret,
        auth_username: lookup("AUTH_USERNAME").unwrap_or_else(|| "admin".into()),
        auth_password: lookup("AUTH_PASSWORD").unwrap_or_else(|| "password123".into()),
        cors_origins: parse_origins(
            &lookup("CORS_ORIGINS").unwrap_or_else(|| "http://localhost:5173".into()),
        ),
        token_expire_minutes,
    })
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
