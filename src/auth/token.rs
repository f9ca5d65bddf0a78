//! Bearer token codec: HS256-signed JWTs carrying a subject and an expiry.
//!
//! Tokens are stateless. Verification recomputes the signature and checks
//! the expiry; nothing is persisted, so an issued token stays valid until
//! it expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Validated claim set extracted from a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the username the token was issued to.
    pub sub: String,
    /// Expiration (Unix timestamp, seconds).
    pub exp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token signature or encoding is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token claims are malformed")]
    MalformedClaims,
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        // Expiry and subject are checked by hand so the error kinds stay
        // distinct and there is no leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn mint(&self, subject: &str, ttl: Duration) -> anyhow::Result<String> {
        self.mint_at(subject, ttl, Utc::now())
    }

    pub fn mint_at(&self, subject: &str, ttl: Duration, now: DateTime<Utc>) -> anyhow::Result<String> {
        let claims = Claims {
            sub: subject.to_string(),
            exp: (now + ttl).timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify `token` as of `now`.
    ///
    /// Order: signature and encoding, then `exp`, then `sub`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let data = decode::<Map<String, Value>>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "token rejected at signature check");
            TokenError::InvalidSignature
        })?;
        let raw = data.claims;

        let exp = raw
            .get("exp")
            .and_then(unix_seconds)
            .ok_or(TokenError::MalformedClaims)?;
        if exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        let sub = raw
            .get("sub")
            .and_then(Value::as_str)
            .ok_or(TokenError::MalformedClaims)?;

        Ok(Claims {
            sub: sub.to_string(),
            exp,
        })
    }
}

fn unix_seconds(v: &Value) -> Option<i64> {
    v.as_i64().or_else(|| v.as_f64().map(|f| f.floor() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SECRET: &str = "unit-test-secret-with-enough-entropy";

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 24, 8, 0, 0).unwrap()
    }

    fn flip(c: u8) -> u8 {
        if c == b'A' {
            b'B'
        } else {
            b'A'
        }
    }

    #[test]
    fn test_mint_then_verify_returns_subject() {
        let codec = TokenCodec::new(SECRET);
        let now = fixed_now();
        let token = codec.mint_at("admin", Duration::minutes(30), now).unwrap();

        let claims = codec.verify_at(&token, now).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.exp, now.timestamp() + 1800);
    }

    #[test]
    fn test_token_with_real_clock() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.mint("admin", Duration::minutes(30)).unwrap();
        let claims = tokio_test::assert_ok!(codec.verify(&token));
        assert_eq!(claims.sub, "admin");
    }

    #[test]
    fn test_expiry_boundary() {
        let codec = TokenCodec::new(SECRET);
        let now = fixed_now();
        let ttl = Duration::minutes(30);
        let token = codec.mint_at("admin", ttl, now).unwrap();

        assert!(codec.verify_at(&token, now + ttl - Duration::seconds(1)).is_ok());
        assert_eq!(codec.verify_at(&token, now + ttl), Err(TokenError::Expired));
        assert_eq!(
            codec.verify_at(&token, now + ttl + Duration::hours(5)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_tampering_any_byte_breaks_signature() {
        let codec = TokenCodec::new(SECRET);
        let now = fixed_now();
        let token = codec.mint_at("admin", Duration::minutes(30), now).unwrap();

        for i in 0..token.len() {
            if token.as_bytes()[i] == b'.' {
                continue;
            }
            let mut bytes = token.clone().into_bytes();
            bytes[i] = flip(bytes[i]);
            let tampered = String::from_utf8(bytes).unwrap();
            assert_eq!(
                codec.verify_at(&tampered, now),
                Err(TokenError::InvalidSignature),
                "tampered byte {} was accepted",
                i
            );
        }
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let now = fixed_now();
        let token = TokenCodec::new("another-secret")
            .mint_at("admin", Duration::minutes(30), now)
            .unwrap();
        assert_eq!(
            TokenCodec::new(SECRET).verify_at(&token, now),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_other_algorithm_is_rejected() {
        let now = fixed_now();
        let claims = Claims {
            sub: "admin".into(),
            exp: now.timestamp() + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(
            TokenCodec::new(SECRET).verify_at(&token, now),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_missing_subject_is_malformed() {
        #[derive(Serialize)]
        struct NoSubject {
            exp: i64,
        }
        let now = fixed_now();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &NoSubject {
                exp: now.timestamp() + 60,
            },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(
            TokenCodec::new(SECRET).verify_at(&token, now),
            Err(TokenError::MalformedClaims)
        );
    }

    #[test]
    fn test_missing_expiry_is_malformed() {
        #[derive(Serialize)]
        struct NoExpiry {
            sub: String,
        }
        let token = encode(
            &Header::new(Algorithm::HS256),
            &NoExpiry { sub: "admin".into() },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(
            TokenCodec::new(SECRET).verify_at(&token, fixed_now()),
            Err(TokenError::MalformedClaims)
        );
    }

    #[test]
    fn test_garbage_is_invalid_signature() {
        let codec = TokenCodec::new(SECRET);
        assert_eq!(codec.verify_at("not-a-jwt", fixed_now()), Err(TokenError::InvalidSignature));
        assert_eq!(codec.verify_at("", fixed_now()), Err(TokenError::InvalidSignature));
    }
}
