use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum SessionError {
    #[error("session token encode failed")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("session token decode/validation failed")]
    Decode(#[source] jsonwebtoken::errors::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct SessionClaims {
    pub(crate) sub: String,
    /// Session epoch of the account at login time.
    pub(crate) epoch: i64,
    pub(crate) iat: i64,
    pub(crate) exp: i64,
}

/// Issues and checks signed session tokens. This only proves the token is
/// authentic and unexpired; whether its epoch is still current is up to the
/// caller.
pub(crate) struct SessionAuthenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_seconds: i64,
}

impl SessionAuthenticator {
    const DEFAULT_TTL_SECONDS: i64 = 24 * 60 * 60;

    pub(crate) fn new(secret: &str, ttl_seconds: i64) -> Self {
        let ttl_seconds = if ttl_seconds > 0 {
            ttl_seconds
        } else {
            Self::DEFAULT_TTL_SECONDS
        };

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds,
        }
    }

    pub(crate) fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    pub(crate) fn start_session(&self, username: &str, epoch: i64) -> Result<String, SessionError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: username.into(),
            epoch,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.ttl_seconds)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(SessionError::Encode)
    }

    pub(crate) fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 10;

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(SessionError::Decode)
    }

    /// `None` for a missing, malformed, tampered or expired token.
    pub(crate) fn resolve(&self, token: Option<&str>) -> Option<SessionClaims> {
        let token = token.map(str::trim).filter(|t| !t.is_empty())?;
        match self.verify(token) {
            Ok(claims) if !claims.sub.is_empty() => Some(claims),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!(error = %err, "rejected session token");
                None
            }
        }
    }
}
