use std::sync::Arc;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use time::Duration;
use tracing::debug;

use super::claims::Claims;
use crate::{
    clock::Clock,
    config::JwtConfig,
    error::{ApiError, TOKEN_INVALID},
    state::AppState,
};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("token signature or structure is invalid")]
    InvalidSignature,

    #[error("failed to sign token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired | TokenError::InvalidSignature => {
                ApiError::AuthenticationFailed(TOKEN_INVALID)
            }
            TokenError::Encode(e) => ApiError::Internal(e.into()),
        }
    }
}

/// HS256 signing and verification keys, built once from configuration.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl JwtKeys {
    pub fn new(secret: &str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
            clock,
        }
    }

    pub fn from_config(cfg: &JwtConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(&cfg.secret, Duration::minutes(cfg.ttl_minutes), clock)
    }

    /// Signs a token for `user_id` that expires `ttl` from now.
    pub fn issue(&self, user_id: i64) -> Result<String, TokenError> {
        let now = self.clock.now();
        let claims = Claims {
            user_id,
            iat: now.unix_timestamp(),
            exp: (now + self.ttl).unix_timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Encode)?;
        debug!(user_id, exp = claims.exp, "jwt signed");
        Ok(token)
    }

    /// Checks signature and expiry and returns the embedded user id.
    ///
    /// Expiry is compared against the injected clock with no leeway: a
    /// token is rejected from the instant `now >= exp`.
    pub fn verify(&self, token: &str) -> Result<i64, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "jwt rejected");
            TokenError::InvalidSignature
        })?;

        if self.clock.now().unix_timestamp() >= data.claims.exp {
            debug!(user_id = data.claims.user_id, exp = data.claims.exp, "jwt expired");
            return Err(TokenError::Expired);
        }

        debug!(user_id = data.claims.user_id, "jwt verified");
        Ok(data.claims.user_id)
    }
}
