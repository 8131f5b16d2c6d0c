use std::sync::Arc;

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;
use time::Duration;
use tracing::debug;

use crate::{
    auth::claims::{Claims, TokenPair},
    clock::Clock,
    config::JwtConfig,
};

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Signature checked out but `exp` has passed.
    #[error("token has expired")]
    Expired,
    /// Bad signature, wrong key, corrupt structure or missing claim.
    #[error("token is malformed or forged")]
    Malformed,
}

/// One HMAC secret in both its signing and verifying form.
#[derive(Clone)]
pub struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn sign(&self, claims: &Claims) -> anyhow::Result<String> {
        Ok(encode(&Header::new(ALGORITHM), claims, &self.encoding)?)
    }
}

/// Issues and validates access and refresh tokens.
#[derive(Clone)]
pub struct JwtKeys {
    pub access: SigningKey,
    pub refresh: SigningKey,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtKeys {
    pub fn new(config: &JwtConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            access: SigningKey::from_secret(config.access_secret.as_bytes()),
            refresh: SigningKey::from_secret(config.refresh_secret.as_bytes()),
            access_ttl: Duration::minutes(config.ttl_minutes),
            refresh_ttl: Duration::minutes(config.refresh_ttl_minutes),
            clock,
        }
    }

    pub fn issue(&self, user_id: i64, ttl: Duration, key: &SigningKey) -> anyhow::Result<String> {
        let now = self.clock.now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: Some(now.unix_timestamp()),
            exp: (now + ttl).unix_timestamp(),
        };
        let token = key.sign(&claims)?;
        debug!(user_id, exp = claims.exp, "jwt signed");
        Ok(token)
    }

    /// Verifies the signature, then the required claims, then expiry against the clock.
    pub fn validate(&self, token: &str, key: &SigningKey) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked below against the injected clock instead of the system time.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(token, &key.decoding, &validation).map_err(|e| {
            debug!(error = %e, "jwt rejected");
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        if data.claims.exp <= self.clock.now().unix_timestamp() {
            debug!(sub = %data.claims.sub, exp = data.claims.exp, "jwt expired");
            return Err(TokenError::Expired);
        }
        debug!(sub = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }

    pub fn sign_access(&self, user_id: i64) -> anyhow::Result<String> {
        self.issue(user_id, self.access_ttl, &self.access)
    }

    pub fn sign_refresh(&self, user_id: i64) -> anyhow::Result<String> {
        self.issue(user_id, self.refresh_ttl, &self.refresh)
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate(token, &self.access)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate(token, &self.refresh)
    }

    pub fn issue_pair(&self, user_id: i64) -> anyhow::Result<TokenPair> {
        Ok(TokenPair::bearer(
            self.sign_access(user_id)?,
            self.sign_refresh(user_id)?,
        ))
    }
}
