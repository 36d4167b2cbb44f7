//! Stateless signed-token issuance and validation.
//!
//! Access tokens are self-verifying: per-request authorization needs no
//! store lookup. Refresh tokens carry the same claims but are additionally
//! cross-checked against the refresh-token store because they must be
//! revocable.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthServiceError;

/// Token-type discriminator embedded in the `typ` claim. A refresh token
/// presented where an access token is expected is rejected, and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

/// JWT claims for both access and refresh tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id (UUID string).
    pub sub: String,
    /// Token type: `"access"` or `"refresh"`.
    pub typ: String,
    /// Unique token id (UUID string).
    pub jti: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiration, seconds since epoch.
    pub exp: i64,
}

/// Result of issuing a token: the signed value plus the identifiers the
/// caller needs to persist a revocable record.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct TokenService {
    secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: String, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            secret,
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn issue(&self, user_id: Uuid, kind: TokenKind) -> Result<IssuedToken, AuthServiceError> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let expires_at = now + ttl;
        let jti = Uuid::new_v4();
        let claims = TokenClaims {
            sub: user_id.to_string(),
            typ: kind.as_str().to_owned(),
            jti: jti.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthServiceError::Internal(e.into()))?;
        Ok(IssuedToken {
            token,
            jti,
            expires_at,
        })
    }

    /// Validate signature, expiry, and token type.
    ///
    /// HS256, exp checked with the library's default 60s leeway, required
    /// claims `exp` + `sub`.
    pub fn verify(
        &self,
        token: &str,
        expected: TokenKind,
    ) -> Result<TokenClaims, AuthServiceError> {
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = true;
        validation.required_spec_claims.clear();
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthServiceError::TokenExpired,
            _ => AuthServiceError::TokenInvalid,
        })?;

        if data.claims.typ != expected.as_str() {
            return Err(AuthServiceError::TokenInvalid);
        }
        Ok(data.claims)
    }

    /// Best-effort, non-validating decode for diagnostics only. Never use
    /// the result to authorize anything.
    pub fn decode(&self, token: &str) -> Option<TokenClaims> {
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
            .ok()
            .map(|data| data.claims)
    }
}
