//! Fixed-window rate limiting over a pluggable counter store.
//!
//! Fixed windows, not sliding or token-bucket: simpler to reason about and
//! sufficient for abuse deterrence at this scale. The burst possible at a
//! window boundary is an accepted tradeoff.

use chrono::Duration;

use crate::domain::repository::RateLimitStore;
use crate::error::AuthServiceError;

/// Key for per-email code-request throttling.
pub fn request_email_key(email: &str) -> String {
    format!("otp_request:email:{email}")
}

/// Key for per-origin code-request throttling.
pub fn request_origin_key(origin: &str) -> String {
    format!("otp_request:origin:{origin}")
}

/// Key for per-email verification-attempt throttling.
pub fn verify_email_key(email: &str) -> String {
    format!("otp_verify:email:{email}")
}

/// Key for per-origin verification-attempt throttling.
pub fn verify_origin_key(origin: &str) -> String {
    format!("otp_verify:origin:{origin}")
}

pub struct RateLimiter<S: RateLimitStore> {
    store: S,
    window: Duration,
}

impl<S: RateLimitStore> RateLimiter<S> {
    pub fn new(store: S, window: Duration) -> Self {
        Self { store, window }
    }

    /// Count a hit against `key`; fails on the call that pushes the window
    /// total past `limit`.
    pub async fn check(&self, key: &str, limit: u32) -> Result<(), AuthServiceError> {
        let entry = self.store.increment(key, self.window).await?;
        if entry.count > limit {
            return Err(AuthServiceError::RateLimitExceeded);
        }
        Ok(())
    }

    /// Administrative unblock for `key`.
    pub async fn reset(&self, key: &str) -> Result<(), AuthServiceError> {
        self.store.reset(key).await
    }

    /// Delete entries whose window has lapsed.
    pub async fn sweep_expired(&self) -> Result<u64, AuthServiceError> {
        self.store.delete_expired(chrono::Utc::now()).await
    }
}
