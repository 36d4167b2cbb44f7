#![allow(async_fn_in_trait)]

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::types::{EmailMessage, OtpRecord, RateLimitEntry, RefreshTokenRecord, User};
use crate::error::AuthServiceError;

/// Store for user records. The store is the single writer for `User`.
pub trait UserRepository: Send + Sync {
    /// Look up a user by canonical email, creating the record on first sight.
    /// Must be atomic per email: two concurrent calls yield the same user.
    async fn find_or_create(&self, email: &str) -> Result<User, AuthServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError>;

    /// Stamp a successful login.
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AuthServiceError>;
}

/// Store for one-time sign-in codes, keyed by email.
pub trait OtpRepository: Send + Sync {
    /// Upsert: stores `record` as the single live code for its email,
    /// discarding any previous record for that email in the same operation.
    async fn put(&self, record: OtpRecord) -> Result<(), AuthServiceError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<OtpRecord>, AuthServiceError>;

    /// Atomic increment-and-fetch of the attempt counter, so concurrent
    /// wrong guesses cannot both observe a pre-increment count.
    async fn increment_attempts(&self, id: Uuid) -> Result<u32, AuthServiceError>;

    /// Compare-and-mark consumption. Returns `false` if the record was
    /// already used or is gone — the caller lost the race.
    async fn mark_used(&self, id: Uuid) -> Result<bool, AuthServiceError>;

    /// Returns `true` if a record existed.
    async fn delete_by_email(&self, email: &str) -> Result<bool, AuthServiceError>;

    /// Delete every record past its expiry. Returns the number removed.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError>;
}

/// Store for issued refresh credentials.
pub trait RefreshTokenRepository: Send + Sync {
    async fn insert(&self, record: RefreshTokenRecord) -> Result<(), AuthServiceError>;

    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, AuthServiceError>;

    /// Compare-and-set revocation. Returns `true` only for the call that
    /// actually flipped the record from active to revoked.
    async fn revoke(&self, id: Uuid) -> Result<bool, AuthServiceError>;

    /// Revoke every active token belonging to `user_id` (logout everywhere).
    /// Returns the number of tokens revoked.
    async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64, AuthServiceError>;
}

/// Fixed-window counters keyed by arbitrary strings.
pub trait RateLimitStore: Send + Sync {
    /// Atomic hit against `key`. A missing or lapsed entry restarts the
    /// window at count 1 with `reset_time = now + window`; otherwise the
    /// count is incremented in place. Returns the resulting entry.
    async fn increment(
        &self,
        key: &str,
        window: Duration,
    ) -> Result<RateLimitEntry, AuthServiceError>;

    /// Administrative unblock: drop the entry for `key`.
    async fn reset(&self, key: &str) -> Result<(), AuthServiceError>;

    /// Delete every entry past its `reset_time`. Returns the number removed.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError>;
}

/// Outbound email capability. One implementation is selected at wiring time;
/// the flows depend only on this trait.
pub trait EmailSender: Send + Sync {
    /// Deliver a message or return an error so the caller can surface a
    /// delivery failure.
    fn send(&self, message: &EmailMessage) -> anyhow::Result<()>;
}
