use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Account identified by a case-normalized email address. Created on the
/// first successful code verification for an unseen email, never deleted by
/// the auth flows.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// One-time sign-in code. Only the SHA-256 digest of the code is stored;
/// the plaintext exists solely in the email handed to the sender.
///
/// At most one live record exists per email — issuing a new code replaces
/// the previous record, which also resets the attempt counter.
#[derive(Debug, Clone)]
pub struct OtpRecord {
    pub id: Uuid,
    pub email: String,
    pub code_hash: Vec<u8>,
    pub attempts: u32,
    pub expires_at: DateTime<Utc>,
    pub is_used: bool,
    pub created_at: DateTime<Utc>,
}

impl OtpRecord {
    /// A record is live while it is unused and unexpired.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && self.expires_at > now
    }
}

/// Issued refresh credential. `token` holds the signed value the client
/// presents; revocation is terminal.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub is_revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked && self.expires_at > now
    }
}

/// Fixed-window counter state for one rate-limit key. Once `reset_time`
/// has passed the entry is logically absent and the next hit restarts the
/// window at count 1.
#[derive(Debug, Clone)]
pub struct RateLimitEntry {
    pub id: Uuid,
    pub key: String,
    pub count: u32,
    pub reset_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Outbound email handed to the [`EmailSender`] collaborator.
///
/// [`EmailSender`]: crate::domain::repository::EmailSender
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Canonical form used for store keys and user records.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}
