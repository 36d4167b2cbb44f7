//! In-memory store implementations.
//!
//! Each store is a `HashMap` behind one async mutex; every contract-relevant
//! mutation (upsert-by-key, increment-and-fetch, compare-and-mark) is a
//! single critical section, which is what the ports' atomicity contracts
//! require of any backing store.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::repository::{
    OtpRepository, RateLimitStore, RefreshTokenRepository, UserRepository,
};
use crate::domain::types::{OtpRecord, RateLimitEntry, RefreshTokenRecord, User};
use crate::error::AuthServiceError;

// ── Users ────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct UserTable {
    by_id: HashMap<Uuid, User>,
    id_by_email: HashMap<String, Uuid>,
}

#[derive(Clone, Default)]
pub struct MemoryUserRepository {
    inner: Arc<Mutex<UserTable>>,
}

impl UserRepository for MemoryUserRepository {
    async fn find_or_create(&self, email: &str) -> Result<User, AuthServiceError> {
        let mut table = self.inner.lock().await;
        if let Some(id) = table.id_by_email.get(email) {
            let user = table.by_id.get(id).cloned().ok_or_else(|| {
                AuthServiceError::Internal(anyhow::anyhow!("user index out of sync"))
            })?;
            return Ok(user);
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_owned(),
            created_at: Utc::now(),
            last_login_at: None,
        };
        table.id_by_email.insert(email.to_owned(), user.id);
        table.by_id.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError> {
        let table = self.inner.lock().await;
        Ok(table.by_id.get(&id).cloned())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AuthServiceError> {
        let mut table = self.inner.lock().await;
        if let Some(user) = table.by_id.get_mut(&id) {
            user.last_login_at = Some(at);
        }
        Ok(())
    }
}

// ── One-time codes ───────────────────────────────────────────────────────────

/// Keyed by email, so the one-live-record-per-email invariant holds by
/// construction: `put` is an upsert that drops the previous record.
#[derive(Clone, Default)]
pub struct MemoryOtpRepository {
    inner: Arc<Mutex<HashMap<String, OtpRecord>>>,
}

impl OtpRepository for MemoryOtpRepository {
    async fn put(&self, record: OtpRecord) -> Result<(), AuthServiceError> {
        let mut codes = self.inner.lock().await;
        codes.insert(record.email.clone(), record);
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<OtpRecord>, AuthServiceError> {
        let codes = self.inner.lock().await;
        Ok(codes.get(email).cloned())
    }

    async fn increment_attempts(&self, id: Uuid) -> Result<u32, AuthServiceError> {
        let mut codes = self.inner.lock().await;
        match codes.values_mut().find(|record| record.id == id) {
            Some(record) => {
                record.attempts += 1;
                Ok(record.attempts)
            }
            None => Err(AuthServiceError::Internal(anyhow::anyhow!(
                "one-time code record vanished mid-verify"
            ))),
        }
    }

    async fn mark_used(&self, id: Uuid) -> Result<bool, AuthServiceError> {
        let mut codes = self.inner.lock().await;
        match codes.values_mut().find(|record| record.id == id) {
            Some(record) if !record.is_used => {
                record.is_used = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_by_email(&self, email: &str) -> Result<bool, AuthServiceError> {
        let mut codes = self.inner.lock().await;
        Ok(codes.remove(email).is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError> {
        let mut codes = self.inner.lock().await;
        let before = codes.len();
        codes.retain(|_, record| record.expires_at > now);
        Ok((before - codes.len()) as u64)
    }
}

// ── Refresh tokens ───────────────────────────────────────────────────────────

#[derive(Default)]
struct RefreshTokenTable {
    by_token: HashMap<String, RefreshTokenRecord>,
}

#[derive(Clone, Default)]
pub struct MemoryRefreshTokenRepository {
    inner: Arc<Mutex<RefreshTokenTable>>,
}

impl RefreshTokenRepository for MemoryRefreshTokenRepository {
    async fn insert(&self, record: RefreshTokenRecord) -> Result<(), AuthServiceError> {
        let mut table = self.inner.lock().await;
        table.by_token.insert(record.token.clone(), record);
        Ok(())
    }

    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, AuthServiceError> {
        let table = self.inner.lock().await;
        Ok(table.by_token.get(token).cloned())
    }

    async fn revoke(&self, id: Uuid) -> Result<bool, AuthServiceError> {
        let mut table = self.inner.lock().await;
        match table
            .by_token
            .values_mut()
            .find(|record| record.id == id)
        {
            Some(record) if !record.is_revoked => {
                record.is_revoked = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64, AuthServiceError> {
        let mut table = self.inner.lock().await;
        let mut revoked = 0;
        for record in table.by_token.values_mut() {
            if record.user_id == user_id && !record.is_revoked {
                record.is_revoked = true;
                revoked += 1;
            }
        }
        Ok(revoked)
    }
}

// ── Rate-limit counters ──────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MemoryRateLimitStore {
    inner: Arc<Mutex<HashMap<String, RateLimitEntry>>>,
}

impl RateLimitStore for MemoryRateLimitStore {
    async fn increment(
        &self,
        key: &str,
        window: Duration,
    ) -> Result<RateLimitEntry, AuthServiceError> {
        let now = Utc::now();
        let mut entries = self.inner.lock().await;
        if let Some(entry) = entries.get_mut(key) {
            // A lapsed entry is treated as absent, never incremented.
            if entry.reset_time > now {
                entry.count += 1;
                return Ok(entry.clone());
            }
        }
        let entry = RateLimitEntry {
            id: Uuid::new_v4(),
            key: key.to_owned(),
            count: 1,
            reset_time: now + window,
            created_at: now,
        };
        entries.insert(key.to_owned(), entry.clone());
        Ok(entry)
    }

    async fn reset(&self, key: &str) -> Result<(), AuthServiceError> {
        let mut entries = self.inner.lock().await;
        entries.remove(key);
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthServiceError> {
        let mut entries = self.inner.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.reset_time > now);
        Ok((before - entries.len()) as u64)
    }
}
