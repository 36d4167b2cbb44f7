//! One-time sign-in code lifecycle: generate, hash, store, verify, sweep.
//!
//! One live record per email — issuing a new code replaces the previous one,
//! so an attacker cannot accumulate outstanding codes to guess in parallel,
//! and a fresh code implicitly resets the attempt counter for a legitimate
//! user who mistyped and requested again.

use chrono::{DateTime, Duration, Utc};
use rand::RngExt;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::domain::repository::OtpRepository;
use crate::domain::types::OtpRecord;
use crate::error::AuthServiceError;

fn generate_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

fn hash_code(code: &str) -> Vec<u8> {
    Sha256::digest(code.as_bytes()).to_vec()
}

/// A freshly issued code. The plaintext exists only in this value, for
/// handing to the email collaborator; the store holds the digest.
#[derive(Debug)]
pub struct IssuedOtp {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

pub struct OtpManager<R: OtpRepository> {
    repo: R,
    code_length: usize,
    ttl: Duration,
    max_attempts: u32,
}

impl<R: OtpRepository> OtpManager<R> {
    pub fn new(repo: R, code_length: usize, ttl: Duration, max_attempts: u32) -> Self {
        Self {
            repo,
            code_length,
            ttl,
            max_attempts,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a new code for `email`, discarding any previous record.
    pub async fn issue(&self, email: &str) -> Result<IssuedOtp, AuthServiceError> {
        let now = Utc::now();
        let code = generate_code(self.code_length);
        let record = OtpRecord {
            id: Uuid::new_v4(),
            email: email.to_owned(),
            code_hash: hash_code(&code),
            attempts: 0,
            expires_at: now + self.ttl,
            is_used: false,
            created_at: now,
        };
        let expires_at = record.expires_at;
        self.repo.put(record).await?;
        Ok(IssuedOtp { code, expires_at })
    }

    /// Creation time of the live record for `email`, if any. Used by the
    /// request flow's resend cooldown; used and expired records do not count.
    pub async fn last_issued_at(
        &self,
        email: &str,
    ) -> Result<Option<DateTime<Utc>>, AuthServiceError> {
        let now = Utc::now();
        Ok(self
            .repo
            .find_by_email(email)
            .await?
            .filter(|record| record.is_live(now))
            .map(|record| record.created_at))
    }

    /// Check `candidate` against the live record for `email`.
    ///
    /// Expiry and attempt exhaustion delete the record; a consumed record
    /// reports `OtpInvalid` without revealing whether the original code was
    /// ever correct.
    pub async fn verify(&self, email: &str, candidate: &str) -> Result<(), AuthServiceError> {
        let record = self
            .repo
            .find_by_email(email)
            .await?
            .ok_or(AuthServiceError::OtpNotFound)?;

        let now = Utc::now();
        if record.expires_at <= now {
            self.repo.delete_by_email(email).await?;
            return Err(AuthServiceError::OtpExpired);
        }
        if record.is_used {
            return Err(AuthServiceError::OtpInvalid);
        }
        if record.attempts >= self.max_attempts {
            self.repo.delete_by_email(email).await?;
            return Err(AuthServiceError::OtpMaxAttemptsExceeded);
        }

        let candidate_hash = hash_code(candidate);
        if bool::from(candidate_hash.as_slice().ct_eq(record.code_hash.as_slice())) {
            // Compare-and-mark at the store: only one concurrent verify wins.
            if self.repo.mark_used(record.id).await? {
                Ok(())
            } else {
                Err(AuthServiceError::OtpInvalid)
            }
        } else {
            self.repo.increment_attempts(record.id).await?;
            Err(AuthServiceError::OtpInvalid)
        }
    }

    /// Delete records past expiry. Foreground reads re-check expiry anyway;
    /// this is reclamation, not enforcement.
    pub async fn sweep_expired(&self) -> Result<u64, AuthServiceError> {
        self.repo.delete_expired(Utc::now()).await
    }
}
