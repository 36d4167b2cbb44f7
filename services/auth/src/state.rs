use std::sync::Arc;

use crate::config::AuthSettings;
use crate::domain::repository::EmailSender;
use crate::infra::memory::{
    MemoryOtpRepository, MemoryRateLimitStore, MemoryRefreshTokenRepository, MemoryUserRepository,
};
use crate::otp::OtpManager;
use crate::ratelimit::RateLimiter;
use crate::token::TokenService;

/// Shared application state passed to every handler via axum `State`.
///
/// Stores are handles (cheap clones over shared maps); handlers assemble
/// usecases from them per request.
#[derive(Clone)]
pub struct AppState {
    pub users: MemoryUserRepository,
    pub otps: MemoryOtpRepository,
    pub refresh_tokens: MemoryRefreshTokenRepository,
    pub rate_limits: MemoryRateLimitStore,
    pub email_sender: Arc<dyn EmailSender>,
    pub tokens: TokenService,
    pub settings: AuthSettings,
}

impl AppState {
    pub fn new(settings: AuthSettings, email_sender: Arc<dyn EmailSender>) -> Self {
        let tokens = TokenService::new(
            settings.jwt_secret.clone(),
            settings.access_token_ttl,
            settings.refresh_token_ttl,
        );
        Self {
            users: MemoryUserRepository::default(),
            otps: MemoryOtpRepository::default(),
            refresh_tokens: MemoryRefreshTokenRepository::default(),
            rate_limits: MemoryRateLimitStore::default(),
            email_sender,
            tokens,
            settings,
        }
    }

    pub fn otp_manager(&self) -> OtpManager<MemoryOtpRepository> {
        OtpManager::new(
            self.otps.clone(),
            self.settings.otp_code_length,
            self.settings.otp_ttl,
            self.settings.otp_max_attempts,
        )
    }

    pub fn rate_limiter(&self) -> RateLimiter<MemoryRateLimitStore> {
        RateLimiter::new(self.rate_limits.clone(), self.settings.rate_limit_window)
    }
}
