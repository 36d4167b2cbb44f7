use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use atelier_auth::config::AuthSettings;
use atelier_auth::domain::repository::EmailSender;
use atelier_auth::domain::types::{EmailMessage, OtpRecord, RefreshTokenRecord};
use atelier_auth::infra::memory::{
    MemoryOtpRepository, MemoryRateLimitStore, MemoryRefreshTokenRepository, MemoryUserRepository,
};
use atelier_auth::state::AppState;
use atelier_auth::usecase::login::LoginUseCase;
use atelier_auth::usecase::logout::LogoutUseCase;
use atelier_auth::usecase::refresh::RefreshSessionUseCase;
use atelier_auth::usecase::request_code::{RequestCodeInput, RequestCodeUseCase};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-integration-tests";
pub const TEST_ORIGIN: &str = "203.0.113.9";

/// Handle onto the messages a [`RecordingEmailSender`] has delivered.
pub type SentHandle = Arc<Mutex<Vec<EmailMessage>>>;

// ── RecordingEmailSender ─────────────────────────────────────────────────────

/// Captures every message; the only place the plaintext code escapes to.
/// With `fail` set it records the message and then reports delivery failure.
pub struct RecordingEmailSender {
    pub sent: Arc<Mutex<Vec<EmailMessage>>>,
    pub fail: bool,
}

impl RecordingEmailSender {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    pub fn sent_handle(&self) -> Arc<Mutex<Vec<EmailMessage>>> {
        Arc::clone(&self.sent)
    }
}

impl EmailSender for RecordingEmailSender {
    fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(message.clone());
        if self.fail {
            anyhow::bail!("smtp relay unavailable");
        }
        Ok(())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn test_settings() -> AuthSettings {
    AuthSettings {
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        auth_port: 0,
        otp_code_length: 6,
        otp_ttl: Duration::minutes(10),
        otp_max_attempts: 5,
        resend_cooldown: Duration::seconds(60),
        rate_limit_window: Duration::minutes(60),
        max_requests_per_email: 5,
        max_requests_per_origin: 30,
        max_verify_attempts: 20,
        access_token_ttl: Duration::minutes(15),
        refresh_token_ttl: Duration::days(7),
        sweep_interval: std::time::Duration::from_secs(300),
        email_driver: "log".to_owned(),
    }
}

/// State wired with a recording sender; returns the handle the tests read
/// delivered codes from.
pub fn build_state(settings: AuthSettings) -> (AppState, Arc<Mutex<Vec<EmailMessage>>>) {
    let sender = RecordingEmailSender::new();
    let sent = sender.sent_handle();
    (AppState::new(settings, Arc::new(sender)), sent)
}

pub fn build_state_with_failing_email(
    settings: AuthSettings,
) -> (AppState, Arc<Mutex<Vec<EmailMessage>>>) {
    let sender = RecordingEmailSender::failing();
    let sent = sender.sent_handle();
    (AppState::new(settings, Arc::new(sender)), sent)
}

pub fn test_otp_record(email: &str, expires_at: DateTime<Utc>) -> OtpRecord {
    OtpRecord {
        id: Uuid::new_v4(),
        email: email.to_owned(),
        code_hash: vec![0xAB; 32],
        attempts: 0,
        expires_at,
        is_used: false,
        created_at: Utc::now(),
    }
}

pub fn test_refresh_record(user_id: Uuid, expires_at: DateTime<Utc>) -> RefreshTokenRecord {
    RefreshTokenRecord {
        id: Uuid::new_v4(),
        user_id,
        token: format!("opaque-{}", Uuid::new_v4()),
        expires_at,
        is_revoked: false,
        created_at: Utc::now(),
    }
}

// ── Usecase wiring ───────────────────────────────────────────────────────────

pub fn request_code_usecase(
    state: &AppState,
) -> RequestCodeUseCase<MemoryOtpRepository, MemoryRateLimitStore> {
    RequestCodeUseCase {
        otp: state.otp_manager(),
        limiter: state.rate_limiter(),
        email_sender: state.email_sender.clone(),
        max_requests_per_email: state.settings.max_requests_per_email,
        max_requests_per_origin: state.settings.max_requests_per_origin,
        resend_cooldown: state.settings.resend_cooldown,
    }
}

pub fn login_usecase(
    state: &AppState,
) -> LoginUseCase<
    MemoryUserRepository,
    MemoryOtpRepository,
    MemoryRefreshTokenRepository,
    MemoryRateLimitStore,
> {
    LoginUseCase {
        users: state.users.clone(),
        otp: state.otp_manager(),
        refresh_tokens: state.refresh_tokens.clone(),
        limiter: state.rate_limiter(),
        tokens: state.tokens.clone(),
        verify_limit: state.settings.max_verify_attempts,
    }
}

pub fn refresh_usecase(state: &AppState) -> RefreshSessionUseCase<MemoryRefreshTokenRepository> {
    RefreshSessionUseCase {
        refresh_tokens: state.refresh_tokens.clone(),
        tokens: state.tokens.clone(),
    }
}

pub fn logout_usecase(state: &AppState) -> LogoutUseCase<MemoryRefreshTokenRepository> {
    LogoutUseCase {
        refresh_tokens: state.refresh_tokens.clone(),
    }
}

// ── Code capture ─────────────────────────────────────────────────────────────

/// Pull the sign-in code out of a delivered email body.
pub fn code_from_message(message: &EmailMessage) -> String {
    let digits: String = message
        .body
        .split("code is ")
        .nth(1)
        .expect("body should contain the code")
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    assert!(!digits.is_empty(), "no code found in {:?}", message.body);
    digits
}

pub fn last_delivered_code(sent: &Arc<Mutex<Vec<EmailMessage>>>) -> String {
    let sent = sent.lock().unwrap();
    code_from_message(sent.last().expect("no email delivered"))
}

/// Request a code for `email` and return the plaintext captured from the
/// delivered message.
pub async fn request_and_capture_code(
    state: &AppState,
    sent: &Arc<Mutex<Vec<EmailMessage>>>,
    email: &str,
) -> String {
    request_code_usecase(state)
        .execute(RequestCodeInput {
            email: email.to_owned(),
            origin: TEST_ORIGIN.to_owned(),
        })
        .await
        .expect("request-code should succeed");
    last_delivered_code(sent)
}

/// A code guaranteed to differ from `code` in its first digit.
pub fn wrong_code(code: &str) -> String {
    let mut chars: Vec<char> = code.chars().collect();
    chars[0] = if chars[0] == '9' { '0' } else { '9' };
    chars.into_iter().collect()
}
