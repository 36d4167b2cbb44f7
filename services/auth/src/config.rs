use anyhow::Context as _;
use chrono::Duration;
use serde::Deserialize;

use atelier_core::config::Config;

/// Auth service configuration loaded from environment variables. Every
/// tunable has a default except `JWT_SECRET`.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing access and refresh tokens.
    pub jwt_secret: String,
    /// TCP port to listen on. Env var: `AUTH_PORT`.
    #[serde(default = "default_auth_port")]
    pub auth_port: u16,
    /// Digits per sign-in code.
    #[serde(default = "default_otp_code_length")]
    pub otp_code_length: usize,
    /// Sign-in code time-to-live.
    #[serde(default = "default_otp_ttl_minutes")]
    pub otp_ttl_minutes: i64,
    /// Wrong guesses tolerated per code before it is discarded.
    #[serde(default = "default_otp_max_attempts")]
    pub otp_max_attempts: u32,
    /// Minimum spacing between code emails for the same address.
    #[serde(default = "default_otp_resend_cooldown_seconds")]
    pub otp_resend_cooldown_seconds: i64,
    /// Fixed rate-limit window shared by both key classes.
    #[serde(default = "default_rate_limit_window_minutes")]
    pub rate_limit_window_minutes: i64,
    /// Code requests allowed per email per window.
    #[serde(default = "default_rate_limit_max_requests_per_email")]
    pub rate_limit_max_requests_per_email: u32,
    /// Code requests allowed per caller origin per window.
    #[serde(default = "default_rate_limit_max_requests_per_origin")]
    pub rate_limit_max_requests_per_origin: u32,
    /// Verification calls allowed per key per window.
    #[serde(default = "default_rate_limit_max_verify_attempts")]
    pub rate_limit_max_verify_attempts: u32,
    /// Access-token lifetime, e.g. "15m".
    #[serde(default = "default_access_token_ttl")]
    pub access_token_ttl: String,
    /// Refresh-token lifetime, e.g. "7d".
    #[serde(default = "default_refresh_token_ttl")]
    pub refresh_token_ttl: String,
    /// Interval between background reclamation sweeps.
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,
    /// Email driver name, resolved at wiring time.
    #[serde(default = "default_email_driver")]
    pub email_driver: String,
}

impl Config for AuthConfig {}

fn default_auth_port() -> u16 {
    3112
}
fn default_otp_code_length() -> usize {
    6
}
fn default_otp_ttl_minutes() -> i64 {
    10
}
fn default_otp_max_attempts() -> u32 {
    5
}
fn default_otp_resend_cooldown_seconds() -> i64 {
    60
}
fn default_rate_limit_window_minutes() -> i64 {
    60
}
fn default_rate_limit_max_requests_per_email() -> u32 {
    5
}
fn default_rate_limit_max_requests_per_origin() -> u32 {
    30
}
fn default_rate_limit_max_verify_attempts() -> u32 {
    20
}
fn default_access_token_ttl() -> String {
    "15m".to_owned()
}
fn default_refresh_token_ttl() -> String {
    "7d".to_owned()
}
fn default_sweep_interval_seconds() -> u64 {
    300
}
fn default_email_driver() -> String {
    "log".to_owned()
}

/// Parsed, ready-to-use settings derived from [`AuthConfig`].
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub auth_port: u16,
    pub otp_code_length: usize,
    pub otp_ttl: Duration,
    pub otp_max_attempts: u32,
    pub resend_cooldown: Duration,
    pub rate_limit_window: Duration,
    pub max_requests_per_email: u32,
    pub max_requests_per_origin: u32,
    pub max_verify_attempts: u32,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub sweep_interval: std::time::Duration,
    pub email_driver: String,
}

impl AuthConfig {
    pub fn into_settings(self) -> anyhow::Result<AuthSettings> {
        Ok(AuthSettings {
            access_token_ttl: parse_duration(&self.access_token_ttl)
                .context("ACCESS_TOKEN_TTL")?,
            refresh_token_ttl: parse_duration(&self.refresh_token_ttl)
                .context("REFRESH_TOKEN_TTL")?,
            jwt_secret: self.jwt_secret,
            auth_port: self.auth_port,
            otp_code_length: self.otp_code_length,
            otp_ttl: Duration::minutes(self.otp_ttl_minutes),
            otp_max_attempts: self.otp_max_attempts,
            resend_cooldown: Duration::seconds(self.otp_resend_cooldown_seconds),
            rate_limit_window: Duration::minutes(self.rate_limit_window_minutes),
            max_requests_per_email: self.rate_limit_max_requests_per_email,
            max_requests_per_origin: self.rate_limit_max_requests_per_origin,
            max_verify_attempts: self.rate_limit_max_verify_attempts,
            sweep_interval: std::time::Duration::from_secs(self.sweep_interval_seconds),
            email_driver: self.email_driver,
        })
    }
}

/// Parse a short duration string: "45s", "15m", "12h", "7d".
pub fn parse_duration(raw: &str) -> anyhow::Result<Duration> {
    let raw = raw.trim();
    anyhow::ensure!(raw.len() >= 2, "duration too short: {raw:?}");
    let (value, unit) = raw.split_at(raw.len() - 1);
    let value: i64 = value
        .parse()
        .with_context(|| format!("invalid duration value in {raw:?}"))?;
    anyhow::ensure!(value > 0, "duration must be positive: {raw:?}");
    match unit {
        "s" => Ok(Duration::seconds(value)),
        "m" => Ok(Duration::minutes(value)),
        "h" => Ok(Duration::hours(value)),
        "d" => Ok(Duration::days(value)),
        other => anyhow::bail!("unknown duration unit {other:?} in {raw:?} (expected s, m, h or d)"),
    }
}
