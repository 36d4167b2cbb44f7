use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Auth service domain error variants. These are definitive authentication
/// decisions — flows propagate them to the boundary unchanged, no retries.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("no sign-in code requested for this email")]
    OtpNotFound,
    #[error("sign-in code expired")]
    OtpExpired,
    #[error("invalid sign-in code")]
    OtpInvalid,
    #[error("too many failed attempts for this code")]
    OtpMaxAttemptsExceeded,
    #[error("a sign-in code was sent recently")]
    OtpCooldownActive,
    #[error("rate limit exceeded")]
    RateLimitExceeded,
    #[error("invalid token")]
    TokenInvalid,
    #[error("token expired")]
    TokenExpired,
    #[error("user not found")]
    UserNotFound,
    #[error("failed to send sign-in email")]
    EmailSendFailed,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OtpNotFound => "OTP_NOT_FOUND",
            Self::OtpExpired => "OTP_EXPIRED",
            Self::OtpInvalid => "OTP_INVALID",
            Self::OtpMaxAttemptsExceeded => "OTP_MAX_ATTEMPTS_EXCEEDED",
            Self::OtpCooldownActive => "OTP_COOLDOWN_ACTIVE",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::TokenInvalid => "TOKEN_INVALID",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::EmailSendFailed => "EMAIL_SEND_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::OtpNotFound | Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::OtpExpired | Self::OtpInvalid | Self::TokenInvalid | Self::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            Self::OtpMaxAttemptsExceeded | Self::OtpCooldownActive | Self::RateLimitExceeded => {
                StatusCode::TOO_MANY_REQUESTS
            }
            Self::EmailSendFailed => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status
        // for all requests, and 4xx are expected client outcomes. Internal errors
        // need the anyhow chain logged so the root cause is traceable.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
