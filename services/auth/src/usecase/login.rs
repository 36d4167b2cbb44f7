use chrono::Utc;

use crate::domain::repository::{
    OtpRepository, RateLimitStore, RefreshTokenRepository, UserRepository,
};
use crate::domain::types::{RefreshTokenRecord, User, normalize_email};
use crate::error::AuthServiceError;
use crate::otp::OtpManager;
use crate::ratelimit::{self, RateLimiter};
use crate::token::{TokenKind, TokenService};

pub struct LoginInput {
    pub email: String,
    pub code: String,
    pub origin: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// Verify a sign-in code and establish a session: find-or-create the user,
/// stamp the login, issue an access/refresh pair, persist the refresh token.
pub struct LoginUseCase<U, O, R, L>
where
    U: UserRepository,
    O: OtpRepository,
    R: RefreshTokenRepository,
    L: RateLimitStore,
{
    pub users: U,
    pub otp: OtpManager<O>,
    pub refresh_tokens: R,
    pub limiter: RateLimiter<L>,
    pub tokens: TokenService,
    /// Verification-call threshold, applied to both keys. Checked before the
    /// code is even inspected, so window exhaustion and per-code attempt
    /// exhaustion stay independent defenses.
    pub verify_limit: u32,
}

impl<U, O, R, L> LoginUseCase<U, O, R, L>
where
    U: UserRepository,
    O: OtpRepository,
    R: RefreshTokenRepository,
    L: RateLimitStore,
{
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, AuthServiceError> {
        let email = normalize_email(&input.email);

        self.limiter
            .check(&ratelimit::verify_email_key(&email), self.verify_limit)
            .await?;
        self.limiter
            .check(
                &ratelimit::verify_origin_key(&input.origin),
                self.verify_limit,
            )
            .await?;

        self.otp.verify(&email, &input.code).await?;

        let user = self.users.find_or_create(&email).await?;
        let now = Utc::now();
        self.users.record_login(user.id, now).await?;
        let user = User {
            last_login_at: Some(now),
            ..user
        };

        let access = self.tokens.issue(user.id, TokenKind::Access)?;
        let refresh = self.tokens.issue(user.id, TokenKind::Refresh)?;
        self.refresh_tokens
            .insert(RefreshTokenRecord {
                id: refresh.jti,
                user_id: user.id,
                token: refresh.token.clone(),
                expires_at: refresh.expires_at,
                is_revoked: false,
                created_at: now,
            })
            .await?;

        Ok(LoginOutput {
            user,
            access_token: access.token,
            refresh_token: refresh.token,
        })
    }
}
