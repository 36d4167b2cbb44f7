use chrono::Utc;

use crate::domain::repository::RefreshTokenRepository;
use crate::domain::types::RefreshTokenRecord;
use crate::error::AuthServiceError;
use crate::token::{TokenKind, TokenService};

#[derive(Debug)]
pub struct RefreshSessionOutput {
    pub access_token: String,
    pub refresh_token: String,
}

/// Exchange a refresh token for a new access/refresh pair, rotating on use:
/// the presented token is revoked in the same logical operation that creates
/// its replacement, so a stolen token replays as `TOKEN_INVALID` once the
/// legitimate client has rotated past it.
pub struct RefreshSessionUseCase<R: RefreshTokenRepository> {
    pub refresh_tokens: R,
    pub tokens: TokenService,
}

impl<R: RefreshTokenRepository> RefreshSessionUseCase<R> {
    pub async fn execute(
        &self,
        refresh_token_value: &str,
    ) -> Result<RefreshSessionOutput, AuthServiceError> {
        let record = self
            .refresh_tokens
            .find_by_token(refresh_token_value)
            .await?
            .ok_or(AuthServiceError::TokenInvalid)?;

        if record.is_revoked {
            return Err(AuthServiceError::TokenInvalid);
        }
        let now = Utc::now();
        if record.expires_at <= now {
            // Opportunistic: an expired token can never become active again.
            self.refresh_tokens.revoke(record.id).await?;
            return Err(AuthServiceError::TokenExpired);
        }

        // Compare-and-set revocation: a concurrent refresh of the same token
        // loses here instead of rotating twice.
        if !self.refresh_tokens.revoke(record.id).await? {
            return Err(AuthServiceError::TokenInvalid);
        }

        let access = self.tokens.issue(record.user_id, TokenKind::Access)?;
        let refresh = self.tokens.issue(record.user_id, TokenKind::Refresh)?;
        self.refresh_tokens
            .insert(RefreshTokenRecord {
                id: refresh.jti,
                user_id: record.user_id,
                token: refresh.token.clone(),
                expires_at: refresh.expires_at,
                is_revoked: false,
                created_at: now,
            })
            .await?;

        Ok(RefreshSessionOutput {
            access_token: access.token,
            refresh_token: refresh.token,
        })
    }
}
