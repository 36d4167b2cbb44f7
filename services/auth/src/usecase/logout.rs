use crate::domain::repository::RefreshTokenRepository;
use crate::error::AuthServiceError;

/// Revoke the presented refresh token. Logout without a token is a no-op
/// success, so a client that already lost its token can still "log out".
pub struct LogoutUseCase<R: RefreshTokenRepository> {
    pub refresh_tokens: R,
}

impl<R: RefreshTokenRepository> LogoutUseCase<R> {
    pub async fn execute(&self, refresh_token: Option<&str>) -> Result<(), AuthServiceError> {
        let Some(value) = refresh_token else {
            return Ok(());
        };
        if let Some(record) = self.refresh_tokens.find_by_token(value).await? {
            // Already-revoked is fine — logout is idempotent.
            self.refresh_tokens.revoke(record.id).await?;
        }
        Ok(())
    }
}
