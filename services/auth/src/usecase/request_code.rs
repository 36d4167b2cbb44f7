use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::domain::repository::{EmailSender, OtpRepository, RateLimitStore};
use crate::domain::types::{EmailMessage, normalize_email};
use crate::error::AuthServiceError;
use crate::otp::OtpManager;
use crate::ratelimit::{self, RateLimiter};

pub struct RequestCodeInput {
    pub email: String,
    /// Caller network origin, the second throttling granularity.
    pub origin: String,
}

#[derive(Debug)]
pub struct RequestCodeOutput {
    pub expires_in_minutes: i64,
    pub cooldown_seconds: i64,
}

pub struct RequestCodeUseCase<O, L>
where
    O: OtpRepository,
    L: RateLimitStore,
{
    pub otp: OtpManager<O>,
    pub limiter: RateLimiter<L>,
    pub email_sender: Arc<dyn EmailSender>,
    pub max_requests_per_email: u32,
    pub max_requests_per_origin: u32,
    pub resend_cooldown: Duration,
}

impl<O, L> RequestCodeUseCase<O, L>
where
    O: OtpRepository,
    L: RateLimitStore,
{
    pub async fn execute(
        &self,
        input: RequestCodeInput,
    ) -> Result<RequestCodeOutput, AuthServiceError> {
        let email = normalize_email(&input.email);

        // 1. Independent throttles: either breach rejects.
        self.limiter
            .check(
                &ratelimit::request_email_key(&email),
                self.max_requests_per_email,
            )
            .await?;
        self.limiter
            .check(
                &ratelimit::request_origin_key(&input.origin),
                self.max_requests_per_origin,
            )
            .await?;

        // 2. Resend cooldown, independent of the window counters.
        if let Some(issued_at) = self.otp.last_issued_at(&email).await? {
            if Utc::now() - issued_at < self.resend_cooldown {
                return Err(AuthServiceError::OtpCooldownActive);
            }
        }

        // 3. Issue and hand off for delivery. A delivery failure leaves the
        //    code valid; the caller may retry under the same cooldown.
        let issued = self.otp.issue(&email).await?;
        let expires_in_minutes = self.otp.ttl().num_minutes();
        let message = EmailMessage {
            to: email,
            subject: "Your Atelier sign-in code".to_owned(),
            body: format!(
                "Your sign-in code is {code}. It expires in {expires_in_minutes} minutes.",
                code = issued.code,
            ),
        };
        if let Err(e) = self.email_sender.send(&message) {
            tracing::warn!(error = %e, to = %message.to, "sign-in code delivery failed");
            return Err(AuthServiceError::EmailSendFailed);
        }

        Ok(RequestCodeOutput {
            expires_in_minutes,
            cooldown_seconds: self.resend_cooldown.num_seconds(),
        })
    }
}
