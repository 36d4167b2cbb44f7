use std::sync::Arc;

use anyhow::bail;

use crate::domain::repository::EmailSender;
use crate::domain::types::EmailMessage;

/// Local/dev sender that logs the message instead of delivering it.
#[derive(Clone, Debug)]
pub struct LogEmailSender;

impl EmailSender for LogEmailSender {
    fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "email send stub"
        );
        Ok(())
    }
}

/// Select the email driver named in configuration. Provider-backed drivers
/// plug in here without touching the flows, which see only the trait.
pub fn build_sender(driver: &str) -> anyhow::Result<Arc<dyn EmailSender>> {
    match driver {
        "log" => Ok(Arc::new(LogEmailSender)),
        other => bail!("unknown email driver {other:?} (expected \"log\")"),
    }
}
