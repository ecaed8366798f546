use async_trait::async_trait;
use engine::{EngineError, MailMessage, Mailer};

/// Writes outgoing mail to the log instead of delivering it.
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> Result<(), EngineError> {
        if message.to.is_empty() {
            return Err(EngineError::Mail("missing recipient".to_string()));
        }
        tracing::info!(
            from = %self.from,
            to = %message.to,
            subject = %message.subject,
            "mail: {}",
            message.body
        );
        Ok(())
    }
}
