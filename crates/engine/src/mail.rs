//! Outgoing mail seam.
//!
//! Delivery is left to the host application; the engine only composes
//! messages.

use async_trait::async_trait;

use crate::ResultEngine;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> ResultEngine<()>;
}
