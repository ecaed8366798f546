//! Negative balance alerts.

use uuid::Uuid;

use crate::{MailMessage, Mailer, ResultEngine, UserBalance, money::format_minor};

use super::Engine;

impl Engine {
    /// Users whose balance (income minus expense) is below zero.
    pub async fn negative_balances(&self) -> ResultEngine<Vec<UserBalance>> {
        let balances = self.store.balances_by_user().await?;
        Ok(balances
            .into_iter()
            .filter(|b| b.balance_minor < 0)
            .collect())
    }

    /// Mail every user with a negative balance. Returns how many mails went out.
    ///
    /// A failed delivery is logged and does not stop the run.
    pub async fn notify_negative_balances(&self, mailer: &dyn Mailer) -> ResultEngine<usize> {
        let mut sent = 0;
        for balance in self.negative_balances().await? {
            let Ok(user_id) = Uuid::parse_str(&balance.user_id) else {
                tracing::warn!("skipping balance of malformed user id {}", balance.user_id);
                continue;
            };
            let Some(user) = self.user(user_id).await? else {
                tracing::warn!("skipping balance of unknown user {user_id}");
                continue;
            };

            let message = MailMessage {
                to: user.email.clone(),
                subject: "Your balance is negative".to_string(),
                body: format!(
                    "Hi {},\n\nyour current balance is {}. \
                     Review your recent expenses to get back on track.",
                    user.username,
                    format_minor(balance.balance_minor)
                ),
            };
            match mailer.send(message).await {
                Ok(()) => sent += 1,
                Err(err) => tracing::error!("failed to notify user {user_id}: {err}"),
            }
        }

        tracing::info!("negative balance notifications sent: {sent}");
        Ok(sent)
    }
}
