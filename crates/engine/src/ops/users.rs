use chrono::{Duration, Utc};
use sea_orm::{ActiveValue, Condition, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    MailMessage, Mailer, Notification, Outcome, RegisterUserCmd, ResultEngine, User, users,
    validation,
};

use super::{Engine, MSG_VALIDATION_FAILED, internal, normalize_email, with_tx};

/// How long a password reset token stays valid.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

impl Engine {
    /// Register a user and return its id.
    pub async fn register(&self, cmd: RegisterUserCmd) -> Outcome<Uuid> {
        let notification = validation::validate_register(&cmd);
        if !notification.is_valid() {
            return Outcome::invalid_with_errors(MSG_VALIDATION_FAILED, notification);
        }

        match self.insert_user(&cmd).await {
            Ok(outcome) => outcome,
            Err(err) => internal("error registering user", err),
        }
    }

    async fn insert_user(&self, cmd: &RegisterUserCmd) -> ResultEngine<Outcome<Uuid>> {
        let username = cmd.username.trim().to_string();
        let email = normalize_email(&cmd.email);

        with_tx!(self, |db_tx| {
            let existing = users::Entity::find()
                .filter(
                    Condition::any()
                        .add(users::Column::Username.eq(username.as_str()))
                        .add(users::Column::Email.eq(email.as_str())),
                )
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                let mut notification = Notification::new();
                notification.add("User", "username or email already registered");
                return Ok(Outcome::invalid_with_errors(
                    MSG_VALIDATION_FAILED,
                    notification,
                ));
            }

            let id = Uuid::new_v4();
            let salt = users::new_salt();
            let user = users::ActiveModel {
                id: ActiveValue::Set(id.to_string()),
                username: ActiveValue::Set(username.clone()),
                email: ActiveValue::Set(email.clone()),
                password_hash: ActiveValue::Set(users::hash_password(&salt, &cmd.password)?),
                password_salt: ActiveValue::Set(salt),
                created_at: ActiveValue::Set(Utc::now()),
                reset_token: ActiveValue::Set(None),
                reset_token_expires_at: ActiveValue::Set(None),
            };
            user.insert(&db_tx).await?;

            tracing::info!("user {username} registered");
            Ok(Outcome::ok_with_message(id, "user registered successfully"))
        })
    }

    /// Check credentials. `None` when the user is unknown or the password is wrong.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<Option<User>> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.database)
            .await?;

        match model {
            Some(model) if users::verify_password(&model, password) => {
                Ok(Some(User::try_from(model)?))
            }
            _ => Ok(None),
        }
    }

    pub async fn user(&self, id: Uuid) -> ResultEngine<Option<User>> {
        users::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?
            .map(User::try_from)
            .transpose()
    }

    /// Issue a reset token and mail it.
    ///
    /// Unknown addresses get the same answer as known ones.
    pub async fn request_password_reset(&self, email: &str, mailer: &dyn Mailer) -> Outcome<()> {
        const MESSAGE: &str = "if the address is registered, a reset link has been sent";

        let email = normalize_email(email);
        let model = match users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(&self.database)
            .await
        {
            Ok(model) => model,
            Err(err) => return internal("error requesting password reset", err.into()),
        };
        let Some(model) = model else {
            tracing::debug!("password reset requested for unknown address");
            return Outcome::ok_with_message((), MESSAGE);
        };

        let token = users::new_token();
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
        let to = model.email.clone();
        let mut active: users::ActiveModel = model.into();
        active.reset_token = ActiveValue::Set(Some(token.clone()));
        active.reset_token_expires_at = ActiveValue::Set(Some(expires_at));
        if let Err(err) = active.update(&self.database).await {
            return internal("error requesting password reset", err.into());
        }

        let message = MailMessage {
            to,
            subject: "Password reset".to_string(),
            body: format!(
                "Use this token to choose a new password: {token}\n\
                 It expires in {RESET_TOKEN_TTL_MINUTES} minutes."
            ),
        };
        if let Err(err) = mailer.send(message).await {
            return internal("error sending password reset mail", err);
        }

        Outcome::ok_with_message((), MESSAGE)
    }

    /// Replace the password of the user owning `token`. Tokens are single use.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Outcome<()> {
        let notification = validation::validate_password(new_password);
        if !notification.is_valid() {
            return Outcome::invalid_with_errors(MSG_VALIDATION_FAILED, notification);
        }

        match self.apply_password_reset(token, new_password).await {
            Ok(outcome) => outcome,
            Err(err) => internal("error resetting password", err),
        }
    }

    async fn apply_password_reset(
        &self,
        token: &str,
        new_password: &str,
    ) -> ResultEngine<Outcome<()>> {
        with_tx!(self, |db_tx| {
            let model = users::Entity::find()
                .filter(users::Column::ResetToken.eq(token))
                .one(&db_tx)
                .await?;

            let Some(model) = model else {
                return Ok(Outcome::invalid("invalid or expired reset token"));
            };
            let expired = model
                .reset_token_expires_at
                .is_none_or(|expires_at| expires_at < Utc::now());

            let user_id = users::user_id(&model)?;
            let salt = users::new_salt();
            let mut active: users::ActiveModel = model.into();
            active.reset_token = ActiveValue::Set(None);
            active.reset_token_expires_at = ActiveValue::Set(None);
            if !expired {
                active.password_hash = ActiveValue::Set(users::hash_password(&salt, new_password)?);
                active.password_salt = ActiveValue::Set(salt);
            }
            active.update(&db_tx).await?;

            // Expired tokens are still cleared, so this branch must reach the commit.
            if expired {
                tracing::warn!("expired reset token used for user {user_id}");
                Ok(Outcome::invalid("invalid or expired reset token"))
            } else {
                tracing::info!("password reset for user {user_id}");
                Ok(Outcome::ok_with_message((), "password updated successfully"))
            }
        })
    }
}
