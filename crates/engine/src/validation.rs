//! Structural validation of incoming commands.
//!
//! These checks look at the shape of the input (required fields, lengths,
//! obvious ranges). Entity rules are enforced again by
//! [`crate::Transaction`]; the two layers are allowed to drift and the
//! service reports both through the same error list.

use chrono::{DateTime, Utc};

use crate::{
    CreateTransactionCmd, Notification, RegisterUserCmd, UpdateTransactionCmd,
    transactions::{
        DESCRIPTION_MAX_LEN, KEY_AMOUNT, KEY_DATE, KEY_DESCRIPTION, KEY_TYPE,
        MAX_AMOUNT_MINOR, MSG_AMOUNT_NOT_POSITIVE, MSG_FUTURE_DATE, amount_too_large_message,
    },
};

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;
pub const PASSWORD_MIN_LEN: usize = 8;

pub fn validate_create(cmd: &CreateTransactionCmd) -> Notification {
    validate_transaction_fields(
        cmd.kind,
        cmd.date,
        cmd.description.as_deref(),
        cmd.amount_minor,
        Utc::now(),
    )
}

pub fn validate_update(cmd: &UpdateTransactionCmd) -> Notification {
    validate_transaction_fields(
        cmd.kind,
        cmd.date,
        cmd.description.as_deref(),
        cmd.amount_minor,
        Utc::now(),
    )
}

/// Field checks shared by create and update. The kind range is not checked
/// here.
pub fn validate_transaction_fields(
    kind: Option<i32>,
    date: Option<DateTime<Utc>>,
    description: Option<&str>,
    amount_minor: Option<i64>,
    now: DateTime<Utc>,
) -> Notification {
    let mut notification = Notification::new();

    if kind.is_none() {
        notification.add(KEY_TYPE, "transaction type is required");
    }

    match date {
        None => notification.add(KEY_DATE, "date is required"),
        Some(date) if date > now => notification.add(KEY_DATE, MSG_FUTURE_DATE),
        Some(_) => {}
    }

    match description.map(str::trim) {
        None | Some("") => notification.add(KEY_DESCRIPTION, "description is required"),
        Some(text) if text.chars().count() > DESCRIPTION_MAX_LEN => notification.add(
            KEY_DESCRIPTION,
            format!("description must be at most {DESCRIPTION_MAX_LEN} characters"),
        ),
        Some(_) => {}
    }

    match amount_minor {
        None => notification.add(KEY_AMOUNT, "amount is required"),
        Some(amount) if amount <= 0 => notification.add(KEY_AMOUNT, MSG_AMOUNT_NOT_POSITIVE),
        Some(amount) if amount > MAX_AMOUNT_MINOR => {
            notification.add(KEY_AMOUNT, amount_too_large_message())
        }
        Some(_) => {}
    }

    notification
}

pub fn validate_register(cmd: &RegisterUserCmd) -> Notification {
    let mut notification = Notification::new();

    let username = cmd.username.trim();
    let username_len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&username_len) {
        notification.add(
            "Username",
            format!(
                "username must be between {USERNAME_MIN_LEN} and {USERNAME_MAX_LEN} characters"
            ),
        );
    } else if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        notification.add(
            "Username",
            "username may only contain letters, digits, '_', '-' and '.'",
        );
    }

    if !looks_like_email(cmd.email.trim()) {
        notification.add("Email", "email is not valid");
    }

    notification.merge(validate_password(&cmd.password));
    notification
}

pub fn validate_password(password: &str) -> Notification {
    let mut notification = Notification::new();
    if password.chars().count() < PASSWORD_MIN_LEN {
        notification.add(
            "Password",
            format!("password must be at least {PASSWORD_MIN_LEN} characters"),
        );
    }
    notification
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        && !value.chars().any(char::is_whitespace)
}
