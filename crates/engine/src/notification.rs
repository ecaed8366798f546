//! Validation accumulator.
//!
//! A [`Notification`] collects `(key, message)` failures instead of stopping
//! at the first one, so callers can report every violation at once. One
//! instance lives for a single validation pass.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single validation failure.
///
/// `key` names the offending field or operation, `message` is meant for the
/// end user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationItem {
    pub key: String,
    pub message: String,
}

impl NotificationItem {
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Ordered list of validation failures. Valid when empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Notification {
    items: Vec<NotificationItem>,
}

impl Notification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.items.push(NotificationItem::new(key, message));
    }

    pub fn extend<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = NotificationItem>,
    {
        self.items.extend(items);
    }

    /// Append every failure of `other`, keeping their order.
    pub fn merge(&mut self, other: Notification) {
        self.items.extend(other.items);
    }

    pub fn is_valid(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[NotificationItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<NotificationItem> {
        self.items
    }

    /// All messages joined with `", "`.
    pub fn error_messages(&self) -> String {
        self.items
            .iter()
            .map(|item| item.message.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl From<Vec<NotificationItem>> for Notification {
    fn from(items: Vec<NotificationItem>) -> Self {
        Self { items }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error_messages())
    }
}
