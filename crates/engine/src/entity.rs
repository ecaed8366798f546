//! Identity and audit fields shared by persisted aggregates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Common identity/audit data.
///
/// `id` never changes after construction and `updated_at` stays `None` until
/// the first mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMeta {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    deleted: bool,
}

impl EntityMeta {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: None,
            deleted: false,
        }
    }

    /// Rebuild the audit data of a row loaded from storage.
    pub(crate) fn restore(
        id: Uuid,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
        deleted: bool,
    ) -> Self {
        Self {
            id,
            created_at,
            updated_at,
            deleted,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }

    pub(crate) fn mark_deleted(&mut self) {
        self.deleted = true;
        self.touch();
    }
}

impl Default for EntityMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// Implemented by every persisted aggregate.
pub trait Entity {
    fn meta(&self) -> &EntityMeta;

    fn id(&self) -> Uuid {
        self.meta().id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_meta_is_untouched() {
        let meta = EntityMeta::new();
        assert!(meta.updated_at().is_none());
        assert!(!meta.is_deleted());
    }

    #[test]
    fn mark_deleted_stamps_and_keeps_id() {
        let mut meta = EntityMeta::new();
        let id = meta.id();
        meta.mark_deleted();
        meta.mark_deleted();
        assert!(meta.is_deleted());
        assert!(meta.updated_at().is_some());
        assert_eq!(meta.id(), id);
    }
}
