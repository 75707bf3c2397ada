//! Base shape shared by every persisted entity.
//!
//! All entities carry a UUID identifier, creation/update timestamps and a
//! deletion marker. A `None` marker means the row is live; a `Some` marker
//! means the row is soft-deleted (still stored, excluded from uniqueness
//! checks and default queries); hard deletion removes the row entirely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity, timestamps and deletion marker common to all entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMeta {
    /// Primary identifier
    pub id: Uuid,
    /// Creation timestamp, set by the store on create
    pub created_on: DateTime<Utc>,
    /// Last update timestamp
    pub updated_on: DateTime<Utc>,
    /// Soft-deletion marker (`None` = live)
    pub deleted: Option<DateTime<Utc>>,
}

impl EntityMeta {
    /// Create a fresh meta with a new identifier and current timestamps
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_on: now,
            updated_on: now,
            deleted: None,
        }
    }

    /// Returns whether the row is soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted.is_some()
    }
}

impl Default for EntityMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// Every entity kind the store manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Organization,
    ConsumerSite,
    User,
    Playlist,
    PlaylistAccess,
    Video,
    Track,
}

impl EntityKind {
    /// Returns the lowercase kind name used in logs and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Organization => "organization",
            EntityKind::ConsumerSite => "consumer_site",
            EntityKind::User => "user",
            EntityKind::Playlist => "playlist",
            EntityKind::PlaylistAccess => "playlist_access",
            EntityKind::Video => "video",
            EntityKind::Track => "track",
        }
    }

    /// Kinds that bypass soft deletion: any delete is immediate and physical.
    pub fn is_hard_delete_only(&self) -> bool {
        matches!(self, EntityKind::PlaylistAccess)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A (kind, id) pair addressing one row in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: Uuid,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: Uuid) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_meta_is_live() {
        let meta = EntityMeta::new();
        assert!(!meta.is_deleted());
        assert_eq!(meta.created_on, meta.updated_on);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(EntityKind::ConsumerSite.as_str(), "consumer_site");
        assert_eq!(EntityKind::PlaylistAccess.as_str(), "playlist_access");
        assert_eq!(format!("{}", EntityKind::Video), "video");
    }

    #[test]
    fn test_only_playlist_access_bypasses_soft_delete() {
        assert!(EntityKind::PlaylistAccess.is_hard_delete_only());
        assert!(!EntityKind::Playlist.is_hard_delete_only());
        assert!(!EntityKind::Track.is_hard_delete_only());
    }
}
