//! Playlists and per-user access grants.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::Role;
use super::base::EntityMeta;

/// A playlist: an ordered list of videos reached through a consumer site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub meta: EntityMeta,
    /// Title of the playlist
    pub title: String,
    /// Identifier for synchronization with an external LTI tool
    pub lti_id: String,
    /// Owning organization, if any
    pub organization_id: Option<Uuid>,
    /// Consumer site through which the playlist is reached
    pub consumer_site_id: Uuid,
    /// User who created the playlist, if known
    pub created_by_id: Option<Uuid>,
    /// Whether the playlist can be viewed without any access control
    pub is_public: bool,
    /// Whether resources can be shared into other playlists
    pub is_portable_to_playlist: bool,
    /// Whether resources can be shared into other consumer sites
    pub is_portable_to_consumer_site: bool,
    /// Origin playlist this one was duplicated from, if any
    pub duplicated_from_id: Option<Uuid>,
}

impl Playlist {
    pub fn new(
        title: impl Into<String>,
        lti_id: impl Into<String>,
        consumer_site_id: Uuid,
    ) -> Self {
        Self {
            meta: EntityMeta::new(),
            title: title.into(),
            lti_id: lti_id.into(),
            organization_id: None,
            consumer_site_id,
            created_by_id: None,
            is_public: false,
            is_portable_to_playlist: true,
            is_portable_to_consumer_site: false,
            duplicated_from_id: None,
        }
    }

    /// Copy this playlist for portability, with fresh identity and the
    /// origin back-reference set.
    pub fn duplicate(&self) -> Self {
        Self {
            meta: EntityMeta::new(),
            title: self.title.clone(),
            lti_id: self.lti_id.clone(),
            organization_id: self.organization_id,
            consumer_site_id: self.consumer_site_id,
            created_by_id: self.created_by_id,
            is_public: self.is_public,
            is_portable_to_playlist: self.is_portable_to_playlist,
            is_portable_to_consumer_site: self.is_portable_to_consumer_site,
            duplicated_from_id: Some(self.meta.id),
        }
    }
}

/// Access granted to a user on a playlist.
///
/// At most one live grant may exist per (user, playlist) pair. Grants bypass
/// soft deletion: deleting one always removes the row physically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistAccess {
    pub meta: EntityMeta,
    /// User the grant is for
    pub user_id: Uuid,
    /// Playlist the grant applies to
    pub playlist_id: Uuid,
    /// Role granted to the user on the playlist
    pub role: Role,
}

impl PlaylistAccess {
    pub fn new(user_id: Uuid, playlist_id: Uuid) -> Self {
        Self {
            meta: EntityMeta::new(),
            user_id,
            playlist_id,
            role: Role::default(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}
