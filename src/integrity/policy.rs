//! Declarative delete-propagation policy, one rule per directed relationship.
//!
//! The engine consults this table instead of scattering policy through the
//! entity definitions. Each rule names the dependent side, the referenced
//! side and what happens to the dependent when the referenced row is deleted.

use uuid::Uuid;

use crate::model::EntityKind;
use crate::store::state::StoreState;

/// What deleting the referenced entity does to a dependent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Soft and hard deletes both propagate to the dependent
    Cascade,
    /// Soft delete propagates; hard delete is refused while any dependent
    /// row (live or soft-deleted) remains
    Protect,
    /// Hard delete clears the dependent's reference; soft delete does nothing
    SetNull,
}

impl DeletePolicy {
    /// Whether a soft delete of the referenced row propagates
    pub fn cascades_on_soft(&self) -> bool {
        matches!(self, DeletePolicy::Cascade | DeletePolicy::Protect)
    }

    /// Whether a hard delete of the referenced row propagates
    pub fn cascades_on_hard(&self) -> bool {
        matches!(self, DeletePolicy::Cascade)
    }
}

/// Every directed relationship (dependent → referenced) the store knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    PlaylistOrganization,
    PlaylistConsumerSite,
    PlaylistCreatedBy,
    PlaylistDuplicatedFrom,
    AccessUser,
    AccessPlaylist,
    VideoCreatedBy,
    VideoPlaylist,
    VideoDuplicatedFrom,
    TrackVideo,
}

impl Relation {
    pub const ALL: [Relation; 10] = [
        Relation::PlaylistOrganization,
        Relation::PlaylistConsumerSite,
        Relation::PlaylistCreatedBy,
        Relation::PlaylistDuplicatedFrom,
        Relation::AccessUser,
        Relation::AccessPlaylist,
        Relation::VideoCreatedBy,
        Relation::VideoPlaylist,
        Relation::VideoDuplicatedFrom,
        Relation::TrackVideo,
    ];

    /// Kind holding the reference field
    pub fn dependent(&self) -> EntityKind {
        match self {
            Relation::PlaylistOrganization
            | Relation::PlaylistConsumerSite
            | Relation::PlaylistCreatedBy
            | Relation::PlaylistDuplicatedFrom => EntityKind::Playlist,
            Relation::AccessUser | Relation::AccessPlaylist => EntityKind::PlaylistAccess,
            Relation::VideoCreatedBy | Relation::VideoPlaylist | Relation::VideoDuplicatedFrom => {
                EntityKind::Video
            }
            Relation::TrackVideo => EntityKind::Track,
        }
    }

    /// Kind the reference points at
    pub fn referenced(&self) -> EntityKind {
        match self {
            Relation::PlaylistOrganization => EntityKind::Organization,
            Relation::PlaylistConsumerSite => EntityKind::ConsumerSite,
            Relation::PlaylistCreatedBy | Relation::AccessUser | Relation::VideoCreatedBy => {
                EntityKind::User
            }
            Relation::PlaylistDuplicatedFrom | Relation::AccessPlaylist | Relation::VideoPlaylist => {
                EntityKind::Playlist
            }
            Relation::VideoDuplicatedFrom | Relation::TrackVideo => EntityKind::Video,
        }
    }

    /// Policy applied when the referenced row is deleted
    pub fn on_delete(&self) -> DeletePolicy {
        match self {
            Relation::PlaylistOrganization
            | Relation::PlaylistConsumerSite
            | Relation::PlaylistCreatedBy
            | Relation::AccessUser
            | Relation::AccessPlaylist
            | Relation::VideoCreatedBy
            | Relation::TrackVideo => DeletePolicy::Cascade,
            Relation::VideoPlaylist => DeletePolicy::Protect,
            Relation::PlaylistDuplicatedFrom | Relation::VideoDuplicatedFrom => DeletePolicy::SetNull,
        }
    }

    /// Ids of all dependent rows (live or soft-deleted) referencing `referenced`
    pub fn dependents(&self, state: &StoreState, referenced: Uuid) -> Vec<Uuid> {
        match self {
            Relation::PlaylistOrganization => state
                .playlists
                .values()
                .filter(|p| p.organization_id == Some(referenced))
                .map(|p| p.meta.id)
                .collect(),
            Relation::PlaylistConsumerSite => state
                .playlists
                .values()
                .filter(|p| p.consumer_site_id == referenced)
                .map(|p| p.meta.id)
                .collect(),
            Relation::PlaylistCreatedBy => state
                .playlists
                .values()
                .filter(|p| p.created_by_id == Some(referenced))
                .map(|p| p.meta.id)
                .collect(),
            Relation::PlaylistDuplicatedFrom => state
                .playlists
                .values()
                .filter(|p| p.duplicated_from_id == Some(referenced))
                .map(|p| p.meta.id)
                .collect(),
            Relation::AccessUser => state
                .playlist_accesses
                .values()
                .filter(|a| a.user_id == referenced)
                .map(|a| a.meta.id)
                .collect(),
            Relation::AccessPlaylist => state
                .playlist_accesses
                .values()
                .filter(|a| a.playlist_id == referenced)
                .map(|a| a.meta.id)
                .collect(),
            Relation::VideoCreatedBy => state
                .videos
                .values()
                .filter(|v| v.created_by_id == Some(referenced))
                .map(|v| v.meta.id)
                .collect(),
            Relation::VideoPlaylist => state
                .videos
                .values()
                .filter(|v| v.playlist_id == referenced)
                .map(|v| v.meta.id)
                .collect(),
            Relation::VideoDuplicatedFrom => state
                .videos
                .values()
                .filter(|v| v.duplicated_from_id == Some(referenced))
                .map(|v| v.meta.id)
                .collect(),
            Relation::TrackVideo => state
                .tracks
                .values()
                .filter(|t| t.video_id == referenced)
                .map(|t| t.meta.id)
                .collect(),
        }
    }

    /// Clear the dependent's reference field; only meaningful for `SetNull`
    /// relations
    pub fn clear_reference(&self, state: &mut StoreState, dependent: Uuid) {
        match self {
            Relation::PlaylistDuplicatedFrom => {
                if let Some(playlist) = state.playlists.get_mut(&dependent) {
                    playlist.duplicated_from_id = None;
                }
            }
            Relation::VideoDuplicatedFrom => {
                if let Some(video) = state.videos.get_mut(&dependent) {
                    video.duplicated_from_id = None;
                }
            }
            _ => debug_assert!(false, "clear_reference on non-nullable relation"),
        }
    }
}
