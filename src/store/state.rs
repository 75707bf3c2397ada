//! Full store state and row-level primitives.
//!
//! The state is a set of per-kind maps keyed by entity id. `BTreeMap` keeps
//! iteration order deterministic, which in turn keeps cascade processing,
//! uniqueness scans and snapshots deterministic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use crate::model::{
    ConsumerSite, EntityKind, EntityMeta, EntityRef, Organization, Playlist, PlaylistAccess,
    Track, TrackKind, User, Video,
};

use super::errors::{StoreError, StoreResult};

/// All rows managed by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    pub organizations: BTreeMap<Uuid, Organization>,
    pub consumer_sites: BTreeMap<Uuid, ConsumerSite>,
    pub users: BTreeMap<Uuid, User>,
    pub playlists: BTreeMap<Uuid, Playlist>,
    pub playlist_accesses: BTreeMap<Uuid, PlaylistAccess>,
    pub videos: BTreeMap<Uuid, Video>,
    pub tracks: BTreeMap<Uuid, Track>,
}

/// A typed entity the store can hold.
///
/// Gives the generic store operations access to the entity's meta block and
/// to its map inside [`StoreState`].
pub trait Entity: Clone {
    const KIND: EntityKind;

    fn meta(&self) -> &EntityMeta;
    fn meta_mut(&mut self) -> &mut EntityMeta;
    fn map(state: &StoreState) -> &BTreeMap<Uuid, Self>;
    fn map_mut(state: &mut StoreState) -> &mut BTreeMap<Uuid, Self>;

    /// Field-level checks applied before any row is written
    fn validate(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Carry fields the store keeps immutable after creation over from the
    /// stored row, overwriting whatever the caller supplied
    fn preserve_immutable(&mut self, _stored: &Self) {}
}

fn require_title(field: &'static str, title: &str) -> StoreResult<()> {
    if title.trim().is_empty() {
        return Err(StoreError::Validation {
            field,
            reason: "title must not be empty".into(),
        });
    }
    Ok(())
}

fn require_language(field: &'static str, language: &str) -> StoreResult<()> {
    if !crate::model::language::is_supported(language) {
        return Err(StoreError::Validation {
            field,
            reason: format!("unsupported language '{}'", language),
        });
    }
    Ok(())
}

impl Entity for Organization {
    const KIND: EntityKind = EntityKind::Organization;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
    fn map(state: &StoreState) -> &BTreeMap<Uuid, Self> {
        &state.organizations
    }
    fn map_mut(state: &mut StoreState) -> &mut BTreeMap<Uuid, Self> {
        &mut state.organizations
    }
}

impl Entity for ConsumerSite {
    const KIND: EntityKind = EntityKind::ConsumerSite;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
    fn map(state: &StoreState) -> &BTreeMap<Uuid, Self> {
        &state.consumer_sites
    }
    fn map_mut(state: &mut StoreState) -> &mut BTreeMap<Uuid, Self> {
        &mut state.consumer_sites
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
    fn map(state: &StoreState) -> &BTreeMap<Uuid, Self> {
        &state.users
    }
    fn map_mut(state: &mut StoreState) -> &mut BTreeMap<Uuid, Self> {
        &mut state.users
    }
}

impl Entity for Playlist {
    const KIND: EntityKind = EntityKind::Playlist;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
    fn map(state: &StoreState) -> &BTreeMap<Uuid, Self> {
        &state.playlists
    }
    fn map_mut(state: &mut StoreState) -> &mut BTreeMap<Uuid, Self> {
        &mut state.playlists
    }

    fn validate(&self) -> StoreResult<()> {
        require_title("playlist.title", &self.title)
    }
}

impl Entity for PlaylistAccess {
    const KIND: EntityKind = EntityKind::PlaylistAccess;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
    fn map(state: &StoreState) -> &BTreeMap<Uuid, Self> {
        &state.playlist_accesses
    }
    fn map_mut(state: &mut StoreState) -> &mut BTreeMap<Uuid, Self> {
        &mut state.playlist_accesses
    }
}

impl Entity for Video {
    const KIND: EntityKind = EntityKind::Video;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
    fn map(state: &StoreState) -> &BTreeMap<Uuid, Self> {
        &state.videos
    }
    fn map_mut(state: &mut StoreState) -> &mut BTreeMap<Uuid, Self> {
        &mut state.videos
    }

    fn validate(&self) -> StoreResult<()> {
        require_title("video.title", &self.title)?;
        require_language("video.language", &self.language)
    }

    // resource_id addresses media already in the object store
    fn preserve_immutable(&mut self, stored: &Self) {
        self.resource_id = stored.resource_id;
    }
}

impl Entity for Track {
    const KIND: EntityKind = EntityKind::Track;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
    fn map(state: &StoreState) -> &BTreeMap<Uuid, Self> {
        &state.tracks
    }
    fn map_mut(state: &mut StoreState) -> &mut BTreeMap<Uuid, Self> {
        &mut state.tracks
    }

    fn validate(&self) -> StoreResult<()> {
        require_language("track.language", &self.language)?;
        if self.kind != TrackKind::Subtitle && self.has_closed_captioning {
            return Err(StoreError::Validation {
                field: "track.has_closed_captioning",
                reason: format!("{} tracks cannot carry closed captioning", self.kind),
            });
        }
        Ok(())
    }
}

impl StoreState {
    /// Meta block of a row, if the row exists (live or soft-deleted)
    pub fn meta_of(&self, r: EntityRef) -> Option<&EntityMeta> {
        match r.kind {
            EntityKind::Organization => self.organizations.get(&r.id).map(|e| &e.meta),
            EntityKind::ConsumerSite => self.consumer_sites.get(&r.id).map(|e| &e.meta),
            EntityKind::User => self.users.get(&r.id).map(|e| &e.meta),
            EntityKind::Playlist => self.playlists.get(&r.id).map(|e| &e.meta),
            EntityKind::PlaylistAccess => self.playlist_accesses.get(&r.id).map(|e| &e.meta),
            EntityKind::Video => self.videos.get(&r.id).map(|e| &e.meta),
            EntityKind::Track => self.tracks.get(&r.id).map(|e| &e.meta),
        }
    }

    fn meta_mut_of(&mut self, r: EntityRef) -> Option<&mut EntityMeta> {
        match r.kind {
            EntityKind::Organization => self.organizations.get_mut(&r.id).map(|e| &mut e.meta),
            EntityKind::ConsumerSite => self.consumer_sites.get_mut(&r.id).map(|e| &mut e.meta),
            EntityKind::User => self.users.get_mut(&r.id).map(|e| &mut e.meta),
            EntityKind::Playlist => self.playlists.get_mut(&r.id).map(|e| &mut e.meta),
            EntityKind::PlaylistAccess => {
                self.playlist_accesses.get_mut(&r.id).map(|e| &mut e.meta)
            }
            EntityKind::Video => self.videos.get_mut(&r.id).map(|e| &mut e.meta),
            EntityKind::Track => self.tracks.get_mut(&r.id).map(|e| &mut e.meta),
        }
    }

    /// Deletion marker of a row: `None` if the row does not exist, otherwise
    /// the marker itself
    pub fn deletion_marker(&self, r: EntityRef) -> Option<Option<DateTime<Utc>>> {
        self.meta_of(r).map(|meta| meta.deleted)
    }

    /// Set the deletion marker of an existing row
    pub fn mark_deleted(&mut self, r: EntityRef, at: DateTime<Utc>) {
        if let Some(meta) = self.meta_mut_of(r) {
            meta.deleted = Some(at);
        }
    }

    /// Clear the deletion marker of an existing row
    pub fn clear_deleted(&mut self, r: EntityRef) {
        if let Some(meta) = self.meta_mut_of(r) {
            meta.deleted = None;
        }
    }

    /// Physically remove a row
    pub fn remove(&mut self, r: EntityRef) {
        match r.kind {
            EntityKind::Organization => {
                self.organizations.remove(&r.id);
            }
            EntityKind::ConsumerSite => {
                self.consumer_sites.remove(&r.id);
            }
            EntityKind::User => {
                self.users.remove(&r.id);
            }
            EntityKind::Playlist => {
                self.playlists.remove(&r.id);
            }
            EntityKind::PlaylistAccess => {
                self.playlist_accesses.remove(&r.id);
            }
            EntityKind::Video => {
                self.videos.remove(&r.id);
            }
            EntityKind::Track => {
                self.tracks.remove(&r.id);
            }
        }
    }

    /// Check every scoped-unique index over live rows.
    ///
    /// Soft-deleted rows are excluded entirely, including against each other.
    /// Returns the name of the first violated constraint, if any.
    pub fn unique_violation(&self) -> Option<&'static str> {
        let mut grants = HashSet::new();
        for access in self
            .playlist_accesses
            .values()
            .filter(|a| !a.meta.is_deleted())
        {
            if !grants.insert((access.user_id, access.playlist_id)) {
                return Some("playlist_access_user_playlist_not_deleted");
            }
        }

        let mut tracks = HashSet::new();
        for track in self.tracks.values().filter(|t| !t.meta.is_deleted()) {
            // The cc flag only discriminates subtitle variants
            let cc = track.kind == TrackKind::Subtitle && track.has_closed_captioning;
            if !tracks.insert((track.kind, track.video_id, track.language.clone(), cc)) {
                return Some(match track.kind {
                    TrackKind::Audio => "audio_track_video_language_not_deleted",
                    TrackKind::Subtitle => "subtitle_track_video_language_cc_not_deleted",
                    TrackKind::Sign => "sign_track_video_language_not_deleted",
                });
            }
        }

        None
    }

    /// Check that every reference a row declares points at a stored row
    pub fn verify_references(&self, r: EntityRef) -> StoreResult<()> {
        fn require(
            present: bool,
            field: &'static str,
            id: Uuid,
        ) -> StoreResult<()> {
            if present {
                Ok(())
            } else {
                Err(StoreError::MissingReference { field, id })
            }
        }

        match r.kind {
            EntityKind::Organization | EntityKind::ConsumerSite | EntityKind::User => Ok(()),
            EntityKind::Playlist => {
                let playlist = self.playlists.get(&r.id).ok_or(StoreError::NotFound {
                    kind: r.kind,
                    id: r.id,
                })?;
                if let Some(id) = playlist.organization_id {
                    require(
                        self.organizations.contains_key(&id),
                        "playlist.organization_id",
                        id,
                    )?;
                }
                require(
                    self.consumer_sites.contains_key(&playlist.consumer_site_id),
                    "playlist.consumer_site_id",
                    playlist.consumer_site_id,
                )?;
                if let Some(id) = playlist.created_by_id {
                    require(self.users.contains_key(&id), "playlist.created_by_id", id)?;
                }
                if let Some(id) = playlist.duplicated_from_id {
                    require(
                        self.playlists.contains_key(&id),
                        "playlist.duplicated_from_id",
                        id,
                    )?;
                }
                Ok(())
            }
            EntityKind::PlaylistAccess => {
                let access = self.playlist_accesses.get(&r.id).ok_or(StoreError::NotFound {
                    kind: r.kind,
                    id: r.id,
                })?;
                require(
                    self.users.contains_key(&access.user_id),
                    "playlist_access.user_id",
                    access.user_id,
                )?;
                require(
                    self.playlists.contains_key(&access.playlist_id),
                    "playlist_access.playlist_id",
                    access.playlist_id,
                )
            }
            EntityKind::Video => {
                let video = self.videos.get(&r.id).ok_or(StoreError::NotFound {
                    kind: r.kind,
                    id: r.id,
                })?;
                require(
                    self.playlists.contains_key(&video.playlist_id),
                    "video.playlist_id",
                    video.playlist_id,
                )?;
                if let Some(id) = video.created_by_id {
                    require(self.users.contains_key(&id), "video.created_by_id", id)?;
                }
                if let Some(id) = video.duplicated_from_id {
                    require(self.videos.contains_key(&id), "video.duplicated_from_id", id)?;
                }
                Ok(())
            }
            EntityKind::Track => {
                let track = self.tracks.get(&r.id).ok_or(StoreError::NotFound {
                    kind: r.kind,
                    id: r.id,
                })?;
                require(
                    self.videos.contains_key(&track.video_id),
                    "track.video_id",
                    track.video_id,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn state_with_video() -> (StoreState, Uuid) {
        let mut state = StoreState::default();
        let site = ConsumerSite::new("Site", "site.example.com");
        let site_id = site.meta.id;
        state.consumer_sites.insert(site_id, site);
        let playlist = Playlist::new("Maths", "lti-maths", site_id);
        let playlist_id = playlist.meta.id;
        state.playlists.insert(playlist_id, playlist);
        let video = Video::new("Lecture", "lti-lecture", "en", playlist_id);
        let video_id = video.meta.id;
        state.videos.insert(video_id, video);
        (state, video_id)
    }

    #[test]
    fn test_duplicate_live_audio_tracks_violate() {
        let (mut state, video_id) = state_with_video();
        let first = Track::audio(video_id, "fr");
        let second = Track::audio(video_id, "fr");
        state.tracks.insert(first.meta.id, first);
        state.tracks.insert(second.meta.id, second);
        assert_eq!(
            state.unique_violation(),
            Some("audio_track_video_language_not_deleted")
        );
    }

    #[test]
    fn test_soft_deleted_row_excluded_from_uniqueness() {
        let (mut state, video_id) = state_with_video();
        let mut first = Track::audio(video_id, "fr");
        first.meta.deleted = Some(Utc::now());
        let second = Track::audio(video_id, "fr");
        state.tracks.insert(first.meta.id, first);
        state.tracks.insert(second.meta.id, second);
        assert_eq!(state.unique_violation(), None);
    }

    #[test]
    fn test_subtitle_cc_variants_coexist() {
        let (mut state, video_id) = state_with_video();
        let plain = Track::subtitle(video_id, "fr", false);
        let captioned = Track::subtitle(video_id, "fr", true);
        state.tracks.insert(plain.meta.id, plain);
        state.tracks.insert(captioned.meta.id, captioned);
        assert_eq!(state.unique_violation(), None);
    }

    #[test]
    fn test_audio_and_sign_do_not_collide() {
        let (mut state, video_id) = state_with_video();
        let audio = Track::audio(video_id, "fr");
        let sign = Track::sign(video_id, "fr");
        state.tracks.insert(audio.meta.id, audio);
        state.tracks.insert(sign.meta.id, sign);
        assert_eq!(state.unique_violation(), None);
    }

    #[test]
    fn test_missing_required_reference() {
        let mut state = StoreState::default();
        let playlist = Playlist::new("Maths", "lti-maths", Uuid::new_v4());
        let r = EntityRef::new(EntityKind::Playlist, playlist.meta.id);
        state.playlists.insert(playlist.meta.id, playlist);
        let err = state.verify_references(r).unwrap_err();
        assert!(matches!(
            err,
            StoreError::MissingReference {
                field: "playlist.consumer_site_id",
                ..
            }
        ));
    }

    #[test]
    fn test_track_validation_rejects_cc_on_audio() {
        let mut track = Track::audio(Uuid::new_v4(), "fr");
        track.has_closed_captioning = true;
        assert!(matches!(
            track.validate(),
            Err(StoreError::Validation { .. })
        ));
    }

    #[test]
    fn test_video_validation_rejects_unknown_language() {
        let video = Video::new("Lecture", "lti", "xx", Uuid::new_v4());
        assert!(matches!(
            video.validate(),
            Err(StoreError::Validation { .. })
        ));
    }
}
