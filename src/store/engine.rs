//! Soft-delete-aware entity store.
//!
//! Every top-level mutating call is transactional: it takes the store lock,
//! builds its full effect (including all cascades and nullifications) on a
//! working copy of the state, and commits the copy wholesale on success. Any
//! error leaves the committed state exactly as it was.

use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::integrity;
use crate::keys;
use crate::model::{EntityRef, Track, TrackKind, UploadState, Video};
use crate::observability::Logger;
use crate::snapshot::{self, SnapshotError, SnapshotManifest, SnapshotResult};

use super::errors::{StoreError, StoreResult};
use super::state::{Entity, StoreState};

/// The entity store.
pub struct Store {
    state: RwLock<StoreState>,
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Create a store over an existing state
    pub fn from_state(state: StoreState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|_| StoreError::Internal("store lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|_| StoreError::Internal("store lock poisoned".into()))
    }

    /// Insert a new entity.
    ///
    /// Refreshes the creation/update timestamps, clears any deletion marker,
    /// and validates declared references and scoped uniqueness against live
    /// rows before committing.
    pub fn create<E: Entity>(&self, mut entity: E) -> StoreResult<E> {
        entity.validate()?;

        let now = Utc::now();
        {
            let meta = entity.meta_mut();
            meta.created_on = now;
            meta.updated_on = now;
            meta.deleted = None;
        }

        let mut guard = self.write()?;
        let id = entity.meta().id;
        if E::map(&guard).contains_key(&id) {
            return Err(StoreError::ConstraintViolation {
                constraint: format!("{}_primary_key", E::KIND),
            });
        }

        let mut work = guard.clone();
        E::map_mut(&mut work).insert(id, entity.clone());
        work.verify_references(EntityRef::new(E::KIND, id))?;
        if let Some(constraint) = work.unique_violation() {
            return Err(StoreError::ConstraintViolation {
                constraint: constraint.into(),
            });
        }

        *guard = work;
        let id_str = id.to_string();
        Logger::info(
            "ENTITY_CREATED",
            &[("kind", E::KIND.as_str()), ("id", &id_str)],
        );
        Ok(entity)
    }

    /// Replace an existing row's fields.
    ///
    /// Identity, creation timestamp, deletion marker and immutable fields
    /// are kept from the stored row; references and scoped uniqueness are
    /// re-validated.
    pub fn update<E: Entity>(&self, mut entity: E) -> StoreResult<E> {
        entity.validate()?;

        let mut guard = self.write()?;
        let id = entity.meta().id;
        let stored = E::map(&guard).get(&id).ok_or(StoreError::NotFound {
            kind: E::KIND,
            id,
        })?;
        entity.preserve_immutable(stored);
        {
            let (created_on, deleted) = (stored.meta().created_on, stored.meta().deleted);
            let meta = entity.meta_mut();
            meta.created_on = created_on;
            meta.deleted = deleted;
            meta.updated_on = Utc::now();
        }

        let mut work = guard.clone();
        E::map_mut(&mut work).insert(id, entity.clone());
        work.verify_references(EntityRef::new(E::KIND, id))?;
        if let Some(constraint) = work.unique_violation() {
            return Err(StoreError::ConstraintViolation {
                constraint: constraint.into(),
            });
        }

        *guard = work;
        Ok(entity)
    }

    /// Soft-delete a row and cascade per the relationship policies.
    ///
    /// Idempotent: deleting an already soft-deleted row is a no-op. Returns
    /// the number of rows affected.
    pub fn soft_delete<E: Entity>(&self, id: Uuid) -> StoreResult<usize> {
        let mut guard = self.write()?;
        let mut work = guard.clone();
        let affected = integrity::soft_delete(&mut work, EntityRef::new(E::KIND, id), Utc::now())?;
        *guard = work;

        if !affected.is_empty() {
            let id_str = id.to_string();
            let count = affected.len().to_string();
            Logger::info(
                "SOFT_DELETE_APPLIED",
                &[
                    ("kind", E::KIND.as_str()),
                    ("id", &id_str),
                    ("affected", &count),
                ],
            );
        }
        Ok(affected.len())
    }

    /// Physically delete a row and cascade per the relationship policies.
    ///
    /// Fails with `IntegrityBlocked` while a protected dependent outside the
    /// deletion closure remains; nothing is mutated in that case.
    pub fn hard_delete<E: Entity>(&self, id: Uuid) -> StoreResult<usize> {
        let mut guard = self.write()?;
        let mut work = guard.clone();
        let id_str = id.to_string();
        let affected = match integrity::hard_delete(&mut work, EntityRef::new(E::KIND, id)) {
            Ok(affected) => affected,
            Err(err) => {
                if matches!(err, StoreError::IntegrityBlocked { .. }) {
                    Logger::warn(
                        "HARD_DELETE_BLOCKED",
                        &[("kind", E::KIND.as_str()), ("id", &id_str)],
                    );
                }
                return Err(err);
            }
        };
        *guard = work;

        let count = affected.len().to_string();
        Logger::info(
            "HARD_DELETE_APPLIED",
            &[
                ("kind", E::KIND.as_str()),
                ("id", &id_str),
                ("affected", &count),
            ],
        );
        Ok(affected.len())
    }

    /// Clear a soft-deletion marker, together with the dependents deleted by
    /// the same cascade.
    ///
    /// Fails with `ConstraintViolation` if bringing the rows back would break
    /// a scoped-unique index against other live rows.
    pub fn restore<E: Entity>(&self, id: Uuid) -> StoreResult<usize> {
        let mut guard = self.write()?;
        let mut work = guard.clone();
        let affected = integrity::restore(&mut work, EntityRef::new(E::KIND, id))?;
        if let Some(constraint) = work.unique_violation() {
            return Err(StoreError::ConstraintViolation {
                constraint: constraint.into(),
            });
        }
        *guard = work;

        if !affected.is_empty() {
            let id_str = id.to_string();
            let count = affected.len().to_string();
            Logger::info(
                "RESTORE_APPLIED",
                &[
                    ("kind", E::KIND.as_str()),
                    ("id", &id_str),
                    ("affected", &count),
                ],
            );
        }
        Ok(affected.len())
    }

    /// Fetch a live row
    pub fn get<E: Entity>(&self, id: Uuid) -> StoreResult<Option<E>> {
        let guard = self.read()?;
        Ok(E::map(&guard)
            .get(&id)
            .filter(|e| !e.meta().is_deleted())
            .cloned())
    }

    /// Fetch a row whether live or soft-deleted
    pub fn get_with_deleted<E: Entity>(&self, id: Uuid) -> StoreResult<Option<E>> {
        let guard = self.read()?;
        Ok(E::map(&guard).get(&id).cloned())
    }

    /// Live videos of a playlist, ordered by (position, id)
    pub fn playlist_videos(&self, playlist_id: Uuid) -> StoreResult<Vec<Video>> {
        let guard = self.read()?;
        let mut videos: Vec<Video> = guard
            .videos
            .values()
            .filter(|v| v.playlist_id == playlist_id && !v.meta.is_deleted())
            .cloned()
            .collect();
        videos.sort_by_key(|v| (v.position, v.meta.id));
        Ok(videos)
    }

    /// Live tracks of a video for one track kind, ordered by (language, id)
    pub fn video_tracks(&self, video_id: Uuid, kind: TrackKind) -> StoreResult<Vec<Track>> {
        let guard = self.read()?;
        let mut tracks: Vec<Track> = guard
            .tracks
            .values()
            .filter(|t| t.video_id == video_id && t.kind == kind && !t.meta.is_deleted())
            .cloned()
            .collect();
        tracks.sort_by(|a, b| (&a.language, a.meta.id).cmp(&(&b.language, b.meta.id)));
        Ok(tracks)
    }

    /// Record a confirmed video upload: sets `uploaded_on` and marks the
    /// video ready
    pub fn confirm_video_upload(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<Video> {
        self.mutate_video(id, |video| {
            video.uploaded_on = Some(at);
            video.state = UploadState::Ready;
        })
    }

    /// Move a video through the processing pipeline states
    pub fn set_video_state(&self, id: Uuid, state: UploadState) -> StoreResult<Video> {
        self.mutate_video(id, |video| {
            video.state = state;
        })
    }

    fn mutate_video(&self, id: Uuid, apply: impl FnOnce(&mut Video)) -> StoreResult<Video> {
        let mut guard = self.write()?;
        let video = guard
            .videos
            .get_mut(&id)
            .filter(|v| !v.meta.is_deleted())
            .ok_or(StoreError::NotFound {
                kind: Video::KIND,
                id,
            })?;
        apply(video);
        video.meta.updated_on = Utc::now();
        Ok(video.clone())
    }

    /// Record a confirmed track upload: sets `uploaded_on` and marks the
    /// track ready
    pub fn confirm_track_upload(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<Track> {
        self.mutate_track(id, |track| {
            track.uploaded_on = Some(at);
            track.state = UploadState::Ready;
        })
    }

    /// Move a track through the processing pipeline states
    pub fn set_track_state(&self, id: Uuid, state: UploadState) -> StoreResult<Track> {
        self.mutate_track(id, |track| {
            track.state = state;
        })
    }

    fn mutate_track(&self, id: Uuid, apply: impl FnOnce(&mut Track)) -> StoreResult<Track> {
        let mut guard = self.write()?;
        let track = guard
            .tracks
            .get_mut(&id)
            .filter(|t| !t.meta.is_deleted())
            .ok_or(StoreError::NotFound {
                kind: Track::KIND,
                id,
            })?;
        apply(track);
        track.meta.updated_on = Utc::now();
        Ok(track.clone())
    }

    /// Source-bucket key for a video, for the given version stamp.
    ///
    /// The row is resolved whether live or soft-deleted so cleanup jobs can
    /// still address the media.
    pub fn video_source_key(&self, id: Uuid, stamp: &str) -> StoreResult<String> {
        let guard = self.read()?;
        let video = guard.videos.get(&id).ok_or(StoreError::NotFound {
            kind: Video::KIND,
            id,
        })?;
        Ok(keys::video_source_key(video.resource_id, video.meta.id, stamp))
    }

    /// Source-bucket key for a subtitle track, for the given version stamp
    pub fn subtitle_source_key(&self, id: Uuid, stamp: &str) -> StoreResult<String> {
        let guard = self.read()?;
        let track = guard.tracks.get(&id).ok_or(StoreError::NotFound {
            kind: Track::KIND,
            id,
        })?;
        if track.kind != TrackKind::Subtitle {
            return Err(StoreError::Validation {
                field: "track.kind",
                reason: format!("{} tracks have no subtitle storage key", track.kind),
            });
        }
        let video = guard
            .videos
            .get(&track.video_id)
            .ok_or(StoreError::MissingReference {
                field: "track.video_id",
                id: track.video_id,
            })?;
        Ok(keys::subtitle_source_key(
            video.resource_id,
            track.meta.id,
            stamp,
            &track.language,
            track.has_closed_captioning,
        ))
    }

    /// Write the full state to a snapshot directory
    pub fn write_snapshot(&self, dir: &Path) -> SnapshotResult<SnapshotManifest> {
        let guard = self.state.read().map_err(|_| SnapshotError::LockPoisoned)?;
        snapshot::write(&guard, dir)
    }

    /// Load a store back from a snapshot directory, verifying the checksum
    pub fn from_snapshot(dir: &Path) -> SnapshotResult<Store> {
        let state = snapshot::read(dir)?;
        Ok(Store::from_state(state))
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
