//! Uniqueness Scope Tests
//!
//! Scoped-unique indexes must, at all times, hold at most one live row per
//! key tuple; soft-deleted rows are excluded entirely, including against
//! each other.

use reelstore::model::{ConsumerSite, Playlist, PlaylistAccess, Role, Track, User, Video};
use reelstore::store::{Store, StoreError};
use uuid::Uuid;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup() -> (Store, Uuid, Uuid, Uuid) {
    let store = Store::new();
    let site = store
        .create(ConsumerSite::new("Moodle", "moodle.example.com"))
        .unwrap();
    let user = store.create(User::new("jane")).unwrap();
    let playlist = store
        .create(Playlist::new("Calculus", "course-v1:calculus", site.meta.id))
        .unwrap();
    let video = store
        .create(Video::new("Limits", "lti-limits", "en", playlist.meta.id))
        .unwrap();
    (store, user.meta.id, playlist.meta.id, video.meta.id)
}

fn assert_constraint(err: StoreError, expected: &str) {
    match err {
        StoreError::ConstraintViolation { constraint } => assert_eq!(constraint, expected),
        other => panic!("expected ConstraintViolation, got {other:?}"),
    }
}

// =============================================================================
// Audio / Sign Tracks: (video, language)
// =============================================================================

/// Two live audio tracks for one (video, language) pair are rejected.
#[test]
fn test_duplicate_audio_track_rejected() {
    let (store, _, _, video_id) = setup();
    store.create(Track::audio(video_id, "fr")).unwrap();
    let err = store.create(Track::audio(video_id, "fr")).unwrap_err();
    assert_constraint(err, "audio_track_video_language_not_deleted");
}

/// Soft-deleting the first track frees the slot for a second.
#[test]
fn test_soft_deleted_audio_track_frees_slot() {
    let (store, _, _, video_id) = setup();
    let first = store.create(Track::audio(video_id, "fr")).unwrap();
    store.soft_delete::<Track>(first.meta.id).unwrap();
    store.create(Track::audio(video_id, "fr")).unwrap();
}

/// Different languages never collide.
#[test]
fn test_audio_tracks_differ_by_language() {
    let (store, _, _, video_id) = setup();
    store.create(Track::audio(video_id, "fr")).unwrap();
    store.create(Track::audio(video_id, "de")).unwrap();
}

/// Sign tracks have their own (video, language) index.
#[test]
fn test_duplicate_sign_track_rejected() {
    let (store, _, _, video_id) = setup();
    store.create(Track::sign(video_id, "fr")).unwrap();
    let err = store.create(Track::sign(video_id, "fr")).unwrap_err();
    assert_constraint(err, "sign_track_video_language_not_deleted");
}

/// An audio and a sign track for the same pair coexist.
#[test]
fn test_track_kinds_do_not_collide() {
    let (store, _, _, video_id) = setup();
    store.create(Track::audio(video_id, "fr")).unwrap();
    store.create(Track::sign(video_id, "fr")).unwrap();
}

// =============================================================================
// Subtitle Tracks: (video, language, cc)
// =============================================================================

/// A language may have both captioned and non-captioned variants.
#[test]
fn test_subtitle_cc_variants_coexist() {
    let (store, _, _, video_id) = setup();
    store.create(Track::subtitle(video_id, "fr", false)).unwrap();
    store.create(Track::subtitle(video_id, "fr", true)).unwrap();
}

/// The same (video, language, cc) tuple is unique among live rows.
#[test]
fn test_duplicate_subtitle_variant_rejected() {
    let (store, _, _, video_id) = setup();
    store.create(Track::subtitle(video_id, "fr", true)).unwrap();
    let err = store
        .create(Track::subtitle(video_id, "fr", true))
        .unwrap_err();
    assert_constraint(err, "subtitle_track_video_language_cc_not_deleted");
}

// =============================================================================
// Playlist Accesses: (user, playlist)
// =============================================================================

/// At most one live grant per (user, playlist).
#[test]
fn test_duplicate_access_rejected() {
    let (store, user_id, playlist_id, _) = setup();
    store
        .create(PlaylistAccess::new(user_id, playlist_id))
        .unwrap();
    let err = store
        .create(PlaylistAccess::new(user_id, playlist_id).with_role(Role::Student))
        .unwrap_err();
    assert_constraint(err, "playlist_access_user_playlist_not_deleted");
}

/// Removing the grant frees the pair.
#[test]
fn test_removed_access_frees_pair() {
    let (store, user_id, playlist_id, _) = setup();
    let access = store
        .create(PlaylistAccess::new(user_id, playlist_id))
        .unwrap();
    store.hard_delete::<PlaylistAccess>(access.meta.id).unwrap();
    store
        .create(PlaylistAccess::new(user_id, playlist_id))
        .unwrap();
}

/// Different users on the same playlist never collide.
#[test]
fn test_access_differs_by_user() {
    let (store, user_id, playlist_id, _) = setup();
    let other = store.create(User::new("john")).unwrap();
    store
        .create(PlaylistAccess::new(user_id, playlist_id))
        .unwrap();
    store
        .create(PlaylistAccess::new(other.meta.id, playlist_id))
        .unwrap();
}

// =============================================================================
// Failed Creates Leave No Trace
// =============================================================================

/// A rejected create applies no partial mutation.
#[test]
fn test_rejected_create_leaves_state_unchanged() {
    let (store, _, _, video_id) = setup();
    store.create(Track::audio(video_id, "fr")).unwrap();
    let err = store.create(Track::audio(video_id, "fr")).unwrap_err();
    assert!(matches!(err, StoreError::ConstraintViolation { .. }));

    let tracks = store
        .video_tracks(video_id, reelstore::model::TrackKind::Audio)
        .unwrap();
    assert_eq!(tracks.len(), 1);
}
