//! Media tracks attached to a video.
//!
//! The three track kinds (audio, subtitle, sign-language) share one record
//! shape and are tagged with a kind; only subtitle tracks use the closed
//! captioning flag. Audio and sign tracks are unique per (video, language)
//! among live rows; subtitle tracks per (video, language, cc flag), since a
//! language may have both captioned and non-captioned variants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::base::EntityMeta;
use super::video::UploadState;

/// Kind of media track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Subtitle,
    Sign,
}

impl TrackKind {
    /// Returns the lowercase kind name
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Audio => "audio",
            TrackKind::Subtitle => "subtitle",
            TrackKind::Sign => "sign",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A media track tied to a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub meta: EntityMeta,
    /// Kind of track
    pub kind: TrackKind,
    /// Video the track belongs to
    pub video_id: Uuid,
    /// Language of the track, from the supported set
    pub language: String,
    /// Whether closed captioning is on; subtitle tracks only
    pub has_closed_captioning: bool,
    /// When the active version was uploaded; `None` until confirmed
    pub uploaded_on: Option<DateTime<Utc>>,
    /// State of the upload and processing pipeline
    pub state: UploadState,
}

impl Track {
    fn new(kind: TrackKind, video_id: Uuid, language: impl Into<String>) -> Self {
        Self {
            meta: EntityMeta::new(),
            kind,
            video_id,
            language: language.into(),
            has_closed_captioning: false,
            uploaded_on: None,
            state: UploadState::default(),
        }
    }

    /// Create an additional audio track for a video
    pub fn audio(video_id: Uuid, language: impl Into<String>) -> Self {
        Self::new(TrackKind::Audio, video_id, language)
    }

    /// Create a subtitle track for a video
    pub fn subtitle(
        video_id: Uuid,
        language: impl Into<String>,
        has_closed_captioning: bool,
    ) -> Self {
        let mut track = Self::new(TrackKind::Subtitle, video_id, language);
        track.has_closed_captioning = has_closed_captioning;
        track
    }

    /// Create a sign-language track for a video
    pub fn sign(video_id: Uuid, language: impl Into<String>) -> Self {
        Self::new(TrackKind::Sign, video_id, language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_tag_the_kind() {
        let video_id = Uuid::new_v4();
        assert_eq!(Track::audio(video_id, "fr").kind, TrackKind::Audio);
        assert_eq!(Track::subtitle(video_id, "fr", true).kind, TrackKind::Subtitle);
        assert_eq!(Track::sign(video_id, "fr").kind, TrackKind::Sign);
    }

    #[test]
    fn test_cc_flag_only_set_through_subtitle() {
        let video_id = Uuid::new_v4();
        assert!(!Track::audio(video_id, "fr").has_closed_captioning);
        assert!(!Track::sign(video_id, "fr").has_closed_captioning);
        assert!(Track::subtitle(video_id, "fr", true).has_closed_captioning);
        assert!(!Track::subtitle(video_id, "fr", false).has_closed_captioning);
    }

    #[test]
    fn test_new_track_starts_pending() {
        let track = Track::audio(Uuid::new_v4(), "en");
        assert_eq!(track.state, UploadState::Pending);
        assert!(track.uploaded_on.is_none());
    }
}
