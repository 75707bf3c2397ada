//! Videos and their processing state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::base::EntityMeta;

/// State of the upload and transcoding pipeline for a video or track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadState {
    Pending,
    Processing,
    Error,
    Ready,
}

impl UploadState {
    /// Returns the lowercase token used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadState::Pending => "pending",
            UploadState::Processing => "processing",
            UploadState::Error => "error",
            UploadState::Ready => "ready",
        }
    }
}

impl Default for UploadState {
    fn default() -> Self {
        UploadState::Pending
    }
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A video belonging to a playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub meta: EntityMeta,
    /// Title of the video
    pub title: String,
    /// Description of the video
    pub description: Option<String>,
    /// Stable identifier addressing the media in the object store.
    ///
    /// Generated at construction and immutable afterwards, independent of the
    /// row id, so the addressing scheme survives row-id reuse.
    pub resource_id: Uuid,
    /// Identifier for synchronization with an external LTI tool
    pub lti_id: String,
    /// User who created the video, if known
    pub created_by_id: Option<Uuid>,
    /// Language of the video, from the supported set
    pub language: String,
    /// Playlist the video belongs to
    pub playlist_id: Uuid,
    /// Position within the playlist; sort key is (position, id)
    pub position: u32,
    /// Origin video this one was duplicated from, if any
    pub duplicated_from_id: Option<Uuid>,
    /// When the active version was uploaded; `None` until confirmed
    pub uploaded_on: Option<DateTime<Utc>>,
    /// State of the upload and transcoding pipeline
    pub state: UploadState,
}

impl Video {
    pub fn new(
        title: impl Into<String>,
        lti_id: impl Into<String>,
        language: impl Into<String>,
        playlist_id: Uuid,
    ) -> Self {
        Self {
            meta: EntityMeta::new(),
            title: title.into(),
            description: None,
            resource_id: Uuid::new_v4(),
            lti_id: lti_id.into(),
            created_by_id: None,
            language: language.into(),
            playlist_id,
            position: 0,
            duplicated_from_id: None,
            uploaded_on: None,
            state: UploadState::default(),
        }
    }

    /// Copy this video into another playlist, with fresh identity and the
    /// origin back-reference set.
    ///
    /// The copy keeps the origin's `resource_id` so already-transcoded media
    /// stays addressable under the same storage keys.
    pub fn duplicate(&self, playlist_id: Uuid) -> Self {
        Self {
            meta: EntityMeta::new(),
            title: self.title.clone(),
            description: self.description.clone(),
            resource_id: self.resource_id,
            lti_id: self.lti_id.clone(),
            created_by_id: self.created_by_id,
            language: self.language.clone(),
            playlist_id,
            position: self.position,
            duplicated_from_id: Some(self.meta.id),
            uploaded_on: self.uploaded_on,
            state: self.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_tokens() {
        assert_eq!(UploadState::Pending.as_str(), "pending");
        assert_eq!(UploadState::Processing.as_str(), "processing");
        assert_eq!(UploadState::Error.as_str(), "error");
        assert_eq!(UploadState::Ready.as_str(), "ready");
    }

    #[test]
    fn test_new_video_is_pending_without_upload() {
        let video = Video::new("Lecture 1", "lti-1", "en", Uuid::new_v4());
        assert_eq!(video.state, UploadState::Pending);
        assert!(video.uploaded_on.is_none());
        assert_eq!(video.position, 0);
        assert_ne!(video.resource_id, video.meta.id);
    }

    #[test]
    fn test_duplicate_keeps_resource_id() {
        let origin = Video::new("Lecture 1", "lti-1", "en", Uuid::new_v4());
        let target = Uuid::new_v4();
        let copy = origin.duplicate(target);
        assert_ne!(copy.meta.id, origin.meta.id);
        assert_eq!(copy.resource_id, origin.resource_id);
        assert_eq!(copy.duplicated_from_id, Some(origin.meta.id));
        assert_eq!(copy.playlist_id, target);
    }
}
