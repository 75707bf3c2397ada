//! Source-bucket storage key derivation.
//!
//! Keys address uploaded media objects in the source bucket, where they land
//! before transcoding. The format is a wire contract with the object-storage
//! collaborator and must be reproduced byte for byte.
//!
//! Callers always supply the stamp explicitly. For a confirmed upload it comes
//! from [`crate::keys::timestamp::active_stamp`]; for a prospective version
//! (upload policy issued before confirmation) it is the stamp the confirmation
//! step will later record as `uploaded_on`.

use uuid::Uuid;

/// Key for a video in the source bucket:
/// `{resource_id}/video/{video_id}/{stamp}`
pub fn video_source_key(resource_id: Uuid, video_id: Uuid, stamp: &str) -> String {
    format!("{resource_id}/video/{video_id}/{stamp}")
}

/// Key for a subtitle track in the source bucket:
/// `{resource_id}/subtitletrack/{track_id}/{stamp}_{language}`, with `_cc`
/// appended when closed captioning is on.
pub fn subtitle_source_key(
    resource_id: Uuid,
    track_id: Uuid,
    stamp: &str,
    language: &str,
    has_closed_captioning: bool,
) -> String {
    let cc = if has_closed_captioning { "_cc" } else { "" };
    format!("{resource_id}/subtitletrack/{track_id}/{stamp}_{language}{cc}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_key_format() {
        let resource = Uuid::new_v4();
        let video = Uuid::new_v4();
        let key = video_source_key(resource, video, "20240101T000000");
        assert_eq!(key, format!("{resource}/video/{video}/20240101T000000"));
    }

    #[test]
    fn test_video_key_deterministic() {
        let resource = Uuid::new_v4();
        let video = Uuid::new_v4();
        let first = video_source_key(resource, video, "1704067200");
        let second = video_source_key(resource, video, "1704067200");
        assert_eq!(first, second);
    }

    #[test]
    fn test_subtitle_key_with_closed_captioning() {
        let resource = Uuid::new_v4();
        let track = Uuid::new_v4();
        let key = subtitle_source_key(resource, track, "S1", "fr", true);
        assert_eq!(key, format!("{resource}/subtitletrack/{track}/S1_fr_cc"));
    }

    #[test]
    fn test_subtitle_key_without_closed_captioning() {
        let resource = Uuid::new_v4();
        let track = Uuid::new_v4();
        let key = subtitle_source_key(resource, track, "S1", "fr", false);
        assert_eq!(key, format!("{resource}/subtitletrack/{track}/S1_fr"));
    }
}
