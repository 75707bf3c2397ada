//! Entity definitions for the platform data model.
//!
//! Playlists group videos; videos carry media tracks; playlist accesses grant
//! users a role on a playlist. Organizations, consumer sites and users are the
//! anchors the rest hangs off.

pub mod account;
pub mod base;
pub mod language;
pub mod playlist;
pub mod track;
pub mod video;

pub use account::{ConsumerSite, Organization, Role, User};
pub use base::{EntityKind, EntityMeta, EntityRef};
pub use playlist::{Playlist, PlaylistAccess};
pub use track::{Track, TrackKind};
pub use video::{UploadState, Video};
