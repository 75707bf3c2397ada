//! Deterministic storage-key derivation for uploaded media.
//!
//! Pure functions, no side effects: two calls with the same inputs always
//! produce the identical string.

pub mod deriver;
pub mod timestamp;

pub use deriver::{subtitle_source_key, video_source_key};
pub use timestamp::{active_stamp, to_datetime, to_stamp};
