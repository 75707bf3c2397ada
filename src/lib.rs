//! reelstore - a strict, soft-delete-aware data core for a video hosting
//! platform.
//!
//! Playlists group videos, videos carry media tracks (audio, subtitle,
//! sign-language), and playlist accesses grant users a role on a playlist.
//! The store owns the two-phase delete lifecycle (soft then hard), scoped
//! uniqueness over live rows, per-relationship delete propagation, and the
//! deterministic storage-key derivation addressing uploaded media in the
//! object store.

pub mod integrity;
pub mod keys;
pub mod model;
pub mod observability;
pub mod snapshot;
pub mod store;
