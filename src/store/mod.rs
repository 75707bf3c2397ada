//! Soft-delete-aware entity store.
//!
//! Owns create/update/delete/restore semantics for all entities: two-phase
//! deletion (soft then hard), uniqueness enforcement scoped to non-deleted
//! rows, and atomic per-call application of cascades.

pub mod engine;
pub mod errors;
pub mod state;

pub use engine::Store;
pub use errors::{StoreError, StoreResult};
pub use state::{Entity, StoreState};
