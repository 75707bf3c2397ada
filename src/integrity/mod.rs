//! Relationship integrity: per-relationship delete propagation.
//!
//! One policy applies to every directed relationship (dependent → referenced):
//! cascade, protect (block hard delete) or set-null. The engine walks the
//! policy table transitively and idempotently; a single top-level delete may
//! mutate an entire dependent subtree, or nothing at all.

pub mod engine;
pub mod policy;

pub use engine::{hard_delete, restore, soft_delete};
pub use policy::{DeletePolicy, Relation};
