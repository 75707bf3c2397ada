//! Store error types.
//!
//! Every recoverable error leaves the committed state unchanged: a top-level
//! call either applies its whole effect (including cascades) or none of it.

use thiserror::Error;
use uuid::Uuid;

use crate::model::EntityKind;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A create, update or restore would leave two live rows with the same
    /// scoped-unique key
    #[error("constraint violation: {constraint}")]
    ConstraintViolation { constraint: String },

    /// A hard delete was refused because a protected dependent still exists;
    /// the caller must delete or relocate dependents first
    #[error("hard delete of {referenced} {id} blocked: {dependent} rows still reference it")]
    IntegrityBlocked {
        referenced: EntityKind,
        dependent: EntityKind,
        id: Uuid,
    },

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: Uuid },

    /// A declared reference points at no stored row
    #[error("missing referenced entity for {field}: {id}")]
    MissingReference { field: &'static str, id: Uuid },

    #[error("validation failed for {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Returns whether the caller can recover by changing its request
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, StoreError::Internal(_))
    }
}
