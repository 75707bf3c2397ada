//! Observability for the store.
//!
//! Structured, synchronous logging only. Observability is read-only and must
//! never affect store execution.

mod logger;

pub use logger::{Logger, Severity};
