//! Business logic services.
//!
//! Services orchestrate record sources and note stores and provide the
//! high-level sync operations.

pub mod reconcile;
