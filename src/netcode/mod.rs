//! Rollback Netcode
//!
//! Snapshot ring buffer and the input reconciler that owns the
//! authoritative timeline. Deterministic: everything here is driven by
//! tagged inputs, never by wall-clock time.

pub mod reconciler;
pub mod snapshot;

pub use reconciler::{InputDisposition, InputReconciler, InputRejected, ReconcilerStats};
pub use snapshot::SnapshotStore;
