//! Slot storage contracts and implementations.
//!
//! # Responsibility
//! - Define the key-value slot contract used by the habit store.
//! - Isolate SQLite details from store orchestration.
//!
//! # Invariants
//! - A write replaces the whole slot value; there are no partial writes.
//! - A missing slot reads as `None`, never as an error.

pub mod slot_repo;
