//! Domain model for tracked habits and their daily completions.
//!
//! # Responsibility
//! - Define canonical data structures used by the habit store and views.
//! - Own the canonical `YYYY-MM-DD` date key format.
//!
//! # Invariants
//! - Every habit is identified by a stable `HabitId`.
//! - Completion records are sparse: only completed days are present.

pub mod date_key;
pub mod habit;
