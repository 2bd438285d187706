//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate model mutations with slot persistence.
//! - Keep callers decoupled from codec and storage details.

pub mod habit_store;
