//! Habit domain model.
//!
//! # Responsibility
//! - Define the canonical record for one tracked behavior.
//! - Provide completion helpers over the sparse date-key set.
//!
//! # Invariants
//! - `id` is stable and never reused for another habit.
//! - `name` is trimmed and non-empty.
//! - `color` and `icon` are never empty; blanks take the defaults.
//! - `completed` holds only days that were marked done.

use crate::model::date_key::DateKey;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a habit.
pub type HabitId = Uuid;

/// Color applied to habits persisted before color was recorded.
pub const DEFAULT_COLOR: &str = "#79b4b7";
/// Icon glyph applied to habits persisted before icon was recorded.
pub const DEFAULT_ICON: &str = "Smile";

/// Validation failures for habit fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HabitValidationError {
    /// Name is blank after trim.
    EmptyName,
    /// Nil UUID cannot identify a habit.
    NilId,
}

impl Display for HabitValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "habit name must not be blank"),
            Self::NilId => write!(f, "habit id must not be nil"),
        }
    }
}

impl Error for HabitValidationError {}

/// One tracked behavior with its per-day completion record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    pub color: String,
    /// Symbolic glyph name resolved by the presentation layer.
    pub icon: String,
    /// Sparse set of completed days. Absence means not completed.
    pub completed: BTreeSet<DateKey>,
}

impl Habit {
    /// Creates a habit with a generated id and no completions.
    ///
    /// # Errors
    /// - `EmptyName` when `name` is blank after trim.
    pub fn new(
        name: &str,
        color: impl Into<String>,
        icon: impl Into<String>,
    ) -> Result<Self, HabitValidationError> {
        Self::with_id(Uuid::new_v4(), name, color, icon)
    }

    /// Creates a habit with a caller-provided id.
    ///
    /// Used by decode paths where identity already exists in storage.
    /// Empty `color`/`icon` become `DEFAULT_COLOR`/`DEFAULT_ICON`.
    pub fn with_id(
        id: HabitId,
        name: &str,
        color: impl Into<String>,
        icon: impl Into<String>,
    ) -> Result<Self, HabitValidationError> {
        if id.is_nil() {
            return Err(HabitValidationError::NilId);
        }
        Ok(Self {
            id,
            name: normalize_name(name)?,
            color: color_or_default(color.into()),
            icon: icon_or_default(icon.into()),
            completed: BTreeSet::new(),
        })
    }

    /// Returns whether the habit was completed on `key`.
    pub fn is_completed_on(&self, key: DateKey) -> bool {
        self.completed.contains(&key)
    }

    /// Flips completion for `key` and returns the new state.
    ///
    /// Calling twice with the same key restores the original set.
    pub fn toggle(&mut self, key: DateKey) -> bool {
        if self.completed.remove(&key) {
            false
        } else {
            self.completed.insert(key);
            true
        }
    }

    /// Number of days marked completed.
    pub fn completion_count(&self) -> usize {
        self.completed.len()
    }
}

/// Trims `name` and rejects blank input.
pub fn normalize_name(name: &str) -> Result<String, HabitValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(HabitValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Returns `color`, or `DEFAULT_COLOR` when it is empty.
pub fn color_or_default(color: String) -> String {
    non_empty_or(color, DEFAULT_COLOR)
}

/// Returns `icon`, or `DEFAULT_ICON` when it is empty.
pub fn icon_or_default(icon: String) -> String {
    non_empty_or(icon, DEFAULT_ICON)
}

fn non_empty_or(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}
