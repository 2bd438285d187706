//! Core domain logic for Habitual.
//! This crate is the single source of truth for habit-tracking invariants.

pub mod calendar;
pub mod codec;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use calendar::{
    can_toggle, day_status, month_cells, month_of, week_cells, week_of, DayCell, DayStatus,
    MonthGrid, ToggleWindow,
};
pub use codec::{decode, encode, DecodeError, EncodeError};
pub use logging::{default_log_level, init_logging, logging_status, LogInitError};
pub use model::date_key::{DateKey, DateKeyParseError, DateKeyRangeError};
pub use model::habit::{Habit, HabitId, HabitValidationError, DEFAULT_COLOR, DEFAULT_ICON};
pub use repo::slot_repo::{
    MemorySlotRepository, SlotRepoError, SlotRepoResult, SlotRepository, SqliteSlotRepository,
};
pub use service::habit_store::{
    HabitStore, HabitStoreError, HabitStoreResult, LoadOutcome, DEFAULT_SLOT_KEY,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
