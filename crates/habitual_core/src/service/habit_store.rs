//! Habit collection store.
//!
//! # Responsibility
//! - Own the ordered habit collection for one process.
//! - Load it once from a named slot and write it back after every mutation.
//! - Notify subscribers with the new collection after each applied change.
//!
//! # Invariants
//! - Habit ids are unique across the collection.
//! - Rejected operations leave the collection untouched.
//! - Storage failures never roll back in-memory state and never panic.
//! - Nothing is written before `load()` has run.

use crate::codec::{decode, encode};
use crate::model::date_key::DateKey;
use crate::model::habit::{color_or_default, icon_or_default, normalize_name, Habit, HabitId};
use chrono::NaiveDate;
use crate::repo::slot_repo::SlotRepository;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default slot key holding the serialized collection.
pub const DEFAULT_SLOT_KEY: &str = "habitual-habits";

pub type HabitStoreResult<T> = Result<T, HabitStoreError>;

/// Rejections reported by store mutations.
///
/// The collection is unchanged whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HabitStoreError {
    /// Name is blank after trim.
    InvalidName,
    /// No habit carries the given id.
    HabitNotFound(HabitId),
    /// Date has no `YYYY-MM-DD` key form (year outside 0000..=9999).
    DateOutOfRange(NaiveDate),
}

impl Display for HabitStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "habit name must not be blank"),
            Self::HabitNotFound(id) => write!(f, "habit not found: {id}"),
            Self::DateOutOfRange(date) => write!(f, "date {date} cannot be tracked"),
        }
    }
}

impl Error for HabitStoreError {}

/// Result of `HabitStore::load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Stored collection decoded with `count` habits.
    Restored { count: usize },
    /// No stored collection existed.
    Fresh,
    /// Stored value was unreadable; started empty.
    Degraded,
    /// `load` had already run; nothing changed.
    AlreadyLoaded,
}

type Listener = Box<dyn FnMut(&[Habit])>;

/// Single-writer owner of the ordered habit collection.
pub struct HabitStore<R: SlotRepository> {
    repo: R,
    slot_key: String,
    habits: Vec<Habit>,
    loaded: bool,
    listeners: Vec<Listener>,
}

impl<R: SlotRepository> HabitStore<R> {
    /// Creates an unloaded store over `repo` using `DEFAULT_SLOT_KEY`.
    pub fn new(repo: R) -> Self {
        Self::with_slot_key(repo, DEFAULT_SLOT_KEY)
    }

    /// Creates an unloaded store over a custom slot key.
    pub fn with_slot_key(repo: R, slot_key: impl Into<String>) -> Self {
        Self {
            repo,
            slot_key: slot_key.into(),
            habits: Vec::new(),
            loaded: false,
            listeners: Vec::new(),
        }
    }

    /// Reads the slot and replaces the collection with its contents.
    ///
    /// Missing, unreadable, or undecodable data yields an empty collection;
    /// habits added before `load` are discarded in every case. The store is
    /// marked loaded in every case. The slot is not rewritten here, so a
    /// corrupt value survives until the first mutation.
    pub fn load(&mut self) -> LoadOutcome {
        if self.loaded {
            warn!("event=store_load module=store status=skipped reason=already_loaded");
            return LoadOutcome::AlreadyLoaded;
        }

        let outcome = match self.repo.read_slot(&self.slot_key) {
            Ok(Some(raw)) => match decode(&raw) {
                Ok(habits) => {
                    let count = habits.len();
                    self.habits = habits;
                    info!("event=store_load module=store status=ok count={count}");
                    LoadOutcome::Restored { count }
                }
                Err(err) => {
                    error!(
                        "event=store_load module=store status=error error_code=decode_failed error={err}"
                    );
                    self.habits.clear();
                    LoadOutcome::Degraded
                }
            },
            Ok(None) => {
                self.habits.clear();
                info!("event=store_load module=store status=ok count=0 reason=empty_slot");
                LoadOutcome::Fresh
            }
            Err(err) => {
                error!(
                    "event=store_load module=store status=error error_code=read_failed error={err}"
                );
                self.habits.clear();
                LoadOutcome::Degraded
            }
        };

        self.loaded = true;
        self.notify();
        outcome
    }

    /// Whether `load` has completed and the collection is authoritative.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Current ordered collection.
    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    /// Looks up one habit by id.
    pub fn get(&self, id: HabitId) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == id)
    }

    /// Number of habits in the collection.
    pub fn len(&self) -> usize {
        self.habits.len()
    }

    /// Whether the collection holds no habits.
    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    /// Storage slot this store reads and writes.
    pub fn slot_key(&self) -> &str {
        &self.slot_key
    }

    /// Registers a listener called with the collection after each applied
    /// mutation and after `load`.
    pub fn subscribe(&mut self, listener: impl FnMut(&[Habit]) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Appends a new habit and returns its generated id.
    ///
    /// # Errors
    /// - `InvalidName` when `name` is blank after trim.
    pub fn add_habit(
        &mut self,
        name: &str,
        color: impl Into<String>,
        icon: impl Into<String>,
    ) -> HabitStoreResult<HabitId> {
        let habit = Habit::new(name, color, icon).map_err(|err| {
            debug!("event=habit_add module=store status=rejected reason={err:?}");
            HabitStoreError::InvalidName
        })?;
        let id = habit.id;
        self.habits.push(habit);
        info!(
            "event=habit_add module=store status=ok habit_id={id} count={}",
            self.habits.len()
        );
        self.commit();
        Ok(id)
    }

    /// Replaces name, color and icon of an existing habit in place.
    ///
    /// Id, completions and position are preserved. Empty `color`/`icon`
    /// take the defaults, as in `add_habit`.
    ///
    /// # Errors
    /// - `HabitNotFound` when no habit has `id`.
    /// - `InvalidName` when `name` is blank after trim.
    pub fn update_habit(
        &mut self,
        id: HabitId,
        name: &str,
        color: impl Into<String>,
        icon: impl Into<String>,
    ) -> HabitStoreResult<()> {
        let index = self.index_of(id).ok_or_else(|| {
            debug!("event=habit_update module=store status=rejected reason=not_found habit_id={id}");
            HabitStoreError::HabitNotFound(id)
        })?;
        let name = normalize_name(name).map_err(|_| {
            debug!("event=habit_update module=store status=rejected reason=invalid_name habit_id={id}");
            HabitStoreError::InvalidName
        })?;

        let habit = &mut self.habits[index];
        habit.name = name;
        habit.color = color_or_default(color.into());
        habit.icon = icon_or_default(icon.into());
        info!("event=habit_update module=store status=ok habit_id={id}");
        self.commit();
        Ok(())
    }

    /// Removes the habit with `id`. Returns whether anything was removed.
    pub fn delete_habit(&mut self, id: HabitId) -> bool {
        let Some(index) = self.index_of(id) else {
            debug!("event=habit_delete module=store status=noop habit_id={id}");
            return false;
        };
        self.habits.remove(index);
        info!(
            "event=habit_delete module=store status=ok habit_id={id} count={}",
            self.habits.len()
        );
        self.commit();
        true
    }

    /// Flips completion of `id` on `date` and returns the new state.
    ///
    /// Past/future bounds are not checked here; see `calendar::can_toggle`.
    ///
    /// # Errors
    /// - `DateOutOfRange` when `date` has no `DateKey` form.
    /// - `HabitNotFound` when no habit has `id`.
    pub fn toggle_completion(&mut self, id: HabitId, date: NaiveDate) -> HabitStoreResult<bool> {
        let key = DateKey::try_from(date).map_err(|_| {
            debug!("event=habit_toggle module=store status=rejected reason=date_out_of_range habit_id={id}");
            HabitStoreError::DateOutOfRange(date)
        })?;
        let index = self.index_of(id).ok_or_else(|| {
            debug!("event=habit_toggle module=store status=rejected reason=not_found habit_id={id}");
            HabitStoreError::HabitNotFound(id)
        })?;
        let completed = self.habits[index].toggle(key);
        info!(
            "event=habit_toggle module=store status=ok habit_id={id} date={key} completed={completed}"
        );
        self.commit();
        Ok(completed)
    }

    /// Moves `dragged_id` to the index currently held by `target_id`.
    ///
    /// Other habits keep their relative order. Returns `false` without
    /// changes when either id is unknown or both are equal.
    pub fn reorder(&mut self, dragged_id: HabitId, target_id: HabitId) -> bool {
        if dragged_id == target_id {
            return false;
        }
        let (Some(from), Some(to)) = (self.index_of(dragged_id), self.index_of(target_id)) else {
            debug!(
                "event=habit_reorder module=store status=noop dragged_id={dragged_id} target_id={target_id}"
            );
            return false;
        };

        let habit = self.habits.remove(from);
        self.habits.insert(to, habit);
        info!("event=habit_reorder module=store status=ok habit_id={dragged_id} from={from} to={to}");
        self.commit();
        true
    }

    fn index_of(&self, id: HabitId) -> Option<usize> {
        self.habits.iter().position(|habit| habit.id == id)
    }

    fn commit(&mut self) {
        self.persist();
        self.notify();
    }

    fn persist(&self) {
        if !self.loaded {
            debug!("event=store_save module=store status=skipped reason=not_loaded");
            return;
        }

        let raw = match encode(&self.habits) {
            Ok(raw) => raw,
            Err(err) => {
                error!("event=store_save module=store status=error error_code=encode_failed error={err}");
                return;
            }
        };

        match self.repo.write_slot(&self.slot_key, &raw) {
            Ok(()) => debug!(
                "event=store_save module=store status=ok count={} bytes={}",
                self.habits.len(),
                raw.len()
            ),
            Err(err) => {
                error!("event=store_save module=store status=error error_code=write_failed error={err}")
            }
        }
    }

    fn notify(&mut self) {
        for listener in &mut self.listeners {
            listener(&self.habits);
        }
    }
}
