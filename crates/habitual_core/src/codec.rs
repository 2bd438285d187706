//! Text codec for the persisted habit collection.
//!
//! # Responsibility
//! - Encode the ordered habit list as one JSON document for a storage slot.
//! - Decode stored documents, filling defaults for fields added after the
//!   first schema (`color`, `icon`).
//!
//! # Invariants
//! - Encoded order equals collection order.
//! - `completed` is written as `{ "YYYY-MM-DD": true }`; `false` never appears.
//! - Decode rejects documents that would break collection invariants
//!   (duplicate ids, blank names, invalid date keys).

use crate::model::date_key::DateKey;
use crate::model::habit::{Habit, HabitId};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Errors raised while decoding a stored collection.
#[derive(Debug)]
pub enum DecodeError {
    /// Text is not a JSON array of habit records.
    Malformed(serde_json::Error),
    /// One record is structurally valid JSON but violates a field invariant.
    InvalidRecord { index: usize, reason: String },
    /// Two records share one id.
    DuplicateId(HabitId),
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "malformed habit document: {err}"),
            Self::InvalidRecord { index, reason } => {
                write!(f, "invalid habit record at index {index}: {reason}")
            }
            Self::DuplicateId(id) => write!(f, "duplicate habit id in document: {id}"),
        }
    }
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
            Self::InvalidRecord { .. } | Self::DuplicateId(_) => None,
        }
    }
}

/// Error raised while encoding a collection.
#[derive(Debug)]
pub struct EncodeError(serde_json::Error);

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to encode habits: {}", self.0)
    }
}

impl Error for EncodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

#[derive(Serialize)]
struct HabitRecordRef<'a> {
    id: HabitId,
    name: &'a str,
    color: &'a str,
    icon: &'a str,
    #[serde(serialize_with = "serialize_completed")]
    completed: &'a BTreeSet<DateKey>,
}

#[derive(Deserialize)]
struct HabitRecord {
    id: String,
    name: String,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    completed: Option<BTreeMap<String, bool>>,
}

fn serialize_completed<S>(completed: &&BTreeSet<DateKey>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(completed.iter().map(|key| (key.to_string(), true)))
}

/// Encodes `habits` into the slot text form.
pub fn encode(habits: &[Habit]) -> Result<String, EncodeError> {
    let records: Vec<HabitRecordRef<'_>> = habits
        .iter()
        .map(|habit| HabitRecordRef {
            id: habit.id,
            name: habit.name.as_str(),
            color: habit.color.as_str(),
            icon: habit.icon.as_str(),
            completed: &habit.completed,
        })
        .collect();
    serde_json::to_string(&records).map_err(EncodeError)
}

/// Decodes slot text into an ordered habit list.
///
/// # Errors
/// - `Malformed` when `raw` is not a JSON array of records.
/// - `InvalidRecord` for bad ids, blank names, or bad date keys.
/// - `DuplicateId` when two records share an id.
pub fn decode(raw: &str) -> Result<Vec<Habit>, DecodeError> {
    let records: Vec<HabitRecord> = serde_json::from_str(raw).map_err(DecodeError::Malformed)?;
    let mut seen = HashSet::with_capacity(records.len());
    let mut habits = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let habit = record_to_habit(index, record)?;
        if !seen.insert(habit.id) {
            return Err(DecodeError::DuplicateId(habit.id));
        }
        habits.push(habit);
    }

    Ok(habits)
}

fn record_to_habit(index: usize, record: HabitRecord) -> Result<Habit, DecodeError> {
    let invalid = |reason: String| DecodeError::InvalidRecord { index, reason };

    let id = Uuid::parse_str(&record.id)
        .map_err(|_| invalid(format!("invalid id `{}`", record.id)))?;
    let mut habit = Habit::with_id(
        id,
        &record.name,
        record.color.unwrap_or_default(),
        record.icon.unwrap_or_default(),
    )
    .map_err(|err| invalid(err.to_string()))?;

    for (key, done) in record.completed.unwrap_or_default() {
        let key: DateKey = key.parse().map_err(|err| invalid(format!("{err}")))?;
        if done {
            habit.completed.insert(key);
        }
    }

    Ok(habit)
}
