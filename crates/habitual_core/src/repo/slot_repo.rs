//! Named slot repository contracts and implementations.
//!
//! # Responsibility
//! - Read and replace whole text values stored under a string key.
//! - Provide SQLite-backed and in-memory implementations.
//!
//! # Invariants
//! - `write_slot` is an upsert of the full value.
//! - Keys are compared byte-for-byte.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SlotRepoResult<T> = Result<T, SlotRepoError>;

/// Errors from slot storage backends.
#[derive(Debug)]
pub enum SlotRepoError {
    Db(DbError),
    /// Backend refused the operation (quota, closed handle, ...).
    Unavailable(String),
}

impl Display for SlotRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "slot storage unavailable: {message}"),
        }
    }
}

impl Error for SlotRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for SlotRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SlotRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Key-value slot storage local to the running client.
pub trait SlotRepository {
    fn read_slot(&self, key: &str) -> SlotRepoResult<Option<String>>;
    fn write_slot(&self, key: &str, value: &str) -> SlotRepoResult<()>;
}

impl<R: SlotRepository + ?Sized> SlotRepository for &R {
    fn read_slot(&self, key: &str) -> SlotRepoResult<Option<String>> {
        (**self).read_slot(key)
    }

    fn write_slot(&self, key: &str, value: &str) -> SlotRepoResult<()> {
        (**self).write_slot(key, value)
    }
}

/// SQLite-backed slot repository over the `kv_slots` table.
pub struct SqliteSlotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSlotRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SlotRepository for SqliteSlotRepository<'_> {
    fn read_slot(&self, key: &str) -> SlotRepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_slots WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_slot(&self, key: &str, value: &str) -> SlotRepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_slots (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }
}

/// In-memory slot repository for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemorySlotRepository {
    slots: RefCell<HashMap<String, String>>,
}

impl MemorySlotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository with one slot already populated.
    pub fn with_slot(key: impl Into<String>, value: impl Into<String>) -> Self {
        let repo = Self::new();
        repo.slots.borrow_mut().insert(key.into(), value.into());
        repo
    }

    /// Returns a copy of the slot value, if set.
    pub fn slot(&self, key: &str) -> Option<String> {
        self.slots.borrow().get(key).cloned()
    }
}

impl SlotRepository for MemorySlotRepository {
    fn read_slot(&self, key: &str) -> SlotRepoResult<Option<String>> {
        Ok(self.slot(key))
    }

    fn write_slot(&self, key: &str, value: &str) -> SlotRepoResult<()> {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
