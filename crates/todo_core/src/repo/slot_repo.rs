//! Key-value slot contracts with SQLite and in-memory implementations.
//!
//! # Responsibility
//! - Read and replace whole string values stored under a key.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `write_slot` is all-or-nothing: readers see the old or the new value.
//! - An absent key reads as `None`, never as an empty string.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, PoisonError};

pub type RepoResult<T> = Result<T, RepoError>;

/// Slot persistence error.
#[derive(Debug)]
pub enum RepoError {
    /// The database behind the slots could not be opened.
    Db(DbError),
    Sqlite(rusqlite::Error),
    InvalidKey(String),
    /// Backing storage exists but is not usable (missing table, poisoned lock).
    Unavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Sqlite(err) => write!(f, "slot query failed: {err}"),
            Self::InvalidKey(key) => write!(f, "invalid slot key `{key}`"),
            Self::Unavailable(message) => write!(f, "slot storage unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Sqlite(err) => Some(err),
            Self::InvalidKey(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Repository interface for whole-value key-value slots.
pub trait SlotRepository {
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>>;
    fn write_slot(&self, key: &str, value: &str) -> RepoResult<()>;
}

impl<R: SlotRepository + ?Sized> SlotRepository for &R {
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).read_slot(key)
    }

    fn write_slot(&self, key: &str, value: &str) -> RepoResult<()> {
        (**self).write_slot(key, value)
    }
}

/// SQLite-backed slot repository over the `kv_slots` table.
pub struct SqliteSlotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSlotRepository<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `RepoError::Unavailable` when the `kv_slots` table is missing, which
    ///   means the connection did not come from `db::open_db*`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'kv_slots'
            );",
            [],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(RepoError::Unavailable(
                "table `kv_slots` is missing; open the database through db::open_db".to_string(),
            ));
        }

        Ok(Self { conn })
    }
}

impl SlotRepository for SqliteSlotRepository<'_> {
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>> {
        let key = normalize_key(key)?;
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

    fn write_slot(&self, key: &str, value: &str) -> RepoResult<()> {
        let key = normalize_key(key)?;
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

/// In-process slot repository.
///
/// Thread-safe, so a store built on it can be shared across threads.
#[derive(Debug, Default)]
pub struct MemorySlotRepository {
    slots: Mutex<HashMap<String, String>>,
}

impl MemorySlotRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotRepository for MemorySlotRepository {
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>> {
        let key = normalize_key(key)?;
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(slots.get(key).cloned())
    }

    fn write_slot(&self, key: &str, value: &str) -> RepoResult<()> {
        let key = normalize_key(key)?;
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn normalize_key(key: &str) -> RepoResult<&str> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(RepoError::InvalidKey(key.to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::{normalize_key, MemorySlotRepository, RepoError, SlotRepository};

    #[test]
    fn normalize_key_rejects_blank_keys() {
        assert!(matches!(normalize_key("   "), Err(RepoError::InvalidKey(_))));
        assert_eq!(normalize_key(" @todos ").unwrap(), "@todos");
    }

    #[test]
    fn memory_repo_reads_none_for_absent_key() {
        let repo = MemorySlotRepository::new();
        assert_eq!(repo.read_slot("@todos").unwrap(), None);
    }

    #[test]
    fn memory_repo_write_replaces_previous_value() {
        let repo = MemorySlotRepository::new();
        repo.write_slot("@todos", "[]").unwrap();
        repo.write_slot("@todos", "[1]").unwrap();
        assert_eq!(repo.read_slot("@todos").unwrap().as_deref(), Some("[1]"));
    }
}
