//! SQLite backing for the on-device key-value slots.
//!
//! # Responsibility
//! - Open the to-do database file and bring its schema up to date.
//! - Report open failures with the database location and the stage that
//!   failed, so shells can show which file is unusable.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - A database written by a newer build is refused, never downgraded.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, MEMORY_LOCATION};

pub type DbResult<T> = Result<T, DbError>;

/// Failure to hand out a ready-to-use connection for one database.
#[derive(Debug)]
pub struct DbError {
    location: String,
    stage: DbStage,
}

/// Step of `open_db*` that failed.
#[derive(Debug)]
pub enum DbStage {
    /// SQLite could not open or create the file.
    Connect(rusqlite::Error),
    /// Connection settings such as the busy timeout were refused.
    Configure(rusqlite::Error),
    /// Moving the schema to `target` failed; the batch was rolled back.
    Migrate {
        target: u32,
        source: rusqlite::Error,
    },
    /// The file carries a schema from a newer build.
    NewerSchema { found: u32, latest_supported: u32 },
}

impl DbError {
    pub(crate) fn new(location: impl Into<String>, stage: DbStage) -> Self {
        Self {
            location: location.into(),
            stage,
        }
    }

    /// File path, or [`MEMORY_LOCATION`] for in-memory databases.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn stage(&self) -> &DbStage {
        &self.stage
    }

    /// Stable code for log lines.
    pub fn code(&self) -> &'static str {
        match self.stage {
            DbStage::Connect(_) => "db_connect_failed",
            DbStage::Configure(_) => "db_configure_failed",
            DbStage::Migrate { .. } => "db_migrate_failed",
            DbStage::NewerSchema { .. } => "db_schema_too_new",
        }
    }
}

impl Display for DbStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect(err) => write!(f, "cannot open file: {err}"),
            Self::Configure(err) => write!(f, "cannot configure connection: {err}"),
            Self::Migrate { target, source } => {
                write!(f, "schema upgrade to version {target} failed: {source}")
            }
            Self::NewerSchema {
                found,
                latest_supported,
            } => write!(
                f,
                "schema version {found} was written by a newer app (supported up to {latest_supported})"
            ),
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "todo database `{}`: {}", self.location, self.stage)
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.stage {
            DbStage::Connect(err) | DbStage::Configure(err) => Some(err),
            DbStage::Migrate { source, .. } => Some(source),
            DbStage::NewerSchema { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DbError, DbStage};

    #[test]
    fn display_names_location_and_stage() {
        let err = DbError::new(
            "/data/todo_items.sqlite3",
            DbStage::NewerSchema {
                found: 4,
                latest_supported: 1,
            },
        );
        let message = err.to_string();
        assert!(message.contains("/data/todo_items.sqlite3"));
        assert!(message.contains("schema version 4"));
        assert_eq!(err.code(), "db_schema_too_new");
    }
}
