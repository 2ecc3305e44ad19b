//! Connection bootstrap for the to-do database.
//!
//! # Invariants
//! - Returned connections have migrations fully applied.
//! - Returned connections wait on a busy database instead of failing fast.
//! - Every failure carries the location it was opened from.

use super::migrations::apply_migrations;
use super::{DbError, DbResult, DbStage};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Location reported for databases opened with [`open_db_in_memory`].
pub const MEMORY_LOCATION: &str = ":memory:";

/// Opens the database file at `path`, creating it when absent, and applies
/// all pending migrations.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_at(&path.display().to_string(), || Connection::open(path))
}

/// Opens a private in-memory database with the current schema.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_at(MEMORY_LOCATION, Connection::open_in_memory)
}

fn open_at(
    location: &str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start location={location}");

    let result = connect()
        .map_err(DbStage::Connect)
        .and_then(|mut conn| prepare(&mut conn).map(|()| conn));

    match result {
        Ok(conn) => {
            info!(
                "event=db_open module=db status=ok location={location} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(stage) => {
            let err = DbError::new(location, stage);
            error!(
                "event=db_open module=db status=error location={location} duration_ms={} error_code={} error={}",
                started_at.elapsed().as_millis(),
                err.code(),
                err.stage()
            );
            Err(err)
        }
    }
}

fn prepare(conn: &mut Connection) -> Result<(), DbStage> {
    conn.busy_timeout(BUSY_TIMEOUT).map_err(DbStage::Configure)?;
    apply_migrations(conn)
}
