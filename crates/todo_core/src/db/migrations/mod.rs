//! Schema steps for the slot database.
//!
//! # Invariants
//! - `version` values are strictly increasing.
//! - Pending steps run in one transaction; `PRAGMA user_version` ends at the
//!   last applied step or stays untouched.

use crate::db::DbStage;
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    name: "kv_slots",
    sql: include_str!("0001_kv_slots.sql"),
}];

/// Returns the schema version this build writes.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Brings the schema of `conn` to [`latest_version`].
pub(crate) fn apply_migrations(conn: &mut Connection) -> Result<(), DbStage> {
    let latest = latest_version();
    let found = conn
        .query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))
        .map_err(DbStage::Configure)?;

    if found > latest {
        return Err(DbStage::NewerSchema {
            found,
            latest_supported: latest,
        });
    }
    if found == latest {
        return Ok(());
    }

    let tx = conn.transaction().map_err(migrate_to(latest))?;
    for step in SCHEMA_STEPS.iter().filter(|step| step.version > found) {
        tx.execute_batch(step.sql)
            .and_then(|()| tx.pragma_update(None, "user_version", step.version))
            .map_err(migrate_to(step.version))?;
        info!(
            "event=db_migrate module=db status=applied version={} name={}",
            step.version, step.name
        );
    }
    tx.commit().map_err(migrate_to(latest))?;

    info!("event=db_migrate module=db status=ok from={found} to={latest}");
    Ok(())
}

fn migrate_to(target: u32) -> impl FnOnce(rusqlite::Error) -> DbStage {
    move |source| DbStage::Migrate { target, source }
}

#[cfg(test)]
mod tests {
    use super::{latest_version, SCHEMA_STEPS};

    #[test]
    fn step_versions_strictly_increase() {
        assert!(SCHEMA_STEPS
            .windows(2)
            .all(|pair| pair[0].version < pair[1].version));
        assert_eq!(latest_version(), SCHEMA_STEPS.len() as u32);
    }
}
