//! Schema upgrades for the memo store.
//!
//! # Invariants
//! - Steps are listed in strictly increasing `version` order.
//! - An upgrade applies every pending step in one transaction, or none.
//! - After an upgrade `PRAGMA user_version` equals the last applied step.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, Transaction};

struct Step {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[Step] = &[Step {
    version: 1,
    name: "create_memos",
    sql: include_str!("0001_init.sql"),
}];

/// Schema version this client writes.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Reads the schema version recorded in the store.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Brings the store up to `latest_version`, refusing stores from newer
/// clients.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = schema_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }

    let pending: Vec<&Step> = STEPS.iter().filter(|step| step.version > found).collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in &pending {
        run_step(&tx, step)?;
    }
    tx.commit()?;
    info!(
        "event=db_migrate module=db status=ok from_version={found} to_version={supported} steps={}",
        pending.len()
    );
    Ok(())
}

fn run_step(tx: &Transaction<'_>, step: &Step) -> DbResult<()> {
    let wrap = |source| DbError::Migration {
        version: step.version,
        name: step.name,
        source,
    };
    tx.execute_batch(step.sql).map_err(wrap)?;
    tx.pragma_update(None, "user_version", step.version)
        .map_err(wrap)
}
