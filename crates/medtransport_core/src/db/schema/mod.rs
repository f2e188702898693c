//! Schema bootstrap for the scheduling store.
//!
//! # Responsibility
//! - Create the `PACIENTE`, `HOSPITAL` and `AGENDAMENTO` tables on first open.
//! - Refuse databases written by a newer schema than this binary knows.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Scripts run in one transaction; a failed bootstrap leaves no partial schema.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaScript {
    version: u32,
    sql: &'static str,
}

const SCHEMA_SCRIPTS: &[SchemaScript] = &[SchemaScript {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// Tables every bootstrapped connection must expose.
pub const REQUIRED_TABLES: &[&str] = &["PACIENTE", "HOSPITAL", "AGENDAMENTO"];

/// Returns the schema version written by this binary.
pub fn latest_version() -> u32 {
    SCHEMA_SCRIPTS.last().map_or(0, |script| script.version)
}

/// Brings the connection's schema up to [`latest_version`].
pub fn apply_schema(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for script in SCHEMA_SCRIPTS {
        if script.version <= current_version {
            continue;
        }

        tx.execute_batch(script.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", script.version))?;
    }
    tx.commit()?;

    Ok(())
}

/// Reads `PRAGMA user_version` from the connection.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Returns whether a table with the exact given name exists.
pub fn table_exists(conn: &Connection, table_name: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table_name],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
