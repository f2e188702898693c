//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Translate configured connection strings into a [`DatabaseTarget`].
//! - Apply the schema bootstrap before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections have the schema fully applied.

use super::schema::apply_schema;
use super::{DbError, DbResult};
use log::{error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

static SQLITE_URI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^sqlite://(?:/(?P<path>.*))?$").expect("valid sqlite uri regex"));
static ANY_SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("valid scheme regex"));

const MEMORY_PATH: &str = ":memory:";

/// Where a configured connection string points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    Memory,
    File(PathBuf),
}

/// Parses a SQLAlchemy-style SQLite URI or a bare filesystem path.
///
/// Accepted forms:
/// - `sqlite://` and `sqlite:///:memory:` (and bare `:memory:`) -> in-memory
/// - `sqlite:///relative.db` -> `relative.db`
/// - `sqlite:////abs/path.db` -> `/abs/path.db`
/// - `/abs/path.db` or `relative.db` -> same path
///
/// # Errors
/// - Returns [`DbError::InvalidUri`] for empty input or non-SQLite schemes.
pub fn parse_database_uri(uri: &str) -> DbResult<DatabaseTarget> {
    let trimmed = uri.trim();
    if trimmed.is_empty() {
        return Err(DbError::InvalidUri(uri.to_string()));
    }

    if let Some(captures) = SQLITE_URI_RE.captures(trimmed) {
        let path = captures.name("path").map_or("", |value| value.as_str());
        if path.is_empty() || path == MEMORY_PATH {
            return Ok(DatabaseTarget::Memory);
        }
        return Ok(DatabaseTarget::File(PathBuf::from(path)));
    }

    if ANY_SCHEME_RE.is_match(trimmed) {
        return Err(DbError::InvalidUri(trimmed.to_string()));
    }

    if trimmed == MEMORY_PATH {
        return Ok(DatabaseTarget::Memory);
    }

    Ok(DatabaseTarget::File(PathBuf::from(trimmed)))
}

/// Opens whatever the connection string points at.
pub fn open_from_uri(uri: &str) -> DbResult<Connection> {
    match parse_database_uri(uri)? {
        DatabaseTarget::Memory => open_db_in_memory(),
        DatabaseTarget::File(path) => open_db(path),
    }
}

/// Opens a SQLite database file and bootstraps its schema.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=file");
    finish_open("file", started_at, Connection::open(path))
}

/// Opens an in-memory SQLite database and bootstraps its schema.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory");
    finish_open("memory", started_at, Connection::open_in_memory())
}

fn finish_open(
    mode: &str,
    started_at: Instant,
    opened: rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let mut conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_schema(conn)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_database_uri, DatabaseTarget};
    use crate::db::DbError;
    use std::path::PathBuf;

    #[test]
    fn parses_memory_forms() {
        for uri in ["sqlite://", "sqlite:///:memory:", ":memory:", "  sqlite://  "] {
            assert_eq!(
                parse_database_uri(uri).expect("memory uri should parse"),
                DatabaseTarget::Memory,
                "uri `{uri}`"
            );
        }
    }

    #[test]
    fn parses_relative_and_absolute_sqlite_paths() {
        assert_eq!(
            parse_database_uri("sqlite:///transport.db").expect("relative uri"),
            DatabaseTarget::File(PathBuf::from("transport.db"))
        );
        assert_eq!(
            parse_database_uri("sqlite:////var/lib/transport.db").expect("absolute uri"),
            DatabaseTarget::File(PathBuf::from("/var/lib/transport.db"))
        );
    }

    #[test]
    fn accepts_bare_paths() {
        assert_eq!(
            parse_database_uri("/tmp/transport.db").expect("bare path"),
            DatabaseTarget::File(PathBuf::from("/tmp/transport.db"))
        );
    }

    #[test]
    fn rejects_other_schemes_and_empty_input() {
        let err = parse_database_uri("postgresql://localhost/transport")
            .expect_err("non-sqlite scheme must fail");
        assert!(matches!(err, DbError::InvalidUri(_)));

        let err = parse_database_uri("   ").expect_err("empty uri must fail");
        assert!(matches!(err, DbError::InvalidUri(_)));
    }
}
