//! SQLite ledger store.
//!
//! Runtime defaults:
//! - `foreign_keys = ON` so bookings cannot point at a missing category
//! - `journal_mode = WAL` and a 5s busy timeout so a second `tally` process
//!   reading the file does not fail immediately

pub mod bookings;
pub mod categories;
pub mod migrations;
pub mod query;
pub mod schema;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::{path::Path, time::Duration};

/// Busy timeout used for ledger connections.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (or create) the ledger database, apply runtime pragmas, and migrate
/// schema to the latest version.
///
/// # Errors
///
/// Returns an error if opening/configuring/migrating the database fails.
pub fn open_ledger(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create ledger directory {}", parent.display()))?;
        }
    }

    let mut conn = Connection::open(path)
        .with_context(|| format!("open ledger database {}", path.display()))?;

    configure_connection(&conn).context("configure sqlite pragmas")?;
    migrations::migrate(&mut conn).context("apply ledger migrations")?;
    tracing::debug!(path = %path.display(), "ledger opened");

    Ok(conn)
}

/// Open a migrated in-memory ledger. Used by tests and throwaway sessions.
///
/// # Errors
///
/// Returns an error if SQLite cannot create the database.
pub fn open_in_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory().context("open in-memory ledger")?;
    configure_connection(&conn).context("configure sqlite pragmas")?;
    migrations::migrate(&mut conn).context("apply ledger migrations")?;
    Ok(conn)
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    let _journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::open_in_memory;
    use crate::db::{bookings, categories};
    use crate::model::{Amount, FlowDirection, NewBooking};
    use chrono::NaiveDate;
    use rusqlite::Connection;

    pub fn test_db() -> Connection {
        open_in_memory().expect("open in-memory ledger")
    }

    pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    pub fn category(conn: &Connection, name: &str, flow: FlowDirection) -> i64 {
        categories::insert_category(conn, name, "", flow).expect("insert category")
    }

    pub fn booking(conn: &Connection, date: NaiveDate, note: &str, amount: &str, category_id: i64) -> i64 {
        bookings::insert_booking(
            conn,
            &NewBooking {
                date,
                note: note.to_string(),
                amount: Amount::parse(amount).expect("valid test amount"),
                category_id,
            },
        )
        .expect("insert booking")
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_BUSY_TIMEOUT, open_ledger};
    use crate::db::migrations;
    use tempfile::TempDir;

    fn temp_db_path() -> (TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("nested").join("ledger.sqlite3");
        (dir, path)
    }

    #[test]
    fn open_ledger_sets_wal_busy_timeout_and_fk() {
        let (_dir, path) = temp_db_path();
        let conn = open_ledger(&path).expect("open ledger db");

        let journal_mode: String = conn
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .expect("query journal_mode");
        assert_eq!(journal_mode.to_ascii_lowercase(), "wal");

        let busy_timeout_ms: u64 = conn
            .pragma_query_value(None, "busy_timeout", |row| row.get(0))
            .expect("query busy_timeout");
        assert_eq!(
            u128::from(busy_timeout_ms),
            DEFAULT_BUSY_TIMEOUT.as_millis()
        );

        let foreign_keys: i64 = conn
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .expect("query foreign_keys");
        assert_eq!(foreign_keys, 1);
    }

    #[test]
    fn open_ledger_runs_migrations_and_reopens() {
        let (_dir, path) = temp_db_path();
        {
            let conn = open_ledger(&path).expect("open ledger db");
            let version = migrations::current_schema_version(&conn).expect("schema version");
            assert_eq!(version, migrations::LATEST_SCHEMA_VERSION);
        }
        let conn = open_ledger(&path).expect("reopen ledger db");
        let version = migrations::current_schema_version(&conn).expect("schema version");
        assert_eq!(version, migrations::LATEST_SCHEMA_VERSION);
    }
}
