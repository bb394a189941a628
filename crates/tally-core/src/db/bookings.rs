//! Single-statement booking writes.
//!
//! Each function issues exactly one statement, so each write is atomic at the
//! store level and there is nothing to roll back on failure.

use crate::error::{LedgerError, Result};
use crate::model::{Amount, NewBooking};
use chrono::NaiveDate;
use rusqlite::{Connection, ToSql, params};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Persisted booking column that a single-cell edit can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Date,
    Note,
    Amount,
}

impl ColumnKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Note => "note",
            Self::Amount => "amount",
        }
    }

    const fn update_sql(self) -> &'static str {
        match self {
            Self::Date => "UPDATE bookings SET date = ?1 WHERE id = ?2",
            Self::Note => "UPDATE bookings SET note = ?1 WHERE id = ?2",
            Self::Amount => "UPDATE bookings SET amount = ?1 WHERE id = ?2",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "note" => Ok(Self::Note),
            "amount" => Ok(Self::Amount),
            other => Err(LedgerError::Schema(format!(
                "no persisted booking column named '{other}'"
            ))),
        }
    }
}

/// Insert a booking and return its id.
///
/// # Errors
///
/// Returns [`LedgerError::Store`] if the insert fails, e.g. when the
/// category does not exist.
pub fn insert_booking(conn: &Connection, booking: &NewBooking) -> Result<i64> {
    conn.execute(
        "INSERT INTO bookings (date, note, amount, category_id) VALUES (?1, ?2, ?3, ?4)",
        params![
            booking.date,
            booking.note,
            booking.amount,
            booking.category_id
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(id, category_id = booking.category_id, "booking inserted");
    Ok(id)
}

fn update_column(conn: &Connection, id: i64, column: ColumnKind, value: &dyn ToSql) -> Result<()> {
    let changed = conn.execute(column.update_sql(), params![value, id])?;
    if changed == 0 {
        return Err(LedgerError::not_found("booking", id));
    }
    info!(id, %column, "booking updated");
    Ok(())
}

/// # Errors
///
/// [`LedgerError::NotFound`] if no booking has `id`, [`LedgerError::Store`] on SQLite failure.
pub fn update_date(conn: &Connection, id: i64, date: NaiveDate) -> Result<()> {
    update_column(conn, id, ColumnKind::Date, &date)
}

/// # Errors
///
/// [`LedgerError::NotFound`] if no booking has `id`, [`LedgerError::Store`] on SQLite failure.
pub fn update_note(conn: &Connection, id: i64, note: &str) -> Result<()> {
    update_column(conn, id, ColumnKind::Note, &note)
}

/// # Errors
///
/// [`LedgerError::NotFound`] if no booking has `id`, [`LedgerError::Store`] on SQLite failure.
pub fn update_amount(conn: &Connection, id: i64, amount: Amount) -> Result<()> {
    update_column(conn, id, ColumnKind::Amount, &amount)
}

/// Delete one booking.
///
/// # Errors
///
/// [`LedgerError::NotFound`] if no booking has `id`, [`LedgerError::Store`] on SQLite failure.
pub fn delete_booking(conn: &Connection, id: i64) -> Result<()> {
    let changed = conn.execute("DELETE FROM bookings WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(LedgerError::not_found("booking", id));
    }
    info!(id, "booking deleted");
    Ok(())
}
