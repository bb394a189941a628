//! Single-cell edit commits.
//!
//! An [`EditIntent`] names one booking, one persisted column and the raw text
//! the user typed. [`commit`] coerces the text for that column and issues one
//! `UPDATE`. Nothing is reloaded afterwards.

use crate::db::bookings;
pub use crate::db::bookings::ColumnKind;
use crate::error::Result;
use crate::model::{Amount, date};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// A requested single-cell change, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditIntent {
    pub row_id: i64,
    pub column: ColumnKind,
    pub raw: String,
}

/// Typed value written by a successful commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CommittedValue {
    Date(NaiveDate),
    Note(String),
    Amount(Amount),
}

impl fmt::Display for CommittedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(value) => write!(f, "{}", value.format(date::CANONICAL_FORMAT)),
            Self::Note(value) => f.write_str(value),
            Self::Amount(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitOutcome {
    pub row_id: i64,
    pub column: ColumnKind,
    pub value: CommittedValue,
}

/// Coerce `raw` for `column` without touching the store.
///
/// # Errors
///
/// Returns [`LedgerError::Validation`](crate::LedgerError::Validation) when the text does not coerce.
pub fn coerce(column: ColumnKind, raw: &str) -> Result<CommittedValue> {
    match column {
        ColumnKind::Date => date::parse_canonical(raw).map(CommittedValue::Date),
        ColumnKind::Note => Ok(CommittedValue::Note(raw.to_string())),
        ColumnKind::Amount => Amount::parse(raw).map(CommittedValue::Amount),
    }
}

/// Validate and persist one edit.
///
/// # Errors
///
/// - [`LedgerError::Validation`](crate::LedgerError::Validation) if the raw text does not coerce
/// - [`LedgerError::NotFound`](crate::LedgerError::NotFound) if the booking no longer exists
/// - [`LedgerError::Store`](crate::LedgerError::Store) if the update fails
pub fn commit(conn: &rusqlite::Connection, intent: &EditIntent) -> Result<CommitOutcome> {
    let value = coerce(intent.column, &intent.raw)?;
    debug!(row_id = intent.row_id, column = %intent.column, "commit edit");

    match &value {
        CommittedValue::Date(d) => bookings::update_date(conn, intent.row_id, *d)?,
        CommittedValue::Note(note) => bookings::update_note(conn, intent.row_id, note)?,
        CommittedValue::Amount(amount) => bookings::update_amount(conn, intent.row_id, *amount)?,
    }

    Ok(CommitOutcome {
        row_id: intent.row_id,
        column: intent.column,
        value,
    })
}
