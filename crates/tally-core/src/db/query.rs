//! `SQLite` read queries over the booking/category join.
//!
//! Every user-supplied value is bound as a parameter. The free-text fragment
//! additionally has its `LIKE` wildcards escaped so it always matches
//! literally.

use crate::error::Result;
use crate::model::{Booking, JoinedBooking};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use tracing::debug;

const SELECT_JOINED: &str = "SELECT b.id, b.date, b.note, b.amount, b.category_id, c.name, c.flow \
     FROM bookings b INNER JOIN categories c ON c.id = b.category_id";

/// Escape character used in every `LIKE ... ESCAPE` clause.
const LIKE_ESCAPE: char = '\\';

/// Filter criteria for the booking listing.
///
/// All fields are optional. When multiple fields are set, they are combined
/// with AND semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingFilter {
    /// Case-insensitive substring of the note.
    pub text: Option<String>,
    /// Inclusive lower date bound.
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub to: Option<NaiveDate>,
}

impl BookingFilter {
    /// Free-text fragment, or `None` when absent or blank.
    #[must_use]
    pub fn text_fragment(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.trim().is_empty())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text_fragment().is_none() && self.from.is_none() && self.to.is_none()
    }
}

/// Escape `%`, `_` and the escape character itself for a `LIKE` pattern.
#[must_use]
pub fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for ch in fragment.chars() {
        if matches!(ch, '%' | '_') || ch == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

/// Build the SQL and its bound values for `filter`.
fn build_list_sql(filter: &BookingFilter) -> (String, Vec<String>) {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_values: Vec<String> = Vec::new();

    if let Some(text) = filter.text_fragment() {
        param_values.push(format!("%{}%", escape_like(text)));
        conditions.push(format!(
            "b.note LIKE ?{} ESCAPE '{LIKE_ESCAPE}'",
            param_values.len()
        ));
    }

    if let Some(from) = filter.from {
        param_values.push(from.format("%Y-%m-%d").to_string());
        conditions.push(format!("b.date >= ?{}", param_values.len()));
    }

    if let Some(to) = filter.to {
        param_values.push(to.format("%Y-%m-%d").to_string());
        conditions.push(format!("b.date <= ?{}", param_values.len()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    (
        format!("{SELECT_JOINED}{where_clause} ORDER BY b.id ASC"),
        param_values,
    )
}

/// List bookings matching `filter`, in store order.
///
/// # Errors
///
/// Returns [`crate::error::LedgerError::Store`] if the query fails.
pub fn list_bookings(conn: &Connection, filter: &BookingFilter) -> Result<Vec<JoinedBooking>> {
    let (sql, param_values) = build_list_sql(filter);
    debug!(%sql, params = param_values.len(), "list bookings");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(param_values.iter()), row_to_joined)?;

    let mut bookings = Vec::new();
    for row in rows {
        bookings.push(row?);
    }
    Ok(bookings)
}

/// Fetch one booking with its category.
///
/// Returns `None` if no booking has this id.
///
/// # Errors
///
/// Returns [`crate::error::LedgerError::Store`] if the query fails.
pub fn get_booking(conn: &Connection, id: i64) -> Result<Option<JoinedBooking>> {
    let sql = format!("{SELECT_JOINED} WHERE b.id = ?1");
    let found = conn
        .query_row(&sql, params![id], row_to_joined)
        .optional()?;
    Ok(found)
}

fn row_to_joined(row: &Row<'_>) -> rusqlite::Result<JoinedBooking> {
    Ok(JoinedBooking {
        booking: Booking {
            id: row.get(0)?,
            date: row.get(1)?,
            note: row.get(2)?,
            amount: row.get(3)?,
            category_id: row.get(4)?,
        },
        category_name: row.get(5)?,
        flow: row.get(6)?,
    })
}
