//! Free-text read queries over the ledger store.
//!
//! Input that does not start with `select` is treated as a `WHERE` clause over
//! `bookings`. The text must then pass a keyword blacklist, and the prepared
//! statement must report itself read-only before anything runs. The
//! display-only `inflow`/`outflow` names are rewritten to the stored `amount`
//! column so users can query with the words they see in the table.

use crate::error::{LedgerError, Result};
use rusqlite::Connection;
use rusqlite::types::ValueRef;
use serde::Serialize;
use tracing::{debug, warn};

const FORBIDDEN_KEYWORDS: [&str; 3] = ["insert", "update", "delete"];
const FLOW_KEYWORDS: [&str; 2] = ["inflow", "outflow"];

/// One cell of an ad-hoc result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GridValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl GridValue {
    fn from_ref(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(i) => Self::Integer(i),
            ValueRef::Real(f) => Self::Real(f),
            ValueRef::Text(bytes) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => Self::Blob(bytes.to_vec()),
        }
    }

    /// Plain-text rendering for tables.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Integer(i) => i.to_string(),
            Self::Real(f) => f.to_string(),
            Self::Text(s) => s.clone(),
            Self::Blob(bytes) => format!("<{} bytes>", bytes.len()),
        }
    }
}

/// Untyped result of an ad-hoc query, columns as the store named them.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResultGrid {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<GridValue>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdhocOutcome {
    /// Blank input; nothing was executed.
    NoOp,
    Grid(ResultGrid),
}

/// Wrap bare conditions into a full read over bookings.
#[must_use]
pub fn complete(text: &str) -> String {
    if text.to_ascii_lowercase().starts_with("select") {
        text.to_string()
    } else {
        format!("SELECT * FROM bookings WHERE {text}")
    }
}

/// Textual gate: must be a `select` and mention none of the write keywords.
///
/// # Errors
///
/// Returns [`LedgerError::UnsafeQuery`] naming the offending rule.
pub fn validate(sql: &str) -> Result<()> {
    let lowered = sql.to_lowercase();
    if !lowered.trim_start().starts_with("select") {
        return Err(LedgerError::UnsafeQuery {
            reason: "only select statements may be run".to_string(),
        });
    }
    if let Some(keyword) = FORBIDDEN_KEYWORDS
        .iter()
        .find(|keyword| lowered.contains(*keyword))
    {
        return Err(LedgerError::UnsafeQuery {
            reason: format!("query mentions '{keyword}'"),
        });
    }
    Ok(())
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Rewrite whole-word `inflow`/`outflow` to `amount`, leaving single-quoted
/// literals untouched.
#[must_use]
pub fn normalize(sql: &str) -> String {
    let chars: Vec<char> = sql.chars().collect();
    let mut out = String::with_capacity(sql.len());
    let mut in_literal = false;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if ch == '\'' {
            in_literal = !in_literal;
            out.push(ch);
            i += 1;
            continue;
        }
        if in_literal || !is_word_char(ch) {
            out.push(ch);
            i += 1;
            continue;
        }

        let start = i;
        while i < chars.len() && is_word_char(chars[i]) {
            i += 1;
        }
        let word: String = chars[start..i].iter().collect();
        if FLOW_KEYWORDS
            .iter()
            .any(|keyword| word.eq_ignore_ascii_case(keyword))
        {
            out.push_str("amount");
        } else {
            out.push_str(&word);
        }
    }
    out
}

/// True when text follows a `;` outside single-quoted literals.
fn has_trailing_statement(sql: &str) -> bool {
    let mut in_literal = false;
    for (index, ch) in sql.char_indices() {
        match ch {
            '\'' => in_literal = !in_literal,
            ';' if !in_literal => {
                let rest = &sql[index + 1..];
                if !rest.trim_matches(|c: char| c == ';' || c.is_whitespace()).is_empty() {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

/// Run one ad-hoc query.
///
/// # Errors
///
/// - [`LedgerError::UnsafeQuery`] when the text fails the blacklist, holds
///   more than one statement, or would write
/// - [`LedgerError::Store`] when SQLite rejects or fails the query
pub fn run(conn: &Connection, text: &str) -> Result<AdhocOutcome> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(AdhocOutcome::NoOp);
    }

    let sql = complete(trimmed);
    if let Err(err) = validate(&sql) {
        warn!(%sql, "ad-hoc query rejected");
        return Err(err);
    }
    let sql = normalize(&sql);
    debug!(%sql, "ad-hoc query");

    if has_trailing_statement(&sql) {
        warn!(%sql, "ad-hoc query rejected");
        return Err(LedgerError::UnsafeQuery {
            reason: "only a single statement may be run".to_string(),
        });
    }

    let mut stmt = conn.prepare(&sql)?;
    if !stmt.readonly() {
        warn!(%sql, "ad-hoc query rejected");
        return Err(LedgerError::UnsafeQuery {
            reason: "statement would modify the ledger".to_string(),
        });
    }

    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let width = columns.len();

    let mut grid_rows = Vec::new();
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(width);
        for index in 0..width {
            cells.push(GridValue::from_ref(row.get_ref(index)?));
        }
        grid_rows.push(cells);
    }

    Ok(AdhocOutcome::Grid(ResultGrid {
        columns,
        rows: grid_rows,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::{booking, category, test_db, ymd};
    use crate::model::FlowDirection;

    fn seeded() -> Connection {
        let conn = test_db();
        let rent = category(&conn, "Rent", FlowDirection::Outflow);
        let salary = category(&conn, "Salary", FlowDirection::Inflow);
        booking(&conn, ymd(2024, 1, 1), "January rent", "1200", rent);
        booking(&conn, ymd(2024, 1, 31), "Salary", "2500", salary);
        booking(&conn, ymd(2024, 2, 1), "February rent", "1200", rent);
        conn
    }

    fn grid(outcome: AdhocOutcome) -> ResultGrid {
        match outcome {
            AdhocOutcome::Grid(grid) => grid,
            AdhocOutcome::NoOp => panic!("expected a result grid"),
        }
    }

    fn booking_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM bookings", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn blank_input_is_a_no_op() {
        let conn = seeded();
        assert_eq!(run(&conn, "").unwrap(), AdhocOutcome::NoOp);
        assert_eq!(run(&conn, "  \n\t").unwrap(), AdhocOutcome::NoOp);
    }

    #[test]
    fn update_is_rejected_without_touching_the_store() {
        let conn = seeded();
        let err = run(&conn, "update Bookings set amount=0").unwrap_err();
        assert!(matches!(err, LedgerError::UnsafeQuery { .. }));

        let zeroed: i64 = conn
            .query_row("SELECT COUNT(*) FROM bookings WHERE amount = 0", [], |row| row.get(0))
            .unwrap();
        assert_eq!(zeroed, 0);
    }

    #[test]
    fn bare_condition_is_wrapped_into_a_bookings_read() {
        assert_eq!(
            complete("note like '%rent%'"),
            "SELECT * FROM bookings WHERE note like '%rent%'"
        );

        let conn = seeded();
        let result = grid(run(&conn, "note like '%rent%'").unwrap());
        assert_eq!(
            result.columns,
            vec!["id", "date", "note", "amount", "category_id"]
        );
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0][2], GridValue::Text("January rent".to_string()));
    }

    #[test]
    fn flow_keywords_are_rewritten_to_amount() {
        assert_eq!(
            normalize("SELECT * FROM bookings WHERE Inflow > 100 OR outflow < 5"),
            "SELECT * FROM bookings WHERE amount > 100 OR amount < 5"
        );
        assert_eq!(
            normalize("select note from bookings where note = 'inflow' and inflows = 1"),
            "select note from bookings where note = 'inflow' and inflows = 1"
        );

        let conn = seeded();
        let result = grid(run(&conn, "outflow > 2000").unwrap());
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0][2], GridValue::Text("Salary".to_string()));
    }

    #[test]
    fn keyword_blacklist_is_textual() {
        for sql in [
            "SELECT * FROM bookings; DELETE FROM bookings",
            "select * from bookings where note = 'insert coin'",
            "insert into bookings values (1)",
        ] {
            assert!(matches!(validate(sql), Err(LedgerError::UnsafeQuery { .. })));
        }
        assert!(validate("  SELECT count(*) FROM categories").is_ok());
    }

    #[test]
    fn stacked_statements_never_run() {
        let conn = seeded();
        let err = run(&conn, "select 1; drop table bookings").unwrap_err();
        assert!(matches!(err, LedgerError::UnsafeQuery { .. }));
        assert_eq!(booking_count(&conn), 3);
    }

    #[test]
    fn semicolons_inside_literals_and_at_the_end_are_fine() {
        assert!(!has_trailing_statement("select * from bookings;  "));
        assert!(!has_trailing_statement("select * from bookings where note = 'a; b'"));
        assert!(has_trailing_statement("select 1; select 2"));

        let conn = seeded();
        let result = grid(run(&conn, "note = 'x; y';").unwrap());
        assert!(result.rows.is_empty());
    }

    #[test]
    fn store_errors_surface_as_store() {
        let conn = seeded();
        assert!(matches!(
            run(&conn, "select * from nowhere"),
            Err(LedgerError::Store(_))
        ));
    }

    #[test]
    fn full_select_runs_as_given() {
        let conn = seeded();
        let result = grid(
            run(&conn, "SELECT c.name, COUNT(*) AS n FROM bookings b JOIN categories c ON c.id = b.category_id GROUP BY c.name ORDER BY c.name").unwrap(),
        );
        assert_eq!(result.columns, vec!["name", "n"]);
        assert_eq!(
            result.rows,
            vec![
                vec![GridValue::Text("Rent".to_string()), GridValue::Integer(2)],
                vec![GridValue::Text("Salary".to_string()), GridValue::Integer(1)],
            ]
        );
    }
}
