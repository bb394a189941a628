//! Category directory: listing, label resolution and category maintenance.
//!
//! Categories are shown to users as labels carrying a direction suffix
//! (`Rent (out)`), so the same name can exist once per flow direction.

use crate::error::{LedgerError, Result};
use crate::model::{Category, FlowDirection};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;
use tracing::{info, warn};

/// What to do with bookings that reference a category being deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadePolicy {
    /// Leave everything untouched if any booking references the category.
    Refuse,
    /// Delete the referencing bookings, then the category.
    Cascade,
}

/// Result of a category deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRemoval {
    pub category_id: i64,
    pub bookings_removed: usize,
}

/// Category detail view: the category plus how many bookings use it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDetails {
    #[serde(flatten)]
    pub category: Category,
    pub booking_count: usize,
}

fn row_to_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        flow: row.get(3)?,
    })
}

/// All categories ordered by id.
///
/// # Errors
///
/// Returns [`LedgerError::Store`] if the query fails.
pub fn list_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt =
        conn.prepare("SELECT id, name, description, flow FROM categories ORDER BY id ASC")?;
    let rows = stmt.query_map([], row_to_category)?;
    let mut categories = Vec::new();
    for row in rows {
        categories.push(row?);
    }
    Ok(categories)
}

/// Labels for a category picker, e.g. `["Rent (out)", "Salary (in)"]`.
///
/// # Errors
///
/// Returns [`LedgerError::Store`] if the query fails.
pub fn category_labels(conn: &Connection) -> Result<Vec<String>> {
    Ok(list_categories(conn)?.iter().map(Category::label).collect())
}

/// Split a picker label into its name and, if present, the direction suffix.
#[must_use]
pub fn split_label(label: &str) -> (&str, Option<FlowDirection>) {
    let trimmed = label.trim();
    for flow in FlowDirection::ALL {
        if let Some(name) = trimmed.strip_suffix(flow.label_suffix()) {
            return (name.trim_end(), Some(flow));
        }
    }
    (trimmed, None)
}

/// Fetch a category by id.
///
/// # Errors
///
/// [`LedgerError::NotFound`] if absent, [`LedgerError::Store`] on SQLite failure.
pub fn get_category(conn: &Connection, id: i64) -> Result<Category> {
    conn.query_row(
        "SELECT id, name, description, flow FROM categories WHERE id = ?1",
        params![id],
        row_to_category,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("category", id))
}

fn find_matching(conn: &Connection, name: &str, flow: Option<FlowDirection>) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, description, flow FROM categories \
         WHERE name = ?1 AND (?2 IS NULL OR flow = ?2) ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![name, flow], row_to_category)?;
    let mut found = Vec::new();
    for row in rows {
        found.push(row?);
    }
    Ok(found)
}

/// Resolve a picker label (with or without direction suffix) to a category.
///
/// # Errors
///
/// - [`LedgerError::NotFound`] if nothing matches
/// - [`LedgerError::Validation`] if a bare name matches both directions
/// - [`LedgerError::Store`] on SQLite failure
pub fn resolve_label(conn: &Connection, label: &str) -> Result<Category> {
    let (name, flow) = split_label(label);
    let mut found = find_matching(conn, name, flow)?;
    match found.len() {
        0 => Err(LedgerError::not_found("category", label.trim())),
        1 => Ok(found.remove(0)),
        _ => Err(LedgerError::validation(
            "category",
            label,
            format!(
                "'{name}' exists as inflow and outflow; add '{}' or '{}'",
                FlowDirection::Inflow.label_suffix().trim(),
                FlowDirection::Outflow.label_suffix().trim()
            ),
        )),
    }
}

/// Resolve a picker label to a category id.
///
/// # Errors
///
/// See [`resolve_label`].
pub fn resolve_label_id(conn: &Connection, label: &str) -> Result<i64> {
    resolve_label(conn, label).map(|category| category.id)
}

/// Number of bookings referencing `category_id`.
///
/// # Errors
///
/// Returns [`LedgerError::Store`] if the query fails.
pub fn count_bookings(conn: &Connection, category_id: i64) -> Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM bookings WHERE category_id = ?1",
        params![category_id],
        |row| row.get(0),
    )?;
    Ok(usize::try_from(count).unwrap_or_default())
}

/// Detail view for a label.
///
/// # Errors
///
/// See [`resolve_label`].
pub fn details(conn: &Connection, label: &str) -> Result<CategoryDetails> {
    let category = resolve_label(conn, label)?;
    let booking_count = count_bookings(conn, category.id)?;
    Ok(CategoryDetails {
        category,
        booking_count,
    })
}

fn ensure_unique(conn: &Connection, name: &str, flow: FlowDirection, except: Option<i64>) -> Result<()> {
    let clash: Option<i64> = conn
        .query_row(
            "SELECT id FROM categories WHERE name = ?1 AND flow = ?2 AND (?3 IS NULL OR id <> ?3)",
            params![name, flow, except],
            |row| row.get(0),
        )
        .optional()?;
    if clash.is_some() {
        return Err(LedgerError::validation(
            "category",
            format!("{name}{}", flow.label_suffix()),
            "a category with this name and direction already exists",
        ));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::validation("category name", name, "must not be empty"));
    }
    if split_label(trimmed).1.is_some() {
        return Err(LedgerError::validation(
            "category name",
            name,
            "must not end with a direction suffix",
        ));
    }
    Ok(trimmed)
}

/// Create a category and return its id.
///
/// # Errors
///
/// [`LedgerError::Validation`] for an empty name or a `(name, flow)`
/// duplicate, [`LedgerError::Store`] on SQLite failure.
pub fn insert_category(
    conn: &Connection,
    name: &str,
    description: &str,
    flow: FlowDirection,
) -> Result<i64> {
    let name = validate_name(name)?;
    ensure_unique(conn, name, flow, None)?;
    conn.execute(
        "INSERT INTO categories (name, description, flow) VALUES (?1, ?2, ?3)",
        params![name, description, flow],
    )?;
    let id = conn.last_insert_rowid();
    info!(id, name, %flow, "category inserted");
    Ok(id)
}

/// Overwrite name, description and flow of an existing category.
///
/// Changing the flow moves all its bookings to the other display column on
/// the next reload.
///
/// # Errors
///
/// [`LedgerError::NotFound`], [`LedgerError::Validation`] or [`LedgerError::Store`].
pub fn update_category(
    conn: &Connection,
    id: i64,
    name: &str,
    description: &str,
    flow: FlowDirection,
) -> Result<()> {
    let name = validate_name(name)?;
    ensure_unique(conn, name, flow, Some(id))?;
    let changed = conn.execute(
        "UPDATE categories SET name = ?1, description = ?2, flow = ?3 WHERE id = ?4",
        params![name, description, flow, id],
    )?;
    if changed == 0 {
        return Err(LedgerError::not_found("category", id));
    }
    info!(id, name, %flow, "category updated");
    Ok(())
}

/// Delete a category.
///
/// With [`CascadePolicy::Cascade`] the dependent bookings and the category are
/// removed inside one transaction. With [`CascadePolicy::Refuse`] nothing is
/// changed when bookings still reference the category.
///
/// # Errors
///
/// [`LedgerError::NotFound`] if the category does not exist,
/// [`LedgerError::Validation`] when refused, [`LedgerError::Store`] on SQLite
/// failure (the transaction is rolled back).
pub fn delete_category(
    conn: &Connection,
    id: i64,
    policy: CascadePolicy,
) -> Result<CategoryRemoval> {
    let category = get_category(conn, id)?;
    let referencing = count_bookings(conn, id)?;

    if referencing > 0 && policy == CascadePolicy::Refuse {
        warn!(id, referencing, "category delete refused");
        return Err(LedgerError::validation(
            "category",
            category.label(),
            format!("{referencing} booking(s) still use this category"),
        ));
    }

    let tx = conn.unchecked_transaction()?;
    let bookings_removed = tx.execute("DELETE FROM bookings WHERE category_id = ?1", params![id])?;
    tx.execute("DELETE FROM categories WHERE id = ?1", params![id])?;
    tx.commit()?;

    info!(id, bookings_removed, "category deleted");
    Ok(CategoryRemoval {
        category_id: id,
        bookings_removed,
    })
}
