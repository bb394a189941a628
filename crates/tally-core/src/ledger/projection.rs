//! In-memory editable view over joined bookings.
//!
//! A projection is rebuilt wholesale from query results on every load. The
//! single stored amount is split into an inflow and an outflow display column
//! according to the category's flow direction; exactly one of them is set.

use super::commit::{ColumnKind, EditIntent};
use crate::error::{LedgerError, Result};
use crate::model::{Amount, EffectiveDate, FlowDirection, JoinedBooking};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// One display row of the ledger table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerRow {
    pub id: i64,
    pub note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inflow: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outflow: Option<Amount>,
    pub date: NaiveDate,
    pub category: String,
}

/// Columns of the ledger table, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayColumn {
    Id,
    Note,
    Inflow,
    Outflow,
    Date,
    Category,
}

impl DisplayColumn {
    pub const ALL: [Self; 6] = [
        Self::Id,
        Self::Note,
        Self::Inflow,
        Self::Outflow,
        Self::Date,
        Self::Category,
    ];

    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Note => "NOTE",
            Self::Inflow => "INFLOW",
            Self::Outflow => "OUTFLOW",
            Self::Date => "DATE",
            Self::Category => "CATEGORY",
        }
    }

    /// Persisted column an edit of this display column writes to.
    ///
    /// Both amount columns map to the one stored amount; id and category are
    /// never edited from the table.
    #[must_use]
    pub const fn edit_kind(self) -> Option<ColumnKind> {
        match self {
            Self::Note => Some(ColumnKind::Note),
            Self::Inflow | Self::Outflow => Some(ColumnKind::Amount),
            Self::Date => Some(ColumnKind::Date),
            Self::Id | Self::Category => None,
        }
    }
}

impl FlowDirection {
    /// Display column a booking's amount appears in.
    #[must_use]
    pub const fn display_column(self) -> DisplayColumn {
        match self {
            Self::Inflow => DisplayColumn::Inflow,
            Self::Outflow => DisplayColumn::Outflow,
        }
    }
}

impl fmt::Display for DisplayColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header().to_ascii_lowercase())
    }
}

impl FromStr for DisplayColumn {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "note" | "info" => Ok(Self::Note),
            "inflow" | "in" => Ok(Self::Inflow),
            "outflow" | "out" => Ok(Self::Outflow),
            "date" => Ok(Self::Date),
            "category" => Ok(Self::Category),
            other => Err(LedgerError::Schema(format!(
                "unknown column '{other}': expected one of id, note, inflow, outflow, date, category"
            ))),
        }
    }
}

impl From<JoinedBooking> for LedgerRow {
    fn from(joined: JoinedBooking) -> Self {
        let (inflow, outflow) = match joined.flow.display_column() {
            DisplayColumn::Inflow => (Some(joined.booking.amount), None),
            _ => (None, Some(joined.booking.amount)),
        };
        Self {
            id: joined.booking.id,
            note: joined.booking.note,
            inflow,
            outflow,
            date: joined.booking.date,
            category: joined.category_name,
        }
    }
}

/// Map query results to display rows, preserving order.
#[must_use]
pub fn project(rows: Vec<JoinedBooking>) -> Vec<LedgerRow> {
    rows.into_iter().map(LedgerRow::from).collect()
}

impl LedgerRow {
    /// The stored magnitude, whichever column shows it.
    #[must_use]
    pub fn amount(&self) -> Amount {
        self.inflow.or(self.outflow).unwrap_or(Amount::ZERO)
    }

    /// Direction inferred from which amount column is populated.
    #[must_use]
    pub const fn flow(&self) -> FlowDirection {
        if self.inflow.is_some() {
            FlowDirection::Inflow
        } else {
            FlowDirection::Outflow
        }
    }

    /// Whether `column` may be edited on this row.
    ///
    /// Note, amount and date cells unlock on rows dated on or after the
    /// effective date. Id and category cells are always locked.
    #[must_use]
    pub fn is_editable(&self, column: DisplayColumn, effective: &EffectiveDate) -> bool {
        column.edit_kind().is_some() && effective.allows_edit(self.date)
    }

    /// Turn a cell edit into an [`EditIntent`], enforcing eligibility.
    ///
    /// Editing either amount column targets the single stored amount; the
    /// direction stays with the category, whichever column was typed into.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Schema`] for id/category columns,
    /// [`LedgerError::Validation`] when the row is dated before the effective date.
    pub fn edit_intent(
        &self,
        column: DisplayColumn,
        raw: impl Into<String>,
        effective: &EffectiveDate,
    ) -> Result<EditIntent> {
        let Some(kind) = column.edit_kind() else {
            return Err(LedgerError::Schema(format!(
                "column '{column}' is not editable in the ledger view"
            )));
        };
        if !effective.allows_edit(self.date) {
            return Err(LedgerError::validation(
                "cell",
                format!("{column} of booking {}", self.id),
                format!(
                    "bookings dated before {} are locked",
                    effective.today().format("%Y-%m-%d")
                ),
            ));
        }
        Ok(EditIntent {
            row_id: self.id,
            column: kind,
            raw: raw.into(),
        })
    }

    /// Text of one cell; absent amounts render empty.
    #[must_use]
    pub fn cell(&self, column: DisplayColumn) -> String {
        match column {
            DisplayColumn::Id => self.id.to_string(),
            DisplayColumn::Note => self.note.clone(),
            DisplayColumn::Inflow => self.inflow.map(|a| a.to_string()).unwrap_or_default(),
            DisplayColumn::Outflow => self.outflow.map(|a| a.to_string()).unwrap_or_default(),
            DisplayColumn::Date => self.date.format("%Y-%m-%d").to_string(),
            DisplayColumn::Category => self.category.clone(),
        }
    }
}

/// Sort direction for the view-only re-sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

fn compare_by(a: &LedgerRow, b: &LedgerRow, column: DisplayColumn) -> Ordering {
    match column {
        DisplayColumn::Id => a.id.cmp(&b.id),
        DisplayColumn::Note => a.note.to_lowercase().cmp(&b.note.to_lowercase()),
        DisplayColumn::Inflow => a.inflow.cmp(&b.inflow),
        DisplayColumn::Outflow => a.outflow.cmp(&b.outflow),
        DisplayColumn::Date => a.date.cmp(&b.date),
        DisplayColumn::Category => a.category.to_lowercase().cmp(&b.category.to_lowercase()),
    }
}

/// Re-sort rows in memory. Stable; absent amounts sort first when ascending.
pub fn sort_rows(rows: &mut [LedgerRow], column: DisplayColumn, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ordering = compare_by(a, b, column);
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

/// Sums over a projection. Sums may exceed the single-amount cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub inflow: Decimal,
    pub outflow: Decimal,
    /// Inflow minus outflow; may be negative.
    pub balance: Decimal,
}

fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Result<Decimal> {
    values.into_iter().try_fold(Decimal::ZERO, |acc, value| {
        acc.checked_add(value).ok_or_else(|| {
            LedgerError::validation("totals", value.to_string(), "sum overflows the decimal range")
        })
    })
}

/// Inflow, outflow and balance of `rows`.
///
/// # Errors
///
/// Returns [`LedgerError::Validation`] if a sum leaves the decimal range.
pub fn totals(rows: &[LedgerRow]) -> Result<Totals> {
    let inflow = checked_sum(rows.iter().filter_map(|row| row.inflow).map(Amount::value))?;
    let outflow = checked_sum(rows.iter().filter_map(|row| row.outflow).map(Amount::value))?;
    let balance = inflow.checked_sub(outflow).ok_or_else(|| {
        LedgerError::validation("totals", outflow.to_string(), "balance overflows the decimal range")
    })?;
    Ok(Totals {
        inflow,
        outflow,
        balance,
    })
}
