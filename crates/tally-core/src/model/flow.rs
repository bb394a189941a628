//! Flow direction of a category: money received or money spent.

use crate::error::LedgerError;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction attached to every category. A booking's amount is always a
/// magnitude; the sign comes from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowDirection {
    Inflow,
    Outflow,
}

impl FlowDirection {
    pub const ALL: [Self; 2] = [Self::Inflow, Self::Outflow];

    /// Integer stored in `categories.flow`.
    #[must_use]
    pub const fn stored_value(self) -> i64 {
        match self {
            Self::Outflow => 0,
            Self::Inflow => 1,
        }
    }

    #[must_use]
    pub const fn from_stored(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Outflow),
            1 => Some(Self::Inflow),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inflow => "inflow",
            Self::Outflow => "outflow",
        }
    }

    /// Suffix appended to category names in pickers, e.g. `Rent (out)`.
    #[must_use]
    pub const fn label_suffix(self) -> &'static str {
        match self {
            Self::Inflow => " (in)",
            Self::Outflow => " (out)",
        }
    }
}

impl fmt::Display for FlowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowDirection {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inflow" | "in" | "income" => Ok(Self::Inflow),
            "outflow" | "out" | "expense" => Ok(Self::Outflow),
            _ => Err(LedgerError::validation(
                "flow",
                s,
                "expected one of inflow, outflow",
            )),
        }
    }
}

impl ToSql for FlowDirection {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.stored_value()))
    }
}

impl FromSql for FlowDirection {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_i64()?;
        Self::from_stored(raw).ok_or(FromSqlError::OutOfRange(raw))
    }
}
