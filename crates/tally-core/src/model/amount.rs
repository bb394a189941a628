//! Non-negative booking magnitude backed by `rust_decimal`.
//!
//! Amounts carry at most two fractional digits and stay at or below
//! [`Amount::largest`]. Within those bounds every value survives the trip through
//! SQLite's NUMERIC affinity exactly, including when SQLite hands a REAL back.

use crate::error::{LedgerError, Result};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fractional digits an amount may carry.
pub const MAX_SCALE: u32 = 2;

/// Largest storable amount in cents (`999999999999.99`).
pub const MAX_CENTS: i64 = 99_999_999_999_999;

/// Booking amount. Always `>= 0`; direction lives on the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest amount the ledger stores.
    #[must_use]
    pub fn largest() -> Self {
        Self(Decimal::new(MAX_CENTS, MAX_SCALE))
    }

    /// Wrap a decimal, rejecting values the store cannot hold exactly.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] when `value` is negative, has more
    /// than two fractional digits, or exceeds [`Amount::largest`].
    pub fn new(value: Decimal) -> Result<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(LedgerError::validation(
                "amount",
                value.to_string(),
                "amounts are stored as non-negative magnitudes; the category decides the direction",
            ));
        }
        let value = value.normalize();
        if value.scale() > MAX_SCALE {
            return Err(LedgerError::validation(
                "amount",
                value.to_string(),
                "at most two decimal places",
            ));
        }
        let max = Self::largest();
        if value > max.0 {
            return Err(LedgerError::validation(
                "amount",
                value.to_string(),
                format!("must not exceed {max}"),
            ));
        }
        Ok(Self(value))
    }

    /// Parse user text. Accepts `,` as the decimal separator.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] for empty, unparsable, negative or
    /// unstorable input.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::validation("amount", raw, "must not be empty"));
        }
        let normalized = trimmed.replace(',', ".");
        let value = Decimal::from_str(&normalized)
            .map_err(|_| LedgerError::validation("amount", raw, "not a decimal number"))?;
        Self::new(value)
    }

    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let decimal = match value {
            ValueRef::Integer(i) => Decimal::from(i),
            // a REAL is within a few ulps of a two-digit decimal; round back to it
            ValueRef::Real(f) => Decimal::from_str(&format!("{f:.2}"))
                .map_err(|err| FromSqlError::Other(Box::new(err)))?,
            ValueRef::Text(bytes) => {
                let text = std::str::from_utf8(bytes).map_err(|err| FromSqlError::Other(Box::new(err)))?;
                Decimal::from_str(text.trim()).map_err(|err| FromSqlError::Other(Box::new(err)))?
            }
            ValueRef::Null | ValueRef::Blob(_) => return Err(FromSqlError::InvalidType),
        };
        Self::new(decimal).map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}
