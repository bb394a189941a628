//! Calendar-date parsing and the effective-date context.

use crate::error::{LedgerError, Result};
use chrono::{Local, NaiveDate};

/// Canonical textual form used for storage and cell commits.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d";

/// Formats accepted for filter bounds and `--as-of`, tried in order.
const LENIENT_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%d-%m-%Y"];

/// Parse a date in the canonical `YYYY-MM-DD` form only.
///
/// # Errors
///
/// Returns [`LedgerError::Validation`] if `raw` is not a valid canonical date.
pub fn parse_canonical(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), CANONICAL_FORMAT).map_err(|_| {
        LedgerError::validation("date", raw, "expected a calendar date as YYYY-MM-DD")
    })
}

/// Parse a date typed by a user: `YYYY-MM-DD`, `YYYY-M-D`, `D.M.YYYY` or `DD-MM-YYYY`.
///
/// # Errors
///
/// Returns [`LedgerError::Validation`] if none of the formats match.
pub fn parse_lenient(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    LENIENT_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| {
            LedgerError::validation(
                "date",
                raw,
                "expected YYYY-MM-DD, D.M.YYYY or DD-MM-YYYY",
            )
        })
}

/// Reference date for edit eligibility and for new bookings.
///
/// Holds an optional override of "today". The value is owned by whoever
/// drives the session and passed explicitly; it is never written to storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EffectiveDate {
    override_date: Option<NaiveDate>,
}

impl EffectiveDate {
    /// No override: the system clock decides.
    #[must_use]
    pub const fn unset() -> Self {
        Self {
            override_date: None,
        }
    }

    /// Pin the reference date regardless of the clock.
    #[must_use]
    pub const fn fixed(date: NaiveDate) -> Self {
        Self {
            override_date: Some(date),
        }
    }

    #[must_use]
    pub const fn override_date(&self) -> Option<NaiveDate> {
        self.override_date
    }

    /// The effective "today".
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.override_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Set the override. Setting it to the real today clears it.
    pub fn set(&mut self, date: NaiveDate) {
        self.set_relative_to(date, Local::now().date_naive());
    }

    /// Drop the override and follow the clock again.
    pub const fn clear(&mut self) {
        self.override_date = None;
    }

    fn set_relative_to(&mut self, date: NaiveDate, clock_today: NaiveDate) {
        self.override_date = if date == clock_today { None } else { Some(date) };
    }

    /// A cell on a row dated `date` may be edited iff `date` is not before the effective today.
    #[must_use]
    pub fn allows_edit(&self, date: NaiveDate) -> bool {
        date >= self.today()
    }
}
