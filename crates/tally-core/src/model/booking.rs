use super::{Amount, FlowDirection};
use chrono::NaiveDate;
use serde::Serialize;

/// A persisted ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Booking {
    pub id: i64,
    pub date: NaiveDate,
    pub note: String,
    pub amount: Amount,
    pub category_id: i64,
}

/// A booking that has not been inserted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub date: NaiveDate,
    pub note: String,
    pub amount: Amount,
    pub category_id: i64,
}

/// A named classification with a fixed flow direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub flow: FlowDirection,
}

impl Category {
    /// Picker label, e.g. `Rent (out)`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}{}", self.name, self.flow.label_suffix())
    }
}

/// A booking joined with its category, as returned by the query builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedBooking {
    pub booking: Booking,
    pub category_name: String,
    pub flow: FlowDirection,
}
