//! The editable ledger view and the operations that act on it.

pub mod commit;
pub mod export;
pub mod projection;
pub mod sandbox;
pub mod session;

pub use commit::{ColumnKind, CommitOutcome, CommittedValue, EditIntent};
pub use projection::{DisplayColumn, LedgerRow, SortDirection, Totals};
pub use sandbox::{AdhocOutcome, GridValue, ResultGrid};
pub use session::Session;
