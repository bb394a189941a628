use std::fmt;

/// Machine-readable error codes for scripts and JSON consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidInput,
    NotFound,
    SchemaMismatch,
    UnsafeQuery,
    StoreFailure,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidInput => "E2001",
            Self::NotFound => "E2002",
            Self::SchemaMismatch => "E3001",
            Self::UnsafeQuery => "E4001",
            Self::StoreFailure => "E5001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidInput => "Invalid input",
            Self::NotFound => "Not found",
            Self::SchemaMismatch => "Unknown column or category mapping",
            Self::UnsafeQuery => "Query rejected: only reads are allowed",
            Self::StoreFailure => "Ledger store failure",
        }
    }

    /// Optional remediation hint surfaced next to the error.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InvalidInput => {
                Some("Dates use YYYY-MM-DD, amounts are non-negative decimals like 12.50.")
            }
            Self::NotFound => Some("Run `tally list` or `tally category list` to see valid values."),
            Self::SchemaMismatch => Some("Editable columns are: date, note, inflow, outflow."),
            Self::UnsafeQuery => {
                Some("Write a SELECT, or a bare filter such as: note like '%rent%'.")
            }
            Self::StoreFailure => Some("Check the database path and retry. Nothing was changed."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Every failure the ledger core can report.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Malformed user input (unparsable date or amount, empty field, locked cell).
    #[error("invalid {field} '{value}': {reason}")]
    Validation {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// Internal inconsistency such as an unknown column name.
    #[error("schema error: {0}")]
    Schema(String),

    /// Ad-hoc query text failed the read-only check.
    #[error("unsafe query rejected: {reason}")]
    UnsafeQuery { reason: String },

    /// Connectivity or constraint failure reported by SQLite.
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// Lookup by name or id found nothing.
    #[error("{what} not found: {key}")]
    NotFound { what: &'static str, key: String },
}

impl LedgerError {
    pub fn validation(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(what: &'static str, key: impl fmt::Display) -> Self {
        Self::NotFound {
            what,
            key: key.to_string(),
        }
    }

    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::InvalidInput,
            Self::Schema(_) => ErrorCode::SchemaMismatch,
            Self::UnsafeQuery { .. } => ErrorCode::UnsafeQuery,
            Self::Store(_) => ErrorCode::StoreFailure,
            Self::NotFound { .. } => ErrorCode::NotFound,
        }
    }

    /// True for errors that only reject the current action and leave state untouched.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Store(_) | Self::Schema(_))
    }
}

pub type Result<T, E = LedgerError> = std::result::Result<T, E>;
