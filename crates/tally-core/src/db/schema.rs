//! Canonical SQLite schema for the ledger.
//!
//! - `categories` holds the classification and its flow direction
//!   (`0` = outflow, `1` = inflow); `(name, flow)` is unique
//! - `bookings` holds entries with a non-negative `amount` and a required
//!   category reference; dates are ISO `YYYY-MM-DD` text so string order is
//!   chronological order
//! - amounts above `999999999999.99` are refused by triggers, so every stored
//!   amount fits the two-decimal range that reads back exactly

/// Migration v1: the two ledger relations.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    description TEXT NOT NULL DEFAULT '',
    flow INTEGER NOT NULL CHECK (flow IN (0, 1)),
    UNIQUE (name, flow)
);

CREATE TABLE IF NOT EXISTS bookings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL CHECK (date GLOB '[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]'),
    note TEXT NOT NULL DEFAULT '',
    amount NUMERIC NOT NULL CHECK (amount >= 0),
    category_id INTEGER NOT NULL REFERENCES categories(id)
);
";

/// Migration v2: read-path indexes for date-range filters and category lookups.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_bookings_date
    ON bookings(date, id);

CREATE INDEX IF NOT EXISTS idx_bookings_category
    ON bookings(category_id);
";

/// Migration v3: refuse amounts beyond the storable cap.
pub const MIGRATION_V3_SQL: &str = r"
CREATE TRIGGER IF NOT EXISTS bookings_amount_cap_insert
BEFORE INSERT ON bookings
WHEN CAST(NEW.amount AS REAL) > 999999999999.99
BEGIN
    SELECT RAISE(ABORT, 'amount exceeds 999999999999.99');
END;

CREATE TRIGGER IF NOT EXISTS bookings_amount_cap_update
BEFORE UPDATE OF amount ON bookings
WHEN CAST(NEW.amount AS REAL) > 999999999999.99
BEGIN
    SELECT RAISE(ABORT, 'amount exceeds 999999999999.99');
END;
";

/// Indexes expected after all migrations.
pub const REQUIRED_INDEXES: &[&str] = &["idx_bookings_date", "idx_bookings_category"];

/// Triggers expected after all migrations.
pub const REQUIRED_TRIGGERS: &[&str] = &["bookings_amount_cap_insert", "bookings_amount_cap_update"];
