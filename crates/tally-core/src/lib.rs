//! tally-core library.
//!
//! # Conventions
//!
//! - **Errors**: ledger operations return [`error::Result`]; bootstrap and
//!   config code uses `anyhow::Result`.
//! - **Logging**: use `tracing` macros (`info!` for writes, `debug!` for
//!   built SQL, `warn!` for rejected input).

pub mod config;
pub mod db;
pub mod error;
pub mod ledger;
pub mod model;

pub use error::{LedgerError, Result};
