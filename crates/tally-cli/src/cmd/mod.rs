pub mod add;
pub mod category;
pub mod completions;
pub mod delete;
pub mod edit;
pub mod export;
pub mod init;
pub mod list;
pub mod query;

use crate::output::OutputMode;
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use tally_core::db::{self, query::BookingFilter};
use tally_core::ledger::Session;
use tally_core::model::{EffectiveDate, date};

/// Per-invocation state shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub db_path: PathBuf,
    pub effective: EffectiveDate,
    pub output: OutputMode,
}

impl Context {
    /// Open the ledger database. Fails hard: nothing works without a store.
    pub fn connect(&self) -> Result<Connection> {
        db::open_ledger(&self.db_path)
    }

    /// Open a session and load the projection under `filter`.
    pub fn session(&self, filter: BookingFilter) -> Result<Session> {
        let mut session = Session::open(self.connect()?, self.effective)?;
        if !filter.is_empty() {
            session.set_filter(filter)?;
        }
        Ok(session)
    }
}

/// clap value parser for user-typed dates.
pub fn parse_date_arg(raw: &str) -> std::result::Result<NaiveDate, String> {
    date::parse_lenient(raw).map_err(|err| err.to_string())
}

/// Ask on the terminal. Without a TTY the answer is yes; `--force` skips the call.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        return Ok(true);
    }

    eprint!("{prompt} [y/N] ");
    std::io::stderr().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let answer = input.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
