//! `tally init`: create or upgrade the ledger database.

use super::Context;
use crate::output::{pretty_kv, render_mode};
use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use tally_core::db::{categories, migrations};

#[derive(Args, Debug)]
pub struct InitArgs {}

#[derive(Debug, Serialize)]
struct InitReport {
    database: String,
    schema_version: u32,
    categories: usize,
}

/// Execute `tally init`. Opening the ledger creates the file and applies
/// pending migrations, so running it twice is harmless.
pub fn run_init(_args: &InitArgs, ctx: &Context) -> Result<()> {
    let conn = ctx.connect()?;
    let schema_version =
        migrations::current_schema_version(&conn).context("read schema version")?;
    let report = InitReport {
        database: ctx.db_path.display().to_string(),
        schema_version,
        categories: categories::list_categories(&conn)?.len(),
    };

    render_mode(
        ctx.output,
        &report,
        |r, w| writeln!(w, "{}\t{}", r.database, r.schema_version),
        |r, w| {
            writeln!(w, "✓ ledger ready")?;
            pretty_kv(w, "database", &r.database)?;
            pretty_kv(w, "schema", r.schema_version.to_string())?;
            pretty_kv(w, "categories", r.categories.to_string())
        },
    )
}
