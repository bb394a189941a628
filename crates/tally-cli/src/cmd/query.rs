//! `tally query`: run a read-only ad-hoc query.

use super::Context;
use crate::output::{pretty_table, render_mode, text_table};
use anyhow::Result;
use clap::Args;
use std::io::Write;
use tally_core::ledger::sandbox::{self, AdhocOutcome, ResultGrid};

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// A SELECT statement, or a bare condition over bookings such as
    /// "note like '%rent%'". `inflow`/`outflow` name the amount column.
    pub text: String,
}

fn grid_cells(grid: &ResultGrid) -> Vec<Vec<String>> {
    grid.rows
        .iter()
        .map(|row| row.iter().map(sandbox::GridValue::display).collect())
        .collect()
}

pub fn run_query(args: &QueryArgs, ctx: &Context) -> Result<()> {
    let conn = ctx.connect()?;
    let grid = match sandbox::run(&conn, &args.text)? {
        AdhocOutcome::NoOp => ResultGrid::default(),
        AdhocOutcome::Grid(grid) => grid,
    };

    render_mode(
        ctx.output,
        &grid,
        |g, w| {
            let headers: Vec<&str> = g.columns.iter().map(String::as_str).collect();
            text_table(w, &headers, &grid_cells(g))
        },
        |g, w| {
            if g.columns.is_empty() {
                return writeln!(w, "Nothing to run.");
            }
            let headers: Vec<&str> = g.columns.iter().map(String::as_str).collect();
            pretty_table(w, &headers, &grid_cells(g))?;
            writeln!(w, "({} row(s))", g.rows.len())
        },
    )
}
