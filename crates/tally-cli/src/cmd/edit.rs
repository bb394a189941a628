//! `tally edit`: change one cell of one booking.

use super::Context;
use crate::output::render;
use anyhow::Result;
use clap::Args;
use std::io::Write;
use tally_core::db::query::BookingFilter;
use tally_core::ledger::DisplayColumn;

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Booking id.
    pub id: i64,

    /// Column to change: note, inflow, outflow or date.
    pub column: DisplayColumn,

    /// New value as typed. Dates must be YYYY-MM-DD.
    pub value: String,
}

pub fn run_edit(args: &EditArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.session(BookingFilter::default())?;
    let outcome = session.edit(args.id, args.column, &args.value)?;

    render(ctx.output, &outcome, |o, w| {
        writeln!(w, "✓ booking {} {} = {}", o.row_id, o.column, o.value)
    })
}
