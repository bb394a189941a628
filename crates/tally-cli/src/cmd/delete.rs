//! `tally delete`: remove one booking.

use super::{Context, confirm};
use crate::output::render;
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::io::Write;
use tally_core::LedgerError;
use tally_core::db::query::{self, BookingFilter};

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Booking id.
    pub id: i64,

    /// Skip interactive confirmation prompt.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct DeleteReport {
    id: i64,
    deleted: bool,
}

pub fn run_delete(args: &DeleteArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.session(BookingFilter::default())?;
    let booking = query::get_booking(session.connection(), args.id)?
        .ok_or_else(|| LedgerError::not_found("booking", args.id))?;

    if !args.force
        && !confirm(&format!(
            "Delete booking {} '{}' ({})?",
            args.id,
            booking.booking.note,
            booking.booking.date.format("%Y-%m-%d")
        ))?
    {
        anyhow::bail!("deletion of booking {} cancelled", args.id);
    }

    session.delete_booking(args.id)?;

    render(
        ctx.output,
        &DeleteReport {
            id: args.id,
            deleted: true,
        },
        |r, w| writeln!(w, "✓ booking {} deleted", r.id),
    )
}
