//! `tally add`: record a new booking.

use super::{Context, parse_date_arg};
use crate::output::{pretty_kv, render_mode};
use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use std::io::Write;
use tally_core::LedgerError;
use tally_core::db::query::BookingFilter;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// What the booking is for.
    #[arg(short, long)]
    pub note: String,

    /// Non-negative amount; `,` is accepted as decimal separator.
    #[arg(short, long)]
    pub amount: String,

    /// Category label, e.g. `Rent` or `Rent (out)`.
    #[arg(short, long)]
    pub category: String,

    /// Booking date. Defaults to the effective date.
    #[arg(long, value_parser = parse_date_arg)]
    pub date: Option<NaiveDate>,
}

pub fn run_add(args: &AddArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.session(BookingFilter::default())?;
    let id = session.add_booking(&args.note, &args.amount, &args.category, args.date)?;
    let row = session
        .rows()
        .iter()
        .find(|row| row.id == id)
        .cloned()
        .ok_or_else(|| LedgerError::not_found("booking", id))?;

    render_mode(
        ctx.output,
        &row,
        |r, w| writeln!(w, "{}", r.id),
        |r, w| {
            writeln!(w, "✓ booking {} added", r.id)?;
            pretty_kv(w, "date", r.date.format("%Y-%m-%d").to_string())?;
            pretty_kv(w, "note", &r.note)?;
            pretty_kv(w, r.flow().as_str(), r.amount().to_string())?;
            pretty_kv(w, "category", &r.category)
        },
    )
}
