//! `tally list`: the ledger table under the current filters.

use super::{Context, parse_date_arg};
use crate::output::{pretty_kv, pretty_rule, pretty_table, render_mode, text_table};
use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;
use std::io::Write;
use tally_core::db::query::BookingFilter;
use tally_core::ledger::{DisplayColumn, LedgerRow, SortDirection, Totals};

/// Filters shared by `list` and `export`.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Case-insensitive substring of the note.
    #[arg(short, long)]
    pub search: Option<String>,

    /// Earliest date, inclusive (YYYY-MM-DD, D.M.YYYY or DD-MM-YYYY).
    #[arg(long, value_parser = parse_date_arg)]
    pub from: Option<NaiveDate>,

    /// Latest date, inclusive.
    #[arg(long, value_parser = parse_date_arg)]
    pub to: Option<NaiveDate>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> BookingFilter {
        BookingFilter {
            text: self.search.clone(),
            from: self.from,
            to: self.to,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Re-sort the view by a column: id, note, inflow, outflow, date, category.
    #[arg(long)]
    pub sort: Option<DisplayColumn>,

    /// Sort descending.
    #[arg(long, requires = "sort")]
    pub desc: bool,
}

#[derive(Debug, Serialize)]
struct ListReport<'a> {
    effective_date: NaiveDate,
    rows: &'a [LedgerRow],
    totals: Totals,
}

pub fn table_cells(row: &LedgerRow) -> Vec<String> {
    DisplayColumn::ALL.iter().map(|c| row.cell(*c)).collect()
}

pub fn headers() -> Vec<&'static str> {
    DisplayColumn::ALL.iter().map(|c| c.header()).collect()
}

pub fn run_list(args: &ListArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.session(args.filter.to_filter())?;
    if let Some(column) = args.sort {
        let direction = if args.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        session.sort(column, direction);
    }

    let report = ListReport {
        effective_date: session.effective_date().today(),
        rows: session.rows(),
        totals: session.totals()?,
    };

    render_mode(
        ctx.output,
        &report,
        |r, w| {
            let cells: Vec<Vec<String>> = r.rows.iter().map(table_cells).collect();
            text_table(w, &headers(), &cells)
        },
        |r, w| {
            if r.rows.is_empty() {
                return writeln!(w, "No bookings found.");
            }
            // rows dated before the effective date are locked
            let cells: Vec<Vec<String>> = r
                .rows
                .iter()
                .map(|row| {
                    let mut cells = table_cells(row);
                    if row.date < r.effective_date {
                        cells[0] = format!("{}*", cells[0]);
                    }
                    cells
                })
                .collect();
            pretty_table(w, &headers(), &cells)?;
            pretty_rule(w)?;
            pretty_kv(w, "inflow", format!("{:.2}", r.totals.inflow))?;
            pretty_kv(w, "outflow", format!("{:.2}", r.totals.outflow))?;
            pretty_kv(w, "balance", format!("{:.2}", r.totals.balance))?;
            pretty_kv(w, "as of", r.effective_date.format("%Y-%m-%d").to_string())?;
            writeln!(w, "* locked: dated before the effective date")
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: ListArgs,
    }

    #[test]
    fn list_args_defaults() {
        let w = Wrapper::parse_from(["test"]);
        assert!(w.args.filter.search.is_none());
        assert!(w.args.filter.from.is_none());
        assert!(w.args.sort.is_none());
        assert!(!w.args.desc);
        assert!(w.args.filter.to_filter().is_empty());
    }

    #[test]
    fn list_args_parse_filters_and_sort() {
        let w = Wrapper::parse_from([
            "test", "--search", "rent", "--from", "1.1.2024", "--to", "2024-01-31", "--sort",
            "outflow", "--desc",
        ]);
        let filter = w.args.filter.to_filter();
        assert_eq!(filter.text.as_deref(), Some("rent"));
        assert_eq!(filter.from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(filter.to, NaiveDate::from_ymd_opt(2024, 1, 31));
        assert_eq!(w.args.sort, Some(DisplayColumn::Outflow));
        assert!(w.args.desc);
    }

    #[test]
    fn desc_requires_sort() {
        assert!(Wrapper::try_parse_from(["test", "--desc"]).is_err());
    }

    #[test]
    fn bad_sort_column_is_rejected() {
        assert!(Wrapper::try_parse_from(["test", "--sort", "betrag"]).is_err());
    }
}
