//! `tally export`: write the filtered ledger as a Markdown table.

use super::Context;
use super::list::FilterArgs;
use crate::output::render;
use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Write to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ExportReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    markdown: Option<String>,
}

pub fn run_export(args: &ExportArgs, ctx: &Context) -> Result<()> {
    let session = ctx.session(args.filter.to_filter())?;
    let markdown = session.export_markdown();
    let rows = session.rows().len();

    let report = if let Some(path) = &args.output {
        std::fs::write(path, &markdown)
            .with_context(|| format!("write export to {}", path.display()))?;
        tracing::info!(path = %path.display(), rows, "ledger exported");
        ExportReport {
            path: Some(path.display().to_string()),
            rows,
            markdown: None,
        }
    } else {
        ExportReport {
            path: None,
            rows,
            markdown: Some(markdown),
        }
    };

    render(ctx.output, &report, |r, w| match (&r.path, &r.markdown) {
        (Some(path), _) => writeln!(w, "✓ {} booking(s) exported to {path}", r.rows),
        (None, Some(markdown)) => write!(w, "{markdown}"),
        (None, None) => Ok(()),
    })
}
