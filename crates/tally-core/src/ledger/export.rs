//! Markdown table export of a projection.

use super::projection::{DisplayColumn, LedgerRow};

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Render rows as a Markdown table: header row, `|---|` separator, one line per row.
#[must_use]
pub fn markdown_table(rows: &[LedgerRow]) -> String {
    let mut out = String::new();

    out.push('|');
    for column in DisplayColumn::ALL {
        out.push_str(column.header());
        out.push('|');
    }
    out.push('\n');

    out.push('|');
    for _ in DisplayColumn::ALL {
        out.push_str("---|");
    }
    out.push('\n');

    for row in rows {
        out.push('|');
        for column in DisplayColumn::ALL {
            out.push_str(&escape_cell(&row.cell(column)));
            out.push('|');
        }
        out.push('\n');
    }
    out
}
