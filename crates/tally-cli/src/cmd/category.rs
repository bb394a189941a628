//! `tally category`: list, create, change, inspect and delete categories.

use super::{Context, confirm};
use crate::output::{pretty_kv, pretty_section, pretty_table, render, render_mode, text_table};
use anyhow::Result;
use clap::{Args, Subcommand};
use std::io::Write;
use tally_core::db::categories::{self, CascadePolicy, CategoryDetails};
use tally_core::model::FlowDirection;

#[derive(Args, Debug)]
pub struct CategoryArgs {
    #[command(subcommand)]
    pub command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    /// List categories with their booking counts.
    List,

    /// Create a category.
    Add {
        /// Category name, without direction suffix.
        name: String,

        /// Direction of its bookings: inflow or outflow.
        #[arg(long)]
        flow: FlowDirection,

        /// Free-form description.
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Change name, description or direction of a category.
    Update {
        /// Category label, e.g. `Rent` or `Rent (out)`.
        label: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        flow: Option<FlowDirection>,
    },

    /// Show one category.
    Show {
        /// Category label, e.g. `Rent` or `Rent (out)`.
        label: String,
    },

    /// Delete a category.
    Delete {
        /// Category label, e.g. `Rent` or `Rent (out)`.
        label: String,

        /// Also delete every booking in the category.
        #[arg(long)]
        cascade: bool,

        /// Skip interactive confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

const HEADERS: [&str; 5] = ["ID", "NAME", "FLOW", "BOOKINGS", "DESCRIPTION"];

fn cells(details: &CategoryDetails) -> Vec<String> {
    vec![
        details.category.id.to_string(),
        details.category.name.clone(),
        details.category.flow.to_string(),
        details.booking_count.to_string(),
        details.category.description.clone(),
    ]
}

fn write_details(w: &mut dyn Write, details: &CategoryDetails) -> std::io::Result<()> {
    pretty_section(w, &details.category.label())?;
    pretty_kv(w, "id", details.category.id.to_string())?;
    pretty_kv(w, "name", &details.category.name)?;
    pretty_kv(w, "flow", details.category.flow.as_str())?;
    pretty_kv(w, "bookings", details.booking_count.to_string())?;
    pretty_kv(w, "description", &details.category.description)
}

pub fn run_category(args: &CategoryArgs, ctx: &Context) -> Result<()> {
    let conn = ctx.connect()?;

    match &args.command {
        CategoryCommand::List => {
            let mut all = Vec::new();
            for category in categories::list_categories(&conn)? {
                let booking_count = categories::count_bookings(&conn, category.id)?;
                all.push(CategoryDetails {
                    category,
                    booking_count,
                });
            }
            let rows: Vec<Vec<String>> = all.iter().map(cells).collect();
            render_mode(
                ctx.output,
                &all,
                |_, w| text_table(w, &HEADERS, &rows),
                |list, w| {
                    if list.is_empty() {
                        return writeln!(w, "No categories yet. Create one with `tally category add`.");
                    }
                    pretty_table(w, &HEADERS, &rows)
                },
            )
        }
        CategoryCommand::Add {
            name,
            flow,
            description,
        } => {
            let id = categories::insert_category(&conn, name, description, *flow)?;
            let details = CategoryDetails {
                category: categories::get_category(&conn, id)?,
                booking_count: 0,
            };
            render(ctx.output, &details, |d, w| {
                writeln!(w, "✓ category {} added ({})", d.category.label(), d.category.id)
            })
        }
        CategoryCommand::Update {
            label,
            name,
            description,
            flow,
        } => {
            let current = categories::resolve_label(&conn, label)?;
            categories::update_category(
                &conn,
                current.id,
                name.as_deref().unwrap_or(&current.name),
                description.as_deref().unwrap_or(&current.description),
                flow.unwrap_or(current.flow),
            )?;
            let details = CategoryDetails {
                booking_count: categories::count_bookings(&conn, current.id)?,
                category: categories::get_category(&conn, current.id)?,
            };
            render(ctx.output, &details, |d, w| {
                writeln!(w, "✓ category {} updated", d.category.label())
            })
        }
        CategoryCommand::Show { label } => {
            let details = categories::details(&conn, label)?;
            render_mode(
                ctx.output,
                &details,
                |d, w| text_table(w, &HEADERS, &[cells(d)]),
                |d, w| write_details(w, d),
            )
        }
        CategoryCommand::Delete {
            label,
            cascade,
            force,
        } => {
            let details = categories::details(&conn, label)?;
            let policy = if *cascade {
                CascadePolicy::Cascade
            } else {
                CascadePolicy::Refuse
            };

            if policy == CascadePolicy::Cascade
                && details.booking_count > 0
                && !force
                && !confirm(&format!(
                    "Delete category '{}' and its {} booking(s)?",
                    details.category.label(),
                    details.booking_count
                ))?
            {
                anyhow::bail!(
                    "deletion of category '{}' cancelled",
                    details.category.label()
                );
            }

            let removal = categories::delete_category(&conn, details.category.id, policy)?;
            render(ctx.output, &removal, |r, w| {
                writeln!(
                    w,
                    "✓ category {} deleted ({} booking(s) removed)",
                    details.category.label(),
                    r.bookings_removed
                )
            })
        }
    }
}
