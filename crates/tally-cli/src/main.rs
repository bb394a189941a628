#![forbid(unsafe_code)]

mod cmd;
mod output;

use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tally_core::config;
use tally_core::model::{EffectiveDate, date};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment fallback for `--as-of`.
const AS_OF_ENV: &str = "TALLY_AS_OF";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "tally: household ledger with inline edits and read-only ad-hoc queries",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Ledger database file (overrides TALLY_DB and the config file).
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Treat this date as today for edit permissions and new bookings.
    #[arg(long, global = true, value_name = "DATE", value_parser = cmd::parse_date_arg)]
    as_of: Option<NaiveDate>,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Alias for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// `--as-of`, else `TALLY_AS_OF`, else no override.
    fn effective_date(&self) -> anyhow::Result<EffectiveDate> {
        let as_of = match self.as_of {
            Some(pinned) => Some(pinned),
            None => env::var(AS_OF_ENV)
                .ok()
                .filter(|raw| !raw.trim().is_empty())
                .map(|raw| date::parse_lenient(&raw))
                .transpose()?,
        };
        let mut effective = EffectiveDate::unset();
        if let Some(pinned) = as_of {
            effective.set(pinned);
        }
        Ok(effective)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Create or upgrade the ledger database",
        after_help = "EXAMPLES:\n    # Create the default ledger\n    tally init\n\n    # Use a specific file\n    tally --db ./household.sqlite3 init"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show the ledger table",
        long_about = "Show bookings with inflow/outflow columns, filtered by note text and date range.",
        after_help = "EXAMPLES:\n    # Everything\n    tally list\n\n    # Rent in the first quarter, largest first\n    tally list --search rent --from 2024-01-01 --to 2024-03-31 --sort outflow --desc\n\n    # Emit machine-readable output\n    tally list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Write",
        about = "Add a booking",
        after_help = "EXAMPLES:\n    tally add --note \"January rent\" --amount 1200 --category Rent\n\n    # Book in the past\n    tally add -n Bread -a 2,50 -c \"Food (out)\" --date 2024-03-01"
    )]
    Add(cmd::add::AddArgs),

    #[command(
        next_help_heading = "Write",
        about = "Edit one cell of a booking",
        long_about = "Edit note, amount or date of a booking. Bookings dated before the effective date are locked.",
        after_help = "EXAMPLES:\n    tally edit 4 note \"Rent incl. parking\"\n    tally edit 4 outflow 1250\n    tally --as-of 2024-01-01 edit 4 date 2024-01-10"
    )]
    Edit(cmd::edit::EditArgs),

    #[command(
        next_help_heading = "Write",
        about = "Delete a booking",
        after_help = "EXAMPLES:\n    tally delete 4\n    tally delete 4 --force"
    )]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        next_help_heading = "Categories",
        about = "Manage categories",
        after_help = "EXAMPLES:\n    tally category add Rent --flow out\n    tally category show \"Rent (out)\"\n    tally category delete Rent --cascade"
    )]
    Category(cmd::category::CategoryArgs),

    #[command(
        next_help_heading = "Read",
        about = "Run a read-only ad-hoc query",
        after_help = "EXAMPLES:\n    tally query \"note like '%rent%'\"\n    tally query \"outflow > 100\"\n    tally query \"SELECT date, note FROM bookings ORDER BY date\""
    )]
    Query(cmd::query::QueryArgs),

    #[command(
        next_help_heading = "Read",
        about = "Export the ledger as a Markdown table",
        after_help = "EXAMPLES:\n    tally export --output ledger.md\n    tally export --from 2024-01-01 --to 2024-12-31 > 2024.md"
    )]
    Export(cmd::export::ExportArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completions"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env("TALLY_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "tally=debug,info"
        } else if quiet {
            "error"
        } else {
            "tally=info,warn"
        })
    });

    let format = env::var("TALLY_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    // stdout carries command output; logs go to stderr
    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli, output: OutputMode, user: &config::UserConfig) -> anyhow::Result<()> {
    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let ctx = cmd::Context {
        db_path: config::resolve_database_path(cli.db.clone(), user)?,
        effective: cli.effective_date()?,
        output,
    };
    debug!(db = %ctx.db_path.display(), effective = %ctx.effective.today(), "context resolved");

    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, &ctx),
        Commands::List(args) => cmd::list::run_list(args, &ctx),
        Commands::Add(args) => cmd::add::run_add(args, &ctx),
        Commands::Edit(args) => cmd::edit::run_edit(args, &ctx),
        Commands::Delete(args) => cmd::delete::run_delete(args, &ctx),
        Commands::Category(args) => cmd::category::run_category(args, &ctx),
        Commands::Query(args) => cmd::query::run_query(args, &ctx),
        Commands::Export(args) => cmd::export::run_export(args, &ctx),
        Commands::Completions(_) => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let (user, config_error) = match config::load_user_config() {
        Ok(user) => (user, None),
        Err(err) => (config::UserConfig::default(), Some(err)),
    };
    let mode = output::resolve_output_mode(cli.format, cli.json, user.output.as_deref());

    let result = config_error.map_or_else(|| run(&cli, mode, &user), Err);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let cli_error = CliError::from_anyhow(&err);
            if output::render_error(mode, &cli_error).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
