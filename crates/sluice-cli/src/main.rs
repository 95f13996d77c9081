#![forbid(unsafe_code)]

mod cmd;
mod context;
mod notify;
mod output;
mod validate;

use clap::{CommandFactory, Parser, Subcommand};
use context::{Reported, Workspace};
use output::{CliError, OutputMode};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser, Debug)]
#[command(
    name = "sluice",
    author,
    version,
    about = "sluice: water complaint intake and tracking",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Emit JSON output (shorthand for --format json).
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Output format. Defaults to pretty on a terminal and text otherwise.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Data directory holding complaints and config.toml (default: $SLUICE_HOME).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Intake",
        about = "Submit a new complaint",
        long_about = "Validate and register a new complaint. It starts as pending, and the \
                      submitter is sent a tracking link when a phone number is given.",
        after_help = "EXAMPLES:\n    # Report a leak by address\n    sluice submit --title \"Burst main\" --description \"Water pouring into the street\" \\\n        --category leak --severity critical --address \"14 Harbour Rd\" \\\n        --name \"Ana Silva\" --email ana@example.org --phone 5550100\n\n    # Report with GPS coordinates and emit JSON\n    sluice submit ... --lat -33.86 --lon 151.21 --json"
    )]
    Submit(cmd::submit::SubmitArgs),

    #[command(
        next_help_heading = "Read",
        about = "List complaints",
        long_about = "List stored complaints in submission order.",
        after_help = "EXAMPLES:\n    # Everything\n    sluice list\n\n    # Only complaints under review\n    sluice list --status under-review"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show a complaint and its progress timeline",
        after_help = "EXAMPLES:\n    # Using the reference handed to the submitter\n    sluice show c0ffee00\n\n    # Machine-readable\n    sluice show c0ffee00 --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Move complaints one step forward",
        long_about = "Move each complaint to the next status: pending, under review, in progress, resolved.",
        after_help = "EXAMPLES:\n    # Advance two complaints\n    sluice advance c0ffee00 5ca1ab1e"
    )]
    Advance(cmd::advance::AdvanceArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Set a complaint's status explicitly",
        long_about = "Set a complaint's status. Only the next status in the lifecycle is accepted.",
        after_help = "EXAMPLES:\n    # Start work on a reviewed complaint\n    sluice set-status c0ffee00 in-progress"
    )]
    SetStatus(cmd::set_status::SetStatusArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Auto-advance complaints on a timer until resolved",
        long_about = "Run the demonstration auto-advancer in the foreground. Delays come from \
                      the [advance] section of config.toml.",
        after_help = "EXAMPLES:\n    # Watch one complaint\n    sluice watch c0ffee00\n\n    # Watch everything still open, streaming JSON events\n    sluice watch --all --json"
    )]
    Watch(cmd::watch::WatchArgs),

    #[command(
        next_help_heading = "Admin",
        about = "Delete every stored complaint",
        after_help = "EXAMPLES:\n    sluice clear --yes"
    )]
    Clear(cmd::clear::ClearArgs),

    #[command(
        next_help_heading = "Admin",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    sluice completions bash > ~/.local/share/bash-completion/completions/sluice"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env("SLUICE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if quiet {
            "error"
        } else if verbose || env::var("DEBUG").is_ok() {
            "sluice=debug,info"
        } else {
            "sluice=info,warn"
        })
    });

    let format = env::var("SLUICE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

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

fn run(cli: &Cli, output: OutputMode) -> anyhow::Result<()> {
    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let ws = Workspace::open(cli.data_dir.as_deref(), output)?;
    match &cli.command {
        Commands::Submit(args) => cmd::submit::run_submit(args, &ws, output),
        Commands::List(args) => cmd::list::run_list(args, &ws, output),
        Commands::Show(args) => cmd::show::run_show(args, &ws, output),
        Commands::Advance(args) => cmd::advance::run_advance(args, &ws, output),
        Commands::SetStatus(args) => cmd::set_status::run_set_status(args, &ws, output),
        Commands::Watch(args) => cmd::watch::run_watch(args, &ws, output),
        Commands::Clear(args) => cmd::clear::run_clear(args, &ws, output),
        Commands::Completions(_) => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let output = cli.output_mode();
    debug!(?output, "output mode resolved");

    match run(&cli, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.downcast_ref::<Reported>().is_some() => ExitCode::FAILURE,
        Err(err) => {
            if let Err(render_err) = output::render_error(output, &CliError::new(format!("{err:#}"))) {
                eprintln!("error: {err:#} ({render_err})");
            }
            ExitCode::FAILURE
        }
    }
}
