#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::{CliError, OutputMode, Reported, render_error, resolve_output_mode};
use std::env;
use std::process::ExitCode;
use tix_core::ErrorCode;
use tix_core::config;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "tix: support ticket tracker with an audit history",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides --json, FORMAT and user config).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags, environment and user config.
    fn output_mode(&self) -> OutputMode {
        let user_output = match config::load_user_config() {
            Ok(cfg) => cfg.output,
            Err(err) => {
                warn!(error = %format!("{err:#}"), "ignoring unreadable user config");
                None
            }
        };
        resolve_output_mode(self.format, self.json, user_output.as_deref())
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Lifecycle",
        about = "Initialize a tix project",
        long_about = "Initialize a tix project in the current directory.",
        after_help = "EXAMPLES:\n    # Initialize a project in the current directory\n    tix init\n\n    # Rewrite the default config\n    tix init --force"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Open a new ticket",
        long_about = "Open a new ticket in the pending state and record its creation.",
        after_help = "EXAMPLES:\n    # Open a ticket\n    tix create --title \"Printer jam\" --description \"Tray 2 jams\" \\\n      --contact-name Ana --contact-info ana@example.com\n\n    # Send a raw JSON payload\n    tix create --body '{\"title\":\"Printer jam\",\"description\":\"Tray 2\",\"contactName\":\"Ana\",\"contactInfo\":\"ana@example.com\"}'"
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        next_help_heading = "Read",
        about = "List tickets",
        long_about = "List tickets with an optional status filter and sort order.",
        after_help = "EXAMPLES:\n    # Newest tickets first\n    tix list\n\n    # Pending tickets, most recently updated first\n    tix list --status pending --sort latest\n\n    # Emit machine-readable output\n    tix list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one ticket",
        long_about = "Show full details and history for a single ticket by ID.",
        after_help = "EXAMPLES:\n    # Show a ticket\n    tix show tk-0123456789ab\n\n    # Emit machine-readable output\n    tix show tk-0123456789ab --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Update a ticket",
        long_about = "Change a ticket's status or information. Every effective change is appended to its history.",
        after_help = "EXAMPLES:\n    # Resolve a ticket\n    tix update tk-0123456789ab --status resolved\n\n    # Fix the contact details\n    tix update tk-0123456789ab --contact-info 555-0100"
    )]
    Update(cmd::update::UpdateArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TIX_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "tix=debug,info"
        } else {
            "tix=info,warn"
        })
    });

    let format = env::var("TIX_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

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
    let cwd = env::current_dir()?;

    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, output, &cwd),
        Commands::Create(args) => cmd::create::run_create(args, output, &cwd),
        Commands::List(args) => cmd::list::run_list(args, output, &cwd),
        Commands::Show(args) => cmd::show::run_show(args, output, &cwd),
        Commands::Update(args) => cmd::update::run_update(args, output, &cwd),
    }
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    match run(&cli, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is::<Reported>() => ExitCode::FAILURE,
        Err(err) => {
            error!(error = %format!("{err:#}"), "command failed");
            // Nothing sensible is left to do if stderr itself is gone.
            let _ = render_error(
                output,
                &CliError::from_code(ErrorCode::InternalUnexpected, format!("{err:#}")),
            );
            ExitCode::FAILURE
        }
    }
}
