//! predictoor-bot — command-line entry point
//!
//! Loads `.env`, initialises logging, loads and validates the config, then
//! either prints a dry-run report or runs the minimal execution path against
//! the selected backend. Errors are printed here and mapped to exit codes.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use predictoor_bot::backend::BackendKind;
use predictoor_bot::config::{self, APP_NAME};
use predictoor_bot::runner::{self, DryRunReport, RunError, RunOutcome};

/// Exit code for configuration and private-key problems.
const EXIT_CONFIG: u8 = 2;
/// Exit code when the selected backend is not installed.
const EXIT_BACKEND_UNAVAILABLE: u8 = 3;

const EXAMPLE_CONFIG: &str = "Example:\n  [bot]\n  enabled = true\n";

/// Prediction-market bot.
#[derive(Parser, Debug)]
#[command(name = APP_NAME)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the bot.
    Run {
        /// Validate config and print planned actions.
        #[arg(long)]
        dry_run: bool,

        /// Print the dry-run report as JSON.
        #[arg(long, requires = "dry_run")]
        json: bool,

        /// Path to config file.
        #[arg(long, default_value_os_t = predictoor_bot::config::default_config_path())]
        config: PathBuf,

        /// Backend to run against (mock or pdr).
        #[arg(long, default_value_t = BackendKind::Mock)]
        backend: BackendKind,
    },
}

fn main() -> Result<ExitCode> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Some(Command::Run {
            dry_run,
            json,
            config,
            backend,
        }) => cmd_run(&config, backend, dry_run, json),
        None => {
            println!("{APP_NAME}: ok");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn cmd_run(path: &Path, backend: BackendKind, dry_run: bool, json: bool) -> Result<ExitCode> {
    let cfg = match config::load_config(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("[ERROR] {e}");
            eprintln!("Create it at: {}", config::default_config_path().display());
            eprintln!("{EXAMPLE_CONFIG}");
            return Ok(ExitCode::from(EXIT_CONFIG));
        }
    };

    if dry_run {
        let report = DryRunReport::new(path, &cfg, backend);
        if json {
            let out = serde_json::to_string_pretty(&report)
                .context("Failed to serialise dry-run report")?;
            println!("{out}");
        } else {
            println!("{report}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    info!(%backend, "Starting run");
    match runner::run(&cfg, |rpc| backend.connect(rpc)) {
        Ok(RunOutcome::Disabled) => {
            println!("[INFO] bot is disabled in config. Exiting.");
            Ok(ExitCode::SUCCESS)
        }
        Ok(RunOutcome::Completed(states)) => {
            for state in &states {
                println!("[INFO] {state}");
            }
            println!("[INFO] Run mode: config + wallet + {backend} backend OK.");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!(error = %e, "Run failed");
            eprintln!("[ERROR] {e}");
            Ok(ExitCode::from(exit_code(&e)))
        }
    }
}

fn exit_code(err: &RunError) -> u8 {
    match err {
        RunError::Config(_) => EXIT_CONFIG,
        RunError::Backend(e) if e.is_not_available() => EXIT_BACKEND_UNAVAILABLE,
        RunError::Backend(_) => 1,
    }
}

/// Initialise the `tracing` subscriber. Logs go to stderr so reports on
/// stdout stay machine-readable.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("predictoor_bot=info"));

    let json_logging = std::env::var("PREDICTOOR_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
