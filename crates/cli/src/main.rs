//! promptgauge CLI, the main entry point.
//!
//! Commands:
//! - `assess`       Assess a prompt and project its running cost
//! - `check`        Run the connection preflight for the configured backend
//! - `pricing`      Show the pricing catalog
//! - `providers`    List backend modes and their defaults
//! - `init`         Write a default config file
//! - `completions`  Generate shell completions

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

#[derive(Parser)]
#[command(
    name = "promptgauge",
    about = "promptgauge: assess prompt quality with an LLM and project what it costs to run",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log output format (logs go to stderr)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Human)]
    log_format: LogFormat,

    /// Config file to use instead of ~/.promptgauge/config.toml
    #[arg(long, global = true, env = "PROMPTGAUGE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess a prompt
    Assess(commands::assess::AssessArgs),

    /// Check that the configured backend is reachable
    Check {
        #[command(flatten)]
        backend: commands::BackendArgs,
    },

    /// Show the pricing catalog used for cost projections
    Pricing {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List backend modes and their defaults
    Providers,

    /// Write a default config file
    Init,

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(promptgauge_config::AppConfig::config_path);

    let outcome = match cli.command {
        Commands::Assess(args) => commands::assess::run(&config_path, args).await,
        Commands::Check { backend } => commands::check::run(&config_path, backend).await,
        Commands::Pricing { json } => commands::pricing::run(&config_path, json),
        Commands::Providers => commands::providers::run(),
        Commands::Init => commands::init::run(&config_path),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "promptgauge", &mut std::io::stdout());
            Ok(())
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// `PROMPTGAUGE_LOG` wins over `RUST_LOG`; `--verbose` sets the fallback.
fn init_tracing(verbose: bool, format: LogFormat) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("PROMPTGAUGE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(fallback));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Human => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
