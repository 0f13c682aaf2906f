use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use subaudit::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Track subscriptions interactively (default)
    Session,
    /// Detect subscriptions in statement files and report the waste
    Scan {
        /// Statement text files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Show or set the monthly budget
    Budget {
        /// New monthly budget
        value: Option<f64>,
    },
}

impl From<Commands> for subaudit::AppCommand {
    fn from(cmd: Commands) -> subaudit::AppCommand {
        match cmd {
            Commands::Session => subaudit::AppCommand::Session,
            Commands::Scan { files } => subaudit::AppCommand::Scan { files },
            Commands::Budget { value } => subaudit::AppCommand::Budget { value },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => subaudit::cli::setup::setup(),
        Some(cmd) => subaudit::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            subaudit::run_command(subaudit::AppCommand::Session, cli.config_path.as_deref()).await
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
