use anyhow::Result;
use cconverter::core::log::init_logging;
use cconverter::core::money::ValidationError;
use clap::{CommandFactory, Parser, Subcommand};
use std::process::ExitCode;

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

impl From<Commands> for cconverter::AppCommand {
    fn from(cmd: Commands) -> cconverter::AppCommand {
        match cmd {
            Commands::Convert {
                amount,
                source,
                target,
            } => cconverter::AppCommand::Convert {
                amount,
                source,
                target,
            },
            Commands::Currencies => cconverter::AppCommand::Currencies,
            Commands::Stats { top } => cconverter::AppCommand::Stats { top },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount between two currencies
    Convert {
        /// Amount in the source currency
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Source currency code, e.g. EUR
        source: String,
        /// Target currency code, e.g. CZK
        target: String,
    },
    /// List currencies supported by the rate provider
    Currencies,
    /// Display the most frequent conversions
    Stats {
        /// Only show the N most frequent pairs
        #[arg(short, long)]
        top: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result: Result<()> = match cli.command {
        Some(Commands::Setup) => cconverter::cli::setup::setup(),
        Some(cmd) => cconverter::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => Cli::command().print_help().map_err(Into::into),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(invalid) = e.downcast_ref::<ValidationError>() {
                tracing::warn!(error = %invalid, "Invalid conversion request");
                ExitCode::from(2)
            } else {
                tracing::error!(error = ?e, "Application failed");
                ExitCode::FAILURE
            }
        }
    }
}
