use crate::commands::{
    run_evaluate, run_reference_show, run_reference_validate, EvaluateArgs, ReferenceShowArgs,
    ReferenceValidateArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use growth_velocity::config::AppConfig;
use growth_velocity::error::AppError;
use growth_velocity::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "Growth Velocity",
    about = "Classify child weight and length gain against the WHO 2006 velocity standards",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Evaluate one increment between two measurements
    Evaluate(EvaluateArgs),
    /// Inspect or validate WHO reference tables
    Reference {
        #[command(subcommand)]
        command: ReferenceCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ReferenceCommand {
    /// Print the percentile rows of one table
    Show(ReferenceShowArgs),
    /// Load a table directory and report missing or malformed tables
    Validate(ReferenceValidateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Evaluate(args) => offline(|config| run_evaluate(args, config)),
        Command::Reference {
            command: ReferenceCommand::Show(args),
        } => offline(|config| run_reference_show(args, config)),
        Command::Reference {
            command: ReferenceCommand::Validate(args),
        } => offline(|config| run_reference_validate(args, config)),
    }
}

/// Runs a one-shot command with configuration loaded and diagnostics routed to stderr.
fn offline<F>(command: F) -> Result<(), AppError>
where
    F: FnOnce(&AppConfig) -> Result<(), AppError>,
{
    let config = AppConfig::load()?;
    telemetry::init_stderr(&config.telemetry)?;
    command(&config)
}
