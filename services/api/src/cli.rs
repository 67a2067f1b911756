use crate::demo::{run_demo, run_match_report, DemoArgs, MatchRunArgs};
use crate::server;
use care_match::error::AppError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Care Match Platform",
    about = "Run the therapist matching service and its demos from the command line",
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
    /// Score a roster against an ad-hoc engagement
    Match {
        #[command(subcommand)]
        command: MatchCommand,
    },
    /// Run an end-to-end demo covering matching, response, and approval
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum MatchCommand {
    /// Produce a ranked lead report from a roster CSV
    Run(MatchRunArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Optional roster CSV to hydrate the therapist directory at startup
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Match {
            command: MatchCommand::Run(args),
        } => run_match_report(args),
        Command::Demo(args) => run_demo(args),
    }
}
