pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "consulty",
    about = "Consulty operator CLI",
    long_about = "Operate the Consulty matching engine: migrations, catalog seeding, the \
                  accuracy regression suite, and a local chat loop.",
    after_help = "Examples:\n  consulty migrate\n  consulty seed\n  consulty validate --json\n  consulty chat"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo provider catalog into the database")]
    Seed,
    #[command(about = "Run the fixed accuracy suite against the deterministic pipeline")]
    Validate {
        #[arg(long, help = "Emit the full machine-readable report as JSON")]
        json: bool,
    },
    #[command(about = "Chat with the matching engine from the terminal")]
    Chat,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, database connectivity, and oracle readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Validate { json } => commands::validate::run(json),
        Command::Chat => commands::chat::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
