pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "shopfront",
    about = "Shopfront assistant operator CLI",
    long_about = "Run one-shot messages through the intent workflow and inspect effective configuration.",
    after_help = "Examples:\n  shopfront chat \"Show me floral shirts\"\n  shopfront chat --dummy \"What's the status of order 5904242344019?\"\n  shopfront doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run one message through the intent workflow and print the result")]
    Chat {
        #[arg(help = "The shopper message to process")]
        message: String,
        #[arg(
            long,
            help = "Serve deterministic mock commerce responses via in-process tools"
        )]
        dummy: bool,
    },
    #[command(about = "Diagnose effective configuration and degraded modes")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Chat { message, dummy } => commands::chat::run(&message, dummy).await,
        Command::Doctor { json } => commands::doctor::run(json),
    };

    match result {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
