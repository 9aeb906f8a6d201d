//! Binary for the event bot service.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use eventbot::{init_tracing, load_config, run_bot, BotError, Cli, Commands};

fn exit_with(err: &BotError) -> ExitCode {
    eprintln!("Error: {}", err);
    ExitCode::from(err.exit_code())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => {
            let config = match load_config(token) {
                Ok(config) => config,
                Err(e) => return exit_with(&e),
            };
            if let Err(e) =
                init_tracing(config.log_file.as_deref()).context("failed to initialize logging")
            {
                eprintln!("Error: {:#}", e);
                return ExitCode::FAILURE;
            }
            match run_bot(config).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => exit_with(&e),
            }
        }
        Commands::CheckConfig { token } => match load_config(token) {
            Ok(config) => {
                println!("{:#?}", config);
                ExitCode::SUCCESS
            }
            Err(e) => exit_with(&e),
        },
    }
}
