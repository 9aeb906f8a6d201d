//! CLI parser and config loading.

use clap::{Parser, Subcommand};
use eventbot_core::Result;

use crate::config::BotConfig;

#[derive(Parser)]
#[command(name = "eventbot")]
#[command(about = "Event-driven bot service", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot service (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Load and validate the config, then print it with the token redacted.
    CheckConfig {
        #[arg(short, long)]
        token: Option<String>,
    },
}

/// Load BotConfig from environment. If `token` is provided it overrides BOT_TOKEN.
pub fn load_config(token: Option<String>) -> Result<BotConfig> {
    BotConfig::load(token)
}
