use std::path::PathBuf;

use clap::Parser;

/// Parley relay bot
#[derive(Debug, Parser)]
#[command(name = "parley", about = "Relay OpenAI chat completions into Discord channels")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "parley.toml", env = "PARLEY_CONFIG")]
    pub config: PathBuf,

    /// Channel that receives each stdin line as a user message
    #[arg(long, env = "PARLEY_CHANNEL")]
    pub channel: String,
}
