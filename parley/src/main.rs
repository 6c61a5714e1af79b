#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use args::Args;
use clap::Parser;
use parley_bot::{Bot, Disposition, IncomingMessage};
use parley_config::Config;
use parley_discord::ChannelId;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Initialize telemetry
    parley_telemetry::init(&config.log)?;

    tracing::info!(
        config_path = %args.config.display(),
        channel_id = %args.channel,
        "starting parley"
    );

    let bot = Bot::from_config(&config).await?;
    let channel = ChannelId::from(args.channel);

    bot.announce_online().await;
    bot.on_channel_create(channel.clone()).await;

    // Set up graceful shutdown
    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_clone.cancel();
    });

    relay_console(&bot, &channel, &shutdown).await?;

    tracing::info!("parley stopped");
    Ok(())
}

/// Feed stdin lines to the bot until EOF or shutdown
async fn relay_console(bot: &Bot, channel: &ChannelId, shutdown: &CancellationToken) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            () = shutdown.cancelled() => break,
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            tracing::info!("console input closed");
            break;
        };

        if line.trim().is_empty() {
            continue;
        }

        let message = IncomingMessage::from_user(channel.clone(), line);

        // A turn in progress finishes before shutdown is honoured
        if bot.on_message(&message).await == Disposition::Failed {
            tracing::warn!(channel_id = %channel, "message was not answered");
        }
    }

    Ok(())
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
