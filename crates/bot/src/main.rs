use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use cb_bot::bootstrap;
use cb_bot::channel::telegram::TelegramGateway;
use cb_bot::cli::{Cli, Command, ConfigCommand, SessionsCommand};
use cb_bot::dispatcher::Dispatcher;
use cb_domain::config::{Config, LogFormat, LoggingConfig};

/// Capacity of the gateway → dispatcher channel.
const INBOUND_BUFFER: usize = 256;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Default to serve when no subcommand is given.
        None | Some(Command::Serve) => {
            let (config, config_path) = cb_bot::cli::load_config()?;
            init_tracing(&config.logging);
            tracing::info!(config = %config_path, "configuration loaded");
            run_serve(config).await
        }
        Some(Command::Chat { actor }) => {
            init_cli_tracing();
            let (config, _) = cb_bot::cli::load_config()?;
            cb_bot::cli::chat::chat(&config, actor).await
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            let (config, config_path) = cb_bot::cli::load_config()?;
            if !cb_bot::cli::config::validate(&config, &config_path) {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            let (config, _) = cb_bot::cli::load_config()?;
            cb_bot::cli::config::show(&config)
        }
        Some(Command::Sessions(SessionsCommand::List { json })) => {
            init_cli_tracing();
            let (config, _) = cb_bot::cli::load_config()?;
            cb_bot::cli::sessions::list(&config.storage, json)
        }
        Some(Command::Version) => {
            println!("conversationbot {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Structured logging for the long-running bot.
fn init_tracing(cfg: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    match cfg.format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init(),
    }
}

/// Quiet stderr logging for interactive commands.
fn init_cli_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Run the Telegram bot until SIGINT/SIGTERM.
async fn run_serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("conversationbot starting");

    bootstrap::check_config(&config)?;
    let token = bootstrap::read_token(&config.telegram)?;
    let (store, snapshot_path) = bootstrap::open_store(&config.storage);

    let gateway = Arc::new(
        TelegramGateway::new(&config.telegram, &token).context("building telegram client")?,
    );
    let bot_name = gateway
        .get_me()
        .await
        .context("telegram token check failed")?;
    tracing::info!(bot = %bot_name, "telegram bot authenticated");

    let dispatcher = Dispatcher::new(
        store,
        gateway.clone(),
        snapshot_path,
        config.dispatch.max_in_flight,
    );

    let shutdown = CancellationToken::new();
    let (tx, rx) = mpsc::channel(INBOUND_BUFFER);
    let poller = tokio::spawn(gateway.poll(tx, shutdown.clone()));

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            shutdown.cancel();
        });
    }

    // Returns once the poller drops its sender.
    dispatcher.run(rx).await;

    if let Err(e) = poller.await {
        tracing::error!(error = %e, "telegram poller panicked");
    }
    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => tracing::info!("received SIGINT, shutting down"),
                    _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable, waiting for SIGINT");
                let _ = ctrl_c.await;
                tracing::info!("received SIGINT, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        tracing::info!("received SIGINT, shutting down");
    }
}
