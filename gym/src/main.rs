mod cli;
mod client;
mod commands;
mod error;
mod output;

use std::time::Duration;

use clap::Parser;
use cli::Command;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::CliError;

#[tokio::main]
async fn main() {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("failed to install rustls crypto provider");

    let cli = cli::Cli::parse();

    // Initialize tracing
    let filter = cli
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO);

    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cancel = setup_signal_handlers();

    if let Err(e) = run(cli, cancel).await {
        let recoverable = matches!(&e, CliError::Gym(g) if g.is_recoverable());
        tracing::error!(error = %e, recoverable, "command failed");
        std::process::exit(1);
    }
}

async fn run(cli: cli::Cli, cancel: CancellationToken) -> Result<(), CliError> {
    let wallet = client::create_wallet(cli.rpc_url).await?;
    let json = cli.json;

    match cli.command {
        Command::Rates => commands::rates(&wallet, json).await,
        Command::Balance(args) => commands::balance(&wallet, args.address.as_deref(), json).await,
        Command::Quote(args) => commands::quote(&wallet, &args.amount, json).await,
        Command::Buy(args) => commands::buy(&wallet, &args.amount, json).await,
        Command::Sell(args) => commands::sell(&wallet, &args.amount, json).await,
        Command::Transfer(args) => commands::transfer(&wallet, &args.to, &args.amount, json).await,
        Command::Register(args) => {
            commands::register(&wallet, &args.username, &args.email, json).await
        }
        Command::UpdateProfile(args) => {
            commands::update_profile(&wallet, &args.username, &args.email, json).await
        }
        Command::Profile(args) => commands::profile(&wallet, args.address.as_deref(), json).await,
        Command::SetRates(args) => {
            commands::set_rates(&wallet, &args.sell_rate, &args.buy_rate, json).await
        }
        Command::Watch(args) => {
            info!(interval_ms = args.interval_ms, "watch starting");
            let interval = Duration::from_millis(args.interval_ms);
            commands::watch(&wallet, args.address.as_deref(), interval, json, cancel).await
        }
    }
}

/// Register SIGINT and SIGTERM handlers that trigger the returned token.
fn setup_signal_handlers() -> CancellationToken {
    let cancel = CancellationToken::new();

    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("received SIGINT, shutting down");
        cancel_clone.cancel();
    });

    #[cfg(unix)]
    {
        let cancel_clone = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                    info!("received SIGTERM, shutting down");
                    cancel_clone.cancel();
                }
                Err(e) => tracing::warn!(error = %e, "failed to register SIGTERM handler"),
            }
        });
    }

    cancel
}
