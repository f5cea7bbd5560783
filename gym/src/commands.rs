//! One function per subcommand. Results go to stdout, logs to stderr.

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::{Address, U256};
use gymcoin::address::{is_placeholder, parse_address};
use gymcoin::{Ledger, PollingScheduler, TokenWallet, TransactionKind, TxOutcome};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::CliError;
use crate::output;

/// Resolve an optional address argument, defaulting to the signing account.
fn target(wallet: &TokenWallet, address: Option<&str>) -> Result<Address, CliError> {
    match address {
        Some(a) => Ok(parse_address(a.trim())?),
        None => Ok(wallet.sender()),
    }
}

fn parse_rate(name: &str, value: &str) -> Result<U256, CliError> {
    value
        .trim()
        .parse::<U256>()
        .map_err(|e| CliError::Argument(format!("{name} {value:?}: {e}")))
}

pub async fn rates(wallet: &TokenWallet, json: bool) -> Result<(), CliError> {
    let rates = wallet.rates().await?;
    output::write_rates(&mut io::stdout().lock(), json, &rates)
}

pub async fn balance(wallet: &TokenWallet, address: Option<&str>, json: bool) -> Result<(), CliError> {
    if let Some(input) = address.filter(|a| is_placeholder(a)) {
        return output::write_no_address(&mut io::stdout().lock(), json, input);
    }
    let address = target(wallet, address)?;
    let (snapshot, eth) = tokio::try_join!(
        wallet.cache().refresh_address(address),
        wallet.ledger().read_eth_balance(address),
    )?;
    output::write_balance(&mut io::stdout().lock(), json, &snapshot, eth)
}

pub async fn quote(wallet: &TokenWallet, amount: &str, json: bool) -> Result<(), CliError> {
    let quote = wallet.quote(amount).await?;
    output::write_quote(&mut io::stdout().lock(), json, &quote)
}

fn report(kind: TransactionKind, outcome: &TxOutcome, json: bool) -> Result<(), CliError> {
    output::write_outcome(&mut io::stdout().lock(), json, kind, outcome)
}

pub async fn buy(wallet: &TokenWallet, amount: &str, json: bool) -> Result<(), CliError> {
    let outcome = wallet.buy(amount).await?;
    report(TransactionKind::Buy, &outcome, json)
}

pub async fn sell(wallet: &TokenWallet, amount: &str, json: bool) -> Result<(), CliError> {
    let outcome = wallet.sell(amount).await?;
    report(TransactionKind::Sell, &outcome, json)
}

pub async fn transfer(wallet: &TokenWallet, to: &str, amount: &str, json: bool) -> Result<(), CliError> {
    let outcome = wallet.transfer(to, amount).await?;
    report(TransactionKind::Transfer, &outcome, json)
}

pub async fn register(wallet: &TokenWallet, username: &str, email: &str, json: bool) -> Result<(), CliError> {
    let outcome = wallet.register(username, email).await?;
    report(TransactionKind::Register, &outcome, json)
}

pub async fn update_profile(
    wallet: &TokenWallet,
    username: &str,
    email: &str,
    json: bool,
) -> Result<(), CliError> {
    let outcome = wallet.update_profile(username, email).await?;
    report(TransactionKind::UpdateProfile, &outcome, json)
}

pub async fn profile(wallet: &TokenWallet, address: Option<&str>, json: bool) -> Result<(), CliError> {
    let address = target(wallet, address)?;
    let profile = wallet.profile(address).await?;
    if profile.needs_registration() && address == wallet.sender() {
        info!("not registered; run `gym register <username> <email>`");
    }
    output::write_profile(&mut io::stdout().lock(), json, &profile)
}

pub async fn set_rates(wallet: &TokenWallet, sell: &str, buy: &str, json: bool) -> Result<(), CliError> {
    let sell = parse_rate("sell_rate", sell)?;
    let buy = parse_rate("buy_rate", buy)?;
    let outcome = wallet.set_rates(sell, buy).await?;
    report(TransactionKind::SetRates, &outcome, json)
}

/// Poll `address` until `cancel` fires, printing each change.
pub async fn watch(
    wallet: &TokenWallet,
    address: Option<&str>,
    interval: Duration,
    json: bool,
    cancel: CancellationToken,
) -> Result<(), CliError> {
    if let Some(input) = address.filter(|a| is_placeholder(a)) {
        return output::write_no_address(&mut io::stdout().lock(), json, input);
    }
    let address = target(wallet, address)?;
    let cache = Arc::clone(wallet.cache());

    let listener = cache.on_change(address, move |snapshot| {
        info!(
            address = %snapshot.address,
            tokens = %snapshot.token_amount(),
            "balance changed"
        );
    });

    let scheduler = PollingScheduler::new(Arc::clone(&cache));
    let last_printed = Mutex::new(None::<U256>);
    let handle = scheduler.start(address, interval, move |snapshot| {
        let mut last = last_printed.lock().unwrap_or_else(|p| p.into_inner());
        if *last == Some(snapshot.amount) {
            return;
        }
        *last = Some(snapshot.amount);
        if let Err(e) = output::write_snapshot(&mut io::stdout().lock(), json, &snapshot) {
            warn!(error = %e, "failed to write snapshot");
        }
    });

    cancel.cancelled().await;

    scheduler.cancel(&handle);
    cache.remove_listener(listener);
    info!(%address, "watch stopped");
    Ok(())
}
