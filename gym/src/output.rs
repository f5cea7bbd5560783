//! TSV / JSON rendering of command results, one record per line.

use std::io::Write;

use alloy_primitives::U256;
use gymcoin::address::shorten_address;
use gymcoin::units::format_ether;
use gymcoin::{
    BalanceSnapshot, ExchangeRate, Quote, TokenAmount, TransactionKind, TxOutcome, UserProfile,
};
use serde_json::{json, Value};

use crate::error::CliError;

fn emit<W: Write>(writer: &mut W, json_mode: bool, value: Value, tsv: &[String]) -> Result<(), CliError> {
    if json_mode {
        serde_json::to_writer(&mut *writer, &value).map_err(std::io::Error::from)?;
        writer.write_all(b"\n")?;
    } else {
        writeln!(writer, "{}", tsv.join("\t"))?;
    }
    writer.flush()?;
    Ok(())
}

/// ETH price of one whole token.
fn per_token(rates: &ExchangeRate) -> Result<(String, String), CliError> {
    let one = TokenAmount::parse("1")?;
    Ok((
        format_ether(rates.buy_cost(&one)?),
        format_ether(rates.sell_proceeds(&one)?),
    ))
}

/// buy_eth_per_token \t sell_eth_per_token \t buy_rate \t sell_rate \t divisor
pub fn write_rates<W: Write>(writer: &mut W, json_mode: bool, rates: &ExchangeRate) -> Result<(), CliError> {
    let (buy, sell) = per_token(rates)?;
    let value = json!({
        "buyEthPerToken": buy,
        "sellEthPerToken": sell,
        "buyRate": rates.buy_rate_units.to_string(),
        "sellRate": rates.sell_rate_units.to_string(),
        "divisor": rates.divisor.to_string(),
    });
    let tsv = [
        buy,
        sell,
        rates.buy_rate_units.to_string(),
        rates.sell_rate_units.to_string(),
        rates.divisor.to_string(),
    ];
    emit(writer, json_mode, value, &tsv)
}

/// address \t tokens \t eth
pub fn write_balance<W: Write>(
    writer: &mut W,
    json_mode: bool,
    snapshot: &BalanceSnapshot,
    eth_wei: U256,
) -> Result<(), CliError> {
    let tokens = snapshot.token_amount().to_string();
    let eth = format_ether(eth_wei);
    let value = json!({
        "address": snapshot.address.to_checksum(None),
        "tokens": tokens,
        "eth": eth,
    });
    let tsv = [snapshot.address.to_checksum(None), tokens, eth];
    emit(writer, json_mode, value, &tsv)
}

/// amount \t buy_cost_eth \t sell_proceeds_eth
pub fn write_quote<W: Write>(writer: &mut W, json_mode: bool, quote: &Quote) -> Result<(), CliError> {
    let amount = quote.amount.to_string();
    let cost = format_ether(quote.buy_cost);
    let proceeds = format_ether(quote.sell_proceeds);
    let value = json!({
        "amount": amount,
        "buyCostEth": cost,
        "sellProceedsEth": proceeds,
        "buyCostWei": quote.buy_cost.to_string(),
        "sellProceedsWei": quote.sell_proceeds.to_string(),
    });
    emit(writer, json_mode, value, &[amount, cost, proceeds])
}

/// kind \t hash \t block
pub fn write_outcome<W: Write>(
    writer: &mut W,
    json_mode: bool,
    kind: TransactionKind,
    outcome: &TxOutcome,
) -> Result<(), CliError> {
    let kind = serde_json::to_value(kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    let block = outcome
        .receipt
        .block_number
        .map(|b| b.to_string())
        .unwrap_or_default();
    let value = json!({
        "kind": kind,
        "hash": outcome.hash.to_string(),
        "block": block,
        "status": "completed",
    });
    let tsv = [kind, outcome.hash.to_string(), block];
    emit(writer, json_mode, value, &tsv)
}

/// wallet \t username \t email (empty fields when unregistered)
pub fn write_profile<W: Write>(writer: &mut W, json_mode: bool, profile: &UserProfile) -> Result<(), CliError> {
    let value = json!({
        "wallet": profile.wallet.to_checksum(None),
        "username": profile.username,
        "email": profile.email,
        "registered": profile.is_registered(),
    });
    let tsv = [
        profile.wallet.to_checksum(None),
        profile.username.clone(),
        profile.email.clone(),
    ];
    emit(writer, json_mode, value, &tsv)
}

/// observed_at_utc \t short_address \t tokens \t seq
pub fn write_snapshot<W: Write>(writer: &mut W, json_mode: bool, snapshot: &BalanceSnapshot) -> Result<(), CliError> {
    let tokens = snapshot.token_amount().to_string();
    let when = snapshot.observed_at_utc.to_rfc3339();
    let value = json!({
        "address": snapshot.address.to_checksum(None),
        "tokens": tokens,
        "observedAt": snapshot.observed_at,
        "observedAtUtc": when,
    });
    let tsv = [
        when,
        shorten_address(&snapshot.address),
        tokens,
        snapshot.observed_at.to_string(),
    ];
    emit(writer, json_mode, value, &tsv)
}

/// Printed when a placeholder address was given instead of a real one.
pub fn write_no_address<W: Write>(writer: &mut W, json_mode: bool, input: &str) -> Result<(), CliError> {
    let value = json!({ "address": input, "tokens": Value::Null });
    emit(writer, json_mode, value, &[input.to_string(), "-".into()])
}
