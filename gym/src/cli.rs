use clap::{Args, Parser, Subcommand};

/// gym: command-line client for GymCoin.
#[derive(Parser, Debug)]
#[command(name = "gym", version)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// JSON-RPC endpoint; overrides GYM_RPC_URL
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Output as JSON instead of TSV
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the current buy and sell rates
    Rates,

    /// Show token and ETH balance (defaults to the signing account)
    Balance(AddressArgs),

    /// Price an amount at the current rates without submitting anything
    Quote(AmountArgs),

    /// Buy tokens with ETH
    Buy(AmountArgs),

    /// Sell tokens back for ETH
    Sell(AmountArgs),

    /// Transfer tokens to another address
    Transfer(TransferArgs),

    /// Register a username and email for the signing account
    Register(ProfileArgs),

    /// Change the registered username and email
    UpdateProfile(ProfileArgs),

    /// Show a user profile (defaults to the signing account)
    Profile(AddressArgs),

    /// Set raw contract rates (owner only)
    SetRates(SetRatesArgs),

    /// Poll a balance and print every change until interrupted
    Watch(WatchArgs),
}

#[derive(Args, Debug)]
pub struct AddressArgs {
    /// Account address (0x-prefixed)
    pub address: Option<String>,
}

#[derive(Args, Debug)]
pub struct AmountArgs {
    /// Token amount, decimal (e.g. 1000 or 2.5)
    pub amount: String,
}

#[derive(Args, Debug)]
pub struct TransferArgs {
    /// Recipient address
    pub to: String,

    /// Token amount, decimal
    pub amount: String,
}

#[derive(Args, Debug)]
pub struct ProfileArgs {
    pub username: String,
    pub email: String,
}

#[derive(Args, Debug)]
pub struct SetRatesArgs {
    /// Sell rate in contract units
    pub sell_rate: String,

    /// Buy rate in contract units
    pub buy_rate: String,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Account address (defaults to the signing account)
    pub address: Option<String>,

    /// Poll interval (ms), at least 1
    #[arg(long, default_value = "10000", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_interval_defaults() {
        let cli = Cli::try_parse_from(["gym", "watch"]).unwrap();
        match cli.command {
            Command::Watch(args) => assert_eq!(args.interval_ms, 10_000),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_watch_rejects_zero_interval() {
        let err = Cli::try_parse_from(["gym", "watch", "--interval-ms", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
