use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::GymConfig;
use crate::contracts::{IGymCoin, IUserProfile};
use crate::error::{GymError, Result};
use crate::ledger::Ledger;
use crate::rpc::RpcClient;
use crate::types::{TransactionRequest, TxReceipt, UserProfile};
use crate::units::ExchangeRate;

/// Connected client context for the GymCoin and UserProfile contracts.
///
/// Constructed once by the caller and passed to whatever needs the chain;
/// there is no process-wide provider or signer.
#[derive(Debug, Clone)]
pub struct GymClient {
    config: GymConfig,
    rpc: RpcClient,
    sender: Address,
}

impl GymClient {
    /// Validate `config`, check the endpoint's chain and resolve the sender.
    ///
    /// # Errors
    ///
    /// Returns [`GymError::UnsupportedNetwork`] if the endpoint is on another
    /// chain, and [`GymError::LedgerUnavailable`] if it exposes no account
    /// and none was configured.
    pub async fn connect(config: GymConfig) -> Result<Self> {
        config.validate()?;
        let rpc = RpcClient::new(&config.rpc_url);

        let actual = rpc.chain_id().await?;
        if actual != config.chain_id {
            return Err(GymError::UnsupportedNetwork {
                expected: config.chain_id,
                actual,
            });
        }

        let sender = match config.sender {
            Some(sender) => sender,
            None => rpc.accounts().await?.first().copied().ok_or_else(|| {
                GymError::LedgerUnavailable("endpoint exposes no accounts".into())
            })?,
        };

        info!(chain_id = actual, %sender, token = %config.token_address, "connected");

        Ok(Self {
            config,
            rpc,
            sender,
        })
    }

    pub fn config(&self) -> &GymConfig {
        &self.config
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    /// Read-only contract call.
    async fn view<C: SolCall + Send>(&self, to: Address, call: C) -> Result<C::Return> {
        let output = self.rpc.call(to, Bytes::from(call.abi_encode())).await?;
        Ok(C::abi_decode_returns(&output, true)?)
    }

    /// State-changing contract call, signed by the node or wallet.
    async fn send<C: SolCall + Send>(&self, to: Address, call: C, value: Option<U256>) -> Result<B256> {
        let tx = TransactionRequest {
            from: self.sender,
            to,
            data: Bytes::from(call.abi_encode()),
            value,
        };
        let hash = self.rpc.send_transaction(tx).await?;
        info!(%hash, function = C::SIGNATURE, "transaction submitted");
        Ok(hash)
    }
}

#[async_trait]
impl Ledger for GymClient {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn read_balance(&self, address: Address) -> Result<U256> {
        let ret = self
            .view(self.config.token_address, IGymCoin::balanceOfCall { account: address })
            .await?;
        debug!(%address, balance = %ret.balance, "token balance");
        Ok(ret.balance)
    }

    async fn read_eth_balance(&self, address: Address) -> Result<U256> {
        self.rpc.get_balance(address).await
    }

    async fn read_rates(&self) -> Result<ExchangeRate> {
        let token = self.config.token_address;
        let divisor = async {
            match self.config.rate_divisor {
                Some(d) => Ok(d),
                None => self.view(token, IGymCoin::divisorCall {}).await.map(|r| r.value),
            }
        };
        let (sell, buy, divisor) = tokio::try_join!(
            self.view(token, IGymCoin::sellRateCall {}),
            self.view(token, IGymCoin::buyRateCall {}),
            divisor,
        )?;
        ExchangeRate::new(sell.rate, buy.rate, divisor)
    }

    async fn read_profile(&self, address: Address) -> Result<UserProfile> {
        let call = IUserProfile::getUserCall { wallet: address };
        match self.view(self.config.profile_address, call).await {
            Ok(ret) => Ok(UserProfile {
                username: ret.username,
                email: ret.email,
                wallet: ret.account,
            }),
            // The registry reverts for unknown wallets.
            Err(GymError::LedgerRejected(reason)) => {
                debug!(%address, %reason, "no profile registered");
                Ok(UserProfile::unregistered(address))
            }
            Err(e) => Err(e),
        }
    }

    async fn submit_buy(&self, base_units: U256, wei_value: U256) -> Result<B256> {
        let call = IGymCoin::buyCall { amount: base_units };
        self.send(self.config.token_address, call, Some(wei_value)).await
    }

    async fn submit_sell(&self, base_units: U256) -> Result<B256> {
        let call = IGymCoin::sellCall { amount: base_units };
        self.send(self.config.token_address, call, None).await
    }

    async fn submit_transfer(&self, recipient: Address, base_units: U256) -> Result<B256> {
        let call = IGymCoin::transferCall {
            to: recipient,
            amount: base_units,
        };
        self.send(self.config.token_address, call, None).await
    }

    async fn submit_register(&self, username: &str, email: &str) -> Result<B256> {
        let call = IUserProfile::registerUserCall {
            username: username.to_string(),
            email: email.to_string(),
        };
        self.send(self.config.profile_address, call, None).await
    }

    async fn submit_update_profile(&self, username: &str, email: &str) -> Result<B256> {
        let call = IUserProfile::updateProfileCall {
            username: username.to_string(),
            email: email.to_string(),
        };
        self.send(self.config.profile_address, call, None).await
    }

    async fn submit_set_rates(&self, sell_rate_units: U256, buy_rate_units: U256) -> Result<B256> {
        let call = IGymCoin::setRatesCall {
            newSellRate: sell_rate_units,
            newBuyRate: buy_rate_units,
        };
        self.send(self.config.token_address, call, None).await
    }

    async fn wait_for_receipt(&self, hash: B256) -> Result<TxReceipt> {
        let poll = Duration::from_millis(self.config.confirmation_poll_ms);
        let deadline = Instant::now() + Duration::from_millis(self.config.confirmation_timeout_ms);

        loop {
            if let Some(receipt) = self.rpc.get_transaction_receipt(hash).await? {
                if !receipt.succeeded() {
                    warn!(%hash, "transaction reverted");
                    return Err(GymError::TransactionReverted(hash));
                }
                info!(%hash, block = ?receipt.block_number, "transaction confirmed");
                return Ok(receipt);
            }
            if Instant::now() >= deadline {
                return Err(GymError::LedgerUnavailable(format!(
                    "no receipt for {hash} after {}ms",
                    self.config.confirmation_timeout_ms
                )));
            }
            tokio::time::sleep(poll).await;
        }
    }
}
