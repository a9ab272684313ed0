use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use log::warn;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_program::{hash::Hash, pubkey::Pubkey};
use solana_sdk::{
    commitment_config::CommitmentConfig, signature::Signature, transaction::Transaction,
};

use crate::error::{ClaimError, Result};

pub const MAX_RPC_RETRIES: usize = 5;

/// Read access to raw account data
#[async_trait]
pub trait AccountFetcher: Send + Sync {
    /// Returns `None` when the account does not exist
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>>;

    async fn account_exists(&self, address: &Pubkey) -> Result<bool> {
        Ok(self.get_account_data(address).await?.is_some())
    }
}

/// Everything a claim attempt needs from the cluster
#[async_trait]
pub trait ClaimRpc: AccountFetcher {
    async fn get_latest_blockhash(&self) -> Result<Hash>;

    /// Broadcast and wait for confirmation. Never retried by the caller within one attempt.
    async fn send_and_confirm_transaction(&self, transaction: &Transaction) -> Result<Signature>;

    /// Raw token amount held by a token account
    async fn get_token_account_balance(&self, address: &Pubkey) -> Result<u64>;
}

/// Jittered exponential backoff applied at the transport boundary
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first call
    pub max_retries: usize,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RPC_RETRIES,
            min_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(3),
        }
    }
}

impl RetryPolicy {
    /// A policy that performs a single call
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_delays(mut self, min_delay: Duration, max_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self.max_delay = max_delay.max(min_delay);
        self
    }

    pub fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries)
            .with_jitter()
    }
}

/// [`ClaimRpc`] over a nonblocking [`RpcClient`]
///
/// Reads are retried according to the [`RetryPolicy`]. Broadcasting is not.
pub struct RetryingRpcClient {
    client: RpcClient,
    retry_policy: RetryPolicy,
}

impl RetryingRpcClient {
    pub fn new(client: RpcClient, retry_policy: RetryPolicy) -> Self {
        Self {
            client,
            retry_policy,
        }
    }

    /// Build a client that confirms transactions at `processed` commitment
    pub fn from_url(rpc_url: String, timeout: Duration, retry_policy: RetryPolicy) -> Self {
        let client = RpcClient::new_with_timeout_and_commitment(
            rpc_url,
            timeout,
            CommitmentConfig::processed(),
        );
        Self::new(client, retry_policy)
    }
}

#[async_trait]
impl AccountFetcher for RetryingRpcClient {
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        let response = (|| async {
            self.client
                .get_account_with_commitment(address, CommitmentConfig::finalized())
                .await
        })
        .retry(self.retry_policy.backoff())
        .notify(|e, delay| warn!("get_account {address} failed: {e}, retrying in {delay:?}"))
        .await?;

        Ok(response.value.map(|account| account.data))
    }
}

#[async_trait]
impl ClaimRpc for RetryingRpcClient {
    async fn get_latest_blockhash(&self) -> Result<Hash> {
        let (blockhash, _) = (|| async {
            self.client
                .get_latest_blockhash_with_commitment(CommitmentConfig::finalized())
                .await
        })
        .retry(self.retry_policy.backoff())
        .notify(|e, delay| warn!("get_latest_blockhash failed: {e}, retrying in {delay:?}"))
        .await?;

        Ok(blockhash)
    }

    async fn send_and_confirm_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        Ok(self.client.send_and_confirm_transaction(transaction).await?)
    }

    async fn get_token_account_balance(&self, address: &Pubkey) -> Result<u64> {
        let balance = (|| async {
            self.client
                .get_token_account_balance_with_commitment(address, CommitmentConfig::finalized())
                .await
        })
        .retry(self.retry_policy.backoff())
        .notify(|e, delay| {
            warn!("get_token_account_balance {address} failed: {e}, retrying in {delay:?}")
        })
        .await?
        .value;

        balance
            .amount
            .parse::<u64>()
            .map_err(|e| ClaimError::Transport(format!("invalid token amount for {address}: {e}")))
    }
}
