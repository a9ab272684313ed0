use grass_claim_core::{
    rpc_utils::{RetryPolicy, RetryingRpcClient},
    sweep::{sweep_balance, SweepOutcome},
};
use log::*;
use solana_sdk::signer::Signer;

use crate::{
    metrics::emit_run_summary,
    utils::{process_wallets, Config, Wallet},
};

/// Forward the Grass balance of one wallet to the destination
pub async fn transfer_wallet(config: &Config, wallet: &Wallet) -> bool {
    let owner = wallet.keypair.pubkey();
    let rpc = RetryingRpcClient::from_url(
        config.rpc_url.clone(),
        config.rpc_timeout,
        RetryPolicy::default(),
    );

    match sweep_balance(&rpc, &wallet.keypair, &config.destination).await {
        Ok(SweepOutcome::Swept { amount, .. }) => {
            debug!("{owner} | Swept {amount} to {}", config.destination);
            true
        }
        Ok(SweepOutcome::Empty) => true,
        Err(e) => {
            error!("{owner} | Transfer failed ({}): {e}", e.kind());
            false
        }
    }
}

pub async fn transfer_all(config: &Config, wallets: &[Wallet]) -> anyhow::Result<()> {
    let results =
        process_wallets(wallets, config.threads, |wallet| transfer_wallet(config, wallet)).await;

    let succeeded = results.iter().filter(|done| **done).count();
    let failed = results.len() - succeeded;
    info!("Transferred from {succeeded} of {} wallets, {failed} failed", results.len());
    emit_run_summary("transfer", succeeded, failed, &config.region);

    Ok(())
}
