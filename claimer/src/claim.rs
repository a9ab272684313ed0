use grass_api_client::{client::GrassApiClient, config::Config as ApiConfig};
use grass_claim_core::{
    rpc_utils::{RetryPolicy, RetryingRpcClient},
    try_claim, AttemptResult, ClaimContext, ProofFetcher,
};
use log::*;
use solana_sdk::signer::Signer;

use crate::{
    metrics::{emit_claim_result, emit_run_summary},
    utils::{append_line, process_wallets, Config, Wallet},
};

pub const SUCCESS_FILE: &str = "success.txt";
pub const FAILED_FILE: &str = "failed.txt";

/// Fetch the receipt of a wallet and claim it, up to `max_attempts` times
///
/// Stops early on errors another attempt cannot fix.
pub async fn claim_wallet(config: &Config, wallet: &Wallet) -> bool {
    let claimant = wallet.keypair.pubkey();

    let api = match GrassApiClient::new(ApiConfig::custom(&config.api_url)) {
        Ok(api) => api,
        Err(e) => {
            error!("{claimant} | Failed to build API client: {e}");
            return false;
        }
    };
    let receipt = match api.fetch_claim_receipt(&claimant).await {
        Ok(receipt) => receipt,
        Err(e) => {
            error!("{claimant} | Failed to fetch claim receipt: {e}");
            emit_claim_result(&claimant, "no_receipt", 0, &config.region);
            return false;
        }
    };

    let rpc = RetryingRpcClient::from_url(
        config.rpc_url.clone(),
        config.rpc_timeout,
        RetryPolicy::default(),
    );
    let ctx = ClaimContext::new(&rpc, &wallet.keypair, config.destination)
        .with_tip(config.tip_owner, config.tip_fraction);

    for attempt in 1..=config.max_attempts {
        match try_claim(&ctx, &receipt).await {
            AttemptResult::Claimed { already_claimed } => {
                let result = if already_claimed {
                    "already_claimed"
                } else {
                    info!("{claimant} | Successfully claimed");
                    "confirmed"
                };
                emit_claim_result(&claimant, result, attempt, &config.region);
                return true;
            }
            AttemptResult::Retry => {
                debug!("{claimant} | Attempt {attempt}/{} failed", config.max_attempts);
            }
            AttemptResult::Abort { kind } => {
                emit_claim_result(&claimant, kind, attempt, &config.region);
                return false;
            }
        }
    }

    emit_claim_result(&claimant, "attempts_exhausted", config.max_attempts, &config.region);
    false
}

/// Claim every wallet and record each under success.txt or failed.txt
pub async fn claim_all(config: &Config, wallets: &[Wallet]) -> anyhow::Result<()> {
    let results = process_wallets(wallets, config.threads, |wallet| async move {
        let claimed = claim_wallet(config, wallet).await;
        let file_name = if claimed { SUCCESS_FILE } else { FAILED_FILE };
        if let Err(e) = append_line(&config.output_dir, file_name, &wallet.line).await {
            error!("{} | Failed to record result: {e:?}", wallet.keypair.pubkey());
        }
        claimed
    })
    .await;

    let succeeded = results.iter().filter(|claimed| **claimed).count();
    let failed = results.len() - succeeded;
    info!("Claimed {succeeded} of {} wallets, {failed} failed", results.len());
    emit_run_summary("claim", succeeded, failed, &config.region);

    Ok(())
}
