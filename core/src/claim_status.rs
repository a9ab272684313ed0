use log::debug;
use solana_program::pubkey::Pubkey;

use crate::{codec::decode_claim_status, error::Result, rpc_utils::AccountFetcher};

/// Settlement state of a claimant under one distributor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimState {
    /// No claim status account yet, nothing was ever claimed
    NotCreated,

    /// Some allocation is still unsent
    PartiallyClaimed,

    /// `allocation == sent_allocation`, no transaction is needed
    FullyClaimed,
}

/// Fetch the claim status account once and classify it
///
/// A missing account is [`ClaimState::NotCreated`]. An account that cannot be decoded is an
/// error, its fields are never guessed.
pub async fn check_already_claimed<F: AccountFetcher + ?Sized>(
    fetcher: &F,
    claim_status_address: &Pubkey,
) -> Result<ClaimState> {
    let Some(data) = fetcher.get_account_data(claim_status_address).await? else {
        debug!("Claim status {claim_status_address} not created");
        return Ok(ClaimState::NotCreated);
    };

    let claim_status = decode_claim_status(&data)?;
    debug!(
        "Claim status {claim_status_address}: allocation {}, sent {}",
        claim_status.allocation, claim_status.sent_allocation
    );

    if claim_status.is_fully_claimed() {
        Ok(ClaimState::FullyClaimed)
    } else {
        Ok(ClaimState::PartiallyClaimed)
    }
}
