use async_trait::async_trait;
use solana_program::pubkey::Pubkey;

use crate::error::Result;

/// Allocation and merkle proof of a wallet, as published by the claim website
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimReceipt {
    /// Distributor version the proof belongs to
    pub version_number: u32,

    /// Total allocation in raw token units
    pub allocation: u64,

    /// Merkle proof nodes, leaf to root
    pub claim_proof: Vec<[u8; 32]>,
}

/// Off-chain source of claim receipts
#[async_trait]
pub trait ProofFetcher: Send + Sync {
    async fn fetch_claim_receipt(&self, wallet: &Pubkey) -> Result<ClaimReceipt>;
}
