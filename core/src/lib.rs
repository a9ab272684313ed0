pub use solana_program::pubkey::Pubkey;

pub use crate::{
    claimer::{
        attempt_claim, run_claim, try_claim, AttemptResult, ClaimContext, ClaimOutcome, ClaimStage,
    },
    error::{ClaimError, Result},
    receipt::{ClaimReceipt, ProofFetcher},
    transaction::TipFraction,
};

pub mod claim_status;
pub mod claimer;
pub mod codec;
pub mod constants;
pub mod error;
pub mod pda;
pub mod receipt;
pub mod rpc_utils;
pub mod sweep;
pub mod transaction;

#[cfg(test)]
mod test_utils;
