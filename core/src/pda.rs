//! Program derived addresses used by a claim
//!
//! Every address here is a pure function of its seeds and the owning program id. The bump is
//! searched from 255 downwards and the first off-curve candidate is returned, the same way the
//! on-chain program derives them.

use solana_program::pubkey::Pubkey;

use crate::{
    constants::{CLAIM_PROGRAM_ID, CLAIM_STATUS_SEED, DISTRIBUTOR_SEED, GRASS_MINT},
    error::{ClaimError, Result},
};

/// Derive a program address and its bump from `seeds`
///
/// Fails with [`ClaimError::Derivation`] when no bump produces an off-curve address. That is
/// not retryable: the same seeds will fail again.
pub fn derive_address(program_id: &Pubkey, seeds: &[&[u8]]) -> Result<(Pubkey, u8)> {
    Pubkey::try_find_program_address(seeds, program_id)
        .ok_or_else(|| ClaimError::Derivation(program_id.to_string()))
}

/// Merkle distributor for a given distributor version
pub fn derive_distributor(version_number: u32) -> Result<(Pubkey, u8)> {
    derive_address(
        &CLAIM_PROGRAM_ID,
        &[
            DISTRIBUTOR_SEED,
            &GRASS_MINT.to_bytes(),
            &version_number.to_le_bytes(),
        ],
    )
}

/// Claim status record of `owner` under `distributor`
pub fn derive_claim_status(owner: &Pubkey, distributor: &Pubkey) -> Result<(Pubkey, u8)> {
    derive_address(
        &CLAIM_PROGRAM_ID,
        &[CLAIM_STATUS_SEED, &owner.to_bytes(), &distributor.to_bytes()],
    )
}

pub fn derive_associated_token_account(owner: &Pubkey, mint: &Pubkey) -> Result<(Pubkey, u8)> {
    derive_address(
        &spl_associated_token_account::id(),
        &[
            &owner.to_bytes(),
            &spl_token::id().to_bytes(),
            &mint.to_bytes(),
        ],
    )
}

/// Associated token account holding Grass for `owner`
pub fn derive_grass_token_account(owner: &Pubkey) -> Result<Pubkey> {
    Ok(derive_associated_token_account(owner, &GRASS_MINT)?.0)
}
