//! Forwarding a wallet's whole Grass balance to another wallet

use log::info;
use solana_program::pubkey::Pubkey;
use solana_sdk::{signature::Signature, signer::Signer, transaction::Transaction};

use crate::{
    constants::SOLSCAN_TX_URL,
    error::Result,
    pda::derive_grass_token_account,
    rpc_utils::ClaimRpc,
    transaction::{ensure_token_account, transfer_instruction},
};

#[derive(Debug, PartialEq, Eq)]
pub enum SweepOutcome {
    /// No token account or a zero balance, nothing was sent
    Empty,

    Swept { signature: Signature, amount: u64 },
}

/// Transfer the full Grass balance of `signer` to the token account of `destination`
///
/// The destination token account is created in the same transaction when missing.
pub async fn sweep_balance<R: ClaimRpc + ?Sized, S: Signer>(
    rpc: &R,
    signer: &S,
    destination: &Pubkey,
) -> Result<SweepOutcome> {
    let owner = signer.try_pubkey()?;
    let source = derive_grass_token_account(&owner)?;

    if !rpc.account_exists(&source).await? {
        info!("{owner} | No Grass token account, nothing to transfer");
        return Ok(SweepOutcome::Empty);
    }

    let amount = rpc.get_token_account_balance(&source).await?;
    if amount == 0 {
        info!("{owner} | Grass balance is zero, nothing to transfer");
        return Ok(SweepOutcome::Empty);
    }

    let (destination_token_account, create) =
        ensure_token_account(rpc, &owner, destination).await?;
    let mut instructions: Vec<_> = create.into_iter().collect();
    instructions.push(transfer_instruction(
        &source,
        &destination_token_account,
        &owner,
        amount,
    )?);

    let recent_blockhash = rpc.get_latest_blockhash().await?;
    let mut transaction = Transaction::new_with_payer(&instructions, Some(&owner));
    transaction.try_sign(&[signer], recent_blockhash)?;

    let signature = rpc.send_and_confirm_transaction(&transaction).await?;
    info!("{owner} | Transferred {amount} | {SOLSCAN_TX_URL}/{signature}");

    Ok(SweepOutcome::Swept { signature, amount })
}
