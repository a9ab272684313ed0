//! One claim attempt for one wallet
//!
//! An attempt moves through `Init -> StatusChecked -> Built -> Signed -> Submitted` and ends
//! `Confirmed` or `Failed`. A claim status showing the allocation fully sent ends the attempt
//! right after the status check without building anything.

use std::fmt;

use log::{debug, error, info, warn};
use solana_program::pubkey::Pubkey;
use solana_sdk::{signature::Signature, signer::Signer, transaction::Transaction};

use crate::{
    claim_status::{check_already_claimed, ClaimState},
    constants::{DEFAULT_TIP_OWNER, SOLSCAN_TX_URL},
    error::{ClaimError, Result},
    pda::{derive_claim_status, derive_distributor},
    receipt::ClaimReceipt,
    rpc_utils::ClaimRpc,
    transaction::{build_claim_instructions, ClaimTransactionInput, TipFraction},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimStage {
    Init,
    StatusChecked,
    Built,
    Signed,
    Submitted,
    Confirmed,
    Failed,
}

impl ClaimStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStage::Init => "init",
            ClaimStage::StatusChecked => "status_checked",
            ClaimStage::Built => "built",
            ClaimStage::Signed => "signed",
            ClaimStage::Submitted => "submitted",
            ClaimStage::Confirmed => "confirmed",
            ClaimStage::Failed => "failed",
        }
    }
}

impl fmt::Display for ClaimStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal result of an attempt that got past the build-time checks
#[derive(Debug)]
pub enum ClaimOutcome {
    /// Claim transaction landed
    Confirmed { signature: Signature },

    /// Nothing left to claim, no transaction was built
    AlreadyClaimed,

    /// The transport failed after the transaction was built
    Failed { stage: ClaimStage, error: ClaimError },
}

impl ClaimOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ClaimOutcome::Confirmed { .. } | ClaimOutcome::AlreadyClaimed)
    }
}

/// Everything one attempt needs, owned by the caller for the duration of the attempt
pub struct ClaimContext<'a, R: ?Sized, S> {
    /// Cluster access for this attempt
    pub rpc: &'a R,

    /// Claimant keypair, fee payer and only signer
    pub signer: &'a S,

    /// Wallet receiving the claimed tokens
    pub destination: Pubkey,

    /// Wallet receiving the tip
    pub tip_owner: Pubkey,

    pub tip_fraction: TipFraction,
}

impl<'a, R: ClaimRpc + ?Sized, S: Signer> ClaimContext<'a, R, S> {
    /// Context sending the whole allocation to `destination`
    pub fn new(rpc: &'a R, signer: &'a S, destination: Pubkey) -> Self {
        Self {
            rpc,
            signer,
            destination,
            tip_owner: DEFAULT_TIP_OWNER,
            tip_fraction: TipFraction::ZERO,
        }
    }

    pub fn with_tip(mut self, tip_owner: Pubkey, tip_fraction: TipFraction) -> Self {
        self.tip_owner = tip_owner;
        self.tip_fraction = tip_fraction;
        self
    }
}

fn enter_stage(claimant: &Pubkey, stage: ClaimStage) -> ClaimStage {
    debug!("{claimant} | claim stage {stage}");
    stage
}

/// Run one claim attempt
///
/// Derivation, encoding, malformed account and signing errors abort the attempt and are
/// returned as `Err`. Transport failures once the transaction is built come back as
/// [`ClaimOutcome::Failed`]. Nothing is retried here.
pub async fn run_claim<R: ClaimRpc + ?Sized, S: Signer>(
    ctx: &ClaimContext<'_, R, S>,
    receipt: &ClaimReceipt,
) -> Result<ClaimOutcome> {
    let claimant = ctx.signer.try_pubkey()?;
    enter_stage(&claimant, ClaimStage::Init);
    info!("Start claiming: {claimant}");

    let (distributor, _) = derive_distributor(receipt.version_number)?;
    let (claim_status, _) = derive_claim_status(&claimant, &distributor)?;

    let state = check_already_claimed(ctx.rpc, &claim_status).await?;
    enter_stage(&claimant, ClaimStage::StatusChecked);
    match state {
        ClaimState::FullyClaimed => {
            info!("{claimant} | Already claimed");
            return Ok(ClaimOutcome::AlreadyClaimed);
        }
        ClaimState::PartiallyClaimed => {
            warn!("{claimant} | Claim status {claim_status} partially settled, claiming again");
        }
        ClaimState::NotCreated => {}
    }

    let input = ClaimTransactionInput {
        claimant,
        destination: ctx.destination,
        tip_owner: ctx.tip_owner,
        distributor,
        claim_status,
        allocation: receipt.allocation,
        proof: receipt.claim_proof.clone(),
        tip_fraction: ctx.tip_fraction,
    };
    let instructions = build_claim_instructions(ctx.rpc, &input).await?;
    let stage = enter_stage(&claimant, ClaimStage::Built);

    let recent_blockhash = match ctx.rpc.get_latest_blockhash().await {
        Ok(blockhash) => blockhash,
        Err(error) => return Ok(ClaimOutcome::Failed { stage, error }),
    };

    let mut transaction = Transaction::new_with_payer(&instructions, Some(&claimant));
    transaction.try_sign(&[ctx.signer], recent_blockhash)?;
    enter_stage(&claimant, ClaimStage::Signed);

    let stage = enter_stage(&claimant, ClaimStage::Submitted);
    match ctx.rpc.send_and_confirm_transaction(&transaction).await {
        Ok(signature) => {
            enter_stage(&claimant, ClaimStage::Confirmed);
            info!("{claimant} | {SOLSCAN_TX_URL}/{signature}");
            Ok(ClaimOutcome::Confirmed { signature })
        }
        Err(error) => {
            enter_stage(&claimant, ClaimStage::Failed);
            Ok(ClaimOutcome::Failed { stage, error })
        }
    }
}

/// What the caller should do after one attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttemptResult {
    /// The claim landed, or an earlier one already settled the allocation
    Claimed { already_claimed: bool },

    /// Failed in a way another attempt may get past
    Retry,

    /// Failed in a way no further attempt can fix, carries the error kind
    Abort { kind: &'static str },
}

impl AttemptResult {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptResult::Claimed { .. })
    }
}

/// Run one claim attempt and classify the result
///
/// [`ClaimOutcome::Failed`] and recoverable errors ask for a retry, any other error aborts.
/// Failures are logged with their error kind.
pub async fn try_claim<R: ClaimRpc + ?Sized, S: Signer>(
    ctx: &ClaimContext<'_, R, S>,
    receipt: &ClaimReceipt,
) -> AttemptResult {
    let claimant = ctx.signer.try_pubkey().unwrap_or_default();

    match run_claim(ctx, receipt).await {
        Ok(ClaimOutcome::Confirmed { .. }) => AttemptResult::Claimed {
            already_claimed: false,
        },
        Ok(ClaimOutcome::AlreadyClaimed) => AttemptResult::Claimed {
            already_claimed: true,
        },
        Ok(ClaimOutcome::Failed { stage, error }) => {
            warn!(
                "{claimant} | Error in claim after stage {stage} ({}): {error} | Continue..",
                error.kind()
            );
            AttemptResult::Retry
        }
        Err(e) if e.is_recoverable() => {
            warn!("{claimant} | Error in claim ({}): {e} | Continue..", e.kind());
            AttemptResult::Retry
        }
        Err(e) => {
            error!("{claimant} | Claim aborted ({}): {e}", e.kind());
            AttemptResult::Abort { kind: e.kind() }
        }
    }
}

/// Run one claim attempt and collapse the result to success or failure
///
/// Already claimed counts as success.
pub async fn attempt_claim<R: ClaimRpc + ?Sized, S: Signer>(
    ctx: &ClaimContext<'_, R, S>,
    receipt: &ClaimReceipt,
) -> bool {
    try_claim(ctx, receipt).await.is_success()
}

#[cfg(test)]
mod tests {
    use solana_sdk::{signature::Keypair, signer::SignerError};

    use super::*;
    use crate::{constants::CLAIM_PROGRAM_ID, test_utils::InMemoryAccounts};

    fn receipt() -> ClaimReceipt {
        ClaimReceipt {
            version_number: 1,
            allocation: 1_000_000,
            claim_proof: vec![[9u8; 32]; 3],
        }
    }

    fn claim_status_data(allocation: u64, sent_allocation: u64) -> Vec<u8> {
        let mut data = vec![0u8; 8];
        data.extend_from_slice(&[1u8; 32]);
        data.extend_from_slice(&allocation.to_le_bytes());
        data.extend_from_slice(&sent_allocation.to_le_bytes());
        data.extend_from_slice(&0i64.to_le_bytes());
        data
    }

    fn claim_status_of(keypair: &Keypair) -> Pubkey {
        let (distributor, _) = derive_distributor(receipt().version_number).unwrap();
        derive_claim_status(&keypair.pubkey(), &distributor).unwrap().0
    }

    #[tokio::test]
    async fn test_fully_claimed_short_circuits() {
        let keypair = Keypair::new();
        let rpc = InMemoryAccounts::default()
            .with_account(claim_status_of(&keypair), claim_status_data(42, 42));
        let ctx = ClaimContext::new(&rpc, &keypair, Pubkey::new_unique());

        let outcome = run_claim(&ctx, &receipt()).await.unwrap();

        assert!(matches!(outcome, ClaimOutcome::AlreadyClaimed));
        assert_eq!(rpc.fetch_count(), 1);
        assert_eq!(rpc.blockhash_requests(), 0);
        assert!(rpc.sent().is_empty());
    }

    #[tokio::test]
    async fn test_confirmed_claim_is_signed_by_claimant() {
        let keypair = Keypair::new();
        let rpc = InMemoryAccounts::default();
        let ctx = ClaimContext::new(&rpc, &keypair, Pubkey::new_unique())
            .with_tip(Pubkey::new_unique(), "0.05".parse::<TipFraction>().unwrap());

        let outcome = run_claim(&ctx, &receipt()).await.unwrap();

        let ClaimOutcome::Confirmed { signature } = outcome else {
            panic!("expected a confirmed claim, got {outcome:?}");
        };
        let sent = rpc.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].signatures, vec![signature]);
        assert_eq!(sent[0].message.account_keys[0], keypair.pubkey());
        assert!(sent[0].verify().is_ok());
        assert_eq!(sent[0].message.instructions.len(), 6);
    }

    #[tokio::test]
    async fn test_partially_claimed_builds_new_claim() {
        let keypair = Keypair::new();
        let rpc = InMemoryAccounts::default()
            .with_account(claim_status_of(&keypair), claim_status_data(1_000, 10));
        let ctx = ClaimContext::new(&rpc, &keypair, Pubkey::new_unique());

        assert_eq!(
            try_claim(&ctx, &receipt()).await,
            AttemptResult::Claimed {
                already_claimed: false
            }
        );

        let sent = rpc.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0]
            .message
            .account_keys
            .iter()
            .any(|key| *key == CLAIM_PROGRAM_ID));
    }

    #[tokio::test]
    async fn test_send_failure_is_failed_outcome() {
        let keypair = Keypair::new();
        let rpc = InMemoryAccounts::default().failing_send();
        let ctx = ClaimContext::new(&rpc, &keypair, Pubkey::new_unique());

        let outcome = run_claim(&ctx, &receipt()).await.unwrap();

        assert!(matches!(
            outcome,
            ClaimOutcome::Failed {
                stage: ClaimStage::Submitted,
                error: ClaimError::Transport(_),
            }
        ));
        assert_eq!(try_claim(&ctx, &receipt()).await, AttemptResult::Retry);
    }

    #[tokio::test]
    async fn test_malformed_claim_status_aborts() {
        let keypair = Keypair::new();
        let rpc =
            InMemoryAccounts::default().with_account(claim_status_of(&keypair), vec![0u8; 12]);
        let ctx = ClaimContext::new(&rpc, &keypair, Pubkey::new_unique());

        let result = run_claim(&ctx, &receipt()).await;

        assert!(matches!(result, Err(ClaimError::MalformedAccount(_))));
        assert_eq!(rpc.blockhash_requests(), 0);
        assert_eq!(
            try_claim(&ctx, &receipt()).await,
            AttemptResult::Abort {
                kind: "malformed_account"
            }
        );
    }

    struct RejectingSigner(Pubkey);

    impl Signer for RejectingSigner {
        fn try_pubkey(&self) -> std::result::Result<Pubkey, SignerError> {
            Ok(self.0)
        }

        fn try_sign_message(&self, _message: &[u8]) -> std::result::Result<Signature, SignerError> {
            Err(SignerError::Custom("device locked".to_string()))
        }

        fn is_interactive(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn test_signing_failure_aborts() {
        let signer = RejectingSigner(Pubkey::new_unique());
        let rpc = InMemoryAccounts::default();
        let ctx = ClaimContext::new(&rpc, &signer, Pubkey::new_unique());

        let result = run_claim(&ctx, &receipt()).await;

        assert!(matches!(result, Err(ClaimError::Signing(_))));
        assert!(rpc.sent().is_empty());
        assert_eq!(
            try_claim(&ctx, &receipt()).await,
            AttemptResult::Abort { kind: "signing" }
        );
    }

    #[tokio::test]
    async fn test_fully_claimed_attempt_succeeds() {
        let keypair = Keypair::new();
        let rpc = InMemoryAccounts::default()
            .with_account(claim_status_of(&keypair), claim_status_data(42, 42));
        let ctx = ClaimContext::new(&rpc, &keypair, Pubkey::new_unique());

        let result = try_claim(&ctx, &receipt()).await;

        assert!(attempt_claim(&ctx, &receipt()).await);
        assert_eq!(
            result,
            AttemptResult::Claimed {
                already_claimed: true
            }
        );
    }
}
