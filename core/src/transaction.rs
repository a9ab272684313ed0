//! Instruction assembly for a claim transaction
//!
//! The order of the instructions matters: later instructions use token accounts created by
//! earlier ones within the same atomic transaction.

use std::{fmt, str::FromStr};

use log::debug;
use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};
use spl_associated_token_account::instruction::create_associated_token_account;

use crate::{
    codec::encode_claim_instruction,
    constants::{CLAIM_PROGRAM_ID, GRASS_MINT},
    error::{ClaimError, Result},
    pda::derive_grass_token_account,
    rpc_utils::AccountFetcher,
};

/// Most decimal places a tip fraction may carry, keeps `10^scale` within a u64
pub const MAX_TIP_DECIMALS: u32 = 18;

/// Share of the allocation redirected to the tip account
///
/// Held as the exact decimal `numerator / 10^scale`, trailing zeros stripped, so parsing
/// never changes the value given.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TipFraction {
    numerator: u64,
    scale: u32,
}

impl TipFraction {
    pub const ZERO: TipFraction = TipFraction {
        numerator: 0,
        scale: 0,
    };

    fn new(numerator: u64, scale: u32) -> Result<Self> {
        let denominator = 10u64.pow(scale);
        if numerator > denominator {
            return Err(ClaimError::InvalidTipFraction(format!(
                "{numerator}/{denominator} exceeds 1"
            )));
        }

        let (mut numerator, mut scale) = (numerator, scale);
        while scale > 0 && numerator % 10 == 0 {
            numerator /= 10;
            scale -= 1;
        }
        Ok(Self { numerator, scale })
    }

    pub fn from_basis_points(basis_points: u16) -> Result<Self> {
        Self::new(u64::from(basis_points), 4)
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        10u64.pow(self.scale)
    }
}

impl FromStr for TipFraction {
    type Err = ClaimError;

    /// Plain decimal notation within `[0, 1]`, at most [`MAX_TIP_DECIMALS`] places
    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| ClaimError::InvalidTipFraction(format!("{s}: {reason}"));

        let trimmed = s.trim();
        let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("empty"));
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid("expected a decimal number"));
        }

        let fraction = fraction.trim_end_matches('0');
        let scale = u32::try_from(fraction.len())
            .ok()
            .filter(|scale| *scale <= MAX_TIP_DECIMALS)
            .ok_or_else(|| invalid("too many decimal places"))?;

        let whole = whole.trim_start_matches('0');
        let whole = match whole {
            "" => 0,
            "1" => 1,
            _ => return Err(invalid("not within [0, 1]")),
        };
        let fraction = if fraction.is_empty() {
            0
        } else {
            fraction
                .parse::<u64>()
                .map_err(|e| invalid(&e.to_string()))?
        };

        Self::new(whole * 10u64.pow(scale) + fraction, scale)
            .map_err(|_| invalid("not within [0, 1]"))
    }
}

impl fmt::Display for TipFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.numerator);
        }
        let denominator = self.denominator();
        write!(
            f,
            "{}.{:0width$}",
            self.numerator / denominator,
            self.numerator % denominator,
            width = self.scale as usize
        )
    }
}

/// How a claimed allocation is forwarded
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TipSplit {
    pub to_destination: u64,
    pub to_tip: u64,
}

/// Split `allocation` between destination and tip
///
/// `to_tip = floor(allocation * tip)`, computed exactly in u128. The destination receives the
/// rest, so the two parts always add up to `allocation`.
pub fn split_allocation(allocation: u64, tip: TipFraction) -> TipSplit {
    let scaled = u128::from(allocation) * u128::from(tip.numerator());
    let denominator = u128::from(tip.denominator());
    let to_tip = (scaled / denominator) as u64;

    if scaled % denominator != 0 {
        debug!("Tip on {allocation} truncated to {to_tip}, remainder kept by destination");
    }

    TipSplit {
        to_destination: allocation - to_tip,
        to_tip,
    }
}

/// Inputs of a claim transaction, all addresses already derived
#[derive(Clone, Debug)]
pub struct ClaimTransactionInput {
    /// Claimant wallet, also fee payer and only signer
    pub claimant: Pubkey,

    /// Wallet receiving the claimed tokens
    pub destination: Pubkey,

    /// Wallet receiving the tip
    pub tip_owner: Pubkey,

    pub distributor: Pubkey,
    pub claim_status: Pubkey,
    pub allocation: u64,
    pub proof: Vec<[u8; 32]>,
    pub tip_fraction: TipFraction,
}

/// Create instruction for the Grass token account of `owner`, if that account is missing
///
/// Returns the token account address together with the optional create instruction.
pub async fn ensure_token_account<F: AccountFetcher + ?Sized>(
    fetcher: &F,
    payer: &Pubkey,
    owner: &Pubkey,
) -> Result<(Pubkey, Option<Instruction>)> {
    let token_account = derive_grass_token_account(owner)?;

    if fetcher.account_exists(&token_account).await? {
        return Ok((token_account, None));
    }

    debug!("Token account {token_account} of {owner} missing, creating it");
    let instruction =
        create_associated_token_account(payer, owner, &GRASS_MINT, &spl_token::id());
    Ok((token_account, Some(instruction)))
}

/// The claim instruction
///
/// Account order and writability are fixed by the program's account index contract.
pub fn claim_instruction(
    distributor: &Pubkey,
    claim_status: &Pubkey,
    vault: &Pubkey,
    claimant_token_account: &Pubkey,
    claimant: &Pubkey,
    allocation: u64,
    proof: &[[u8; 32]],
) -> Result<Instruction> {
    let data = encode_claim_instruction(allocation, proof)?;

    let accounts = vec![
        AccountMeta::new(*distributor, false),
        AccountMeta::new_readonly(GRASS_MINT, false),
        AccountMeta::new(*claim_status, false),
        AccountMeta::new(*vault, false),
        AccountMeta::new(*claimant_token_account, false),
        AccountMeta::new(*claimant, true),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Ok(Instruction::new_with_bytes(CLAIM_PROGRAM_ID, &data, accounts))
}

pub fn transfer_instruction(
    source: &Pubkey,
    destination: &Pubkey,
    owner: &Pubkey,
    amount: u64,
) -> Result<Instruction> {
    spl_token::instruction::transfer(&spl_token::id(), source, destination, owner, &[], amount)
        .map_err(|e| ClaimError::Instruction(e.to_string()))
}

/// Build the ordered instructions of a claim transaction
///
/// 1. create the claimant token account if missing
/// 2. claim
/// 3. create the destination token account if missing
/// 4. create the tip token account if missing
/// 5. transfer the destination share
/// 6. transfer the tip
///
/// A token account shared by several roles is created once. Nothing is signed or
/// sent here.
pub async fn build_claim_instructions<F: AccountFetcher + ?Sized>(
    fetcher: &F,
    input: &ClaimTransactionInput,
) -> Result<Vec<Instruction>> {
    let claimant = &input.claimant;
    let mut instructions = Vec::with_capacity(6);
    let mut created = Vec::with_capacity(3);

    let (claimant_token_account, create_claimant) =
        ensure_token_account(fetcher, claimant, claimant).await?;
    schedule_create(&mut instructions, &mut created, claimant_token_account, create_claimant);

    let vault = derive_grass_token_account(&input.distributor)?;
    instructions.push(claim_instruction(
        &input.distributor,
        &input.claim_status,
        &vault,
        &claimant_token_account,
        claimant,
        input.allocation,
        &input.proof,
    )?);

    let (destination_token_account, create_destination) =
        ensure_token_account(fetcher, claimant, &input.destination).await?;
    schedule_create(
        &mut instructions,
        &mut created,
        destination_token_account,
        create_destination,
    );

    let (tip_token_account, create_tip) =
        ensure_token_account(fetcher, claimant, &input.tip_owner).await?;
    schedule_create(&mut instructions, &mut created, tip_token_account, create_tip);

    let split = split_allocation(input.allocation, input.tip_fraction);
    debug!(
        "Allocation {} split into {} to destination and {} to tip",
        input.allocation, split.to_destination, split.to_tip
    );

    instructions.push(transfer_instruction(
        &claimant_token_account,
        &destination_token_account,
        claimant,
        split.to_destination,
    )?);
    instructions.push(transfer_instruction(
        &claimant_token_account,
        &tip_token_account,
        claimant,
        split.to_tip,
    )?);

    Ok(instructions)
}

/// Push a create instruction unless the same token account is already being created
fn schedule_create(
    instructions: &mut Vec<Instruction>,
    created: &mut Vec<Pubkey>,
    token_account: Pubkey,
    create: Option<Instruction>,
) {
    let Some(create) = create else {
        return;
    };
    if created.contains(&token_account) {
        debug!("Token account {token_account} already scheduled for creation");
        return;
    }
    created.push(token_account);
    instructions.push(create);
}
