use solana_program::{pubkey, pubkey::Pubkey};

/// Merkle distributor program that owns the distributor and claim status accounts
pub const CLAIM_PROGRAM_ID: Pubkey = pubkey!("Eohp5jrnGQgP74oD7ij9EuCSYnQDLLHgsuAmtSTuxABk");

/// Grass token mint
pub const GRASS_MINT: Pubkey = pubkey!("Grass7B4RdKfBCjTKgSqnXkqjwiGvQyFbuSCUJr3XXjs");

/// Wallet receiving the operational tip
pub const DEFAULT_TIP_OWNER: Pubkey = pubkey!("Fk1KfqN7jd6rRV4k7k8dedSqm1aZ8tXbFegitvSZYxoY");

pub const DISTRIBUTOR_SEED: &[u8] = b"MerkleDistributor";
pub const CLAIM_STATUS_SEED: &[u8] = b"ClaimStatus";

/// Anchor instruction namespace and name hashed into the claim selector
pub const INSTRUCTION_NAMESPACE: &str = "global";
pub const CLAIM_INSTRUCTION_NAME: &str = "claim";

pub const SOLSCAN_TX_URL: &str = "https://solscan.io/tx";
