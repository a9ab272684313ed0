//! Binary layouts shared with the merkle distributor program
//!
//! Claim instruction data:
//!
//! ```text
//! [8 selector][8 LE allocation][4 LE proof length][proof length x 32]
//! ```
//!
//! Claim status account data:
//!
//! ```text
//! [8 discriminator][32 claimant][8 LE allocation][8 LE sent_allocation][8 LE claimed_ts]
//! ```

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{hash::hash, pubkey::Pubkey};

use crate::{
    constants::{CLAIM_INSTRUCTION_NAME, INSTRUCTION_NAMESPACE},
    error::{ClaimError, EncodingError, Result},
};

/// Length of the anchor account discriminator in front of the claim status fields
pub const ACCOUNT_DISCRIMINATOR_LEN: usize = 8;

/// Length of the claim status fields: claimant, allocation, sent allocation, timestamp
pub const CLAIM_STATUS_FIELDS_LEN: usize = 32 + 8 + 8 + 8;

/// Minimum size of a readable claim status account
pub const CLAIM_STATUS_ACCOUNT_LEN: usize = ACCOUNT_DISCRIMINATOR_LEN + CLAIM_STATUS_FIELDS_LEN;

/// Arguments of the claim instruction, serialized right after the selector
#[derive(Debug, BorshSerialize, BorshDeserialize)]
struct ClaimArgs {
    allocation: u64,
    proof: Vec<[u8; 32]>,
}

#[derive(BorshDeserialize)]
struct ClaimStatusLayout {
    claimant: [u8; 32],
    allocation: u64,
    sent_allocation: u64,
    claimed_ts: i64,
}

/// On-chain record of how much of a claimant's allocation has been paid out
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimStatus {
    pub claimant: Pubkey,
    pub allocation: u64,
    pub sent_allocation: u64,
    pub claimed_ts: i64,
}

impl ClaimStatus {
    /// The whole allocation has been sent out
    pub fn is_fully_claimed(&self) -> bool {
        self.allocation == self.sent_allocation
    }
}

impl From<ClaimStatusLayout> for ClaimStatus {
    fn from(layout: ClaimStatusLayout) -> Self {
        Self {
            claimant: Pubkey::new_from_array(layout.claimant),
            allocation: layout.allocation,
            sent_allocation: layout.sent_allocation,
            claimed_ts: layout.claimed_ts,
        }
    }
}

/// Anchor selector of an instruction: `sha256("<namespace>:<name>")[..8]`
pub fn instruction_discriminator(namespace: &str, name: &str) -> [u8; 8] {
    let preimage = format!("{namespace}:{name}");
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hash(preimage.as_bytes()).to_bytes()[..8]);
    discriminator
}

/// Selector of the claim instruction, `sha256("global:claim")[..8]`
pub fn claim_discriminator() -> [u8; 8] {
    instruction_discriminator(INSTRUCTION_NAMESPACE, CLAIM_INSTRUCTION_NAME)
}

/// Narrow an allocation received as an arbitrary-width integer
pub fn checked_allocation(raw: u128) -> Result<u64> {
    u64::try_from(raw).map_err(|_| EncodingError::AllocationOverflow(raw).into())
}

/// Encode the claim instruction data for `allocation` and `proof`
///
/// The proof is copied verbatim. Whether it actually proves inclusion is for the program to
/// decide.
pub fn encode_claim_instruction(allocation: u64, proof: &[[u8; 32]]) -> Result<Vec<u8>> {
    let args = ClaimArgs {
        allocation,
        proof: proof.to_vec(),
    };

    let mut data = Vec::with_capacity(8 + 8 + 4 + proof.len() * 32);
    data.extend_from_slice(&claim_discriminator());
    args.serialize(&mut data).map_err(EncodingError::from)?;

    Ok(data)
}

/// Decode a claim status account
///
/// `data` is the raw account data. The leading discriminator is skipped without being checked
/// and anything after the last field is ignored.
pub fn decode_claim_status(data: &[u8]) -> Result<ClaimStatus> {
    if data.len() < CLAIM_STATUS_ACCOUNT_LEN {
        return Err(ClaimError::MalformedAccount(format!(
            "expected at least {CLAIM_STATUS_ACCOUNT_LEN} bytes, got {}",
            data.len()
        )));
    }

    let mut fields = &data[ACCOUNT_DISCRIMINATOR_LEN..];
    let layout = ClaimStatusLayout::deserialize(&mut fields)
        .map_err(|e| ClaimError::MalformedAccount(e.to_string()))?;

    Ok(layout.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim_status_bytes(claimant: &Pubkey, allocation: u64, sent: u64, ts: i64) -> Vec<u8> {
        let mut data = vec![0xAA; ACCOUNT_DISCRIMINATOR_LEN];
        data.extend_from_slice(claimant.as_ref());
        data.extend_from_slice(&allocation.to_le_bytes());
        data.extend_from_slice(&sent.to_le_bytes());
        data.extend_from_slice(&ts.to_le_bytes());
        data
    }

    fn parse_claim_data(data: &[u8]) -> (u64, Vec<[u8; 32]>) {
        let allocation = u64::from_le_bytes(data[8..16].try_into().unwrap());
        let len = u32::from_le_bytes(data[16..20].try_into().unwrap()) as usize;
        let proof = data[20..]
            .chunks_exact(32)
            .map(|chunk| <[u8; 32]>::try_from(chunk).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(proof.len(), len);
        (allocation, proof)
    }

    #[test]
    fn test_claim_discriminator() {
        let expected = &hash(b"global:claim").to_bytes()[..8];
        assert_eq!(claim_discriminator().as_slice(), expected);
        assert_eq!(
            claim_discriminator(),
            [0x3e, 0xc6, 0xd6, 0xc1, 0xd5, 0x9f, 0x6c, 0xd2]
        );
    }

    #[test]
    fn test_encode_claim_instruction_round_trip() {
        for proof_len in [0usize, 1, 5] {
            let proof: Vec<[u8; 32]> = (0..proof_len).map(|i| [i as u8 + 1; 32]).collect();
            let allocation = 1_234_567_890_123u64 + proof_len as u64;

            let data = encode_claim_instruction(allocation, &proof).unwrap();

            assert_eq!(data.len(), 8 + 8 + 4 + proof_len * 32);
            assert_eq!(data[..8], claim_discriminator());
            assert_eq!(parse_claim_data(&data), (allocation, proof));
        }
    }

    #[test]
    fn test_encode_sixteen_node_proof_length() {
        let proof = vec![[7u8; 32]; 16];
        let data = encode_claim_instruction(u64::MAX, &proof).unwrap();

        assert_eq!(data.len(), 532);
        assert_eq!(data[16..20], 16u32.to_le_bytes());
        assert_eq!(data[8..16], u64::MAX.to_le_bytes());
    }

    #[test]
    fn test_checked_allocation() {
        assert_eq!(checked_allocation(42).unwrap(), 42);
        assert_eq!(checked_allocation(u64::MAX as u128).unwrap(), u64::MAX);
        assert!(matches!(
            checked_allocation(u64::MAX as u128 + 1),
            Err(ClaimError::Encoding(EncodingError::AllocationOverflow(_)))
        ));
    }

    #[test]
    fn test_decode_claim_status() {
        let claimant = Pubkey::new_unique();
        let data = claim_status_bytes(&claimant, 1_000, 250, -7);

        let status = decode_claim_status(&data).unwrap();

        assert_eq!(
            status,
            ClaimStatus {
                claimant,
                allocation: 1_000,
                sent_allocation: 250,
                claimed_ts: -7,
            }
        );
        assert!(!status.is_fully_claimed());
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let claimant = Pubkey::new_unique();
        let mut data = claim_status_bytes(&claimant, 42, 42, 1_700_000_000);
        data.extend_from_slice(&[0xFF; 40]);

        let status = decode_claim_status(&data).unwrap();

        assert_eq!(status.claimant, claimant);
        assert!(status.is_fully_claimed());
    }

    #[test]
    fn test_decode_arbitrary_buffer_of_minimum_length() {
        let data: Vec<u8> = (0..CLAIM_STATUS_ACCOUNT_LEN as u8).collect();
        assert!(decode_claim_status(&data).is_ok());
    }

    #[test]
    fn test_decode_short_buffer_is_malformed() {
        let data = vec![0u8; CLAIM_STATUS_ACCOUNT_LEN - 1];
        assert!(matches!(
            decode_claim_status(&data),
            Err(ClaimError::MalformedAccount(_))
        ));
        assert!(matches!(
            decode_claim_status(&[]),
            Err(ClaimError::MalformedAccount(_))
        ));
    }
}
