use grass_claim_core::{codec::checked_allocation, ClaimReceipt};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};

use crate::error::GrassApiError;

/// Top level of a receipt response
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptEnvelope {
    pub result: ReceiptResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptResult {
    /// Absent for wallets without an allocation
    #[serde(default)]
    pub data: Option<ReceiptData>,
}

/// Allocation in raw token units, sent either as a number or a decimal string
#[serde_as]
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum RawAllocation {
    Number(u64),
    Text(#[serde_as(as = "DisplayFromStr")] u128),
}

impl RawAllocation {
    pub fn value(self) -> u128 {
        match self {
            RawAllocation::Number(value) => value as u128,
            RawAllocation::Text(value) => value,
        }
    }
}

/// Claim receipt as published, before proof decoding
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptData {
    pub version_number: u32,

    pub allocation: RawAllocation,

    /// JSON encoded list of [`ProofNode`]
    pub claim_proof: String,
}

/// One merkle proof node, a serialized byte buffer
#[derive(Debug, Clone, Deserialize)]
pub struct ProofNode {
    pub data: ProofBytes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProofBytes {
    pub data: Vec<u8>,
}

impl ReceiptData {
    /// Decode the proof and narrow the allocation to the on-chain width
    pub fn into_receipt(self) -> Result<ClaimReceipt, GrassApiError> {
        let allocation =
            checked_allocation(self.allocation.value()).map_err(GrassApiError::Allocation)?;
        let nodes: Vec<ProofNode> = serde_json::from_str(&self.claim_proof)?;

        let claim_proof = nodes
            .into_iter()
            .enumerate()
            .map(|(i, node)| {
                let len = node.data.data.len();
                <[u8; 32]>::try_from(node.data.data).map_err(|_| {
                    GrassApiError::InvalidProof(format!("node {i} is {len} bytes, expected 32"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ClaimReceipt {
            version_number: self.version_number,
            allocation,
            claim_proof,
        })
    }
}

impl ReceiptEnvelope {
    pub fn into_receipt(self, wallet: &str) -> Result<ClaimReceipt, GrassApiError> {
        self.result
            .data
            .ok_or_else(|| GrassApiError::NotFound(format!("no claim receipt for {wallet}")))?
            .into_receipt()
    }
}
