use solana_client::client_error::ClientError;
use solana_sdk::signer::SignerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("No valid program address found for seeds under program {0}")]
    Derivation(String),

    #[error("Failed to encode claim instruction: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Malformed claim status account: {0}")]
    MalformedAccount(String),

    #[error("Failed to sign claim transaction: {0}")]
    Signing(#[from] SignerError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid tip fraction: {0}")]
    InvalidTipFraction(String),

    #[error("Failed to build token instruction: {0}")]
    Instruction(String),
}

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("Allocation {0} does not fit in an unsigned 64-bit integer")]
    AllocationOverflow(u128),

    #[error("Borsh serialization failed: {0}")]
    Borsh(#[from] std::io::Error),
}

impl ClaimError {
    /// Short label used when logging failed attempts
    pub fn kind(&self) -> &'static str {
        match self {
            ClaimError::Derivation(_) => "derivation",
            ClaimError::Encoding(_) => "encoding",
            ClaimError::MalformedAccount(_) => "malformed_account",
            ClaimError::Signing(_) => "signing",
            ClaimError::Transport(_) => "transport",
            ClaimError::InvalidTipFraction(_) => "invalid_tip_fraction",
            ClaimError::Instruction(_) => "instruction",
        }
    }

    /// Only transport failures are worth another attempt
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ClaimError::Transport(_))
    }
}

impl From<ClientError> for ClaimError {
    fn from(value: ClientError) -> Self {
        ClaimError::Transport(value.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClaimError>;
