use grass_claim_core::ClaimError;
use thiserror::Error;

/// Error types for the Grass API client
#[derive(Error, Debug)]
pub enum GrassApiError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// API returned an error response
    #[error("API error: {status_code} - {message}")]
    ApiError { status_code: u16, message: String },

    /// No receipt for this wallet
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimitExceeded,

    /// Timeout error
    #[error("Request timed out")]
    Timeout,

    /// Proof node that is not a 32-byte hash
    #[error("Invalid claim proof: {0}")]
    InvalidProof(String),

    /// Allocation that does not fit the claim instruction
    #[error("Invalid allocation: {0}")]
    Allocation(#[source] ClaimError),
}

impl GrassApiError {
    /// Create an API error from status code and message
    pub fn api_error(status_code: u16, message: impl Into<String>) -> Self {
        GrassApiError::ApiError {
            status_code,
            message: message.into(),
        }
    }

    /// Check if error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, GrassApiError::NotFound(_))
    }

    /// Transient failures worth another request
    pub fn is_retryable(&self) -> bool {
        match self {
            GrassApiError::HttpError(_)
            | GrassApiError::Timeout
            | GrassApiError::RateLimitExceeded => true,
            GrassApiError::ApiError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }
}

impl From<GrassApiError> for ClaimError {
    fn from(value: GrassApiError) -> Self {
        match value {
            GrassApiError::Allocation(e) => e,
            e => ClaimError::Transport(e.to_string()),
        }
    }
}
