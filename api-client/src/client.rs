use async_trait::async_trait;
use backon::Retryable;
use grass_claim_core::{ClaimError, ClaimReceipt, ProofFetcher};
use log::{debug, warn};
use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Client, Response, StatusCode,
};
use serde::de::DeserializeOwned;
use solana_pubkey::Pubkey;

use crate::{
    config::Config, error::GrassApiError, request_type::ReceiptQuery,
    response_type::ReceiptEnvelope,
};

/// Client for the Grass claim receipt API
#[derive(Debug, Clone)]
pub struct GrassApiClient {
    /// Reqwest client
    client: Client,
    config: Config,
}

/// Headers of a browser visiting the claim site
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(header::ORIGIN, HeaderValue::from_static(crate::CLAIM_SITE_URL));
    headers.insert(header::REFERER, HeaderValue::from_static("https://www.grassfoundation.io/"));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("empty"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("cors"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("cross-site"));
    headers
}

impl GrassApiClient {
    /// Create a new Grass API client with the given configuration
    pub fn new(config: Config) -> Result<Self, GrassApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .default_headers(browser_headers())
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a client with mainnet defaults
    pub fn mainnet() -> Result<Self, GrassApiError> {
        Self::new(Config::mainnet())
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Make a single GET request
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GrassApiError> {
        let url = format!("{}{}", self.config.base_url, endpoint);
        let response = self.client.get(&url).query(query).send().await.map_err(|e| {
            if e.is_timeout() {
                GrassApiError::Timeout
            } else {
                GrassApiError::HttpError(e)
            }
        })?;

        self.handle_response(response).await
    }

    /// Handle HTTP response
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, GrassApiError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(Into::into)
        } else {
            let status_code = status.as_u16();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            match status {
                StatusCode::NOT_FOUND => Err(GrassApiError::NotFound(error_text)),
                StatusCode::TOO_MANY_REQUESTS => Err(GrassApiError::RateLimitExceeded),
                StatusCode::REQUEST_TIMEOUT => Err(GrassApiError::Timeout),
                _ => Err(GrassApiError::api_error(status_code, error_text)),
            }
        }
    }

    /// Get the claim receipt of a wallet
    ///
    /// Transient failures are retried with a jittered wait between `min_delay` and
    /// `max_delay`, up to `max_retries` times.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use grass_api_client::client::GrassApiClient;
    /// # use solana_pubkey::Pubkey;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = GrassApiClient::mainnet()?;
    /// let receipt = client.get_claim_receipt(&Pubkey::new_unique()).await?;
    /// println!("allocation {}", receipt.allocation);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_claim_receipt(
        &self,
        wallet: &Pubkey,
    ) -> Result<ClaimReceipt, GrassApiError> {
        let input = ReceiptQuery::mainnet(wallet).to_input()?;

        let envelope: ReceiptEnvelope = (|| async {
            self.get("/airdropClaimReceipt", &[("input", input.as_str())]).await
        })
        .retry(self.config.retry_policy().backoff())
        .when(GrassApiError::is_retryable)
        .notify(|e, delay| {
            warn!("{wallet} | Claim receipt request failed: {e}, retrying in {delay:?}")
        })
        .await?;

        let receipt = envelope.into_receipt(&wallet.to_string())?;
        debug!(
            "{wallet} | Receipt version {} allocation {} with {} proof nodes",
            receipt.version_number,
            receipt.allocation,
            receipt.claim_proof.len()
        );
        Ok(receipt)
    }
}

#[async_trait]
impl ProofFetcher for GrassApiClient {
    async fn fetch_claim_receipt(&self, wallet: &Pubkey) -> Result<ClaimReceipt, ClaimError> {
        Ok(self.get_claim_receipt(wallet).await?)
    }
}
