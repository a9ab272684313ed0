pub mod client;
pub mod config;
pub mod error;
pub mod request_type;
pub mod response_type;

/// Default base URL of the Grass claim API
pub const MAINNET_BASE_URL: &str = "https://api.getgrass.io";

/// Site the claim receipts are requested from, sent as origin and referer
pub const CLAIM_SITE_URL: &str = "https://www.grassfoundation.io";

/// Cluster name sent with every receipt query
pub const CLUSTER: &str = "mainnet";
