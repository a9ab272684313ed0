use serde::Serialize;

/// JSON document sent in the `input` query parameter of a receipt request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptQuery<'a> {
    /// Base58 wallet address
    pub wallet_address: String,

    pub cluster: &'a str,
}

impl ReceiptQuery<'_> {
    pub fn mainnet(wallet_address: impl ToString) -> Self {
        Self {
            wallet_address: wallet_address.to_string(),
            cluster: crate::CLUSTER,
        }
    }

    /// Serialize to the JSON string the endpoint expects
    pub fn to_input(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
