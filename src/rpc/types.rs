//! Wire types for the Solana JSON-RPC calls the monitor makes.

use serde::Deserialize;

/// One entry of a `getSignaturesForAddress` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub signature: String,
    #[serde(default)]
    pub slot: u64,
    #[serde(default)]
    pub err: Option<serde_json::Value>,
    #[serde(default)]
    pub block_time: Option<i64>,
}

/// `getTransaction` result (json encoding).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetail {
    #[serde(default)]
    pub slot: u64,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub transaction: Option<TransactionBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionBody {
    #[serde(default)]
    pub signatures: Vec<String>,
    pub message: Message,
}

/// Legacy messages list keys under `accountKeys`; some versioned encodings
/// use `staticAccountKeys` instead.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default)]
    pub account_keys: Option<Vec<AccountKey>>,
    #[serde(default)]
    pub static_account_keys: Option<Vec<AccountKey>>,
}

/// An account key is a bare string in `json` encoding and an object in
/// `jsonParsed` encoding.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AccountKey {
    Plain(String),
    Parsed { pubkey: String },
}

impl AccountKey {
    pub fn as_str(&self) -> &str {
        match self {
            AccountKey::Plain(key) => key,
            AccountKey::Parsed { pubkey } => pubkey,
        }
    }
}

impl Message {
    /// Whichever key list is present, as plain strings.
    pub fn account_keys(&self) -> Vec<String> {
        self.account_keys
            .as_ref()
            .or(self.static_account_keys.as_ref())
            .map(|keys| keys.iter().map(|k| k.as_str().to_string()).collect())
            .unwrap_or_default()
    }
}

impl TransactionDetail {
    /// Participant accounts, or `None` when the body is missing.
    pub fn account_keys(&self) -> Option<Vec<String>> {
        self.transaction.as_ref().map(|tx| tx.message.account_keys())
    }
}
