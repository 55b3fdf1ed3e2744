//! Token metadata cache: mint address → symbol/name/decimals.
//!
//! Entries never expire. Failed lookups return a placeholder that is NOT
//! cached, so the next alert for the same mint tries again.

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("metadata API returned status {0}")]
    Status(u16),
}

/// Descriptive metadata for a token mint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "TokenInfo")]
pub struct TokenMetadata {
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

/// API payload. Fields may be absent or null; each falls back on its own.
#[derive(Deserialize)]
struct TokenInfo {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    decimals: Option<u8>,
}

impl From<TokenInfo> for TokenMetadata {
    fn from(info: TokenInfo) -> Self {
        Self {
            symbol: info.symbol.unwrap_or_else(unknown_symbol),
            name: info.name.unwrap_or_else(unknown_name),
            decimals: info.decimals.unwrap_or_else(default_decimals),
        }
    }
}

fn unknown_symbol() -> String {
    "???".to_string()
}
fn unknown_name() -> String {
    "Unknown".to_string()
}
fn default_decimals() -> u8 {
    9
}

impl TokenMetadata {
    /// Placeholder returned when a lookup fails.
    pub fn unknown() -> Self {
        Self {
            symbol: unknown_symbol(),
            name: unknown_name(),
            decimals: default_decimals(),
        }
    }
}

/// Source of token metadata.
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    async fn fetch(&self, mint: &str) -> Result<TokenMetadata, LookupError>;
}

/// Jupiter token info API (`GET {base_url}/{mint}`).
pub struct JupiterLookup {
    http: Client,
    base_url: String,
}

impl JupiterLookup {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MetadataLookup for JupiterLookup {
    async fn fetch(&self, mint: &str) -> Result<TokenMetadata, LookupError> {
        let url = format!("{}/{}", self.base_url, mint);
        let resp = self.http.get(&url).send().await?;
        if resp.status().as_u16() != 200 {
            return Err(LookupError::Status(resp.status().as_u16()));
        }
        Ok(resp.json().await?)
    }
}

pub struct MetadataCache {
    entries: DashMap<String, TokenMetadata>,
    lookup: Box<dyn MetadataLookup>,
}

impl MetadataCache {
    pub fn new(lookup: Box<dyn MetadataLookup>) -> Self {
        Self {
            entries: DashMap::new(),
            lookup,
        }
    }

    /// Cached metadata for `mint`, fetching it on a miss. Never fails.
    pub async fn resolve(&self, mint: &str) -> TokenMetadata {
        if let Some(entry) = self.entries.get(mint) {
            return entry.clone();
        }

        match self.lookup.fetch(mint).await {
            Ok(meta) => {
                debug!(mint = %mint, symbol = %meta.symbol, "token metadata cached");
                self.entries.insert(mint.to_string(), meta.clone());
                meta
            }
            Err(e) => {
                warn!(mint = %mint, error = %e, "token metadata lookup failed");
                TokenMetadata::unknown()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeLookup;

    fn bonk() -> TokenMetadata {
        TokenMetadata {
            symbol: "BONK".to_string(),
            name: "Bonk".to_string(),
            decimals: 5,
        }
    }

    #[tokio::test]
    async fn test_failure_not_cached() {
        let lookup = FakeLookup::new();
        lookup.push(Err(LookupError::Status(404)));
        lookup.push(Ok(bonk()));
        let cache = MetadataCache::new(Box::new(lookup.clone()));

        assert_eq!(cache.resolve("MintK").await, TokenMetadata::unknown());
        assert!(cache.is_empty());

        assert_eq!(cache.resolve("MintK").await, bonk());
        assert_eq!(lookup.calls(), 2);

        // Served from cache from now on.
        assert_eq!(cache.resolve("MintK").await, bonk());
        assert_eq!(cache.resolve("MintK").await, bonk());
        assert_eq!(lookup.calls(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let lookup = FakeLookup::new();
        lookup.push(Ok(bonk()));
        let cache = MetadataCache::new(Box::new(lookup.clone()));

        cache.resolve("A").await;
        // Queue exhausted: the fake reports a failure.
        assert_eq!(cache.resolve("B").await, TokenMetadata::unknown());
        assert_eq!(lookup.calls(), 2);
    }

    #[test]
    fn test_partial_response_defaults() {
        let meta: TokenMetadata = serde_json::from_str(r#"{"symbol":"WIF"}"#).unwrap();
        assert_eq!(meta.symbol, "WIF");
        assert_eq!(meta.name, "Unknown");
        assert_eq!(meta.decimals, 9);
    }

    #[test]
    fn test_null_fields_default_individually() {
        let meta: TokenMetadata =
            serde_json::from_str(r#"{"symbol":"A","name":"B","decimals":null}"#).unwrap();
        assert_eq!(meta.symbol, "A");
        assert_eq!(meta.name, "B");
        assert_eq!(meta.decimals, 9);

        let meta: TokenMetadata =
            serde_json::from_str(r#"{"symbol":null,"name":"Bonk","decimals":5}"#).unwrap();
        assert_eq!(meta.symbol, "???");
        assert_eq!(meta.name, "Bonk");
        assert_eq!(meta.decimals, 5);
    }

    #[tokio::test]
    async fn test_jupiter_unreachable_falls_back() {
        let cache = MetadataCache::new(Box::new(JupiterLookup::new(
            "http://127.0.0.1:9/v4/token/".to_string(),
            Duration::from_secs(1),
        )));
        assert_eq!(cache.resolve("MintK").await, TokenMetadata::unknown());
        assert!(cache.is_empty());
    }
}
