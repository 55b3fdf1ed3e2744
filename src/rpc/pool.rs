//! Round-robin pool of RPC endpoints.

use super::types::{SignatureInfo, TransactionDetail};
use super::{RpcError, RpcTransport};
use serde_json::{json, Value};
use std::fmt;
use tracing::{info, warn};

/// An RPC endpoint and its position in the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    pub index: usize,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Ordered endpoints with a movable "current" pointer. Rotation is strict
/// round robin; nothing is health-scored.
pub struct EndpointPool {
    endpoints: Vec<Endpoint>,
    current: usize,
    transport: Box<dyn RpcTransport>,
}

impl EndpointPool {
    pub fn new(urls: Vec<String>, transport: Box<dyn RpcTransport>) -> Result<Self, RpcError> {
        if urls.is_empty() {
            return Err(RpcError::NoEndpoints);
        }
        let endpoints = urls
            .into_iter()
            .enumerate()
            .map(|(index, url)| Endpoint { url, index })
            .collect();
        Ok(Self {
            endpoints,
            current: 0,
            transport,
        })
    }

    pub fn current(&self) -> &Endpoint {
        &self.endpoints[self.current]
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Advance to the next endpoint (wrapping) with a fresh HTTP session.
    pub fn rotate(&mut self) -> &Endpoint {
        let from = self.current;
        self.current = (self.current + 1) % self.endpoints.len();
        self.transport.reconnect();
        info!(
            from = %self.endpoints[from],
            to = %self.endpoints[self.current],
            provider = self.current + 1,
            total = self.endpoints.len(),
            "rotated RPC endpoint"
        );
        &self.endpoints[self.current]
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let endpoint = self.current();
        self.transport.call(&endpoint.url, method, params).await
    }

    /// Most recent signatures touching `address`, newest first.
    pub async fn get_signatures_for_address(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, RpcError> {
        let result = self
            .call(
                "getSignaturesForAddress",
                json!([address, { "limit": limit }]),
            )
            .await?;
        if result.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(result).map_err(|e| RpcError::Decode(e.to_string()))
    }

    /// Full transaction at confirmed commitment. `None` if the node doesn't
    /// have it (yet).
    pub async fn get_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<TransactionDetail>, RpcError> {
        let result = self
            .call(
                "getTransaction",
                json!([
                    signature,
                    {
                        "encoding": "json",
                        "commitment": "confirmed",
                        "maxSupportedTransactionVersion": 0
                    }
                ]),
            )
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        serde_json::from_value(result)
            .map(Some)
            .map_err(|e| RpcError::Decode(e.to_string()))
    }

    /// Connectivity probe.
    pub async fn get_slot(&self) -> Result<u64, RpcError> {
        let result = self.call("getSlot", json!([])).await?;
        result.as_u64().ok_or_else(|| {
            warn!(result = %result, "unexpected getSlot result");
            RpcError::Decode(format!("expected slot number, got {}", result))
        })
    }
}
