//! JSON-RPC transport over HTTP.

use super::RpcError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// A single JSON-RPC request/response exchange.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Call `method` on the node at `url` and return the `result` member.
    async fn call(&self, url: &str, method: &str, params: Value) -> Result<Value, RpcError>;

    /// Drop any pooled connections and start a fresh session.
    fn reconnect(&mut self);
}

/// reqwest-backed transport.
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            timeout,
        }
    }
}

fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(15))
        .build()
        .unwrap_or_else(|_| Client::new())
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(&self, url: &str, method: &str, params: Value) -> Result<Value, RpcError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let resp = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_send_error(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(RpcError::from_status(url, status.as_u16(), text));
        }

        // The client timeout also covers the body, so a stalled read is a
        // connection failure rather than a malformed response.
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| classify_send_error(url, e))?;
        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| RpcError::Decode(e.to_string()))?;

        debug!(endpoint = url, method = method, "rpc call complete");
        parse_envelope(value)
    }

    fn reconnect(&mut self) {
        self.client = build_client(self.timeout);
    }
}

fn classify_send_error(url: &str, e: reqwest::Error) -> RpcError {
    if e.is_timeout() || e.is_connect() || e.is_request() {
        RpcError::Connection {
            endpoint: url.to_string(),
            reason: e.to_string(),
        }
    } else if let Some(status) = e.status() {
        RpcError::from_status(url, status.as_u16(), e.to_string())
    } else {
        RpcError::Decode(e.to_string())
    }
}

/// Unwrap a JSON-RPC response envelope.
pub(crate) fn parse_envelope(value: Value) -> Result<Value, RpcError> {
    if let Some(err) = value.get("error") {
        let code = err.get("code").and_then(Value::as_i64).unwrap_or(0);
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(RpcError::Rpc { code, message });
    }
    Ok(value.get("result").cloned().unwrap_or(Value::Null))
}
