//! Solana JSON-RPC access for the burn monitor.
//!
//! Architecture:
//! - `RpcTransport`: one JSON-RPC call against one URL. `HttpTransport` is the
//!   reqwest implementation; tests swap in an in-memory fake.
//! - `EndpointPool`: ordered endpoints with a round-robin "current" pointer.
//!   Every typed call goes to the current endpoint.
//! - `RpcError` carries an `ErrorKind` assigned by the transport from status
//!   codes and error classes, which the monitor maps to a backoff.

pub mod pool;
pub mod transport;
pub mod types;

pub use pool::{Endpoint, EndpointPool};
pub use transport::{HttpTransport, RpcTransport};
pub use types::{AccountKey, SignatureInfo, TransactionDetail};

use std::fmt;
use thiserror::Error;

/// Failure class of an RPC call, as far as recovery is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    RateLimited,
    Forbidden,
    Unavailable,
    Connection,
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::RateLimited => write!(f, "rate_limited"),
            ErrorKind::Forbidden => write!(f, "forbidden"),
            ErrorKind::Unavailable => write!(f, "unavailable"),
            ErrorKind::Connection => write!(f, "connection"),
            ErrorKind::Other => write!(f, "other"),
        }
    }
}

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("rate limited by {endpoint}")]
    RateLimited { endpoint: String },
    #[error("access forbidden by {endpoint}")]
    Forbidden { endpoint: String },
    #[error("{endpoint} unavailable (HTTP {status})")]
    Unavailable { endpoint: String, status: u16 },
    #[error("connection to {endpoint} failed: {reason}")]
    Connection { endpoint: String, reason: String },
    #[error("HTTP {status} from {endpoint}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("malformed RPC response: {0}")]
    Decode(String),
    #[error("no RPC endpoints configured")]
    NoEndpoints,
}

impl RpcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RpcError::RateLimited { .. } => ErrorKind::RateLimited,
            RpcError::Forbidden { .. } => ErrorKind::Forbidden,
            RpcError::Unavailable { .. } => ErrorKind::Unavailable,
            RpcError::Connection { .. } => ErrorKind::Connection,
            // Some providers answer 200 with a JSON-RPC error carrying the HTTP code.
            RpcError::Rpc { code: 429, .. } => ErrorKind::RateLimited,
            RpcError::Rpc { code: 403, .. } => ErrorKind::Forbidden,
            RpcError::Rpc { code: 503, .. } => ErrorKind::Unavailable,
            RpcError::Status { .. }
            | RpcError::Rpc { .. }
            | RpcError::Decode(_)
            | RpcError::NoEndpoints => ErrorKind::Other,
        }
    }

    /// Map a non-success HTTP status to an error.
    pub fn from_status(endpoint: &str, status: u16, body: String) -> Self {
        let endpoint = endpoint.to_string();
        match status {
            429 => RpcError::RateLimited { endpoint },
            401 | 403 => RpcError::Forbidden { endpoint },
            502 | 503 | 504 => RpcError::Unavailable { endpoint, status },
            _ => RpcError::Status {
                endpoint,
                status,
                body,
            },
        }
    }
}
