//! In-memory fakes for the RPC, metadata and messaging seams.

use crate::metadata::{LookupError, MetadataLookup, TokenMetadata};
use crate::notify::{BotIdentity, Messenger, NotifyError};
use crate::rpc::{RpcError, RpcTransport};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// A `getTransaction` result whose message lists `accounts`.
pub fn transaction_json(accounts: &[&str]) -> Value {
    json!({
        "slot": 1,
        "blockTime": 1_700_000_000i64,
        "transaction": {
            "signatures": ["sig"],
            "message": { "accountKeys": accounts }
        }
    })
}

#[derive(Default)]
struct RpcState {
    signatures: VecDeque<Result<Value, RpcError>>,
    transactions: HashMap<String, Value>,
    failing: HashMap<String, RpcError>,
    slot: Value,
    calls: Vec<(String, String, Value)>,
    reconnects: usize,
}

/// Scripted JSON-RPC node. Clones share state.
#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<RpcState>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a `getSignaturesForAddress` outcome; an empty queue answers `[]`.
    pub fn push_signatures(&self, result: Result<Value, RpcError>) {
        self.state.lock().unwrap().signatures.push_back(result);
    }

    pub fn add_transaction(&self, signature: &str, tx: Value) {
        self.state
            .lock()
            .unwrap()
            .transactions
            .insert(signature.to_string(), tx);
    }

    /// Make `getTransaction` for `signature` fail (once).
    pub fn fail_transaction(&self, signature: &str, err: RpcError) {
        self.state
            .lock()
            .unwrap()
            .failing
            .insert(signature.to_string(), err);
    }

    pub fn set_slot(&self, slot: Value) {
        self.state.lock().unwrap().slot = slot;
    }

    /// `(url, method, params)` for every call so far.
    pub fn calls(&self) -> Vec<(String, String, Value)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn reconnects(&self) -> usize {
        self.state.lock().unwrap().reconnects
    }
}

#[async_trait]
impl RpcTransport for FakeTransport {
    async fn call(&self, url: &str, method: &str, params: Value) -> Result<Value, RpcError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push((url.to_string(), method.to_string(), params.clone()));

        match method {
            "getSignaturesForAddress" => state
                .signatures
                .pop_front()
                .unwrap_or_else(|| Ok(json!([]))),
            "getTransaction" => {
                let sig = params[0].as_str().unwrap_or_default().to_string();
                if let Some(err) = state.failing.remove(&sig) {
                    return Err(err);
                }
                Ok(state.transactions.get(&sig).cloned().unwrap_or(Value::Null))
            }
            "getSlot" => Ok(state.slot.clone()),
            _ => Err(RpcError::Rpc {
                code: -32601,
                message: "Method not found".to_string(),
            }),
        }
    }

    fn reconnect(&mut self) {
        self.state.lock().unwrap().reconnects += 1;
    }
}

#[derive(Default)]
struct LookupState {
    results: VecDeque<Result<TokenMetadata, LookupError>>,
    calls: usize,
}

/// Scripted metadata source; an empty queue answers 404.
#[derive(Clone, Default)]
pub struct FakeLookup {
    state: Arc<Mutex<LookupState>>,
}

impl FakeLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, result: Result<TokenMetadata, LookupError>) {
        self.state.lock().unwrap().results.push_back(result);
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }
}

#[async_trait]
impl MetadataLookup for FakeLookup {
    async fn fetch(&self, _mint: &str) -> Result<TokenMetadata, LookupError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        state
            .results
            .pop_front()
            .unwrap_or(Err(LookupError::Status(404)))
    }
}

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub chat_id: String,
    pub text: String,
    pub disable_preview: bool,
}

#[derive(Default)]
struct MessengerState {
    sent: Vec<SentMessage>,
    attempts: usize,
    fail: bool,
}

/// Records delivered messages; can be told to reject sends.
#[derive(Clone, Default)]
pub struct FakeMessenger {
    state: Arc<Mutex<MessengerState>>,
}

impl FakeMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_sends(&self, fail: bool) {
        self.state.lock().unwrap().fail = fail;
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn attempts(&self) -> usize {
        self.state.lock().unwrap().attempts
    }
}

#[async_trait]
impl Messenger for FakeMessenger {
    async fn get_me(&self) -> Result<BotIdentity, NotifyError> {
        Ok(BotIdentity {
            id: 42,
            username: Some("burnwatch_bot".to_string()),
        })
    }

    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        disable_preview: bool,
    ) -> Result<(), NotifyError> {
        let mut state = self.state.lock().unwrap();
        state.attempts += 1;
        if state.fail {
            return Err(NotifyError::Api {
                code: 403,
                description: "Forbidden: bot is not a member of the channel chat".to_string(),
            });
        }
        state.sent.push(SentMessage {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
            disable_preview,
        });
        Ok(())
    }
}
