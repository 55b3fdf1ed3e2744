//! LP burn classification.
//!
//! Heuristic only: a transaction counts as an LP burn when its account list
//! mentions both a burn sink and the monitored pool program (or its
//! authority). Which account is the token is decided by a `SubjectExtractor`
//! so a real instruction decoder can replace the default later.

use crate::rpc::EndpointPool;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, error, info};

/// A transaction classified as an LP burn.
#[derive(Debug, Clone, PartialEq)]
pub struct BurnEvent {
    pub signature: String,
    /// Token the alert is reported against.
    pub token_address: String,
    pub observed_at: DateTime<Utc>,
    /// Estimated share of LP burned. Currently the configured threshold,
    /// not a decoded amount.
    pub burn_percent: f64,
}

impl BurnEvent {
    pub fn timestamp(&self) -> String {
        self.observed_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }
}

/// Picks the subject token out of a matching transaction's accounts.
pub trait SubjectExtractor: Send + Sync {
    fn extract(&self, accounts: &[String]) -> Option<String>;
}

/// Takes the first account in the message.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstAccount;

impl SubjectExtractor for FirstAccount {
    fn extract(&self, accounts: &[String]) -> Option<String> {
        accounts.first().cloned()
    }
}

/// True when `accounts` hits both sets.
pub fn is_lp_burn(
    accounts: &[String],
    burn_sinks: &HashSet<String>,
    watched: &HashSet<String>,
) -> bool {
    let has_burn = accounts.iter().any(|a| burn_sinks.contains(a));
    let has_pool = accounts.iter().any(|a| watched.contains(a));
    has_burn && has_pool
}

pub struct Classifier {
    burn_sinks: HashSet<String>,
    /// Program id and its authority.
    watched: HashSet<String>,
    burn_percent: f64,
    request_delay: Duration,
    extractor: Box<dyn SubjectExtractor>,
}

impl Classifier {
    pub fn new(
        burn_sinks: impl IntoIterator<Item = String>,
        program_id: &str,
        authority_id: &str,
        burn_percent: f64,
        request_delay: Duration,
    ) -> Self {
        Self {
            burn_sinks: burn_sinks.into_iter().collect(),
            watched: [program_id.to_string(), authority_id.to_string()]
                .into_iter()
                .collect(),
            burn_percent,
            request_delay,
            extractor: Box::new(FirstAccount),
        }
    }

    pub fn with_extractor(mut self, extractor: Box<dyn SubjectExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Classify one signature. Fetch and decode errors are logged and
    /// reported as "not a burn".
    pub async fn classify(&self, pool: &EndpointPool, signature: &str) -> Option<BurnEvent> {
        tokio::time::sleep(self.request_delay).await;

        let detail = match pool.get_transaction(signature).await {
            Ok(Some(detail)) => detail,
            Ok(None) => {
                debug!(signature = %signature, "transaction not available");
                return None;
            }
            Err(e) => {
                error!(signature = %signature, error = %e, "error checking transaction");
                return None;
            }
        };

        let accounts = detail.account_keys()?;
        self.evaluate(signature, &accounts)
    }

    /// Apply the predicate and extraction to an already fetched account list.
    pub fn evaluate(&self, signature: &str, accounts: &[String]) -> Option<BurnEvent> {
        if !is_lp_burn(accounts, &self.burn_sinks, &self.watched) {
            return None;
        }

        let token_address = self
            .extractor
            .extract(accounts)
            .unwrap_or_else(|| "unknown".to_string());
        info!(signature = %signature, token = %token_address, "potential LP burn found");

        Some(BurnEvent {
            signature: signature.to_string(),
            token_address,
            observed_at: Utc::now(),
            burn_percent: self.burn_percent,
        })
    }
}
