//! The polling loop: fetch → dedupe → classify → notify.
//!
//! One task, one candidate at a time, in the order the node returns them.
//! Only failures of the signature fetch count against the endpoint; the
//! classifier and notifier absorb their own errors.

pub mod escalation;

pub use escalation::{CycleErrorState, Recovery, RecoveryPolicy};

use crate::classifier::Classifier;
use crate::ledger::SignatureLedger;
use crate::notify::Notifier;
use crate::rpc::{EndpointPool, RpcError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// Program whose signatures are polled.
    pub program_id: String,
    pub signature_limit: usize,
    /// Base sleep after every cycle.
    pub interval: Duration,
}

/// Counters for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub candidates: usize,
    /// Candidates not seen before.
    pub fresh: usize,
    pub burns: usize,
    pub notified: usize,
}

pub struct Monitor {
    pool: EndpointPool,
    ledger: SignatureLedger,
    classifier: Classifier,
    notifier: Notifier,
    errors: CycleErrorState,
    policy: RecoveryPolicy,
    settings: MonitorSettings,
}

impl Monitor {
    pub fn new(
        pool: EndpointPool,
        ledger: SignatureLedger,
        classifier: Classifier,
        notifier: Notifier,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            pool,
            ledger,
            classifier,
            notifier,
            errors: CycleErrorState::default(),
            policy: RecoveryPolicy::default(),
            settings,
        }
    }

    pub fn with_policy(mut self, policy: RecoveryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn pool(&self) -> &EndpointPool {
        &self.pool
    }

    pub fn ledger(&self) -> &SignatureLedger {
        &self.ledger
    }

    pub fn errors(&self) -> &CycleErrorState {
        &self.errors
    }

    /// One fetch-filter-classify-notify pass. Only the signature fetch can
    /// fail the cycle.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, RpcError> {
        let signatures = self
            .pool
            .get_signatures_for_address(&self.settings.program_id, self.settings.signature_limit)
            .await?;

        let mut report = CycleReport {
            candidates: signatures.len(),
            ..Default::default()
        };

        for info in signatures {
            let sig = info.signature;
            if self.ledger.contains(&sig) {
                continue;
            }
            self.ledger.add(&sig);
            report.fresh += 1;

            if let Some(event) = self.classifier.classify(&self.pool, &sig).await {
                report.burns += 1;
                if self.notifier.notify(&event).await {
                    report.notified += 1;
                }
            }
        }

        Ok(report)
    }

    /// Run a cycle and apply any recovery it calls for (rotation, extra
    /// wait). Returns the recovery taken, if the cycle failed.
    pub async fn step(&mut self) -> Option<Recovery> {
        match self.run_cycle().await {
            Ok(report) => {
                self.errors.record_success();
                debug!(
                    candidates = report.candidates,
                    fresh = report.fresh,
                    burns = report.burns,
                    notified = report.notified,
                    seen = self.ledger.len(),
                    "cycle complete"
                );
                None
            }
            Err(e) => {
                let kind = e.kind();
                let attempt = self.errors.consecutive_failures() + 1;
                let recovery = self.errors.record_failure(kind, &self.policy);
                error!(
                    failures = attempt,
                    kind = %kind,
                    endpoint = %self.pool.current(),
                    error = %e,
                    "monitor error"
                );

                if recovery.escalated {
                    error!(
                        cooldown_secs = recovery.wait.as_secs(),
                        "too many consecutive errors, rotating and cooling down"
                    );
                } else if recovery.rotate {
                    warn!(kind = %kind, wait_secs = recovery.wait.as_secs(), "rotating endpoint");
                }

                if recovery.rotate {
                    self.pool.rotate();
                }
                if !recovery.wait.is_zero() {
                    tokio::time::sleep(recovery.wait).await;
                }
                Some(recovery)
            }
        }
    }

    /// One loop iteration: a step, then the base interval. The base sleep
    /// always follows, even after a recovery wait or cooldown.
    pub async fn tick(&mut self) -> Option<Recovery> {
        let recovery = self.step().await;
        tokio::time::sleep(self.settings.interval).await;
        recovery
    }

    /// Poll until the task is dropped.
    pub async fn run_forever(&mut self) {
        info!(
            program = %self.settings.program_id,
            endpoint = %self.pool.current(),
            interval_secs = self.settings.interval.as_secs(),
            "starting monitor loop"
        );
        loop {
            self.tick().await;
        }
    }
}
