//! Failure counting and per-kind recovery for the polling loop.

use crate::rpc::ErrorKind;
use std::time::Duration;

/// What to do after a failed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recovery {
    pub rotate: bool,
    /// Extra wait on top of the base interval.
    pub wait: Duration,
    /// Set when the failure streak hit the threshold.
    pub escalated: bool,
}

/// Waits and thresholds for each failure kind.
#[derive(Debug, Clone)]
pub struct RecoveryPolicy {
    pub rate_limited_wait: Duration,
    pub forbidden_wait: Duration,
    pub unavailable_wait: Duration,
    pub connection_wait: Duration,
    /// Failures tolerated before escalating.
    pub max_consecutive_failures: u32,
    pub cooldown: Duration,
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        Self {
            rate_limited_wait: Duration::from_secs(30),
            forbidden_wait: Duration::from_secs(5),
            unavailable_wait: Duration::from_secs(10),
            connection_wait: Duration::from_secs(10),
            max_consecutive_failures: 10,
            cooldown: Duration::from_secs(60),
        }
    }
}

impl RecoveryPolicy {
    /// Recovery for a single failure of `kind`, ignoring escalation.
    pub fn for_kind(&self, kind: ErrorKind) -> Recovery {
        let (rotate, wait) = match kind {
            ErrorKind::RateLimited => (true, self.rate_limited_wait),
            ErrorKind::Forbidden => (true, self.forbidden_wait),
            ErrorKind::Unavailable => (true, self.unavailable_wait),
            ErrorKind::Connection => (false, self.connection_wait),
            ErrorKind::Other => (false, Duration::ZERO),
        };
        Recovery {
            rotate,
            wait,
            escalated: false,
        }
    }
}

/// Consecutive cycle failures.
#[derive(Debug, Clone, Default)]
pub struct CycleErrorState {
    consecutive_failures: u32,
}

impl CycleErrorState {
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Count a failure and decide the recovery. Past the threshold this is
    /// always rotate + cooldown, and the counter starts over.
    pub fn record_failure(&mut self, kind: ErrorKind, policy: &RecoveryPolicy) -> Recovery {
        self.consecutive_failures += 1;
        if self.consecutive_failures > policy.max_consecutive_failures {
            self.consecutive_failures = 0;
            return Recovery {
                rotate: true,
                wait: policy.cooldown,
                escalated: true,
            };
        }
        policy.for_kind(kind)
    }
}
