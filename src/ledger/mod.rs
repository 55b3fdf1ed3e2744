//! Bounded record of signatures already processed.
//!
//! A memory cap, not a correctness guarantee: once a signature is evicted it
//! can be processed (and alerted on) again if the node returns it later.

use std::collections::{HashSet, VecDeque};
use tracing::debug;

pub const DEFAULT_CAPACITY: usize = 10_000;
pub const DEFAULT_RETAIN: usize = 5_000;

#[derive(Debug)]
pub struct SignatureLedger {
    seen: HashSet<String>,
    /// Insertion order, oldest at the front.
    order: VecDeque<String>,
    capacity: usize,
    retain: usize,
}

impl Default for SignatureLedger {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_RETAIN)
    }
}

impl SignatureLedger {
    /// `retain` is clamped to `capacity`.
    pub fn new(capacity: usize, retain: usize) -> Self {
        Self {
            seen: HashSet::with_capacity(capacity + 1),
            order: VecDeque::with_capacity(capacity + 1),
            capacity,
            retain: retain.min(capacity),
        }
    }

    pub fn contains(&self, signature: &str) -> bool {
        self.seen.contains(signature)
    }

    /// Record a signature. Going over capacity evicts the oldest entries
    /// until only the `retain` most recent remain.
    pub fn add(&mut self, signature: &str) {
        if !self.seen.insert(signature.to_string()) {
            return;
        }
        self.order.push_back(signature.to_string());

        if self.order.len() > self.capacity {
            let evict = self.order.len() - self.retain;
            for old in self.order.drain(..evict) {
                self.seen.remove(&old);
            }
            debug!(evicted = evict, kept = self.order.len(), "signature ledger pruned");
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(i: usize) -> String {
        format!("sig-{}", i)
    }

    #[test]
    fn test_contains_after_add() {
        let mut ledger = SignatureLedger::default();
        assert!(!ledger.contains("a"));
        ledger.add("a");
        assert!(ledger.contains("a"));
        ledger.add("a");
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_eviction_keeps_most_recent_half() {
        let mut ledger = SignatureLedger::default();
        for i in 0..DEFAULT_CAPACITY {
            ledger.add(&sig(i));
        }
        assert_eq!(ledger.len(), DEFAULT_CAPACITY);

        // One past the cap triggers eviction.
        ledger.add(&sig(DEFAULT_CAPACITY));
        assert_eq!(ledger.len(), DEFAULT_RETAIN);

        let first_kept = DEFAULT_CAPACITY + 1 - DEFAULT_RETAIN;
        for i in 0..first_kept {
            assert!(!ledger.contains(&sig(i)), "{} should be evicted", i);
        }
        for i in first_kept..=DEFAULT_CAPACITY {
            assert!(ledger.contains(&sig(i)), "{} should be kept", i);
        }
    }

    #[test]
    fn test_size_never_exceeds_cap() {
        let mut ledger = SignatureLedger::default();
        for i in 0..35_000 {
            ledger.add(&sig(i));
            assert!(ledger.len() <= DEFAULT_CAPACITY);
        }
    }

    #[test]
    fn test_eviction_follows_insertion_order() {
        let mut ledger = SignatureLedger::new(4, 2);
        for s in ["z", "a", "m", "b"] {
            ledger.add(s);
        }
        ledger.add("c");
        assert_eq!(ledger.len(), 2);
        assert!(ledger.contains("b"));
        assert!(ledger.contains("c"));
        assert!(!ledger.contains("z"));
        assert!(!ledger.contains("m"));
    }

    #[test]
    fn test_evicted_signature_can_return() {
        let mut ledger = SignatureLedger::new(2, 1);
        ledger.add("a");
        ledger.add("b");
        ledger.add("c");
        assert!(!ledger.contains("a"));
        ledger.add("a");
        assert!(ledger.contains("a"));
    }
}
