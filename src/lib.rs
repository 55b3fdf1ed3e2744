//! Solana LP burn monitor.
//!
//! Polls the Raydium AMM program for recent signatures, flags transactions
//! that look like liquidity-pool burns and posts alerts to Telegram.

pub mod classifier;
pub mod config;
pub mod health;
pub mod ledger;
pub mod metadata;
pub mod monitor;
pub mod notify;
pub mod rpc;
pub mod shutdown;

#[cfg(test)]
mod testing;
