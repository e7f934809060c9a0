//! HealthChain Sentinel ledger gateway
//!
//! The chain-facing core of the HealthChain Sentinel records dApp: a wallet
//! provider adapter, a contract gateway for appointment and file-anchoring
//! writes, and a pin-then-anchor upload pipeline.
//!
//! The ledger and the content-addressed storage network stay authoritative
//! for all appointment, file and identity data. Nothing in this crate keeps
//! its own source of truth; local state is limited to one connected-account
//! session and the transient values of an operation in flight.

pub mod chain;
pub mod config;
pub mod error;
pub mod gateway;
pub mod session;
pub mod storage;
pub mod upload;
pub mod wallet;

pub use error::{Error, Result};
