//! Wallet provider capability
//!
//! The original dApp reached for a browser-injected global to talk to the
//! wallet extension. Here the extension is an explicit capability handle
//! passed into the adapter and the gateway; nothing reads ambient state.

pub mod adapter;

#[cfg(test)]
mod adapter_test;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::error::{Error as GatewayError, Result};

pub use adapter::{ConnectPhase, WalletAdapter};

/// EIP-1193: the user rejected the request
pub const CODE_USER_REJECTED: i64 = 4001;
/// EIP-1193: the method is not supported by this provider
pub const CODE_UNSUPPORTED_METHOD: i64 = 4200;
/// EIP-3326: `wallet_switchEthereumChain` hit a chain the wallet has never added
pub const CODE_UNRECOGNIZED_CHAIN: i64 = 4902;

/// Error reported by a wallet's request surface, with the provider error
/// code preserved so callers can branch on it
#[derive(Error, Debug, Clone)]
#[error("code {code}: {message}")]
pub struct WalletRpcError {
    pub code: i64,
    pub message: String,
}

impl WalletRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn user_rejected(&self) -> bool {
        self.code == CODE_USER_REJECTED
    }

    pub fn unrecognized_chain(&self) -> bool {
        self.code == CODE_UNRECOGNIZED_CHAIN
    }
}

/// One installed wallet extension, reduced to its JSON-RPC request surface.
///
/// Account and network management methods (`eth_requestAccounts`,
/// `wallet_switchEthereumChain`, ...) go through the same entry point as
/// ledger reads and transaction submission; the extension decides which of
/// them prompt the user.
#[async_trait]
pub trait WalletCapability: Send + Sync {
    /// Human-readable provider name (e.g. "SubWallet")
    fn provider_name(&self) -> &str;

    /// Submit one request to the wallet
    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletRpcError>;
}

/// Resolve the expected extension from an environment's handle slot.
/// `None` means nothing is installed, or an incompatible version that
/// published no handle.
pub fn detect_provider(
    installed: Option<Arc<dyn WalletCapability>>,
) -> Result<Arc<dyn WalletCapability>> {
    installed.ok_or(GatewayError::ProviderNotFound)
}
