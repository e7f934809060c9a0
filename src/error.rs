//! Central error types for the HealthChain gateway.
//!
//! Uses `thiserror` for ergonomic, type-safe error handling. Every failure
//! here is terminal for the current user action: nothing is retried
//! automatically, and no error is downgraded to a default value.

use thiserror::Error;

use crate::wallet::WalletRpcError;

/// Central error type for the gateway crate
#[derive(Error, Debug)]
pub enum Error {
    /// The expected wallet extension is not installed (or published no handle)
    #[error("no compatible wallet extension detected")]
    ProviderNotFound,

    /// The wallet returned no accounts, or the user denied authorization
    #[error("wallet returned no authorized accounts")]
    NoAuthorizedAccounts,

    /// The wallet did not end up on the target chain
    #[error("wallet did not switch to chain {expected}: {reason}")]
    NetworkSwitchRejected { expected: u64, reason: String },

    /// A gateway operation ran before an account was bound
    #[error("gateway not initialized: connect a wallet account first")]
    GatewayUninitialized,

    /// The transaction was included but reverted by the contract
    #[error("transaction {hash} reverted on-chain")]
    TransactionReverted { hash: String },

    /// Inclusion succeeded but the expected event was not emitted.
    /// Signals ABI or contract-version drift; never treated as success.
    #[error("transaction {hash} included but no {event} event was emitted")]
    EventNotFound { hash: String, event: &'static str },

    /// The content-addressed storage network rejected or dropped the pin
    #[error("pinning to content storage failed: {0}")]
    PinningFailed(String),

    /// A duplicate submission was suppressed by the in-flight guard
    #[error("another {operation} is already in flight")]
    OperationInFlight { operation: &'static str },

    /// The receipt poll budget ran out before the transaction was included
    #[error("transaction {hash} not included after {attempts} receipt polls")]
    InclusionTimeout { hash: String, attempts: u32 },

    /// The pin succeeded but the on-ledger anchor write failed.
    /// The identifier stays valid; retry the anchor alone.
    #[error("content {content_id} pinned but anchoring failed: {source}")]
    AnchorFailed {
        content_id: String,
        #[source]
        source: Box<Error>,
    },

    /// A request was rejected before reaching the ledger
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Error reported by the wallet's RPC surface
    #[error("wallet RPC error: {0}")]
    WalletRpc(#[from] WalletRpcError),

    /// HTTP request error (from reqwest)
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The ledger answered with something the codec cannot interpret
    #[error("malformed ledger response: {0}")]
    MalformedResponse(String),

    /// Local I/O error (session storage, config files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for gateway operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Whether repeating the same action unchanged can plausibly succeed.
    /// Retrying is always the user's call; the gateway never does it.
    pub fn is_recoverable_by_retry(&self) -> bool {
        matches!(
            self,
            Error::WalletRpc(_)
                | Error::Http(_)
                | Error::PinningFailed(_)
                | Error::OperationInFlight { .. }
                | Error::InclusionTimeout { .. }
        )
    }

    /// The pinned content identifier rescued from a partial upload failure
    pub fn pinned_content_id(&self) -> Option<&str> {
        match self {
            Error::AnchorFailed { content_id, .. } => Some(content_id),
            _ => None,
        }
    }

    /// Convert to a human-readable message for the UI layer
    pub fn user_message(&self) -> String {
        match self {
            Error::ProviderNotFound => {
                "Wallet extension not detected. Install it and reload.".to_string()
            }
            Error::NoAuthorizedAccounts => {
                "No wallet account authorized. Approve the connection request.".to_string()
            }
            Error::NetworkSwitchRejected { expected, .. } => {
                format!("The wallet stayed on the wrong network (expected chain {expected}).")
            }
            Error::GatewayUninitialized => "Connect a wallet before submitting.".to_string(),
            Error::TransactionReverted { .. } => {
                "The contract rejected the transaction.".to_string()
            }
            Error::EventNotFound { event, .. } => {
                format!("The transaction went through but no {event} confirmation was found.")
            }
            Error::PinningFailed(msg) => format!("File upload failed: {msg}"),
            Error::OperationInFlight { operation } => {
                format!("A {operation} is already running; wait for it to finish.")
            }
            Error::AnchorFailed { content_id, .. } => {
                format!("File {content_id} is stored but not yet recorded on-chain; retry the recording step.")
            }
            _ => self.to_string(),
        }
    }
}
