//! Wallet connection sequence
//!
//! Obtains exactly one authorized account from the extension and aligns the
//! wallet's active chain with the target network before any ledger write.
//! Wallets that have never added the target chain reject the switch with the
//! unrecognized-chain code; those get an add-network request followed by a
//! second switch. A naive single switch strands exactly those users.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use crate::chain::rpc::LedgerRpc;
use crate::config::NetworkDescriptor;
use crate::error::{Error, Result};
use crate::session::{AccountRole, Session};
use crate::wallet::{detect_provider, WalletCapability, WalletRpcError};

/// Progress of one connection attempt. `Ready` and `Failed` are terminal;
/// there are no automatic retries, the caller re-runs the whole sequence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConnectPhase {
    Idle,
    Detecting,
    RequestingAccounts,
    CheckingNetwork,
    Switching,
    AddingNetwork,
    Ready,
    Failed,
}

pub struct WalletAdapter {
    provider: Arc<dyn WalletCapability>,
    network: NetworkDescriptor,
    phase: ConnectPhase,
}

impl WalletAdapter {
    /// Resolve the extension handle. Fails with `ProviderNotFound` when the
    /// environment has no compatible extension installed.
    pub fn detect(
        installed: Option<Arc<dyn WalletCapability>>,
        network: NetworkDescriptor,
    ) -> Result<Self> {
        let provider = detect_provider(installed)?;
        debug!(provider = provider.provider_name(), "wallet extension detected");
        Ok(Self {
            provider,
            network,
            phase: ConnectPhase::Idle,
        })
    }

    pub fn phase(&self) -> ConnectPhase {
        self.phase
    }

    pub fn provider(&self) -> Arc<dyn WalletCapability> {
        Arc::clone(&self.provider)
    }

    /// Run the full connection sequence: account authorization, then the
    /// network check. Returns the session for the authorized account.
    #[instrument(skip(self), fields(provider = self.provider.provider_name()))]
    pub async fn connect(&mut self, role: AccountRole) -> Result<Session> {
        self.phase = ConnectPhase::RequestingAccounts;
        let address = match self.request_accounts().await {
            Ok(address) => address,
            Err(e) => {
                self.phase = ConnectPhase::Failed;
                return Err(e);
            }
        };

        self.phase = ConnectPhase::CheckingNetwork;
        if let Err(e) = self.ensure_network().await {
            self.phase = ConnectPhase::Failed;
            return Err(e);
        }

        self.phase = ConnectPhase::Ready;
        let session = Session::new(address, role, self.provider.provider_name());
        info!(address = %session.short_address(), "wallet connected");
        Ok(session)
    }

    /// Request account authorization and take the first returned address.
    /// The wallet's own ordering decides; there is no selection UI.
    pub async fn request_accounts(&self) -> Result<String> {
        let accounts = match self.provider.request("eth_requestAccounts", json!([])).await {
            Ok(accounts) => accounts,
            Err(e) if e.user_rejected() => return Err(Error::NoAuthorizedAccounts),
            Err(e) => return Err(e.into()),
        };
        match accounts.as_array().and_then(|a| a.first()).and_then(Value::as_str) {
            Some(address) if !address.is_empty() => Ok(address.to_string()),
            _ => Err(Error::NoAuthorizedAccounts),
        }
    }

    /// Align the wallet's active chain with the target network.
    ///
    /// Already on target: no request is issued. Otherwise: switch; on the
    /// unrecognized-chain code, add the network from the descriptor and
    /// switch again. The chain id is re-read afterwards and only a match
    /// counts as success, so this ends on the target network or with
    /// `NetworkSwitchRejected`, never in between.
    #[instrument(skip(self), fields(target = self.network.chain_id))]
    pub async fn ensure_network(&mut self) -> Result<()> {
        let current = self.chain_id().await?;
        if current == self.network.chain_id {
            debug!(chain_id = current, "wallet already on target network");
            return Ok(());
        }

        self.phase = ConnectPhase::Switching;
        let switched = self.switch_chain().await;
        match switched {
            Ok(()) => {}
            Err(e) if e.unrecognized_chain() => {
                info!(
                    chain = %self.network.chain_name,
                    "target network unknown to wallet, requesting registration"
                );
                self.phase = ConnectPhase::AddingNetwork;
                self.add_chain().await.map_err(|e| self.rejected(e))?;
                self.phase = ConnectPhase::Switching;
                self.switch_chain().await.map_err(|e| self.rejected(e))?;
            }
            Err(e) => return Err(self.rejected(e)),
        }

        let now = self.chain_id().await?;
        if now != self.network.chain_id {
            warn!(chain_id = now, "wallet reports the old chain after switching");
            return Err(Error::NetworkSwitchRejected {
                expected: self.network.chain_id,
                reason: format!("wallet is still on chain {now}"),
            });
        }
        Ok(())
    }

    async fn chain_id(&self) -> Result<u64> {
        LedgerRpc::new(Arc::clone(&self.provider)).chain_id().await
    }

    async fn switch_chain(&self) -> Result<(), WalletRpcError> {
        self.provider
            .request(
                "wallet_switchEthereumChain",
                json!([{ "chainId": self.network.chain_id_hex() }]),
            )
            .await
            .map(|_| ())
    }

    async fn add_chain(&self) -> Result<(), WalletRpcError> {
        self.provider
            .request(
                "wallet_addEthereumChain",
                json!([self.network.add_chain_params()]),
            )
            .await
            .map(|_| ())
    }

    fn rejected(&self, source: WalletRpcError) -> Error {
        Error::NetworkSwitchRejected {
            expected: self.network.chain_id,
            reason: source.to_string(),
        }
    }
}
