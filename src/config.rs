//! Gateway configuration
//!
//! Contract addresses, the target network descriptor and pinning credentials
//! are deployment configuration, never source constants. Configuration loads
//! from a TOML file or from environment variables; the pinning token is only
//! ever read from the environment.

use std::env;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use crate::chain::abi;
use crate::error::{Error, Result};

/// Native currency entry of a network descriptor
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Everything a wallet needs to register and select the target network.
/// Handed verbatim to the wallet's add-network request.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDescriptor {
    pub chain_id: u64,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

impl NetworkDescriptor {
    /// The network the deployed contracts live on
    pub fn aleph_zero_testnet() -> Self {
        Self {
            chain_id: 2039,
            chain_name: "Aleph Zero Testnet EVM".to_string(),
            native_currency: NativeCurrency {
                name: "AZERO".to_string(),
                symbol: "AZERO".to_string(),
                decimals: 18,
            },
            rpc_urls: vec![
                "https://rpc.alephzero-testnet.gelato.digital".to_string(),
                "https://alephzero-sepolia.drpc.org".to_string(),
            ],
            block_explorer_urls: vec!["https://evm-explorer-testnet.alephzero.org".to_string()],
        }
    }

    /// Chain id in the wallet's hex-quantity form (e.g. `0x7f7`)
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }

    /// Parameter object for `wallet_addEthereumChain`
    pub fn add_chain_params(&self) -> Value {
        json!({
            "chainId": self.chain_id_hex(),
            "chainName": self.chain_name,
            "nativeCurrency": {
                "name": self.native_currency.name,
                "symbol": self.native_currency.symbol,
                "decimals": self.native_currency.decimals,
            },
            "rpcUrls": self.rpc_urls,
            "blockExplorerUrls": self.block_explorer_urls,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.rpc_urls.is_empty() {
            return Err(Error::Config(
                "network descriptor has no RPC endpoints".to_string(),
            ));
        }
        for raw in self.rpc_urls.iter().chain(self.block_explorer_urls.iter()) {
            Url::parse(raw)
                .map_err(|e| Error::Config(format!("invalid URL {raw:?} in network descriptor: {e}")))?;
        }
        Ok(())
    }
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_poll_attempts() -> u32 {
    60
}

/// Contract addresses and ledger polling knobs
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    pub network: NetworkDescriptor,

    /// AppointmentManager contract address (0x-prefixed)
    pub appointment_manager: String,

    /// MedicalFileVault contract address (0x-prefixed)
    pub file_vault: String,

    /// Delay between receipt polls while waiting for inclusion
    #[serde(default = "default_poll_interval_ms")]
    pub receipt_poll_interval_ms: u64,

    /// How many receipt polls before giving up on a pending transaction
    #[serde(default = "default_poll_attempts")]
    pub receipt_poll_attempts: u32,
}

impl GatewayConfig {
    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|e| Error::Config(format!("invalid config file: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `HEALTHCHAIN_*` environment variables with the default
    /// network descriptor. The contract addresses have no defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self {
            network: NetworkDescriptor::aleph_zero_testnet(),
            appointment_manager: require_env("HEALTHCHAIN_APPOINTMENT_MANAGER")?,
            file_vault: require_env("HEALTHCHAIN_FILE_VAULT")?,
            receipt_poll_interval_ms: default_poll_interval_ms(),
            receipt_poll_attempts: default_poll_attempts(),
        };
        if let Ok(raw) = env::var("HEALTHCHAIN_RECEIPT_POLL_INTERVAL_MS") {
            config.receipt_poll_interval_ms = parse_env("HEALTHCHAIN_RECEIPT_POLL_INTERVAL_MS", &raw)?;
        }
        if let Ok(raw) = env::var("HEALTHCHAIN_RECEIPT_POLL_ATTEMPTS") {
            config.receipt_poll_attempts = parse_env("HEALTHCHAIN_RECEIPT_POLL_ATTEMPTS", &raw)?;
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.network.validate()?;
        abi::parse_address(&self.appointment_manager)
            .map_err(|_| Error::Config(format!(
                "appointmentManager {:?} is not a valid contract address",
                self.appointment_manager
            )))?;
        abi::parse_address(&self.file_vault).map_err(|_| {
            Error::Config(format!(
                "fileVault {:?} is not a valid contract address",
                self.file_vault
            ))
        })?;
        if self.receipt_poll_attempts == 0 {
            return Err(Error::Config(
                "receiptPollAttempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Pinning service endpoint and credentials
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinningConfig {
    /// Pinning API base, e.g. `https://api.pinata.cloud`
    pub api_url: String,

    /// Public retrieval gateway base, e.g. `https://gateway.pinata.cloud`
    pub gateway_url: String,

    /// Bearer token. Environment-only; never written to config files.
    #[serde(skip)]
    pub token: String,
}

impl PinningConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            api_url: env::var("HEALTHCHAIN_PINNING_API_URL")
                .unwrap_or_else(|_| "https://api.pinata.cloud".to_string()),
            gateway_url: env::var("HEALTHCHAIN_PINNING_GATEWAY_URL")
                .unwrap_or_else(|_| "https://gateway.pinata.cloud".to_string()),
            token: require_env("HEALTHCHAIN_PINNING_TOKEN")?,
        };
        for raw in [&config.api_url, &config.gateway_url] {
            Url::parse(raw)
                .map_err(|e| Error::Config(format!("invalid pinning URL {raw:?}: {e}")))?;
        }
        Ok(config)
    }
}

fn require_env(key: &str) -> Result<String> {
    env::var(key).map_err(|_| Error::Config(format!("{key} is not set")))
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| Error::Config(format!("{key} has invalid value {raw:?}")))
}
