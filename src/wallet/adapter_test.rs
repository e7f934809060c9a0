//! Unit tests for the wallet connection sequence.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::NetworkDescriptor;
use crate::error::Error;
use crate::session::AccountRole;
use crate::wallet::testing::MockProvider;
use crate::wallet::{
    ConnectPhase, WalletAdapter, WalletCapability, WalletRpcError, CODE_UNRECOGNIZED_CHAIN,
    CODE_USER_REJECTED,
};

const TARGET_HEX: &str = "0x7f7";
const ACCOUNT: &str = "0x1e86542bbbd733ca1e11231a448ba35be4d280a5";

fn adapter_with(mock: MockProvider) -> (Arc<MockProvider>, WalletAdapter) {
    let provider = Arc::new(mock);
    let adapter = WalletAdapter::detect(
        Some(Arc::clone(&provider) as Arc<dyn WalletCapability>),
        NetworkDescriptor::aleph_zero_testnet(),
    )
    .unwrap();
    (provider, adapter)
}

fn rejected() -> WalletRpcError {
    WalletRpcError::new(CODE_USER_REJECTED, "user rejected the request")
}

fn unknown_chain() -> WalletRpcError {
    WalletRpcError::new(CODE_UNRECOGNIZED_CHAIN, "unrecognized chain")
}

// -------------------------------------------------------------------------
// Detection and account authorization
// -------------------------------------------------------------------------

#[test]
fn missing_extension_is_reported_not_thrown() {
    let result = WalletAdapter::detect(None, NetworkDescriptor::aleph_zero_testnet());
    assert!(matches!(result, Err(Error::ProviderNotFound)));
}

#[tokio::test]
async fn first_account_is_taken_without_a_selection_step() {
    let (_, adapter) = adapter_with(
        MockProvider::new().expect(
            "eth_requestAccounts",
            Ok(json!([ACCOUNT, "0x9999999999999999999999999999999999999999"])),
        ),
    );
    assert_eq!(adapter.request_accounts().await.unwrap(), ACCOUNT);
}

#[tokio::test]
async fn denied_authorization_maps_to_no_authorized_accounts() {
    let (_, adapter) =
        adapter_with(MockProvider::new().expect("eth_requestAccounts", Err(rejected())));
    assert!(matches!(
        adapter.request_accounts().await,
        Err(Error::NoAuthorizedAccounts)
    ));
}

#[tokio::test]
async fn empty_account_list_maps_to_no_authorized_accounts() {
    let (_, adapter) =
        adapter_with(MockProvider::new().expect("eth_requestAccounts", Ok(json!([]))));
    assert!(matches!(
        adapter.request_accounts().await,
        Err(Error::NoAuthorizedAccounts)
    ));
}

// -------------------------------------------------------------------------
// Network alignment
// -------------------------------------------------------------------------

#[tokio::test]
async fn matching_chain_issues_no_switch_or_add_request() {
    let (provider, mut adapter) =
        adapter_with(MockProvider::new().expect("eth_chainId", Ok(json!(TARGET_HEX))));

    adapter.ensure_network().await.unwrap();

    assert_eq!(provider.calls().len(), 1);
    assert_eq!(provider.calls_for("wallet_switchEthereumChain"), 0);
    assert_eq!(provider.calls_for("wallet_addEthereumChain"), 0);
}

#[tokio::test]
async fn mismatched_chain_switches_and_verifies() {
    let (provider, mut adapter) = adapter_with(
        MockProvider::new()
            .expect("eth_chainId", Ok(json!("0x1")))
            .expect("wallet_switchEthereumChain", Ok(Value::Null))
            .expect("eth_chainId", Ok(json!(TARGET_HEX))),
    );

    adapter.ensure_network().await.unwrap();

    let calls = provider.calls();
    let (_, params) = calls
        .iter()
        .find(|(method, _)| method == "wallet_switchEthereumChain")
        .unwrap();
    assert_eq!(params[0]["chainId"], TARGET_HEX);
}

#[tokio::test]
async fn unknown_chain_is_added_then_switched_again() {
    let (provider, mut adapter) = adapter_with(
        MockProvider::new()
            .expect("eth_chainId", Ok(json!("0x1")))
            .expect("wallet_switchEthereumChain", Err(unknown_chain()))
            .expect("wallet_addEthereumChain", Ok(Value::Null))
            .expect("wallet_switchEthereumChain", Ok(Value::Null))
            .expect("eth_chainId", Ok(json!(TARGET_HEX))),
    );

    adapter.ensure_network().await.unwrap();

    assert_eq!(provider.calls_for("wallet_switchEthereumChain"), 2);
    let calls = provider.calls();
    let (_, params) = calls
        .iter()
        .find(|(method, _)| method == "wallet_addEthereumChain")
        .unwrap();
    // The add request carries the full fixed descriptor
    assert_eq!(params[0]["chainId"], TARGET_HEX);
    assert_eq!(params[0]["chainName"], "Aleph Zero Testnet EVM");
    assert_eq!(params[0]["nativeCurrency"]["decimals"], 18);
    assert!(params[0]["rpcUrls"].as_array().is_some_and(|u| !u.is_empty()));
}

#[tokio::test]
async fn rejected_switch_maps_to_network_switch_rejected() {
    let (_, mut adapter) = adapter_with(
        MockProvider::new()
            .expect("eth_chainId", Ok(json!("0x1")))
            .expect("wallet_switchEthereumChain", Err(rejected())),
    );
    assert!(matches!(
        adapter.ensure_network().await,
        Err(Error::NetworkSwitchRejected { expected: 2039, .. })
    ));
}

#[tokio::test]
async fn rejected_add_maps_to_network_switch_rejected() {
    let (_, mut adapter) = adapter_with(
        MockProvider::new()
            .expect("eth_chainId", Ok(json!("0x1")))
            .expect("wallet_switchEthereumChain", Err(unknown_chain()))
            .expect("wallet_addEthereumChain", Err(rejected())),
    );
    assert!(matches!(
        adapter.ensure_network().await,
        Err(Error::NetworkSwitchRejected { .. })
    ));
}

#[tokio::test]
async fn silent_non_switch_is_caught_by_the_verification_read() {
    // The wallet claims the switch worked but stays on the old chain
    let (_, mut adapter) = adapter_with(
        MockProvider::new()
            .expect("eth_chainId", Ok(json!("0x1")))
            .expect("wallet_switchEthereumChain", Ok(Value::Null))
            .expect("eth_chainId", Ok(json!("0x1"))),
    );
    assert!(matches!(
        adapter.ensure_network().await,
        Err(Error::NetworkSwitchRejected { .. })
    ));
}

// -------------------------------------------------------------------------
// Full connection sequence
// -------------------------------------------------------------------------

#[tokio::test]
async fn connect_ends_ready_with_a_session() {
    let (_, mut adapter) = adapter_with(
        MockProvider::new()
            .expect("eth_requestAccounts", Ok(json!([ACCOUNT])))
            .expect("eth_chainId", Ok(json!(TARGET_HEX))),
    );

    let session = adapter.connect(AccountRole::Patient).await.unwrap();

    assert_eq!(adapter.phase(), ConnectPhase::Ready);
    assert_eq!(session.address, ACCOUNT);
    assert_eq!(session.provider_name, "SubWallet");
}

#[tokio::test]
async fn connect_ends_failed_on_denied_accounts() {
    let (_, mut adapter) =
        adapter_with(MockProvider::new().expect("eth_requestAccounts", Err(rejected())));

    assert!(adapter.connect(AccountRole::Doctor).await.is_err());
    assert_eq!(adapter.phase(), ConnectPhase::Failed);
}

#[tokio::test]
async fn connect_ends_failed_on_network_rejection() {
    let (_, mut adapter) = adapter_with(
        MockProvider::new()
            .expect("eth_requestAccounts", Ok(json!([ACCOUNT])))
            .expect("eth_chainId", Ok(json!("0x1")))
            .expect("wallet_switchEthereumChain", Err(rejected())),
    );

    assert!(adapter.connect(AccountRole::Patient).await.is_err());
    assert_eq!(adapter.phase(), ConnectPhase::Failed);
}
