//! Pinning client against a mocked Pinata-compatible API.

use healthchain_gateway::config::PinningConfig;
use healthchain_gateway::error::Error;
use healthchain_gateway::storage::pinata::PinataStore;
use healthchain_gateway::storage::{ContentStore, PinMetadata};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CID: &str = "QmSfEnXkDtZoZ1BWuSFpVZ7Zk2Wb9T7rXoJ6sZp5e4vQb1";

fn store_for(server: &MockServer) -> PinataStore {
    PinataStore::new(PinningConfig {
        api_url: server.uri(),
        gateway_url: "https://gateway.test".to_string(),
        token: "test-token".to_string(),
    })
    .unwrap()
}

fn sample_metadata(data: &[u8]) -> PinMetadata {
    PinMetadata::for_bytes("scan.pdf", "application/pdf", data)
}

#[tokio::test]
async fn pin_posts_the_file_and_returns_the_cid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "IpfsHash": CID,
            "PinSize": 12,
            "Timestamp": "2025-04-08T10:30:00.000Z",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server);
    let data = b"patient scan".to_vec();
    let cid = store.pin(data.clone(), sample_metadata(&data)).await.unwrap();
    assert_eq!(cid, CID);
}

#[tokio::test]
async fn quota_rejection_maps_to_pinning_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let data = b"patient scan".to_vec();
    let err = store.pin(data.clone(), sample_metadata(&data)).await.unwrap_err();
    assert!(matches!(err, Error::PinningFailed(_)));
}

#[tokio::test]
async fn response_without_a_cid_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let data = b"patient scan".to_vec();
    let err = store.pin(data.clone(), sample_metadata(&data)).await.unwrap_err();
    assert!(matches!(err, Error::PinningFailed(_)));
}

#[test]
fn retrieval_urls_join_the_public_gateway() {
    let store = PinataStore::new(PinningConfig {
        api_url: "https://api.pinata.cloud".to_string(),
        gateway_url: "https://gateway.test/".to_string(),
        token: "test-token".to_string(),
    })
    .unwrap();
    assert_eq!(
        store.retrieval_url(CID),
        format!("https://gateway.test/ipfs/{CID}")
    );
}

#[test]
fn pin_metadata_measures_and_digests() {
    let metadata = sample_metadata(b"patient scan");
    assert_eq!(metadata.size, 12);
    assert_eq!(metadata.content_type, "application/pdf");
    // sha256 of "patient scan"
    assert_eq!(metadata.sha256.len(), 64);
    assert!(metadata.sha256.chars().all(|c| c.is_ascii_hexdigit()));
}
