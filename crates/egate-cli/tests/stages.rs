//! Stage tests against mock chain, key-management, and pinning services.
//!
//! Each test builds a temporary working directory and calls the stage
//! function with explicit configuration pointing at wiremock servers.

use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use egate_chain::{ChainConfig, ChainError, Flag};
use egate_cli::decrypt::{decrypt, DecryptArgs, Source};
use egate_cli::deploy::{deploy, DeployArgs};
use egate_cli::deposit::{deposit, DepositArgs};
use egate_cli::encrypt::{encrypt, EncryptArgs, Layout};
use egate_cli::release::{release, ReleaseArgs};
use egate_cli::status::{status, StatusArgs};
use egate_cli::workspace::{CONDITIONS_FILE, CONTRACT_ADDRESS_FILE, ENCRYPTED_KEY_FILE, MANIFEST_FILE};
use egate_cli::{Workspace, DEFAULT_ASSET};
use egate_core::{
    BundleManifest, Cid, CidManifest, ConditionSet, EncryptedAssetBundle, EthAddress, SplitManifest,
    Wei,
};
use egate_crypto::Wallet;
use egate_kms::KmsConfig;
use egate_pin::PinConfig;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{any, body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const BUYER_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
const BLOCKHASH: &str = "0x4c1b9f8e2a7d3c6b5a4f3e2d1c0b9a8f7e6d5c4b3a2f1e0d9c8b7a6f5e4d3c2b";

const ASSET_CID: &str = "QmAssetBundle1111111111111111111111111111111111";
const CONDITIONS_CID: &str = "QmConditions22222222222222222222222222222222222";
const CIPHERTEXT_CID: &str = "QmCiphertext33333333333333333333333333333333333";
const HASH_CID: &str = "QmHash444444444444444444444444444444444444444444";
const KEY_CID: &str = "QmKey55555555555555555555555555555555555555555555";

const ESCROW_ARTIFACT: &str = r#"{
  "abi": [
    {"type":"constructor","inputs":[{"name":"_seller","type":"address"}],"stateMutability":"nonpayable"},
    {"type":"function","name":"deposit","inputs":[],"outputs":[],"stateMutability":"payable"},
    {"type":"function","name":"releaseFunds","inputs":[],"outputs":[],"stateMutability":"nonpayable"},
    {"type":"function","name":"isFundsDeposited","inputs":[],"outputs":[{"name":"","type":"bool"}],"stateMutability":"view"},
    {"type":"function","name":"isFundsReleased","inputs":[],"outputs":[{"name":"","type":"bool"}],"stateMutability":"view"}
  ],
  "bytecode": {"object": "0x6080604052"}
}"#;

// -- Fixtures ----------------------------------------------------------------

fn contract() -> EthAddress {
    CONTRACT.parse().unwrap()
}

fn buyer() -> Wallet {
    Wallet::from_hex(BUYER_KEY).unwrap()
}

fn workspace_with_contract() -> (TempDir, Workspace) {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    ws.write_contract_address(&contract()).unwrap();
    std::fs::write(dir.path().join("Escrow.json"), ESCROW_ARTIFACT).unwrap();
    (dir, ws)
}

fn chain_config(server: &MockServer) -> ChainConfig {
    ChainConfig::local_mock(server.uri().parse().unwrap())
}

fn kms_config(server: &MockServer) -> KmsConfig {
    KmsConfig::local_mock(server.uri().parse().unwrap())
}

fn pin_config(server: &MockServer) -> PinConfig {
    PinConfig::local_mock(server.uri().parse().unwrap(), "key-1", "secret-1")
}

fn deposit_args() -> DepositArgs {
    DepositArgs {
        artifact: PathBuf::from("Escrow.json"),
        amount: None,
        force: false,
    }
}

fn rpc_ok(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "result": result }))
}

async fn mount_flag(server: &MockServer, flag: Flag, value: bool) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_call" })))
        .and(body_string_contains(hex::encode(flag.selector())))
        .respond_with(rpc_ok(json!(format!("0x{:064x}", u8::from(value)))))
        .mount(server)
        .await;
}

/// A server that fails the test if it sees any request.
async fn untouchable() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    server
}

struct WrapKey;

impl Respond for WrapKey {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        let key = BASE64.decode(body["symmetricKey"].as_str().unwrap()).unwrap();
        ResponseTemplate::new(200).set_body_json(json!({ "encryptedSymmetricKey": hex::encode(key) }))
    }
}

struct UnwrapKey;

impl Respond for UnwrapKey {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        if body["sessionSigs"].as_object().map_or(true, |m| m.is_empty()) {
            return ResponseTemplate::new(401).set_body_string("missing session signatures");
        }
        let key = hex::decode(body["toDecrypt"].as_str().unwrap()).unwrap();
        ResponseTemplate::new(200).set_body_json(json!({ "symmetricKey": BASE64.encode(key) }))
    }
}

async fn mock_kms(handshakes: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/web/handshake"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "latestBlockhash": BLOCKHASH,
            "nodeVersion": "0.1.0"
        })))
        .expect(handshakes)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/web/encryption/store"))
        .respond_with(WrapKey)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/web/encryption/retrieve"))
        .respond_with(UnwrapKey)
        .mount(&server)
        .await;
    server
}

async fn mount_pin(server: &MockServer, file_name: &str, cid: &str) {
    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .and(body_string_contains(format!("filename=\"{file_name}\"")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "IpfsHash": cid })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_gateway(server: &MockServer, cid: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/ipfs/{cid}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

// -- Chain stages --------------------------------------------------------------

#[tokio::test]
async fn deposit_refuses_when_already_deposited() {
    let (_dir, ws) = workspace_with_contract();
    let server = MockServer::start().await;
    mount_flag(&server, Flag::Deposited, true).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_sendRawTransaction" })))
        .respond_with(rpc_ok(json!("0x00")))
        .expect(0)
        .mount(&server)
        .await;

    let amount = Wei::parse_ether("0.001").unwrap();
    let err = deposit(&deposit_args(), &ws, chain_config(&server), buyer(), amount)
        .await
        .unwrap_err();
    let chain_err = err.downcast_ref::<ChainError>().unwrap();
    assert!(matches!(chain_err, ChainError::AlreadyDeposited { .. }), "got {chain_err:?}");
}

#[tokio::test]
async fn deposit_without_contract_file_makes_no_requests() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Escrow.json"), ESCROW_ARTIFACT).unwrap();
    let ws = Workspace::new(dir.path());
    let server = untouchable().await;

    let err = deposit(&deposit_args(), &ws, chain_config(&server), buyer(), Wei(1))
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains(CONTRACT_ADDRESS_FILE));
}

#[tokio::test]
async fn deploy_without_artifact_makes_no_requests() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    let server = untouchable().await;
    let args = DeployArgs {
        artifact: PathBuf::from("Escrow.json"),
        seller: None,
    };
    let seller: EthAddress = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".parse().unwrap();

    let err = deploy(&args, &ws, chain_config(&server), buyer(), seller)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("Escrow.json"), "got {err:#}");
    assert!(!dir.path().join(CONTRACT_ADDRESS_FILE).exists());
}

#[tokio::test]
async fn deposit_with_incomplete_artifact_makes_no_requests() {
    let (dir, ws) = workspace_with_contract();
    std::fs::write(
        dir.path().join("Escrow.json"),
        r#"{"abi":[{"type":"function","name":"deposit","inputs":[]}],"bytecode":"0x00"}"#,
    )
    .unwrap();
    let server = untouchable().await;

    let err = deposit(&deposit_args(), &ws, chain_config(&server), buyer(), Wei(1))
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("isFundsDeposited"));
}

#[tokio::test]
async fn release_refuses_when_nothing_deposited() {
    let (_dir, ws) = workspace_with_contract();
    let server = MockServer::start().await;
    mount_flag(&server, Flag::Deposited, false).await;
    mount_flag(&server, Flag::Released, false).await;

    let args = ReleaseArgs {
        artifact: PathBuf::from("Escrow.json"),
        force: false,
    };
    let err = release(&args, &ws, chain_config(&server), buyer())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ChainError>(),
        Some(ChainError::NotDeposited { .. })
    ));
}

#[tokio::test]
async fn status_reads_both_flags() {
    let (_dir, ws) = workspace_with_contract();
    let server = MockServer::start().await;
    mount_flag(&server, Flag::Deposited, true).await;
    mount_flag(&server, Flag::Released, false).await;

    let code = status(&StatusArgs {}, &ws, chain_config(&server)).await.unwrap();
    assert_eq!(code, 0);
}

#[tokio::test]
async fn status_rejects_malformed_manifest_before_rpc() {
    let (dir, ws) = workspace_with_contract();
    std::fs::write(dir.path().join(MANIFEST_FILE), "{\"unexpected\": true}").unwrap();
    let server = untouchable().await;

    let err = status(&StatusArgs {}, &ws, chain_config(&server)).await.unwrap_err();
    assert!(format!("{err:#}").contains(MANIFEST_FILE));
}

// -- Encrypt / decrypt ---------------------------------------------------------

#[tokio::test]
async fn encrypt_bundle_then_decrypt_pinned() {
    let (_dir, ws) = workspace_with_contract();
    let kms = mock_kms(2).await;
    let pin = MockServer::start().await;
    mount_pin(&pin, "encryptedAsset.json", ASSET_CID).await;
    mount_pin(&pin, "accessControlConditions.json", CONDITIONS_CID).await;

    let args = EncryptArgs {
        layout: Layout::Bundle,
        asset: None,
        asset_file: None,
    };
    encrypt(&args, &ws, kms_config(&kms), pin_config(&pin), "ethereum")
        .await
        .unwrap();

    let manifest = ws.read_manifest().unwrap();
    assert_eq!(
        manifest,
        CidManifest::Bundle(BundleManifest {
            encrypted_asset_cid: Cid::new(ASSET_CID).unwrap(),
            access_control_conditions_cid: Cid::new(CONDITIONS_CID).unwrap(),
        })
    );

    // Serve back exactly what was pinned.
    let (bundle, conditions) = ws.read_cache().unwrap();
    mount_gateway(&pin, ASSET_CID, serde_json::to_string_pretty(&bundle).unwrap()).await;
    mount_gateway(&pin, CONDITIONS_CID, conditions.to_json_pretty().unwrap()).await;

    let out = PathBuf::from("asset.out");
    let args = DecryptArgs {
        source: Source::Pinned,
        output: Some(out.clone()),
    };
    decrypt(&args, &ws, kms_config(&kms), pin_config(&pin), "ethereum", buyer())
        .await
        .unwrap();
    assert_eq!(std::fs::read(ws.resolve(&out)).unwrap(), DEFAULT_ASSET.as_bytes());
}

#[tokio::test]
async fn encrypt_split_pins_every_piece() {
    let (_dir, ws) = workspace_with_contract();
    let kms = mock_kms(1).await;
    let pin = MockServer::start().await;
    mount_pin(&pin, "encryptedAsset.txt", CIPHERTEXT_CID).await;
    mount_pin(&pin, "dataToEncryptHash.txt", HASH_CID).await;
    mount_pin(&pin, "encryptedSymmetricKey.txt", KEY_CID).await;
    mount_pin(&pin, "accessControlConditions.json", CONDITIONS_CID).await;

    let args = EncryptArgs {
        layout: Layout::Split,
        asset: Some("deed".into()),
        asset_file: None,
    };
    encrypt(&args, &ws, kms_config(&kms), pin_config(&pin), "ethereum")
        .await
        .unwrap();

    let CidManifest::Split(manifest) = ws.read_manifest().unwrap() else {
        panic!("expected split manifest");
    };
    assert_eq!(manifest.ciphertext_cid.as_str(), CIPHERTEXT_CID);
    assert_eq!(manifest.encrypted_symmetric_key_cid.unwrap().as_str(), KEY_CID);
}

#[tokio::test]
async fn encrypt_without_credentials_makes_no_requests() {
    let (_dir, ws) = workspace_with_contract();
    let kms = untouchable().await;
    let pin = untouchable().await;
    let mut pin_config = pin_config(&pin);
    pin_config.credentials = None;

    let args = EncryptArgs {
        layout: Layout::Bundle,
        asset: None,
        asset_file: None,
    };
    assert!(encrypt(&args, &ws, kms_config(&kms), pin_config, "ethereum")
        .await
        .is_err());
}

#[tokio::test]
async fn legacy_split_manifest_uses_local_key() {
    let (_dir, ws) = workspace_with_contract();
    let kms = mock_kms(2).await;
    let pin = MockServer::start().await;
    mount_pin(&pin, "encryptedAsset.json", ASSET_CID).await;
    mount_pin(&pin, "accessControlConditions.json", CONDITIONS_CID).await;

    let args = EncryptArgs {
        layout: Layout::Bundle,
        asset: Some("legacy asset".into()),
        asset_file: None,
    };
    encrypt(&args, &ws, kms_config(&kms), pin_config(&pin), "ethereum")
        .await
        .unwrap();

    // Rewrite as a split manifest from an older run: no key CID.
    let (bundle, conditions) = ws.read_cache().unwrap();
    ws.write_manifest(&CidManifest::Split(SplitManifest {
        ciphertext_cid: Cid::new(CIPHERTEXT_CID).unwrap(),
        data_to_encrypt_hash_cid: Cid::new(HASH_CID).unwrap(),
        encrypted_symmetric_key_cid: None,
        access_control_conditions_cid: Cid::new(CONDITIONS_CID).unwrap(),
    }))
    .unwrap();
    mount_gateway(&pin, CIPHERTEXT_CID, bundle.ciphertext.clone()).await;
    mount_gateway(&pin, HASH_CID, bundle.data_to_encrypt_hash.clone()).await;
    mount_gateway(&pin, CONDITIONS_CID, conditions.to_json_pretty().unwrap()).await;

    let args = DecryptArgs {
        source: Source::Pinned,
        output: Some(PathBuf::from("legacy.out")),
    };
    decrypt(&args, &ws, kms_config(&kms), pin_config(&pin), "ethereum", buyer())
        .await
        .unwrap();
    assert_eq!(
        std::fs::read(ws.resolve(&PathBuf::from("legacy.out"))).unwrap(),
        b"legacy asset"
    );
}

#[tokio::test]
async fn legacy_split_manifest_without_local_key_fails_before_network() {
    let (dir, ws) = workspace_with_contract();
    ws.write_manifest(&CidManifest::Split(SplitManifest {
        ciphertext_cid: Cid::new(CIPHERTEXT_CID).unwrap(),
        data_to_encrypt_hash_cid: Cid::new(HASH_CID).unwrap(),
        encrypted_symmetric_key_cid: None,
        access_control_conditions_cid: Cid::new(CONDITIONS_CID).unwrap(),
    }))
    .unwrap();
    assert!(!dir.path().join(ENCRYPTED_KEY_FILE).exists());
    let kms = untouchable().await;
    let pin = untouchable().await;

    let args = DecryptArgs {
        source: Source::Pinned,
        output: None,
    };
    let err = decrypt(&args, &ws, kms_config(&kms), pin_config(&pin), "ethereum", buyer())
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains(ENCRYPTED_KEY_FILE));
}

#[tokio::test]
async fn malformed_manifest_fails_before_network() {
    let (dir, ws) = workspace_with_contract();
    std::fs::write(dir.path().join(MANIFEST_FILE), "not json").unwrap();
    let kms = untouchable().await;
    let pin = untouchable().await;

    let args = DecryptArgs {
        source: Source::Pinned,
        output: None,
    };
    let err = decrypt(&args, &ws, kms_config(&kms), pin_config(&pin), "ethereum", buyer())
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains(MANIFEST_FILE));
}

#[tokio::test]
async fn pinned_conditions_for_another_contract_are_refused() {
    let (_dir, ws) = workspace_with_contract();
    ws.write_manifest(&CidManifest::Bundle(BundleManifest {
        encrypted_asset_cid: Cid::new(ASSET_CID).unwrap(),
        access_control_conditions_cid: Cid::new(CONDITIONS_CID).unwrap(),
    }))
    .unwrap();
    let other: EthAddress = "0x0000000000000000000000000000000000000001".parse().unwrap();
    let pin = MockServer::start().await;
    mount_gateway(
        &pin,
        CONDITIONS_CID,
        ConditionSet::escrow_release(&other, "ethereum").to_json_pretty().unwrap(),
    )
    .await;
    let kms = untouchable().await;

    let args = DecryptArgs {
        source: Source::Pinned,
        output: None,
    };
    let err = decrypt(&args, &ws, kms_config(&kms), pin_config(&pin), "ethereum", buyer())
        .await
        .unwrap_err();
    assert!(err.to_string().contains(CONDITIONS_CID), "got {err:#}");
}

#[tokio::test]
async fn local_cache_with_mismatched_conditions_fails_before_network() {
    let (_dir, ws) = workspace_with_contract();
    let other: EthAddress = "0x0000000000000000000000000000000000000001".parse().unwrap();
    let bundle = EncryptedAssetBundle {
        ciphertext: BASE64.encode([0u8; 40]),
        data_to_encrypt_hash: hex::encode([1u8; 32]),
        encrypted_symmetric_key: "abcd".into(),
    };
    ws.write_cache(&bundle, &ConditionSet::escrow_release(&other, "ethereum"))
        .unwrap();
    let kms = untouchable().await;
    let pin = untouchable().await;

    let args = DecryptArgs {
        source: Source::Local,
        output: None,
    };
    let err = decrypt(&args, &ws, kms_config(&kms), pin_config(&pin), "ethereum", buyer())
        .await
        .unwrap_err();
    assert!(err.to_string().contains(CONDITIONS_FILE));
}

#[tokio::test]
async fn local_cache_decrypts_without_pinning_service() {
    let (_dir, ws) = workspace_with_contract();
    let kms = mock_kms(2).await;
    let pin = MockServer::start().await;
    mount_pin(&pin, "encryptedAsset.json", ASSET_CID).await;
    mount_pin(&pin, "accessControlConditions.json", CONDITIONS_CID).await;

    let args = EncryptArgs {
        layout: Layout::Bundle,
        asset: Some("cached asset".into()),
        asset_file: None,
    };
    encrypt(&args, &ws, kms_config(&kms), pin_config(&pin), "ethereum")
        .await
        .unwrap();

    let gateway = untouchable().await;
    let args = DecryptArgs {
        source: Source::Local,
        output: Some(PathBuf::from("cached.out")),
    };
    decrypt(&args, &ws, kms_config(&kms), pin_config(&gateway), "ethereum", buyer())
        .await
        .unwrap();
    assert_eq!(
        std::fs::read(ws.resolve(&PathBuf::from("cached.out"))).unwrap(),
        b"cached asset"
    );
}
