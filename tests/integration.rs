//! Integration tests for the campaign admin API.
//!
//! The server runs on an ephemeral port with the in-memory key-value store
//! and a temporary directory for the campaign document, so no Redis is
//! needed.

use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use campaign_admin::{
    auth::{derive_nonce, middleware::AppState},
    config::{Allowlist, Config, DEFAULT_NONCE_TTL_SECS, DEFAULT_SESSION_TTL_SECS},
    models::Address,
    routes,
    storage::{KvStore, MemoryKv},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

const OPERATOR_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

struct TestServer {
    base_url: String,
    kv: MemoryKv,
    _dir: TempDir,
}

/// Sign `message` with `key`, returning (address, hex signature).
fn sign(key: &str, message: &str) -> (String, String) {
    let signer: PrivateKeySigner = key.parse().unwrap();
    let signature = signer.sign_message_sync(message.as_bytes()).unwrap();
    (
        format!("0x{}", hex::encode(signer.address().as_slice())),
        format!("0x{}", hex::encode(signature.as_bytes())),
    )
}

fn operator_address() -> String {
    sign(OPERATOR_KEY, "").0
}

/// Spin up a test server and return its handle.
async fn spawn_test_server(allowed: &[&str]) -> TestServer {
    let dir = TempDir::new().unwrap();
    let kv = MemoryKv::new();

    let config = Config {
        allowlist: allowed.iter().map(|a| Address::new(*a)).collect::<Allowlist>(),
        redis_url: "redis://unused".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        campaigns_storage_path: dir.path().to_path_buf(),
        campaigns_document_key: "campaigns.toml".to_string(),
        max_body_bytes: 65_536,
        session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        nonce_ttl_secs: DEFAULT_NONCE_TTL_SECS,
    };

    let state = AppState::new(config, Arc::new(kv.clone()));
    let app = routes::api_router()
        .layer(axum::extract::DefaultBodyLimit::max(65_536))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{}", addr),
        kv,
        _dir: dir,
    }
}

async fn authenticate(
    client: &reqwest::Client,
    server: &TestServer,
    address: &str,
    message: &str,
    signature: &str,
) -> reqwest::Response {
    client
        .post(format!("{}/auth", server.base_url))
        .json(&json!({ "address": address, "message": message, "signature": signature }))
        .send()
        .await
        .unwrap()
}

/// Authenticate as the operator and return a bearer token.
async fn login(client: &reqwest::Client, server: &TestServer, message: &str) -> String {
    let (address, signature) = sign(OPERATOR_KEY, message);
    let resp = authenticate(client, server, &address, message, &signature).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

fn campaign_body(id: &str, start: &str, end: &str) -> Value {
    json!({
        "id": id,
        "token_address": "0xabc",
        "total_amount": 100,
        "start_date": start,
        "end_date": end
    })
}

#[tokio::test]
async fn test_create_campaign_defaults_active() {
    let server = spawn_test_server(&[operator_address().as_str()]).await;
    let client = reqwest::Client::new();
    let token = login(&client, &server, "login: create").await;

    let resp = client
        .post(format!("{}/campaigns", server.base_url))
        .bearer_auth(&token)
        .json(&campaign_body("c1", "2099-01-01", "2099-01-31"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["campaign"]["status"], "active");
    assert_eq!(body["message"], "Campaign created successfully");

    let resp = client
        .get(format!("{}/campaigns", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["campaigns"][0]["id"], "c1");
}

#[tokio::test]
async fn test_started_campaign_status_only() {
    let server = spawn_test_server(&[operator_address().as_str()]).await;
    let client = reqwest::Client::new();
    let token = login(&client, &server, "login: started").await;

    let resp = client
        .post(format!("{}/campaigns", server.base_url))
        .bearer_auth(&token)
        .json(&campaign_body("c1", "2001-01-01", "2999-01-31"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    // Pausing after start is allowed
    let resp = client
        .put(format!("{}/campaigns/c1", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "status": "paused" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["campaign"]["status"], "paused");

    // Changing the amount alongside the status is not
    let resp = client
        .put(format!("{}/campaigns/c1", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "status": "active", "total_amount": 200 }))
        .send()
        .await
        .unwrap();
    assert!(!resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("total_amount"));

    let resp = client
        .get(format!("{}/campaigns/c1", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["campaign"]["status"], "paused");
    assert_eq!(body["campaign"]["total_amount"], 100.0);
}

#[tokio::test]
async fn test_delete_before_start() {
    let server = spawn_test_server(&[operator_address().as_str()]).await;
    let client = reqwest::Client::new();
    let token = login(&client, &server, "login: delete").await;

    client
        .post(format!("{}/campaigns", server.base_url))
        .bearer_auth(&token)
        .json(&campaign_body("c1", "2099-01-01", "2099-01-31"))
        .send()
        .await
        .unwrap();

    let resp = client
        .delete(format!("{}/campaigns/c1", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Campaign deleted successfully");

    let resp = client
        .get(format!("{}/campaigns/c1", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_not_allowlisted_keeps_nonce() {
    // Only some other address is allowlisted
    let server = spawn_test_server(&["0xdead"]).await;
    let client = reqwest::Client::new();
    let (address, signature) = sign(OPERATOR_KEY, "login: denied");

    let resp = authenticate(&client, &server, &address, "login: denied", &signature).await;
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Address not authorized");
    assert_eq!(body["reason"], "address_not_authorized");

    let nonce = derive_nonce("login: denied", &signature);
    assert!(!server.kv.exists(&format!("nonce:{}", nonce)).await.unwrap());
}

#[tokio::test]
async fn test_replay_rejected() {
    let server = spawn_test_server(&[operator_address().as_str()]).await;
    let client = reqwest::Client::new();
    let (address, signature) = sign(OPERATOR_KEY, "login: replay");

    let first = authenticate(&client, &server, &address, "login: replay", &signature).await;
    assert_eq!(first.status(), 200);

    let nonce = derive_nonce("login: replay", &signature);
    assert!(server.kv.exists(&format!("nonce:{}", nonce)).await.unwrap());

    let second = authenticate(&client, &server, &address, "login: replay", &signature).await;
    assert_eq!(second.status(), 401);
    let body: Value = second.json().await.unwrap();
    assert_eq!(body["error"], "Signature already used");
    assert_eq!(body["reason"], "signature_already_used");
}

#[tokio::test]
async fn test_invalid_signature() {
    let server = spawn_test_server(&[operator_address().as_str()]).await;
    let client = reqwest::Client::new();
    let (_, signature) = sign(OPERATOR_KEY, "login: original");

    // Signature over a different message
    let resp = authenticate(
        &client,
        &server,
        &operator_address(),
        "login: tampered",
        &signature,
    )
    .await;
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["reason"], "invalid_signature");
}

#[tokio::test]
async fn test_protected_routes_need_token() {
    let server = spawn_test_server(&[operator_address().as_str()]).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/campaigns", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = client
        .get(format!("{}/campaigns", server.base_url))
        .bearer_auth("not-a-real-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_method_not_allowed() {
    let server = spawn_test_server(&[operator_address().as_str()]).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/auth", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 405);

    let token = login(&client, &server, "login: 405").await;
    let resp = client
        .post(format!("{}/elsewhere", server.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 405);
}
