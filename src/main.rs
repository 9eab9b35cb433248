//! Campaign admin service entry point.
//!
//! Bootstraps the server:
//! 1. Load configuration from environment
//! 2. Connect to Redis
//! 3. Build router with API routes
//! 4. Start Axum server
//!
//! Also supports a `sign` subcommand that produces a `POST /auth` body from
//! a private key, for operators testing a deployment.

use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use campaign_admin::{auth::middleware::AppState, config::Config, routes, storage::RedisKv};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Sign `message` with `private_key` (hex, optional 0x) using `personal_sign`.
fn sign(private_key: &str, message: &str) -> Result<String, String> {
    let signer: PrivateKeySigner = private_key
        .trim()
        .parse()
        .map_err(|e| format!("Invalid private key: {}", e))?;
    let signature = signer
        .sign_message_sync(message.as_bytes())
        .map_err(|e| format!("Signing failed: {}", e))?;

    let body = serde_json::json!({
        "address": format!("0x{}", hex::encode(signer.address().as_slice())),
        "message": message,
        "signature": format!("0x{}", hex::encode(signature.as_bytes())),
    });
    serde_json::to_string_pretty(&body).map_err(|e| e.to_string())
}

fn print_sign_usage() {
    eprintln!("Usage: campaign-admin sign <private-key-hex> <message>");
    eprintln!();
    eprintln!("Print a JSON body for POST /auth signed with the given key.");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  campaign-admin sign 0x4c08...2318 'Sign in to campaign admin'");
}

#[tokio::main]
async fn main() {
    // Check for sign subcommand
    let args: Vec<String> = std::env::args().collect();
    if args.len() >= 2 && args[1] == "sign" {
        if args.len() != 4 {
            print_sign_usage();
            std::process::exit(1);
        }

        match sign(&args[2], &args[3]) {
            Ok(body) => println!("{}", body),
            Err(e) => {
                eprintln!("Error signing message: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    // Initialize tracing with env filter support (RUST_LOG)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config from environment
    let config = Config::from_env().expect("Failed to load config");
    tracing::info!("Starting campaign-admin on {}", config.bind_addr);

    if config.allowlist.is_empty() {
        tracing::warn!("ALLOWED_ADDRESSES is empty; every authentication attempt will be rejected");
    } else {
        tracing::info!("{} address(es) allowlisted", config.allowlist.len());
    }

    // Connect to Redis
    let kv = RedisKv::connect(&config.redis_url)
        .await
        .expect("Failed to connect to Redis");

    let bind_addr = config.bind_addr;
    let max_body_bytes = config.max_body_bytes;
    let state = AppState::new(config, Arc::new(kv));

    // Explicit CORS: no cross-origin access (single-origin deployment).
    let cors = CorsLayer::new();

    let app = routes::api_router()
        .layer(axum::extract::DefaultBodyLimit::max(max_body_bytes))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .expect("Failed to bind");
    tracing::info!("Listening on {}", bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
