// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::{extract::Form, http::StatusCode, routing::post};
use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::Value;

use crate::cache::token::TokenRecord;
use crate::cache::token_store::TokenStore;
use crate::config::credentials::Credentials;
use crate::config::settings::UpstreamConfig;
use crate::sources::{TokenManager, UpstreamClient};

pub const IDENTITY_PATH: &str = "/idp/connect/token";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

/// Fake identity endpoint answering every refresh grant with the same reply
/// and recording each submitted form.
pub struct IdentityMock {
    pub addr: SocketAddr,
    pub seen: Arc<Mutex<Vec<HashMap<String, String>>>>,
    handle: JoinHandle<()>,
}

impl IdentityMock {
    pub async fn start(status: StatusCode, body: String) -> Self {
        let seen: Arc<Mutex<Vec<HashMap<String, String>>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let router = Router::new().route(IDENTITY_PATH, post(move |Form(form): Form<HashMap<String, String>>| {
            let seen = seen_clone.clone();
            let body = body.clone();
            async move {
                seen.lock().unwrap().push(form);
                (status, body)
            }
        }));
        let (handle, addr) = spawn_axum(router).await;
        Self { addr, seen, handle }
    }

    pub async fn ok(body: Value) -> Self {
        Self::start(StatusCode::OK, body.to_string()).await
    }

    pub fn token_url(&self) -> String {
        format!("http://{}{}", self.addr, IDENTITY_PATH)
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn refresh_tokens_used(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|form| form.get("refresh_token").cloned().unwrap_or_default())
            .collect()
    }
}

impl Drop for IdentityMock {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn credentials(seed: Option<&str>) -> Credentials {
    Credentials::new(Some("cid".into()), Some("secret".into()), seed.map(str::to_owned))
}

pub fn token_manager(token_url: String, store_path: &Path, seed: Option<&str>) -> TokenManager {
    TokenManager::new(build_reqwest_client(), token_url, credentials(seed), TokenStore::new(store_path), 60)
}

pub fn upstream_client(api_base: String, tokens: Arc<TokenManager>, page_size: u32) -> UpstreamClient {
    let config = UpstreamConfig {
        api_base,
        page_size,
        ..UpstreamConfig::default()
    };
    UpstreamClient::new(build_reqwest_client(), config, tokens)
}

pub async fn seed_token_file(path: &Path, access: &str, refresh: &str, valid_for_secs: i64) -> TokenRecord {
    let record = TokenRecord::new(access.into(), refresh.into(), Utc::now() + Duration::seconds(valid_for_secs));
    TokenStore::new(path).save(&record).await.expect("seed token file");
    record
}
