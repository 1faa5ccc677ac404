use std::sync::Arc;

use anyhow::Result;
use bqe_proxy::cache::token_store::TokenStore;
use bqe_proxy::config::credentials::Credentials;
use bqe_proxy::server;
use bqe_proxy::server::server::AppState;
use bqe_proxy::sources::{TokenManager, UpstreamClient};
use bqe_proxy::utils::config_loader;
use bqe_proxy::utils::logging;
use bqe_proxy::utils::logging::LogLevel;
use clap::Parser;
use reqwest::Client;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG")]
    config: Option<String>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Read .env and CLI args
    // -------------------------------

    let _ = dotenvy::dotenv();
    let args = Args::parse();

    // -------------------------------
    // 2. Load settings, init logging
    // -------------------------------

    let service_config = config_loader::run(args.config.as_deref())?;
    logging::run(&service_config, args.log_level);

    // -------------------------------
    // 3. Credentials (read once, immutable)
    // -------------------------------

    let credentials = Credentials::from_env();
    if credentials.client_id.is_none() || credentials.client_secret.is_none() {
        warn!("BQE_CLIENT_ID / BQE_CLIENT_SECRET not set, token refresh will fail");
    }

    // -------------------------------
    // 4. Token manager + upstream client
    // -------------------------------

    let client = Client::new();
    let store = TokenStore::new(&service_config.token.path);
    let tokens = Arc::new(TokenManager::new(
        client.clone(),
        service_config.upstream.token_url.clone(),
        credentials,
        store,
        service_config.token.safety_margin_seconds,
    ));
    let upstream = UpstreamClient::new(client, service_config.upstream.clone(), tokens);

    // -------------------------------
    // 5. Start http server
    // -------------------------------

    info!("bqe-proxy v{} starting...", env!("CARGO_PKG_VERSION"));
    server::server::start(&service_config, AppState::new(upstream)).await
}
