use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::cache::token::TokenRecord;
use crate::cache::token_store::TokenStore;
use crate::config::credentials::Credentials;
use crate::error::{ProxyError, ProxyResult};
use crate::helpers::time::{expires_at_with_margin, now_utc};
use crate::observability::metrics::get_metrics;

static SUCCESS_MSG: &str = "success";
static FAILURE_MSG: &str = "failure";

/// Identity endpoint reply to a refresh-token grant.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: f64,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Owns the cached bearer token: validity checks, refresh-token grants and persistence.
///
/// The load-check-refresh-save sequence runs under one async mutex, so
/// concurrent requests in this process never refresh twice for the same expiry.
#[derive(Debug)]
pub struct TokenManager {
    client: Client,
    token_url: String,
    credentials: Credentials,
    store: TokenStore,
    safety_margin_seconds: u64,
    lock: Mutex<()>,
}

impl TokenManager {
    pub fn new(
        client: Client,
        token_url: String,
        credentials: Credentials,
        store: TokenStore,
        safety_margin_seconds: u64,
    ) -> Self {
        Self {
            client,
            token_url,
            credentials,
            store,
            safety_margin_seconds,
            lock: Mutex::new(()),
        }
    }

    /// Cached token while it is still valid, otherwise a freshly refreshed one.
    pub async fn get_valid_access_token(&self) -> ProxyResult<String> {
        let _guard = self.lock.lock().await;

        let stored = self.store.load().await.into_option();
        if let Some(record) = stored.as_ref().filter(|r| r.is_valid_at(now_utc())) {
            debug!("cached access token valid until {}", record.expires_at);
            return Ok(record.access_token.clone());
        }

        info!("cached access token missing or expired, refreshing");
        let refresh_token = stored
            .map(|record| record.refresh_token)
            .filter(|token| !token.is_empty())
            .or_else(|| self.credentials.refresh_token.clone())
            .ok_or_else(|| {
                ProxyError::Configuration("no refresh token in environment or token file".to_owned())
            })?;

        self.exchange(&refresh_token).await
    }

    /// Refresh-token grant with an explicit refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> ProxyResult<String> {
        let _guard = self.lock.lock().await;
        self.exchange(refresh_token).await
    }

    /// Unconditional refresh after the core API rejected the current token.
    ///
    /// Uses the configured seed refresh token, then the stored one.
    pub async fn force_refresh(&self) -> ProxyResult<String> {
        let _guard = self.lock.lock().await;
        get_metrics().forced_refreshes.inc();

        let refresh_token = match self.credentials.refresh_token.clone() {
            Some(token) => token,
            None => self
                .store
                .load()
                .await
                .into_option()
                .map(|record| record.refresh_token)
                .filter(|token| !token.is_empty())
                .ok_or_else(|| {
                    ProxyError::Configuration("no refresh token available for forced refresh".to_owned())
                })?,
        };

        warn!("forcing token refresh after upstream rejected the access token");
        self.exchange(&refresh_token).await
    }

    async fn exchange(&self, refresh_token: &str) -> ProxyResult<String> {
        let metrics = get_metrics();
        let client_id = self.credentials.client_id.as_deref().ok_or_else(|| {
            ProxyError::Configuration("BQE_CLIENT_ID is not set".to_owned())
        })?;
        let client_secret = self.credentials.client_secret.as_deref().ok_or_else(|| {
            ProxyError::Configuration("BQE_CLIENT_SECRET is not set".to_owned())
        })?;

        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ];

        let failed = || metrics.token_refreshes.with_label_values(&[FAILURE_MSG]).inc();

        let response = self.client.post(&self.token_url).form(&form).send().await.map_err(|e| {
            error!("token refresh request failed: {}", e);
            failed();
            ProxyError::Transport(e)
        })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("token refresh rejected with status {}", status);
            failed();
            return Err(ProxyError::UpstreamAuth { status: status.as_u16(), body });
        }

        let body = response.text().await.inspect_err(|_| failed())?;
        let token_data: RefreshResponse = serde_json::from_str(&body).map_err(|e| {
            failed();
            ProxyError::MalformedTokenResponse(e.to_string())
        })?;

        let expires_at = expires_at_with_margin(now_utc(), token_data.expires_in, self.safety_margin_seconds)
            .ok_or_else(|| {
                failed();
                ProxyError::MalformedTokenResponse(format!("unusable expires_in {}", token_data.expires_in))
            })?;
        let rotated = token_data.refresh_token.filter(|token| !token.is_empty());
        if rotated.is_some() {
            debug!("identity endpoint rotated the refresh token");
        }
        let record = TokenRecord::new(
            token_data.access_token,
            rotated.unwrap_or_else(|| refresh_token.to_owned()),
            expires_at,
        );

        self.store.save(&record).await?;
        metrics.token_refreshes.with_label_values(&[SUCCESS_MSG]).inc();
        metrics.token_expiry_unix.set(record.expires_at.timestamp());
        info!("access token refreshed, valid until {}", record.expires_at);

        Ok(record.access_token)
    }
}
