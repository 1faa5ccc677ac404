use std::sync::Arc;

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::settings::UpstreamConfig;
use crate::error::{ProxyError, ProxyResult};
use crate::helpers::time::get_instant;
use crate::observability::metrics::{get_metrics, resource_label};
use crate::sources::oauth2::TokenManager;

pub type QueryParams = Vec<(&'static str, String)>;

/// One page of a core API collection, in either of the shapes it comes back in.
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Wrapped { items: Vec<Value>, total: Option<u64> },
    Bare(Vec<Value>),
}

impl Page {
    /// Objects without an `items` array and scalars both read as an empty page.
    pub fn from_body(body: Value) -> Self {
        match body {
            Value::Array(items) => Page::Bare(items),
            Value::Object(mut map) => {
                let items = match map.remove("items") {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                };
                let total = map.get("total").and_then(Value::as_u64);
                Page::Wrapped { items, total }
            }
            _ => Page::Bare(Vec::new()),
        }
    }

    pub fn items(&self) -> &[Value] {
        match self {
            Page::Wrapped { items, .. } => items,
            Page::Bare(items) => items,
        }
    }

    pub fn into_items(self) -> Vec<Value> {
        match self {
            Page::Wrapped { items, .. } => items,
            Page::Bare(items) => items,
        }
    }

    /// Total reported by the wrapper, if any.
    pub fn reported_total(&self) -> Option<u64> {
        match self {
            Page::Wrapped { total, .. } => *total,
            Page::Bare(_) => None,
        }
    }
}

/// Authenticated GET access to the core API.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    config: UpstreamConfig,
    tokens: Arc<TokenManager>,
}

impl UpstreamClient {
    pub fn new(client: Client, config: UpstreamConfig, tokens: Arc<TokenManager>) -> Self {
        Self { client, config, tokens }
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base, path.trim_start_matches('/'))
    }

    /// GET with the current bearer token; a 401 forces one refresh and one retry.
    ///
    /// A 200 whose body is not JSON reads as an empty list.
    pub async fn authenticated_get(&self, url: &str, query: &[(&'static str, String)]) -> ProxyResult<Value> {
        let metrics = get_metrics();
        let resource = resource_label(&self.config.api_base, url);
        let start = get_instant();

        let token = self.tokens.get_valid_access_token().await?;
        let mut response = self.send_get(url, query, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            info!("core API returned 401 for '{}', refreshing token and retrying once", resource);
            let token = self.tokens.force_refresh().await?;
            response = self.send_get(url, query, &token).await?;
        }

        metrics.upstream_duration.with_label_values(&[resource]).observe(start.elapsed().as_secs_f64());

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!("core API request for '{}' failed with status {}", resource, status);
            metrics.upstream_failures.with_label_values(&[resource, status.as_str()]).inc();
            return Err(ProxyError::UpstreamRequest { status: status.as_u16(), body });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body).unwrap_or_else(|e| {
            warn!("core API returned non-JSON body for '{}': {}", resource, e);
            Value::Array(Vec::new())
        }))
    }

    pub async fn get_page(&self, url: &str, query: &[(&'static str, String)]) -> ProxyResult<Page> {
        self.authenticated_get(url, query).await.map(Page::from_body)
    }

    /// Walk a collection from page 1 until an empty or short page.
    ///
    /// A page that fails at the HTTP level ends the walk with what was collected
    /// so far; token failures still propagate.
    pub async fn paginate(&self, url: &str, base_params: &[(&'static str, String)], page_size: u32) -> ProxyResult<Vec<Value>> {
        let metrics = get_metrics();
        let resource = resource_label(&self.config.api_base, url).to_owned();
        let mut collected = Vec::new();
        let mut page: u32 = 1;

        loop {
            let mut params: QueryParams = base_params.to_vec();
            params.push(("page", page.to_string()));
            params.push(("pageSize", page_size.to_string()));

            let items = match self.get_page(url, &params).await {
                Ok(fetched) => fetched.into_items(),
                Err(e) if e.is_page_failure() => {
                    warn!("stopping pagination of '{}' at page {}: {}", resource, page, e);
                    break;
                }
                Err(e) => return Err(e),
            };
            metrics.pages_fetched.with_label_values(&[resource.as_str()]).inc();

            if items.is_empty() {
                debug!("page {} of '{}' is empty", page, resource);
                break;
            }
            let received = items.len();
            collected.extend(items);
            if received < page_size as usize {
                debug!("page {} of '{}' is the last one ({} items)", page, resource, received);
                break;
            }
            page += 1;
        }

        Ok(collected)
    }

    async fn send_get(&self, url: &str, query: &[(&'static str, String)], token: &str) -> ProxyResult<Response> {
        get_metrics()
            .upstream_requests
            .with_label_values(&[resource_label(&self.config.api_base, url)])
            .inc();
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;
        Ok(response)
    }
}
