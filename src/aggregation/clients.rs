use serde::Serialize;
use serde_json::Value;

use crate::error::ProxyResult;
use crate::sources::{Page, UpstreamClient};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientsPage {
    pub page: u32,
    pub count: usize,
    pub total: u64,
    pub clients: Vec<Value>,
}

pub fn shape_clients(page_number: u32, page: Page) -> ClientsPage {
    let reported = page.reported_total();
    let clients = page.into_items();
    ClientsPage {
        page: page_number,
        count: clients.len(),
        total: reported.unwrap_or(clients.len() as u64),
        clients,
    }
}

/// One page of `/client`.
pub async fn list_clients(upstream: &UpstreamClient, page: u32) -> ProxyResult<ClientsPage> {
    let params = [
        ("page", page.to_string()),
        ("pageSize", upstream.config().clients_page_size.to_string()),
    ];
    let fetched = upstream.get_page(&upstream.url("client"), &params).await?;
    Ok(shape_clients(page, fetched))
}
