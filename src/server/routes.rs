use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::aggregation::clients::{list_clients, ClientsPage};
use crate::aggregation::projects::{list_projects, ProjectsPage};
use crate::aggregation::resources::{client_resources, ClientResources};
use crate::aggregation::time_entries::{client_time_entries, ClientTimeEntries};
use crate::error::{ProxyError, ProxyResult};
use crate::server::server::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub page: Option<String>,
    pub status: Option<String>,
}

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/clients", get(get_clients))
        .route("/projects", get(get_projects))
        .route("/clients/{client_id}/resources", get(get_client_resources))
        .route("/clients/{client_id}/timeentries", get(get_client_timeentries))
}

/// `page` defaults to 1 and must be a positive integer.
pub fn parse_page(raw: Option<&str>) -> ProxyResult<u32> {
    match raw {
        None => Ok(1),
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|page| *page >= 1)
            .ok_or_else(|| ProxyError::Validation(format!("page must be an integer >= 1, got '{}'", raw))),
    }
}

async fn get_clients(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ProxyResult<Json<ClientsPage>> {
    let page = parse_page(query.page.as_deref())?;
    info!("GET /clients page={}", page);
    list_clients(&state.upstream, page).await.map(Json)
}

async fn get_projects(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ProxyResult<Json<ProjectsPage>> {
    let page = parse_page(query.page.as_deref())?;
    info!("GET /projects page={} status={:?}", page, query.status);
    list_projects(&state.upstream, page, query.status.as_deref()).await.map(Json)
}

async fn get_client_resources(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> ProxyResult<Json<ClientResources>> {
    info!("GET /clients/{}/resources", client_id);
    client_resources(&state.upstream, &client_id).await.map(Json)
}

async fn get_client_timeentries(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> ProxyResult<Json<ClientTimeEntries>> {
    info!("GET /clients/{}/timeentries", client_id);
    client_time_entries(&state.upstream, &client_id).await.map(Json)
}
