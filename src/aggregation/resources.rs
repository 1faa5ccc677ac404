use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::aggregation::{fetch_client, truthy, ClientSummary, IdKey, InsertionOrdered};
use crate::error::ProxyResult;
use crate::sources::UpstreamClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    #[serde(rename = "Project Manager")]
    ProjectManager,
    #[serde(rename = "Principal")]
    Principal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceRole {
    pub name: Value,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientResources {
    pub client: ClientSummary,
    pub total_unique_resources: usize,
    pub resources: Vec<ResourceRole>,
}

/// Managers and principals across `projects`, one entry per person id.
///
/// Later sightings of an id replace its name and role.
pub fn extract_resources(projects: &[Value]) -> Vec<ResourceRole> {
    let mut people = InsertionOrdered::new();

    for project in projects {
        for (id_key, name_key, role) in [
            ("managerId", "manager", Role::ProjectManager),
            ("principalId", "principal", Role::Principal),
        ] {
            match (project.get(id_key), project.get(name_key)) {
                (Some(id), Some(name)) if truthy(Some(id)) && truthy(Some(name)) => {
                    if let Some(key) = IdKey::from_value(Some(id)) {
                        people.insert(key, ResourceRole { name: name.clone(), role });
                    }
                }
                _ => {}
            }
        }
    }

    people.into_values()
}

pub async fn client_resources(upstream: &UpstreamClient, client_id: &str) -> ProxyResult<ClientResources> {
    let client = fetch_client(upstream, client_id).await?;

    let params = [("clientId", client_id.to_owned())];
    let projects = upstream
        .paginate(&upstream.url("project"), &params, upstream.config().page_size)
        .await?;
    debug!("client {} has {} projects", client_id, projects.len());

    let resources = extract_resources(&projects);
    Ok(ClientResources {
        client: ClientSummary::from_record(&client),
        total_unique_resources: resources.len(),
        resources,
    })
}
