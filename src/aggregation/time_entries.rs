use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::aggregation::{fetch_client, field, truthy, ClientSummary, IdKey, InsertionOrdered};
use crate::error::ProxyResult;
use crate::sources::UpstreamClient;

static UNKNOWN_RESOURCE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryDetail {
    pub date: Value,
    pub project: Value,
    pub activity: Value,
    pub hours: f64,
    pub description: Value,
    pub billable: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceHours {
    pub resource_name: Value,
    pub total_hours: f64,
    pub entry_count: usize,
    pub entries: Vec<EntryDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientTimeEntries {
    pub client: ClientSummary,
    pub total_time_entries: usize,
    pub resources_with_hours: Vec<ResourceHours>,
}

/// `actualHours` as a number; null, missing and unparsable values count as zero.
pub fn parse_hours(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) if !s.is_empty() => s.trim().parse::<f64>().unwrap_or_else(|_| {
            warn!("unparsable actualHours '{}', counting as 0", s);
            0.0
        }),
        Some(Value::Bool(true)) => 1.0,
        _ => 0.0,
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Group entries by `resourceId` in first-seen order, summing hours per resource.
pub fn group_by_resource(entries: &[Value]) -> Vec<ResourceHours> {
    let mut groups: InsertionOrdered<Option<IdKey>, ResourceHours> = InsertionOrdered::new();

    for entry in entries {
        let resource_id = IdKey::from_value(entry.get("resourceId"));
        let hours = parse_hours(entry.get("actualHours"));

        let group = groups.get_or_insert_with(resource_id, || ResourceHours {
            resource_name: entry
                .get("resource")
                .filter(|name| truthy(Some(*name)))
                .cloned()
                .unwrap_or_else(|| Value::String(UNKNOWN_RESOURCE.to_owned())),
            total_hours: 0.0,
            entry_count: 0,
            entries: Vec::new(),
        });
        group.total_hours += hours;
        group.entries.push(EntryDetail {
            date: field(entry, "date"),
            project: field(entry, "project"),
            activity: field(entry, "activity"),
            hours,
            description: field(entry, "description"),
            billable: field(entry, "billable"),
        });
    }

    groups
        .into_values()
        .into_iter()
        .map(|mut group| {
            group.total_hours = round2(group.total_hours);
            group.entry_count = group.entries.len();
            group
        })
        .collect()
}

pub async fn client_time_entries(upstream: &UpstreamClient, client_id: &str) -> ProxyResult<ClientTimeEntries> {
    let client = fetch_client(upstream, client_id).await?;

    let params = [("clientId", client_id.to_owned())];
    let entries = upstream
        .paginate(&upstream.url("timeentry"), &params, upstream.config().page_size)
        .await?;
    debug!("client {} has {} time entries", client_id, entries.len());

    Ok(ClientTimeEntries {
        client: ClientSummary::from_record(&client),
        total_time_entries: entries.len(),
        resources_with_hours: group_by_resource(&entries),
    })
}
