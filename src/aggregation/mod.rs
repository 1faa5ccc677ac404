//! Read-only views assembled from one or more core API calls.
//!
//! Each submodule pairs a pure reshaping function (tested directly) with the
//! async operation that feeds it from [`UpstreamClient`](crate::sources::UpstreamClient).

pub mod clients;
pub mod projects;
pub mod resources;
pub mod time_entries;

use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;
use serde_json::Value;

use crate::error::{ProxyError, ProxyResult};
use crate::sources::UpstreamClient;

/// The client fields echoed back by the per-client endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientSummary {
    pub id: Value,
    pub company: Value,
    pub name: Value,
}

impl ClientSummary {
    /// `name` reads as `"N/A"` only when the key is missing.
    pub fn from_record(record: &Value) -> Self {
        Self {
            id: field(record, "id"),
            company: field(record, "company"),
            name: record
                .get("name")
                .cloned()
                .unwrap_or_else(|| Value::String("N/A".to_owned())),
        }
    }
}

/// `GET /client/{id}`, with an upstream 404 turned into [`ProxyError::NotFound`].
pub async fn fetch_client(upstream: &UpstreamClient, client_id: &str) -> ProxyResult<Value> {
    let url = upstream.url(&format!("client/{}", client_id));
    upstream.authenticated_get(&url, &[]).await.map_err(|e| match e {
        ProxyError::UpstreamRequest { status: 404, .. } => ProxyError::NotFound("Client".to_owned()),
        other => other,
    })
}

pub(crate) fn field(record: &Value, key: &str) -> Value {
    record.get(key).cloned().unwrap_or(Value::Null)
}

/// Python-style truthiness of a JSON value.
pub(crate) fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// Hashable identity of a JSON id; `7` and `"7"` stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum IdKey {
    Text(String),
    Other(String),
}

impl IdKey {
    /// `None` for a missing or null id.
    pub fn from_value(value: Option<&Value>) -> Option<Self> {
        match value {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(IdKey::Text(s.clone())),
            Some(other) => Some(IdKey::Other(other.to_string())),
        }
    }
}

/// Map that iterates in first-insertion order; overwriting keeps the slot.
#[derive(Debug)]
pub(crate) struct InsertionOrdered<K, V> {
    index: HashMap<K, usize>,
    entries: Vec<V>,
}

impl<K: Eq + Hash, V> InsertionOrdered<K, V> {
    pub fn new() -> Self {
        Self { index: HashMap::new(), entries: Vec::new() }
    }

    pub fn insert(&mut self, key: K, value: V) {
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot] = value,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(value);
            }
        }
    }

    pub fn get_or_insert_with(&mut self, key: K, make: impl FnOnce() -> V) -> &mut V {
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(make());
                self.entries.len() - 1
            }
        };
        &mut self.entries[slot]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn into_values(self) -> Vec<V> {
        self.entries
    }
}
