//! # Status dictionaries and status labels
//!
//! Records carry their status as a small integer code, a string, or an
//! embedded object, and the meaning of the codes depends on the backend
//! version. The dictionary mapping codes to labels is soft configuration:
//! fetched once per `(base URL, resource type)` for the life of the process,
//! merged over a fixed three-entry default, and never a reason to fail.
//!
//! ## Cache
//!
//! [`StatusDictionary`] keeps one `OnceCell` per cache key. Concurrent first
//! callers for the same key wait on the same fill instead of probing the
//! backend twice. Entries are never invalidated.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::candidates;
use crate::fields::{is_truthy, scalar_text, PLACEHOLDER};
use crate::resolver::EndpointResolver;

/// Resource family whose status dictionary is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Responses,
    Repairs,
    Services,
    /// Completed records of every family; probes all three dictionaries.
    History,
}

impl ResourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Responses => "responses",
            Self::Repairs => "repairs",
            Self::Services => "services",
            Self::History => "history",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "responses" => Ok(Self::Responses),
            "repairs" => Ok(Self::Repairs),
            "services" => Ok(Self::Services),
            "history" => Ok(Self::History),
            other => Err(format!(
                "unknown resource type {other:?} (expected responses, repairs, services or history)"
            )),
        }
    }
}

// -- StatusMap ----------------------------------------------------------------

/// Status code → display label. Codes are compared by their string form, so
/// `2` and `"2"` are the same key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusMap(BTreeMap<String, String>);

impl StatusMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in dictionary used when the backend exposes none:
    /// awaiting confirmation, in progress, completed.
    pub fn defaults() -> Self {
        [
            ("1", "ელოდება დადასტურებას"),
            ("2", "მიმდინარეობს შესრულება"),
            ("3", "დასრულებული"),
        ]
        .into_iter()
        .collect()
    }

    pub fn insert(&mut self, code: impl Into<String>, label: impl Into<String>) {
        self.0.insert(code.into(), label.into());
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.0.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `self` with every entry of `remote` laid over it; remote labels win
    /// on collision.
    pub fn merged_over(mut self, remote: &StatusMap) -> Self {
        for (code, label) in remote.iter() {
            self.insert(code, label);
        }
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StatusMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

fn first_label(obj: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
        .and_then(scalar_text)
        .filter(|s| !s.is_empty())
}

/// Read a status dictionary from any of the shapes backends return.
///
/// Accepted shapes, in order:
/// 1. an object mapping codes to labels (or to objects with a
///    `name`/`label`/`title`/`text`), at the top level or under
///    `statuses` / `data.statuses`;
/// 2. an array of `{id|code, name|label|title|text|value}` items, at the top
///    level or under `statuses`, `data.statuses`, `data` or `items`.
///
/// Returns an empty map when nothing usable is found.
pub fn parse_status_map(json: &Value) -> StatusMap {
    let mut map = StatusMap::new();

    if json.is_object() {
        let candidate = [
            json.get("statuses"),
            json.get("data").and_then(|d| d.get("statuses")),
        ]
        .into_iter()
        .flatten()
        .find(|v| is_truthy(v))
        .unwrap_or(json);
        if let Some(obj) = candidate.as_object() {
            for (code, v) in obj {
                let label = match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(_) => first_label(v, &["name", "label", "title", "text"]),
                    _ => None,
                };
                if let Some(label) = label.filter(|l| !l.is_empty()) {
                    map.insert(code.as_str(), label);
                }
            }
            if !map.is_empty() {
                return map;
            }
        }
    }

    let items = if json.is_array() {
        Some(json)
    } else {
        [
            json.get("statuses"),
            json.get("data").and_then(|d| d.get("statuses")),
            json.get("data"),
            json.get("items"),
        ]
        .into_iter()
        .flatten()
        .find(|v| is_truthy(v))
    };

    if let Some(items) = items.and_then(Value::as_array) {
        for item in items {
            let code = ["id", "code"]
                .iter()
                .filter_map(|k| item.get(*k))
                .find(|v| !v.is_null())
                .and_then(scalar_text);
            let label = first_label(item, &["name", "label", "title", "text", "value"]);
            if let (Some(code), Some(label)) = (code, label) {
                map.insert(code, label);
            }
        }
    }
    map
}

// -- Labels -------------------------------------------------------------------

/// Human-readable label for a bare status value.
///
/// - strings are returned verbatim;
/// - objects yield the first non-null `name`, `label`, `title`, `text` or
///   `id` (an empty string counts), or `"—"` when none is set;
/// - codes present in `map` yield their label;
/// - other scalars yield their string form;
/// - `null` yields the `"—"` placeholder.
pub fn label_for(map: &StatusMap, raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        Value::Object(_) => ["name", "label", "title", "text", "id"]
            .iter()
            .filter_map(|k| raw.get(*k))
            .find(|v| !v.is_null())
            .map(|v| scalar_text(v).unwrap_or_else(|| v.to_string()))
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        Value::Null => PLACEHOLDER.to_string(),
        other => {
            let code = scalar_text(other).unwrap_or_else(|| other.to_string());
            map.get(&code).map(str::to_string).unwrap_or(code)
        }
    }
}

/// Human-readable status label for a whole record.
///
/// The status is read from `status`, `state` or `contract_status`. Codes the
/// dictionary does not know fall back to the record's own `status_text` or
/// `status_label` before the bare code.
pub fn record_label(map: &StatusMap, record: &Value) -> String {
    let raw = ["status", "state", "contract_status"]
        .iter()
        .filter_map(|k| record.get(*k))
        .find(|v| !v.is_null());

    match raw {
        Some(v @ (Value::String(_) | Value::Object(_))) => label_for(map, v),
        _ => {
            let mapped = raw
                .and_then(scalar_text)
                .and_then(|code| map.get(&code).map(str::to_string));
            mapped
                .or_else(|| {
                    ["status_text", "status_label"]
                        .iter()
                        .filter_map(|k| record.get(*k))
                        .filter_map(Value::as_str)
                        .find(|s| !s.is_empty())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| raw.map_or_else(|| PLACEHOLDER.to_string(), |v| label_for(map, v)))
        }
    }
}

// -- Dictionary cache ---------------------------------------------------------

/// Process-wide status dictionary cache.
///
/// Cheaply cloneable via `Arc`; all clones share the same entries.
#[derive(Debug, Clone)]
pub struct StatusDictionary {
    resolver: EndpointResolver,
    cache: Arc<DashMap<String, Arc<OnceCell<Arc<StatusMap>>>>>,
}

impl StatusDictionary {
    pub fn new(resolver: EndpointResolver) -> Self {
        Self {
            resolver,
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Cache key for `(base_url, kind)`.
    pub fn cache_key(base_url: &str, kind: Option<ResourceType>) -> String {
        format!("{}|{}", base_url, kind.map_or("all", ResourceType::as_str))
    }

    /// Whether a dictionary for `(base_url, kind)` has been loaded.
    pub fn is_cached(&self, base_url: &str, kind: Option<ResourceType>) -> bool {
        self.cache
            .get(&Self::cache_key(base_url, kind))
            .is_some_and(|cell| cell.initialized())
    }

    /// Load the dictionary for `kind`, probing the backend on first use.
    ///
    /// Never fails: when no candidate yields a usable dictionary the
    /// built-in defaults are returned (and cached).
    pub async fn load(
        &self,
        base_url: &str,
        token: Option<&str>,
        kind: Option<ResourceType>,
    ) -> Arc<StatusMap> {
        let key = Self::cache_key(base_url, kind);
        let cell = Arc::clone(&*self.cache.entry(key.clone()).or_default());

        let map = cell
            .get_or_init(|| async {
                let candidates = candidates::statuses(base_url, kind);
                let remote = self
                    .resolver
                    .resolve_with("status dictionary", &candidates, token, |body| {
                        Some(parse_status_map(body)).filter(|m| !m.is_empty())
                    })
                    .await;

                let merged = match remote {
                    Ok(remote) => {
                        tracing::debug!(%key, entries = remote.len(), "loaded status dictionary");
                        StatusMap::defaults().merged_over(&remote)
                    }
                    Err(e) => {
                        tracing::debug!(%key, "no status dictionary, using defaults: {e}");
                        StatusMap::defaults()
                    }
                };
                Arc::new(merged)
            })
            .await;
        Arc::clone(map)
    }
}
