//! Typed client for the signed-in client's service records.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/app/responses` | Orders (call-out responses) |
//! | GET    | `/app/repairs` | Repairs |
//! | GET    | `/app/services` | Scheduled services |
//! | GET    | `/app/{responses,repairs,services}-done` | Completed records (history) |
//! | GET    | `/app/responses/{id}` | Order detail |
//! | GET    | `/app/repairs/{id}` | Repair detail |
//!
//! These routes are fixed, so they are called directly rather than through
//! candidate resolution.

use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::BearerToken;
use crate::error::ServiceDeskError;
use crate::fields::{scalar_text, Field, Step};
use crate::status::{record_label, ResourceType, StatusDictionary};

// -- Types --------------------------------------------------------------------

/// Record family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Orders,
    Repairs,
    Services,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [Self::Orders, Self::Repairs, Self::Services];

    /// Path segment under `/app`.
    pub fn route(self) -> &'static str {
        match self {
            Self::Orders => "responses",
            Self::Repairs => "repairs",
            Self::Services => "services",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Orders => "orders",
            Self::Repairs => "repairs",
            Self::Services => "services",
        }
    }

    /// Status dictionary family for this kind.
    pub fn resource_type(self) -> ResourceType {
        match self {
            Self::Orders => ResourceType::Responses,
            Self::Repairs => ResourceType::Repairs,
            Self::Services => ResourceType::Services,
        }
    }

    /// Singular wrapper key some deployments use for a one-item list.
    fn singular(self) -> &'static str {
        match self {
            Self::Orders => "response",
            Self::Repairs => "repair",
            Self::Services => "service",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const RECORD_ID: Field = Field::defined(&[
    &[Step::Key("id")],
    &[Step::Key("number")],
    &[Step::Key("code")],
]);

/// A record paired with its display status.
#[derive(Debug, Clone, Serialize)]
pub struct LabelledRecord {
    pub id: Option<String>,
    pub status: String,
    pub record: Value,
}

/// Pull the record list out of a list response.
///
/// Accepts a bare array, an array under `<route>`, `data`, `items`,
/// `response`, or under `data.items` / `data.<route>`; a single object under
/// the singular key (`response`, `repair`, `service`); or an object whose
/// values are all records. Anything else is an empty list.
pub fn extract_list(kind: RecordKind, json: &Value) -> Vec<Value> {
    if let Some(items) = json.as_array() {
        return items.clone();
    }

    let nested = json.get("data");
    let arrays = [
        json.get(kind.route()),
        nested,
        json.get("items"),
        json.get("response"),
        nested.and_then(|d| d.get("items")),
        nested.and_then(|d| d.get(kind.route())),
    ];
    if let Some(items) = arrays.into_iter().flatten().find_map(Value::as_array) {
        return items.clone();
    }

    if let Some(single) = json.get(kind.singular()).filter(|v| v.is_object()) {
        return vec![single.clone()];
    }

    match json.as_object() {
        Some(obj) if !obj.is_empty() && obj.values().all(Value::is_object) => {
            obj.values().cloned().collect()
        }
        _ => Vec::new(),
    }
}

// -- Client -------------------------------------------------------------------

/// Client for orders, repairs, services and history.
#[derive(Debug, Clone)]
pub struct RecordsClient {
    http: reqwest::Client,
    statuses: StatusDictionary,
    base: String,
    token: Option<BearerToken>,
}

impl RecordsClient {
    pub(crate) fn new(
        http: reqwest::Client,
        statuses: StatusDictionary,
        base: String,
        token: Option<BearerToken>,
    ) -> Self {
        Self {
            http,
            statuses,
            base,
            token,
        }
    }

    /// Current records of `kind`.
    ///
    /// Calls `GET {base}/app/{route}`.
    pub async fn list(&self, kind: RecordKind) -> Result<Vec<Value>, ServiceDeskError> {
        let url = format!("{}/app/{}", self.base, kind.route());
        let json = self.get_json(&format!("GET /app/{}", kind.route()), &url).await?;
        Ok(extract_list(kind, &json))
    }

    /// Records of `kind` completed during `year`.
    ///
    /// Calls `GET {base}/app/{route}-done?date_from=..&date_to=..`.
    pub async fn history(&self, kind: RecordKind, year: i32) -> Result<Vec<Value>, ServiceDeskError> {
        let url = format!(
            "{}/app/{}-done?date_from={year}-01-01&date_to={year}-12-31",
            self.base,
            kind.route()
        );
        let json = self
            .get_json(&format!("GET /app/{}-done", kind.route()), &url)
            .await?;
        Ok(extract_list(kind, &json))
    }

    /// One order or repair. Services have no detail route.
    ///
    /// Calls `GET {base}/app/{route}/{id}`. A `data` object wrapper is
    /// removed.
    pub async fn detail(&self, kind: RecordKind, id: &str) -> Result<Value, ServiceDeskError> {
        if kind == RecordKind::Services {
            return Err(ServiceDeskError::Unsupported {
                operation: "record detail",
                kind: kind.as_str(),
            });
        }
        let url = format!("{}/app/{}/{}", self.base, kind.route(), id);
        let mut json = self
            .get_json(&format!("GET /app/{}/{{id}}", kind.route()), &url)
            .await?;
        if json.get("data").is_some_and(Value::is_object) {
            return Ok(json["data"].take());
        }
        Ok(json)
    }

    /// Pair records with status labels from the `kind` dictionary.
    pub async fn labelled(&self, kind: RecordKind, records: Vec<Value>) -> Vec<LabelledRecord> {
        let statuses = self
            .statuses
            .load(
                &self.base,
                self.token.as_ref().map(BearerToken::as_str),
                Some(kind.resource_type()),
            )
            .await;
        records
            .into_iter()
            .map(|record| LabelledRecord {
                id: RECORD_ID.get(&record).and_then(scalar_text),
                status: record_label(&statuses, &record),
                record,
            })
            .collect()
    }

    async fn get_json(&self, endpoint: &str, url: &str) -> Result<Value, ServiceDeskError> {
        let mut request = self.http.get(url).header(ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.as_str());
        }

        let resp = request.send().await.map_err(|e| ServiceDeskError::Http {
            endpoint: endpoint.into(),
            source: e,
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceDeskError::ApiError {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        resp.json().await.map_err(|e| ServiceDeskError::Deserialization {
            endpoint: endpoint.into(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_shapes() {
        let one = json!({"id": 1});
        assert_eq!(extract_list(RecordKind::Orders, &json!([one])), vec![one.clone()]);
        assert_eq!(extract_list(RecordKind::Orders, &json!({"responses": [one]})), vec![one.clone()]);
        assert_eq!(extract_list(RecordKind::Repairs, &json!({"data": [one]})), vec![one.clone()]);
        assert_eq!(extract_list(RecordKind::Repairs, &json!({"repair": one})), vec![one.clone()]);
        assert_eq!(
            extract_list(RecordKind::Services, &json!({"data": {"items": [one]}})),
            vec![one.clone()]
        );
        assert_eq!(
            extract_list(RecordKind::Services, &json!({"7": {"id": 7}, "8": {"id": 8}})).len(),
            2
        );
    }

    #[test]
    fn unrecognised_list_is_empty() {
        assert!(extract_list(RecordKind::Orders, &json!({"message": "ok"})).is_empty());
        assert!(extract_list(RecordKind::Orders, &json!({})).is_empty());
        assert!(extract_list(RecordKind::Orders, &json!(null)).is_empty());
    }

    #[test]
    fn kinds_map_to_status_families() {
        assert_eq!(RecordKind::Orders.resource_type(), ResourceType::Responses);
        assert_eq!(RecordKind::Orders.route(), "responses");
        assert_eq!(RecordKind::Services.resource_type(), ResourceType::Services);
    }
}
