//! Evidence bundle and event types.
//!
//! One [`EvidenceBundle`] exists per scenario. Events are appended in call
//! order and the field names below are the stable wire schema consumed by
//! downstream tooling:
//!
//! ```json
//! {"feature": "...", "scenario": "...", "timestamp": "20260807_153000",
//!  "api_requests": [...], "database_queries": [...], "ui_screenshots": [...]}
//! ```

use crate::body::normalize_body;
use chrono::{Local, SecondsFormat};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One normalized result row. DB drivers disagree on row access shape, so
/// the DB boundary converts every row to this mapping before it reaches
/// the evidence layer.
pub type Row = serde_json::Map<String, Value>;

/// All evidence captured for one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceBundle {
    pub feature: String,
    pub scenario: String,
    /// Sortable to-the-second stamp fixed at bundle creation; embedded in
    /// output directory and file names.
    pub timestamp: String,
    #[serde(default)]
    pub api_requests: Vec<ApiEvent>,
    #[serde(default)]
    pub database_queries: Vec<DbEvent>,
    #[serde(default)]
    pub ui_screenshots: Vec<UiEvent>,
}

impl EvidenceBundle {
    pub fn new(feature: &str, scenario: &str, timestamp: String) -> Self {
        Self {
            feature: feature.to_string(),
            scenario: scenario.to_string(),
            timestamp,
            api_requests: Vec::new(),
            database_queries: Vec::new(),
            ui_screenshots: Vec::new(),
        }
    }

    pub fn has_screenshots(&self) -> bool {
        !self.ui_screenshots.is_empty()
    }

    pub fn has_api_or_db_events(&self) -> bool {
        !self.api_requests.is_empty() || !self.database_queries.is_empty()
    }
}

/// One recorded HTTP exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEvent {
    pub timestamp: String,
    pub request: RequestRecord,
    pub response: ResponseRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestRecord {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub status_code: Option<u16>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Value,
}

/// Inputs for [`crate::EvidenceRecorder::add_api_request`], gathered into
/// one struct so call sites stay readable. Bodies are normalized when the
/// event is built, not here.
#[derive(Debug, Clone, Default)]
pub struct ApiCall {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
    pub response_status: Option<u16>,
    pub response_headers: BTreeMap<String, String>,
    pub response_body: Option<Value>,
}

impl ApiCall {
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            method: method.to_string(),
            url: url.to_string(),
            ..Self::default()
        }
    }

    /// Fill the response side from a recorded snapshot, so the evidence
    /// shows exactly what the assertions ran against. The raw body text
    /// goes in as-is; normalization parses JSON bodies at event build
    /// time.
    pub fn with_response(mut self, snapshot: &crate::assertions::ResponseSnapshot) -> Self {
        self.response_status = Some(snapshot.status);
        self.response_headers = snapshot.headers.clone();
        self.response_body = if snapshot.body.is_empty() {
            None
        } else {
            Some(Value::String(snapshot.body.clone()))
        };
        self
    }
}

impl ApiEvent {
    pub(crate) fn from_call(call: ApiCall) -> Self {
        Self {
            timestamp: iso_timestamp(),
            request: RequestRecord {
                method: call.method,
                url: call.url,
                headers: call.headers,
                body: normalize_body(call.body.unwrap_or(Value::Null)),
            },
            response: ResponseRecord {
                status_code: call.response_status,
                headers: call.response_headers,
                body: normalize_body(call.response_body.unwrap_or(Value::Null)),
            },
        }
    }
}

/// One recorded database query. Exactly one of `result`/`error` is
/// expected to be meaningful; when both are absent the event still
/// records with `row_count` 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbEvent {
    pub timestamp: String,
    pub query: String,
    #[serde(default)]
    pub result: Vec<Row>,
    pub row_count: usize,
    pub error: Option<String>,
}

impl DbEvent {
    pub(crate) fn new(query: &str, result: Option<Vec<Row>>, error: Option<String>) -> Self {
        let result = result.unwrap_or_default();
        Self {
            timestamp: iso_timestamp(),
            query: query.to_string(),
            row_count: result.len(),
            result,
            error,
        }
    }
}

/// One captured screenshot reference. The file itself lives on disk and
/// must still exist when the bundle is rendered, not when it is added.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiEvent {
    pub timestamp: String,
    pub path: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub page_url: String,
}

impl UiEvent {
    pub(crate) fn new(path: &str, description: &str, page_url: &str) -> Self {
        Self {
            timestamp: iso_timestamp(),
            path: path.to_string(),
            description: description.to_string(),
            page_url: page_url.to_string(),
        }
    }
}

/// Event stamp: local time, RFC 3339, millisecond precision.
pub(crate) fn iso_timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Millis, false)
}

/// Bundle stamp: local time, `%Y%m%d_%H%M%S`. Lexical order matches
/// chronological order, which keeps evidence directories sorted.
pub(crate) fn sortable_timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn db_event_with_error_has_zero_row_count() {
        let event = DbEvent::new("SELECT 1", None, Some("connection refused".to_string()));
        assert_eq!(event.row_count, 0);
        assert!(event.result.is_empty());
        assert_eq!(event.error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn db_event_row_count_tracks_result_length() {
        let mut row = Row::new();
        row.insert("id".to_string(), json!(1));
        let event = DbEvent::new("SELECT id FROM t", Some(vec![row.clone(), row]), None);
        assert_eq!(event.row_count, 2);
        assert!(event.error.is_none());
    }

    #[test]
    fn db_event_with_neither_result_nor_error_still_records() {
        let event = DbEvent::new("UPDATE t SET x = 1", None, None);
        assert_eq!(event.row_count, 0);
        assert!(event.error.is_none());
    }

    #[test]
    fn api_event_normalizes_both_bodies() {
        let mut call = ApiCall::new("POST", "https://api.example.test/users");
        call.body = Some(json!(r#"{"name":"amy"}"#));
        call.response_status = Some(201);
        call.response_body = Some(json!(7));

        let event = ApiEvent::from_call(call);
        assert_eq!(event.request.body, json!({"name": "amy"}));
        assert_eq!(event.response.body, json!("7"));
        assert_eq!(event.response.status_code, Some(201));
    }

    #[test]
    fn response_snapshot_fills_the_response_side() {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        let snapshot = crate::assertions::ResponseSnapshot {
            status: 200,
            headers,
            body: r#"{"id": 7}"#.to_string(),
            url: "https://api.example.test/users/7".to_string(),
        };

        let call = ApiCall::new("GET", &snapshot.url).with_response(&snapshot);
        let event = ApiEvent::from_call(call);
        assert_eq!(event.response.status_code, Some(200));
        assert_eq!(event.response.body, json!({"id": 7}));
        assert_eq!(
            event.response.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn bundle_round_trips_through_wire_schema() {
        let mut bundle = EvidenceBundle::new("Login", "Valid user", "20260807_120000".to_string());
        bundle
            .api_requests
            .push(ApiEvent::from_call(ApiCall::new("GET", "https://api.example.test/ping")));
        bundle
            .ui_screenshots
            .push(UiEvent::new("shot.png", "after login", "https://example.test"));

        let json = serde_json::to_string(&bundle).unwrap();
        assert!(json.contains("\"api_requests\""));
        assert!(json.contains("\"database_queries\""));
        assert!(json.contains("\"ui_screenshots\""));
        assert!(json.contains("\"status_code\""));

        let parsed: EvidenceBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.feature, "Login");
        assert_eq!(parsed.scenario, "Valid user");
        assert_eq!(parsed.api_requests.len(), 1);
        assert_eq!(parsed.ui_screenshots.len(), 1);
        assert!(parsed.database_queries.is_empty());
    }

    #[test]
    fn sortable_timestamp_has_fixed_shape() {
        let stamp = sortable_timestamp();
        assert_eq!(stamp.len(), 15);
        assert_eq!(&stamp[8..9], "_");
        assert!(stamp[..8].chars().all(|ch| ch.is_ascii_digit()));
    }
}
