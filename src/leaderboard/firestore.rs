//! Firestore REST backend
//!
//! Scores live in `apps/{app_id}/leaderboard`. Documents use the typed value
//! encoding (`{"stringValue": ...}`, `{"integerValue": "42"}`); the top-N read
//! is a `runQuery` ordered by score descending with a limit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{LeaderboardEntry, LeaderboardStore, PersistenceError, ScoreRecord};
use crate::settings::StoreConfig;

const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const COLLECTION_ID: &str = "leaderboard";

/// A single typed Firestore value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    StringValue(String),
    /// int64 travels as a decimal string
    IntegerValue(String),
    DoubleValue(f64),
    BooleanValue(bool),
    TimestampValue(String),
    NullValue(Option<()>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Full resource name; absent on create requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

impl Document {
    /// Last path segment of the resource name
    pub fn id(&self) -> Option<&str> {
        self.name.as_deref().and_then(|n| n.rsplit('/').next())
    }

    fn string(&self, field: &str) -> Result<String, PersistenceError> {
        match self.fields.get(field) {
            Some(Value::StringValue(s)) | Some(Value::TimestampValue(s)) => Ok(s.clone()),
            other => Err(PersistenceError::Decode(format!(
                "field `{}` is not a string: {:?}",
                field, other
            ))),
        }
    }

    fn score(&self, field: &str) -> Result<u64, PersistenceError> {
        match self.fields.get(field) {
            Some(Value::IntegerValue(s)) => s
                .parse::<i64>()
                .map(|v| v.max(0) as u64)
                .map_err(|e| PersistenceError::Decode(format!("field `{}`: {}", field, e))),
            // Browser clients may have written fractional numbers
            Some(Value::DoubleValue(v)) if v.is_finite() => Ok(v.max(0.0) as u64),
            other => Err(PersistenceError::Decode(format!(
                "field `{}` is not a number: {:?}",
                field, other
            ))),
        }
    }
}

/// One element of a `runQuery` response stream
#[derive(Debug, Clone, Deserialize)]
struct QueryRow {
    #[serde(default)]
    document: Option<Document>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunQueryRequest {
    structured_query: StructuredQuery,
}

#[derive(Debug, Serialize)]
struct StructuredQuery {
    from: Vec<CollectionSelector>,
    #[serde(rename = "orderBy")]
    order_by: Vec<Order>,
    limit: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectionSelector {
    collection_id: &'static str,
}

#[derive(Debug, Serialize)]
struct Order {
    field: FieldReference,
    direction: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldReference {
    field_path: &'static str,
}

/// Leaderboard over the Firestore REST API
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    config: StoreConfig,
    base_url: String,
}

impl FirestoreStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            base_url: FIRESTORE_BASE_URL.to_string(),
        }
    }

    /// Point at an emulator or proxy instead of the public endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Parent document of the leaderboard collection
    fn parent_path(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/apps/{}",
            self.base_url, self.config.project_id, self.config.app_id
        )
    }

    pub fn append_url(&self) -> String {
        format!("{}/{}?key={}", self.parent_path(), COLLECTION_ID, self.config.api_key)
    }

    pub fn query_url(&self) -> String {
        format!("{}:runQuery?key={}", self.parent_path(), self.config.api_key)
    }

    /// Request body for creating a score document
    pub fn encode_record(record: &ScoreRecord) -> Result<String, PersistenceError> {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), Value::StringValue(record.name.clone()));
        fields.insert("score".to_string(), Value::IntegerValue(record.score.to_string()));
        fields.insert("timestamp".to_string(), Value::StringValue(record.timestamp.clone()));
        Ok(serde_json::to_string(&Document { name: None, fields })?)
    }

    /// Id assigned in a create response
    pub fn decode_created(body: &str) -> Result<String, PersistenceError> {
        let document: Document = serde_json::from_str(body)?;
        document
            .id()
            .map(str::to_string)
            .ok_or_else(|| PersistenceError::Decode("created document has no name".to_string()))
    }

    /// Request body for the top-N query
    pub fn encode_top_query(limit: usize) -> Result<String, PersistenceError> {
        let request = RunQueryRequest {
            structured_query: StructuredQuery {
                from: vec![CollectionSelector {
                    collection_id: COLLECTION_ID,
                }],
                order_by: vec![Order {
                    field: FieldReference { field_path: "score" },
                    direction: "DESCENDING",
                }],
                limit,
            },
        };
        Ok(serde_json::to_string(&request)?)
    }

    /// Entries from a `runQuery` response, in response order
    pub fn decode_top(body: &str) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
        let rows: Vec<QueryRow> = serde_json::from_str(body)?;
        rows.into_iter()
            .filter_map(|row| row.document)
            .map(|doc| -> Result<LeaderboardEntry, PersistenceError> {
                Ok(LeaderboardEntry {
                    id: doc.id().unwrap_or_default().to_string(),
                    name: doc.string("name")?,
                    score: doc.score("score")?,
                    timestamp: doc.string("timestamp")?,
                })
            })
            .collect()
    }

    #[cfg(target_arch = "wasm32")]
    async fn post_json(&self, url: &str, body: String) -> Result<String, PersistenceError> {
        use wasm_bindgen::{JsCast, JsValue};
        use wasm_bindgen_futures::JsFuture;
        use web_sys::{Request, RequestInit, RequestMode, Response};

        fn js_err(e: JsValue) -> PersistenceError {
            PersistenceError::Transport(format!("{:?}", e))
        }

        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::Cors);
        opts.set_body(&JsValue::from_str(&body));

        let request = Request::new_with_str_and_init(url, &opts).map_err(js_err)?;
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(js_err)?;

        let window = web_sys::window()
            .ok_or_else(|| PersistenceError::Transport("no window".to_string()))?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_err)?
            .dyn_into()
            .map_err(js_err)?;

        let text = JsFuture::from(response.text().map_err(js_err)?)
            .await
            .map_err(js_err)?
            .as_string()
            .unwrap_or_default();

        if !response.ok() {
            return Err(PersistenceError::Rejected {
                status: response.status(),
                message: text,
            });
        }
        Ok(text)
    }

    #[cfg(not(target_arch = "wasm32"))]
    async fn post_json(&self, url: &str, _body: String) -> Result<String, PersistenceError> {
        Err(PersistenceError::Transport(format!(
            "no HTTP transport in native builds ({})",
            url.split('?').next().unwrap_or_default()
        )))
    }
}

impl LeaderboardStore for FirestoreStore {
    async fn append(&self, record: &ScoreRecord) -> Result<String, PersistenceError> {
        let body = Self::encode_record(record)?;
        let response = self.post_json(&self.append_url(), body).await?;
        Self::decode_created(&response)
    }

    async fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
        let body = Self::encode_top_query(limit)?;
        let response = self.post_json(&self.query_url(), body).await?;
        Self::decode_top(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> FirestoreStore {
        FirestoreStore::new(StoreConfig {
            api_key: "k3y".into(),
            project_id: "demo-project".into(),
            app_id: "responsability-game".into(),
        })
    }

    #[test]
    fn test_urls() {
        let s = store();
        assert_eq!(
            s.append_url(),
            "https://firestore.googleapis.com/v1/projects/demo-project/databases/(default)/documents/apps/responsability-game/leaderboard?key=k3y"
        );
        assert_eq!(
            s.with_base_url("http://localhost:8080/v1/").query_url(),
            "http://localhost:8080/v1/projects/demo-project/databases/(default)/documents/apps/responsability-game:runQuery?key=k3y"
        );
    }

    #[test]
    fn test_encode_record() {
        let body = FirestoreStore::encode_record(&ScoreRecord {
            name: "Anna".into(),
            score: 340,
            timestamp: "2026-10-15T10:00:00.000Z".into(),
        })
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["fields"]["name"]["stringValue"], "Anna");
        assert_eq!(json["fields"]["score"]["integerValue"], "340");
        assert_eq!(json["fields"]["timestamp"]["stringValue"], "2026-10-15T10:00:00.000Z");
        assert!(json.get("name").is_none());
    }

    #[test]
    fn test_encode_top_query() {
        let body = FirestoreStore::encode_top_query(100).unwrap();
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        let q = &json["structuredQuery"];
        assert_eq!(q["from"][0]["collectionId"], "leaderboard");
        assert_eq!(q["orderBy"][0]["field"]["fieldPath"], "score");
        assert_eq!(q["orderBy"][0]["direction"], "DESCENDING");
        assert_eq!(q["limit"], 100);
    }

    #[test]
    fn test_decode_created() {
        let body = r#"{
            "name": "projects/p/databases/(default)/documents/apps/a/leaderboard/AbC123",
            "fields": { "score": { "integerValue": "5" } },
            "createTime": "2026-10-15T10:00:00Z"
        }"#;
        assert_eq!(FirestoreStore::decode_created(body).unwrap(), "AbC123");
    }

    #[test]
    fn test_decode_top() {
        let body = r#"[
            { "document": {
                "name": "projects/p/databases/(default)/documents/apps/a/leaderboard/one",
                "fields": {
                    "name": { "stringValue": "Marco" },
                    "score": { "integerValue": "90" },
                    "timestamp": { "stringValue": "2026-10-01T00:00:00.000Z" }
                } }, "readTime": "2026-10-15T10:00:00Z" },
            { "document": {
                "name": "projects/p/databases/(default)/documents/apps/a/leaderboard/two",
                "fields": {
                    "name": { "stringValue": "Sara" },
                    "score": { "doubleValue": 45.0 },
                    "timestamp": { "stringValue": "2026-10-02T00:00:00.000Z" }
                } } }
        ]"#;
        let entries = FirestoreStore::decode_top(body).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "one");
        assert_eq!(entries[0].score, 90);
        assert_eq!(entries[1].name, "Sara");
        assert_eq!(entries[1].score, 45);
    }

    #[test]
    fn test_decode_empty_result() {
        let body = r#"[ { "readTime": "2026-10-15T10:00:00Z" } ]"#;
        assert!(FirestoreStore::decode_top(body).unwrap().is_empty());
    }

    #[test]
    fn test_decode_missing_field_is_error() {
        let body = r#"[ { "document": { "name": "x/y", "fields": { "name": { "stringValue": "A" } } } } ]"#;
        assert!(matches!(
            FirestoreStore::decode_top(body),
            Err(PersistenceError::Decode(_))
        ));
    }

    #[test]
    fn test_native_transport_fails_cleanly() {
        let err = pollster::block_on(store().top(10)).unwrap_err();
        assert!(matches!(err, PersistenceError::Transport(_)));
    }
}
