//! In-process stand-in for the gateway/registry REST API.
//!
//! Keeps every collection in memory and mimics the behaviours the client
//! relies on: enveloped create bodies, server-assigned ids, a withheld
//! gateway credential, `/info` reads for resources, URI-keyed roots and
//! `include_inactive` filtering.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::Json;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use forge_provider::{Client, ResolvedConfig};
use percent_encoding::percent_decode_str;
use serde_json::{Map, Value, json};

const TIMESTAMP: &str = "2025-01-01T00:00:00Z";

#[derive(Default)]
struct Store {
    collections: BTreeMap<String, Vec<Value>>,
    next_id: u64,
    requests: Vec<(Method, String)>,
}

/// Running fake service; dropped with the test runtime.
pub struct FakeGateway {
    pub base_url: String,
    store: Arc<Mutex<Store>>,
}

impl FakeGateway {
    pub async fn start() -> Self {
        let store = Arc::new(Mutex::new(Store::default()));
        let handler_store = store.clone();
        let app = Router::new().fallback(move |req: Request<Body>| {
            let store = handler_store.clone();
            async move { handle(store, req).await }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            store,
        }
    }

    pub fn client(&self) -> Client {
        Client::new(&ResolvedConfig::new(self.base_url.clone(), Some("test-token".to_string())).unwrap())
    }

    /// Raw stored record, including fields the API never returns.
    pub fn stored(&self, collection: &str, key: &str) -> Option<Value> {
        let store = self.store.lock().unwrap();
        store
            .collections
            .get(collection)?
            .iter()
            .find(|record| record_key(collection, record) == key)
            .cloned()
    }

    /// Insert a record directly, as if created out of band.
    pub fn seed(&self, collection: &str, record: Value) {
        let mut store = self.store.lock().unwrap();
        store
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(record);
    }

    pub fn request_count(&self) -> usize {
        self.store.lock().unwrap().requests.len()
    }
}

fn envelope_key(collection: &str) -> Option<&'static str> {
    match collection {
        "servers" => Some("server"),
        "tools" => Some("tool"),
        "resources" => Some("resource"),
        "prompts" => Some("prompt"),
        _ => None,
    }
}

fn record_key<'a>(collection: &str, record: &'a Value) -> &'a str {
    let key = if collection == "roots" { "uri" } else { "id" };
    record.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn public_view(collection: &str, record: &Value) -> Value {
    let mut record = record.clone();
    if collection == "gateways" {
        if let Some(object) = record.as_object_mut() {
            object.remove("auth_value");
        }
    }
    record
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

async fn handle(store: Arc<Mutex<Store>>, req: Request<Body>) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let include_inactive = req
        .uri()
        .query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .any(|(k, v)| k == "include_inactive" && v == "true")
        })
        .unwrap_or(false);
    let bytes = to_bytes(req.into_body(), usize::MAX).await.unwrap();
    let body: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    let mut store = store.lock().unwrap();
    store.requests.push((method.clone(), path.clone()));

    let segments: Vec<String> = path
        .trim_start_matches('/')
        .split('/')
        .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
        .collect();
    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

    match (method, segments.as_slice()) {
        (Method::GET, ["health"]) => reply(StatusCode::OK, json!({"status": "healthy"})),

        (Method::GET, [collection]) => {
            let records = store.collections.get(*collection).cloned().unwrap_or_default();
            let listed: Vec<Value> = records
                .iter()
                .filter(|r| {
                    *collection == "roots"
                        || include_inactive
                        || r.get("is_active").and_then(Value::as_bool).unwrap_or(true)
                })
                .map(|r| public_view(collection, r))
                .collect();
            reply(StatusCode::OK, Value::Array(listed))
        }

        (Method::POST, [collection]) => {
            let mut record = match envelope_key(collection) {
                Some(key) => {
                    let mut fields = body.get(key).cloned().unwrap_or(Value::Null);
                    let Some(object) = fields.as_object_mut() else {
                        return reply(StatusCode::UNPROCESSABLE_ENTITY, json!({"detail": "missing envelope"}));
                    };
                    let visibility = body.get("visibility").cloned().unwrap_or(json!("public"));
                    object.insert("visibility".to_string(), visibility);
                    if let Some(team_id) = body.get("team_id") {
                        object.insert("team_id".to_string(), team_id.clone());
                    }
                    fields
                }
                None => body,
            };
            let Some(object) = record.as_object_mut() else {
                return reply(StatusCode::UNPROCESSABLE_ENTITY, json!({"detail": "expected object"}));
            };

            if *collection == "roots" {
                let uri = object.get("uri").and_then(Value::as_str).unwrap_or_default().to_string();
                let exists = store
                    .collections
                    .get("roots")
                    .is_some_and(|roots| roots.iter().any(|r| record_key("roots", r) == uri));
                if exists {
                    return reply(StatusCode::CONFLICT, json!({"detail": "root already exists"}));
                }
            } else {
                store.next_id += 1;
                let id = format!("{}-{}", collection, store.next_id);
                object.insert("id".to_string(), json!(id));
                object.entry("is_active").or_insert(json!(true));
                object.insert("created_at".to_string(), json!(TIMESTAMP));
                object.insert("updated_at".to_string(), json!(TIMESTAMP));
            }

            store
                .collections
                .entry(collection.to_string())
                .or_default()
                .push(record.clone());
            reply(StatusCode::CREATED, public_view(collection, &record))
        }

        (Method::GET, ["resources", id]) => {
            // Bare item path serves content, not metadata.
            match find(&store, "resources", id) {
                Some(_) => reply(StatusCode::OK, json!({"type": "text", "text": "..."})),
                None => reply(StatusCode::NOT_FOUND, json!({"detail": "Resource not found"})),
            }
        }

        (Method::GET, ["resources", id, "info"]) => match find(&store, "resources", id) {
            Some(record) => reply(StatusCode::OK, record),
            None => reply(StatusCode::NOT_FOUND, json!({"detail": "Resource not found"})),
        },

        (Method::GET, [collection, id]) if *collection != "roots" => {
            match find(&store, collection, id) {
                Some(record) => reply(StatusCode::OK, public_view(collection, &record)),
                None => reply(StatusCode::NOT_FOUND, json!({"detail": "Not found"})),
            }
        }

        (Method::PUT, [collection, id]) if *collection != "roots" => {
            let Some(updates) = body.as_object() else {
                return reply(StatusCode::UNPROCESSABLE_ENTITY, json!({"detail": "expected object"}));
            };
            let Some(record) = store
                .collections
                .get_mut(*collection)
                .and_then(|records| records.iter_mut().find(|r| record_key(collection, r) == *id))
            else {
                return reply(StatusCode::NOT_FOUND, json!({"detail": "Not found"}));
            };
            if let Some(object) = record.as_object_mut() {
                merge(object, updates);
            }
            let updated = record.clone();
            reply(StatusCode::OK, public_view(collection, &updated))
        }

        (Method::DELETE, [collection, id]) => {
            let Some(records) = store.collections.get_mut(*collection) else {
                return StatusCode::NOT_FOUND.into_response();
            };
            let before = records.len();
            records.retain(|r| record_key(collection, r) != *id);
            if records.len() < before {
                StatusCode::NO_CONTENT.into_response()
            } else {
                StatusCode::NOT_FOUND.into_response()
            }
        }

        _ => reply(StatusCode::METHOD_NOT_ALLOWED, json!({"detail": "Method not allowed"})),
    }
}

fn find(store: &Store, collection: &str, key: &str) -> Option<Value> {
    store
        .collections
        .get(collection)?
        .iter()
        .find(|record| record_key(collection, record) == key)
        .cloned()
}

fn merge(record: &mut Map<String, Value>, updates: &Map<String, Value>) {
    for (key, value) in updates {
        record.insert(key.clone(), value.clone());
    }
    record.insert("updated_at".to_string(), json!("2025-06-01T00:00:00Z"));
}
