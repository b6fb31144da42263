//! Authenticated transport: the single choke point for every backend call.
//!
//! Outbound, each request is stamped with the bearer token read fresh from the
//! credential store. Inbound, a 401 clears the store, emits
//! [`TransportEvent::AuthenticationExpired`] for whoever owns navigation, and is
//! still returned to the caller as an error. Nothing is retried here.

use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::ClientError;
use crate::store::CredentialStore;

const EVENT_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    /// The server answered 401; the stored session has already been cleared
    AuthenticationExpired,
}

/// A request relative to the API base
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

pub struct Transport {
    client: reqwest::Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
    events: broadcast::Sender<TransportEvent>,
}

impl Transport {
    pub fn new(config: &ApiConfig, store: Arc<dyn CredentialStore>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        // Validate once so every later join is infallible
        url::Url::parse(&config.base_url)?;

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            store,
            events,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.events.subscribe()
    }

    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Send a request and decode the JSON answer
    pub async fn send(&self, request: ApiRequest) -> Result<Value, ClientError> {
        let url = self.url_for(&request.path);
        let mut builder = self.client.request(request.method.clone(), &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        // Read fresh: a login or logout may have happened since the last call
        let stamped = match self.store.load().await {
            Some(session) => {
                builder = builder.bearer_auth(&session.token);
                true
            }
            None => false,
        };

        debug!(method = %request.method, path = %request.path, stamped, "sending request");

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let body = decode_body(&bytes);

        debug!(method = %request.method, path = %request.path, status = status.as_u16(), "response received");

        if status.is_success() {
            return Ok(body);
        }

        if status == StatusCode::UNAUTHORIZED {
            self.expire(&request).await;
            return Err(ClientError::AuthenticationExpired);
        }

        Err(ClientError::from_response(status, &request.path, body))
    }

    pub async fn get(&self, path: &str) -> Result<Value, ClientError> {
        self.send(ApiRequest::get(path)).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value, ClientError> {
        self.send(ApiRequest::post(path).json(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<Value, ClientError> {
        self.send(ApiRequest::put(path).json(body)).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<Value, ClientError> {
        self.send(ApiRequest::patch(path).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ClientError> {
        self.send(ApiRequest::delete(path)).await
    }

    /// Reset after a 401. Safe to run any number of times concurrently.
    async fn expire(&self, request: &ApiRequest) {
        warn!(method = %request.method, path = %request.path, "authentication rejected, clearing session");

        if let Err(e) = self.store.clear().await {
            warn!("Failed to clear credential store: {}", e);
        }

        // No subscribers just means nobody is driving navigation
        let _ = self.events.send(TransportEvent::AuthenticationExpired);
    }
}

fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::store::MemoryCredentialStore;
    use serde_json::json;

    #[test]
    fn decode_body_handles_empty_json_and_text() {
        assert_eq!(decode_body(b""), Value::Null);
        assert_eq!(decode_body(b"  \n"), Value::Null);
        assert_eq!(decode_body(br#"{"a":1}"#), json!({ "a": 1 }));
        assert_eq!(decode_body(b"Logged out"), json!("Logged out"));
    }

    #[test]
    fn url_for_joins_against_base() {
        let config = ClientConfig::for_base_url("http://localhost:9000");
        let transport = Transport::new(&config.api, Arc::new(MemoryCredentialStore::new())).unwrap();
        assert_eq!(transport.url_for("/leave/my"), "http://localhost:9000/api/v1/leave/my");
        assert_eq!(transport.url_for("profile"), "http://localhost:9000/api/v1/profile");
    }

    #[test]
    fn request_builder_collects_query_and_body() {
        let request = ApiRequest::post("/leave")
            .query("startDate", "2024-01-01")
            .query("type", "PAID")
            .json(json!({}));
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.query.len(), 2);
        assert_eq!(request.body, Some(json!({})));
    }
}
