#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};

use payroll_portal::config::ClientConfig;
use payroll_portal::store::MemoryCredentialStore;
use payroll_portal::{Portal, Session};

const API_PREFIX: &str = "/api/v1";

/// One request as the mock backend saw it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Debug, Clone)]
struct Reply {
    status: StatusCode,
    body: Value,
}

#[derive(Default)]
struct MockState {
    // The last scripted reply for a route repeats once the queue is down to it
    routes: Mutex<HashMap<(String, String), VecDeque<Reply>>>,
    requests: Mutex<Vec<Recorded>>,
}

/// Scriptable stand-in for the payroll API, served on a free local port
pub struct MockBackend {
    pub port: u16,
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockBackend {
    pub async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}{}", port, API_PREFIX);
        let state = Arc::new(MockState::default());

        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind mock backend")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let backend = Self { port, base_url, state };
        backend.wait_ready(Duration::from_secs(5)).await?;
        Ok(backend)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if client.get(format!("{}/__ready", self.base_url)).send().await.is_ok() {
                self.state.requests.lock().unwrap().clear();
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("mock backend did not become ready on {} within {:?}", self.base_url, timeout)
    }

    /// Script a reply for `method path` (path relative to `/api/v1`, no query)
    pub fn on(&self, method: &str, path: &str, status: u16, body: Value) -> &Self {
        let status = StatusCode::from_u16(status).expect("valid status code");
        self.state
            .routes
            .lock()
            .unwrap()
            .entry((method.to_uppercase(), path.to_string()))
            .or_default()
            .push_back(Reply { status, body });
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    /// `"METHOD path"` for every request, in arrival order
    pub fn request_lines(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::for_base_url(&self.base_url)
    }

    /// Portal over an empty in-memory store
    pub async fn portal(&self) -> Result<(Portal, Arc<MemoryCredentialStore>)> {
        let store = Arc::new(MemoryCredentialStore::new());
        let portal = Portal::open(&self.config(), store.clone()).await?;
        Ok((portal, store))
    }

    /// Portal whose store already holds `session`, as after an earlier login
    pub async fn portal_with(&self, session: &Session) -> Result<(Portal, Arc<MemoryCredentialStore>)> {
        let store = Arc::new(MemoryCredentialStore::with_raw(serde_json::to_string(session)?));
        let portal = Portal::open(&self.config(), store.clone()).await?;
        Ok((portal, store))
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix(API_PREFIX)
        .unwrap_or(uri.path())
        .to_string();
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };

    state.requests.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    let reply = {
        let mut routes = state.routes.lock().unwrap();
        routes
            .get_mut(&(method.to_string(), path.clone()))
            .and_then(|queue| if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() })
    };

    match reply {
        Some(Reply { status, body }) if body.is_null() => status.into_response(),
        Some(Reply { status, body }) => (status, Json(body)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Not Found", "path": path })),
        )
            .into_response(),
    }
}

/// A logged-in employee, matching what `POST /auth/login` would have produced
pub fn employee_session(token: &str, user_id: i64, username: &str) -> Session {
    Session::new(token)
        .with_user_id(user_id)
        .with_username(username)
        .with_role(payroll_portal::Role::Employee)
}

pub fn admin_session(token: &str, user_id: i64, username: &str) -> Session {
    Session::new(token)
        .with_user_id(user_id)
        .with_username(username)
        .with_role(payroll_portal::Role::Admin)
}
