//! Session manager: login, registration and logout over the authenticated transport.
//!
//! State is `Anonymous` (`None`) or `Authenticated` (`Some(session)`). The
//! credential store is written only from here; dependents observe transitions
//! through a watch channel.

mod normalize;
mod register;

pub use normalize::normalize_login;
pub use register::{is_valid_password, is_valid_phone, normalize_date, RegistrationForm};

use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::probe::{first_reachable, AdvancePolicy, Hypothesis, Probe};
use crate::transport::{ApiRequest, Transport};
use crate::types::{IdentityClaim, Role, Session};

pub const LOGIN_PATH: &str = "/auth/login";
pub const LOGOUT_PATH: &str = "/auth/logout";

pub struct SessionManager {
    transport: Arc<Transport>,
    register_paths: Vec<Hypothesis>,
    revoke_on_logout: bool,
    state: watch::Sender<Option<Session>>,
}

impl SessionManager {
    /// Start from whatever the credential store holds
    pub async fn restore(transport: Arc<Transport>, config: &ClientConfig) -> Self {
        let initial = transport.store().load().await;
        if let Some(session) = &initial {
            debug!(username = ?session.username, role = ?session.role, "restored stored session");
        }

        let (state, _) = watch::channel(initial);
        Self {
            transport,
            register_paths: config
                .probe
                .register_paths
                .iter()
                .map(|path| Hypothesis::post(path.as_str()))
                .collect(),
            revoke_on_logout: config.session.revoke_on_logout,
            state,
        }
    }

    pub fn session(&self) -> Option<Session> {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.state.borrow().as_ref().and_then(|s| s.role.clone())
    }

    pub fn identity(&self) -> Option<IdentityClaim> {
        self.state.borrow().as_ref().and_then(Session::identity)
    }

    /// Observe session transitions
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.state.subscribe()
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ClientError> {
        let request = ApiRequest::post(LOGIN_PATH).json(json!({
            "username": username.trim(),
            "password": password,
        }));

        let body = match self.transport.send(request).await {
            Ok(body) => body,
            Err(ClientError::AuthenticationExpired) | Err(ClientError::Forbidden(_)) => {
                return Err(ClientError::InvalidCredentials)
            }
            Err(e) => return Err(e),
        };

        let session = normalize_login(&body)?;
        self.transport.store().save(&session).await?;
        self.state.send_replace(Some(session.clone()));

        info!(username = ?session.username, role = ?session.role, "logged in");
        Ok(session)
    }

    /// Create an account without touching the current session.
    ///
    /// Registration routes are probed in order; only "route absent" answers
    /// move on to the next one.
    pub async fn register(&self, form: &RegistrationForm) -> Result<Value, ClientError> {
        let payload = form.to_payload()?;
        let transport: &Transport = &self.transport;
        let payload = &payload;

        let probe = first_reachable(
            self.register_paths.iter().cloned(),
            AdvancePolicy::RouteAbsent,
            move |hypothesis: Hypothesis| transport.send(hypothesis.request().json(payload.clone())),
        )
        .await?;

        match probe {
            Probe::Found { index, value } => {
                info!(endpoint = %self.register_paths[index], "registered new account");
                Ok(value)
            }
            Probe::Exhausted { attempts, .. } => {
                debug!(attempts, "no registration endpoint answered");
                Err(ClientError::NoRegistrationEndpoint)
            }
        }
    }

    /// Drop the session. Safe to call when already anonymous.
    pub async fn logout(&self) -> Result<(), ClientError> {
        if self.revoke_on_logout && self.transport.store().load().await.is_some() {
            // Best effort: the server may not know this route, or the token may be dead already
            if let Err(e) = self.transport.send(ApiRequest::post(LOGOUT_PATH)).await {
                debug!("server-side logout skipped: {}", e);
            }
        }

        self.transport.store().clear().await?;
        if self.state.send_if_modified(|state| state.take().is_some()) {
            info!("logged out");
        }
        Ok(())
    }

    /// The transport saw a 401 and already cleared the store
    pub fn handle_expired(&self) -> bool {
        let changed = self.state.send_if_modified(|state| state.take().is_some());
        if changed {
            info!("session expired");
        }
        changed
    }
}
