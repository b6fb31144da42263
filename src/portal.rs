//! Top-level coordinator.
//!
//! Owns the transport, the session manager, the resolver and the navigator, and
//! is the single place that reacts to `AuthenticationExpired` events: the session
//! is dropped and the view is forced to the login page. Every call that can hit
//! the network drains pending events before returning.

use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::debug;

use crate::auth::{RegistrationForm, SessionManager};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::guard::{decide, role_home, Decision, Navigation, Navigator};
use crate::resources::{LinkedCreate, ResourceKind, ResourceResolver};
use crate::store::{CredentialStore, FileCredentialStore};
use crate::transport::{Transport, TransportEvent};
use crate::types::{IdentityClaim, Role, Session};

pub struct Portal {
    transport: Arc<Transport>,
    sessions: SessionManager,
    resolver: ResourceResolver,
    navigator: Navigator,
    events: broadcast::Receiver<TransportEvent>,
}

impl Portal {
    pub async fn open(config: &ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self, ClientError> {
        let transport = Arc::new(Transport::new(&config.api, store)?);
        let events = transport.subscribe();
        let sessions = SessionManager::restore(Arc::clone(&transport), config).await;
        let navigator = Navigator::new(sessions.subscribe());
        let resolver = ResourceResolver::new(Arc::clone(&transport));

        Ok(Self {
            transport,
            sessions,
            resolver,
            navigator,
            events,
        })
    }

    /// Open with the file-backed store described by the config
    pub async fn open_with_file_store(config: &ClientConfig) -> Result<Self, ClientError> {
        let store = FileCredentialStore::new(&config.session.store_dir, &config.session.storage_key);
        Self::open(config, Arc::new(store)).await
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    // Read-side accessors drain pending expiries first: a 401 seen through
    // `transport()` has already emptied the store.

    pub fn session(&mut self) -> Option<Session> {
        self.pump_events();
        self.sessions.session()
    }

    pub fn is_authenticated(&mut self) -> bool {
        self.pump_events();
        self.sessions.is_authenticated()
    }

    pub fn role(&mut self) -> Option<Role> {
        self.pump_events();
        self.sessions.role()
    }

    pub fn identity(&mut self) -> Option<IdentityClaim> {
        self.pump_events();
        self.sessions.identity()
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<Session, ClientError> {
        // Stale expiries from before this login must not wipe the new session
        self.pump_events();
        let result = self.sessions.login(username, password).await;
        self.pump_events();
        result
    }

    /// Log in through a specific portal and land on that role's home.
    ///
    /// A role mismatch is reported but the session is kept, so the user can
    /// switch portals without logging in again.
    pub async fn login_to_portal(
        &mut self,
        username: &str,
        password: &str,
        portal: &Role,
    ) -> Result<Navigation, ClientError> {
        let session = self.login(username, password).await?;
        let actual = session
            .role
            .ok_or_else(|| ClientError::MalformedResponse("login response carried no role".to_string()))?;

        if &actual != portal {
            return Err(ClientError::WrongPortal {
                actual,
                selected: portal.clone(),
            });
        }

        Ok(self.navigator.navigate(role_home(&actual)))
    }

    pub async fn register(&mut self, form: &RegistrationForm) -> Result<Value, ClientError> {
        let result = self.sessions.register(form).await;
        self.pump_events();
        result
    }

    pub async fn logout(&mut self) -> Result<(), ClientError> {
        let result = self.sessions.logout().await;
        self.pump_events();
        self.navigator.sync();
        result
    }

    pub fn authorize(&mut self, required: &[Role]) -> Decision {
        self.pump_events();
        decide(self.sessions.session().as_ref(), required)
    }

    pub fn navigate(&mut self, path: &str) -> Navigation {
        self.pump_events();
        self.navigator.navigate(path)
    }

    pub fn current_view(&mut self) -> String {
        self.pump_events();
        self.navigator.current().to_string()
    }

    pub async fn resolve_mine(&mut self, kind: ResourceKind) -> Result<Value, ClientError> {
        let identity = self.sessions.identity();
        let result = self.resolver.resolve_mine(identity.as_ref(), kind).await;
        self.pump_events();
        result
    }

    pub async fn create_with_fallback_shape(&mut self, create: &LinkedCreate) -> Result<Value, ClientError> {
        let result = self.resolver.create_with_fallback_shape(create).await;
        self.pump_events();
        result
    }

    /// Run a plain collaborator call (no fallback logic) through the transport
    pub async fn call<T, F, Fut>(&mut self, f: F) -> Result<T, ClientError>
    where
        F: FnOnce(Arc<Transport>) -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let result = f(Arc::clone(&self.transport)).await;
        self.pump_events();
        result
    }

    /// Handle queued transport events; returns how many were seen
    pub fn pump_events(&mut self) -> usize {
        let mut handled = 0;
        loop {
            match self.events.try_recv() {
                Ok(TransportEvent::AuthenticationExpired) | Err(TryRecvError::Lagged(_)) => {
                    handled += 1;
                    self.on_expired();
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        handled
    }

    fn on_expired(&mut self) {
        let dropped = self.sessions.handle_expired();
        let moved = self.navigator.force_login();
        debug!(dropped, moved, "handled authentication expiry");
    }
}
