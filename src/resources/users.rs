// User accounts: whoami and admin account management
use serde_json::{json, Value};

use super::into_list;
use crate::error::ClientError;
use crate::transport::{ApiRequest, Transport};
use crate::types::{Role, UserId};

pub const USERS_PATH: &str = "/users";

/// Server's view of the current account (`id`, `username`, `role`, `enabled`)
pub async fn me(transport: &Transport) -> Result<Value, ClientError> {
    transport.get(&format!("{}/me", USERS_PATH)).await
}

pub async fn list(
    transport: &Transport,
    role: Option<&Role>,
    enabled: Option<bool>,
) -> Result<Vec<Value>, ClientError> {
    let mut request = ApiRequest::get(USERS_PATH);
    if let Some(role) = role {
        request = request.query("role", role);
    }
    if let Some(enabled) = enabled {
        request = request.query("enabled", enabled);
    }
    transport.send(request).await.map(into_list)
}

pub async fn create(transport: &Transport, payload: Value) -> Result<Value, ClientError> {
    transport.post(USERS_PATH, payload).await
}

pub async fn set_enabled(transport: &Transport, user_id: UserId, enabled: bool) -> Result<Value, ClientError> {
    transport
        .patch(
            &format!("{}/{}/status", USERS_PATH, user_id),
            json!({ "enabled": enabled }),
        )
        .await
}
