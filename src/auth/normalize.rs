use serde_json::{Map, Value};

use crate::error::ClientError;
use crate::types::{Role, Session, UserId};

/// Field names the backend has used for the bearer token, in priority order
const TOKEN_FIELDS: &[&str] = &["accessToken", "token", "jwt", "access_token"];

/// Turn whatever the login endpoint returned into the canonical session shape.
///
/// Identity may be nested under `user` or flattened next to the token, and the
/// whole payload may sit inside a `{ "success": true, "data": {...} }` envelope.
pub fn normalize_login(body: &Value) -> Result<Session, ClientError> {
    let root = body
        .as_object()
        .ok_or_else(|| ClientError::MalformedResponse("login response is not an object".to_string()))?;

    let payload = match find_token(root) {
        Some(_) => root,
        None => root
            .get("data")
            .and_then(Value::as_object)
            .filter(|data| find_token(data).is_some())
            .ok_or_else(|| {
                ClientError::MalformedResponse(format!(
                    "no token field ({}) in login response",
                    TOKEN_FIELDS.join(", ")
                ))
            })?,
    };

    let token = find_token(payload).unwrap_or_default();
    let user = payload.get("user").and_then(Value::as_object);

    let user_id = user
        .and_then(|u| u.get("id"))
        .and_then(as_user_id)
        .or_else(|| payload.get("id").and_then(as_user_id))
        .or_else(|| payload.get("userId").and_then(as_user_id));

    let username = user
        .and_then(|u| u.get("username"))
        .or_else(|| payload.get("username"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let role = user
        .and_then(|u| u.get("role"))
        .or_else(|| payload.get("role"))
        .and_then(Value::as_str)
        .filter(|r| !r.trim().is_empty())
        .map(Role::from);

    Ok(Session {
        token,
        user_id,
        username,
        role,
    })
}

fn find_token(map: &Map<String, Value>) -> Option<String> {
    TOKEN_FIELDS
        .iter()
        .filter_map(|field| map.get(*field))
        .find_map(|v| v.as_str().filter(|s| !s.trim().is_empty()).map(str::to_string))
}

fn as_user_id(value: &Value) -> Option<UserId> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
