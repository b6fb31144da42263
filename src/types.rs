/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric user identifier as issued by the backend
pub type UserId = i64;

/// Portal role attached to a session.
///
/// The backend only issues `ADMIN` and `EMPLOYEE` today, but any other value is
/// kept verbatim so it can still be routed to the generic member home.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Employee,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "ADMIN",
            Role::Employee => "EMPLOYEE",
            Role::Other(name) => name,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "ADMIN" | "ROLE_ADMIN" => Role::Admin,
            "EMPLOYEE" | "ROLE_EMPLOYEE" => Role::Employee,
            _ => Role::Other(value),
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Role::from(value.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Role::from(s))
    }
}

/// Persisted session record.
///
/// Serialized as `{ "token", "id", "username", "role" }` under a single storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(rename = "id", alias = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_id: None,
            username: None,
            role: None,
        }
    }

    pub fn with_user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Derive the identity used for authorization and owner lookups.
    ///
    /// A session without a role carries no identity: it still stamps requests,
    /// but every authorization decision treats it as anonymous.
    pub fn identity(&self) -> Option<IdentityClaim> {
        if self.token.is_empty() {
            return None;
        }
        self.role.clone().map(|role| IdentityClaim {
            user_id: self.user_id,
            role,
        })
    }
}

/// `{ userId, role }` derived from a session, never stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaim {
    pub user_id: Option<UserId>,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_parses_known_and_unknown_values() {
        assert_eq!(Role::from("ADMIN"), Role::Admin);
        assert_eq!(Role::from("employee"), Role::Employee);
        assert_eq!(Role::from("ROLE_ADMIN"), Role::Admin);
        assert_eq!(Role::from("AUDITOR"), Role::Other("AUDITOR".into()));
    }

    #[test]
    fn session_serializes_with_short_id_key() {
        let session = Session::new("t1").with_user_id(7).with_role(Role::Employee);
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value, json!({ "token": "t1", "id": 7, "role": "EMPLOYEE" }));
    }

    #[test]
    fn session_accepts_user_id_alias() {
        let session: Session =
            serde_json::from_value(json!({ "token": "t", "userId": 3, "role": "ADMIN" })).unwrap();
        assert_eq!(session.user_id, Some(3));
        assert_eq!(session.role, Some(Role::Admin));
    }

    #[test]
    fn session_without_role_has_no_identity() {
        assert!(Session::new("t").with_user_id(1).identity().is_none());
        assert!(Session::new("").with_role(Role::Admin).identity().is_none());
    }
}
