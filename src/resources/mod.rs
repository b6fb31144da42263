//! Resource resolution and the thin CRUD collaborators built on the transport.

pub mod employees;
pub mod leave;
mod linked;
pub mod payroll;
pub mod reports;
mod resolver;
pub mod users;

pub use linked::{LinkedCreate, LinkedReference};
pub use resolver::ResourceResolver;

use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::probe::Hypothesis;
use crate::types::UserId;

/// "My own" resources that can be located without a guaranteed endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    EmployeeProfile,
    Leaves,
}

impl ResourceKind {
    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::EmployeeProfile => "employee profile",
            ResourceKind::Leaves => "leave list",
        }
    }

    /// Candidate endpoints, most specific first, plus the owner-id fallback
    pub fn plan(&self) -> ResolverPlan {
        match self {
            ResourceKind::EmployeeProfile => ResolverPlan {
                candidates: vec![
                    Hypothesis::get("/profile"),
                    Hypothesis::get("/employees/me"),
                    Hypothesis::get("/employees/my"),
                ],
                owner_lookup: Some(|owner| Hypothesis::get(format!("/employees/by-user/{}", owner))),
                shape: ResponseShape::Object,
            },
            ResourceKind::Leaves => ResolverPlan {
                candidates: vec![Hypothesis::get("/leave/my"), Hypothesis::get("/leaves/my")],
                owner_lookup: Some(|owner| Hypothesis::get(format!("/leave/by-user/{}", owner))),
                shape: ResponseShape::List,
            },
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "profile" | "employee" | "employee-profile" => Ok(ResourceKind::EmployeeProfile),
            "leaves" | "leave" => Ok(ResourceKind::Leaves),
            other => Err(format!("unknown resource kind '{}'", other)),
        }
    }
}

/// How to locate one resource kind
#[derive(Debug, Clone)]
pub struct ResolverPlan {
    pub candidates: Vec<Hypothesis>,
    pub owner_lookup: Option<fn(UserId) -> Hypothesis>,
    pub shape: ResponseShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    Object,
    /// Anything that is not an array reads as an empty list
    List,
}

impl ResponseShape {
    pub fn apply(&self, value: Value) -> Value {
        match (self, value) {
            (ResponseShape::List, Value::Array(items)) => Value::Array(items),
            (ResponseShape::List, _) => Value::Array(Vec::new()),
            (ResponseShape::Object, value) => value,
        }
    }
}

/// Coerce a list response; collaborators tolerate non-array bodies
pub(crate) fn into_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}
