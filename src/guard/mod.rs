//! Route authorization guard.
//!
//! `decide` is a pure policy check; [`Navigator`] applies it to the route table
//! and re-applies it whenever the session changes.

mod routes;

pub use routes::{Access, Navigation, Navigator, RouteDef, RouteMatch, RouteTable};

use crate::types::{Role, Session};

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const ADMIN_HOME: &str = "/admin";
pub const MEMBER_HOME: &str = "/me";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectToLogin,
    /// Authenticated, but this view belongs to another portal
    RedirectToRoleHome(&'static str),
}

impl Decision {
    /// Where the caller should be sent, if anywhere
    pub fn target(&self) -> Option<&'static str> {
        match self {
            Decision::Allow => None,
            Decision::RedirectToLogin => Some(LOGIN_PATH),
            Decision::RedirectToRoleHome(home) => Some(home),
        }
    }
}

/// Landing view for a role
pub fn role_home(role: &Role) -> &'static str {
    if role.is_admin() {
        ADMIN_HOME
    } else {
        MEMBER_HOME
    }
}

/// Decide whether `session` may see a view requiring one of `required`.
///
/// An empty `required` set admits any authenticated session. A session with a
/// token but no role counts as anonymous.
pub fn decide(session: Option<&Session>, required: &[Role]) -> Decision {
    let Some(identity) = session.and_then(Session::identity) else {
        return Decision::RedirectToLogin;
    };

    if !required.is_empty() && !required.contains(&identity.role) {
        return Decision::RedirectToRoleHome(role_home(&identity.role));
    }

    Decision::Allow
}
