use std::collections::HashMap;
use tokio::sync::watch;
use tracing::debug;

use super::{decide, Decision, ADMIN_HOME, HOME_PATH, LOGIN_PATH, MEMBER_HOME, REGISTER_PATH};
use crate::types::{Role, Session};

/// Redirect chains longer than this are treated as a loop
const MAX_REDIRECTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    AdminOnly,
    /// Employees and admins
    Members,
}

impl Access {
    pub fn required_roles(&self) -> Option<Vec<Role>> {
        match self {
            Access::Public => None,
            Access::AdminOnly => Some(vec![Role::Admin]),
            Access::Members => Some(vec![Role::Employee, Role::Admin]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDef {
    pub pattern: &'static str,
    pub access: Access,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: RouteDef,
    pub params: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDef>,
}

impl Default for RouteTable {
    fn default() -> Self {
        let route = |pattern, access| RouteDef { pattern, access };
        Self {
            routes: vec![
                route(HOME_PATH, Access::Public),
                route(LOGIN_PATH, Access::Public),
                route(REGISTER_PATH, Access::Public),
                route(ADMIN_HOME, Access::AdminOnly),
                route("/admin/employees/:id", Access::AdminOnly),
                route("/admin/reports", Access::AdminOnly),
                route("/admin/leaves/:id", Access::AdminOnly),
                route(MEMBER_HOME, Access::Members),
                route("/me/payroll", Access::Members),
            ],
        }
    }
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDef>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[RouteDef] {
        &self.routes
    }

    /// First route whose pattern matches `path`; `:name` segments capture
    pub fn match_path(&self, path: &str) -> Option<RouteMatch> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        self.routes.iter().find_map(|route| {
            let pattern: Vec<&str> = route.pattern.split('/').filter(|s| !s.is_empty()).collect();
            if pattern.len() != segments.len() {
                return None;
            }

            let mut params = HashMap::new();
            for (expected, actual) in pattern.iter().zip(&segments) {
                match expected.strip_prefix(':') {
                    Some(name) => {
                        params.insert(name.to_string(), actual.to_string());
                    }
                    None if expected == actual => {}
                    None => return None,
                }
            }

            Some(RouteMatch {
                route: *route,
                params,
            })
        })
    }

    /// Decide what `session` may see when asking for `path`; `None` for unknown paths
    pub fn decide_path(&self, path: &str, session: Option<&Session>) -> Option<Decision> {
        let RouteMatch { route, .. } = self.match_path(path)?;
        Some(match route.access.required_roles() {
            None => Decision::Allow,
            Some(required) => decide(session, &required),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Rendered { path: String },
    Redirected { requested: String, to: String },
}

impl Navigation {
    pub fn path(&self) -> &str {
        match self {
            Navigation::Rendered { path } => path,
            Navigation::Redirected { to, .. } => to,
        }
    }
}

/// Current view plus the policy that governs it.
///
/// The view is re-decided whenever the watched session changes, so a logout
/// while on a protected view lands on the login page.
pub struct Navigator {
    table: RouteTable,
    current: String,
    sessions: watch::Receiver<Option<Session>>,
}

impl Navigator {
    pub fn new(sessions: watch::Receiver<Option<Session>>) -> Self {
        Self::with_table(RouteTable::default(), sessions)
    }

    pub fn with_table(table: RouteTable, sessions: watch::Receiver<Option<Session>>) -> Self {
        Self {
            table,
            current: HOME_PATH.to_string(),
            sessions,
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// The view currently shown, after applying any pending session change
    pub fn current(&mut self) -> &str {
        self.sync();
        &self.current
    }

    pub fn navigate(&mut self, path: &str) -> Navigation {
        let session = self.sessions.borrow_and_update().clone();
        let target = self.resolve(path, session.as_ref());
        self.current = target.clone();

        if target == path {
            Navigation::Rendered { path: target }
        } else {
            debug!(requested = path, to = %target, "navigation redirected");
            Navigation::Redirected {
                requested: path.to_string(),
                to: target,
            }
        }
    }

    /// Jump to the login view. Returns false if already there.
    pub fn force_login(&mut self) -> bool {
        self.sessions.borrow_and_update();
        if self.current == LOGIN_PATH {
            return false;
        }
        self.current = LOGIN_PATH.to_string();
        true
    }

    /// Re-decide the current view if the session changed since last look
    pub fn sync(&mut self) -> Option<Navigation> {
        if !self.sessions.has_changed().unwrap_or(false) {
            return None;
        }
        let current = self.current.clone();
        let navigation = self.navigate(&current);
        Some(navigation)
    }

    fn resolve(&self, path: &str, session: Option<&Session>) -> String {
        let mut path = path.to_string();
        let mut visited = vec![path.clone()];

        for _ in 0..MAX_REDIRECTS {
            let target = match self.table.decide_path(&path, session) {
                Some(decision) => decision.target(),
                None => Some(HOME_PATH),
            };
            let Some(target) = target else {
                return path;
            };
            if visited.iter().any(|seen| seen == target) {
                break;
            }
            visited.push(target.to_string());
            path = target.to_string();
        }

        LOGIN_PATH.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee() -> Session {
        Session::new("t").with_user_id(7).with_role(Role::Employee)
    }

    fn admin() -> Session {
        Session::new("t").with_user_id(1).with_role(Role::Admin)
    }

    #[test]
    fn matches_patterns_and_captures_params() {
        let table = RouteTable::default();
        let matched = table.match_path("/admin/employees/42?tab=pay").unwrap();
        assert_eq!(matched.route.pattern, "/admin/employees/:id");
        assert_eq!(matched.params.get("id").map(String::as_str), Some("42"));
        assert!(table.match_path("/admin/employees").is_none());
        assert_eq!(table.match_path("/").unwrap().route.access, Access::Public);
    }

    #[test]
    fn unknown_paths_go_home() {
        let (_tx, rx) = watch::channel(None);
        let mut nav = Navigator::new(rx);
        assert_eq!(nav.navigate("/nowhere").path(), "/");
    }

    #[test]
    fn employee_is_bounced_from_admin_area() {
        let (_tx, rx) = watch::channel(Some(employee()));
        let mut nav = Navigator::new(rx);
        let navigation = nav.navigate("/admin/reports");
        assert_eq!(
            navigation,
            Navigation::Redirected {
                requested: "/admin/reports".into(),
                to: "/me".into()
            }
        );
    }

    #[test]
    fn admin_may_enter_member_area() {
        let (_tx, rx) = watch::channel(Some(admin()));
        let mut nav = Navigator::new(rx);
        assert_eq!(
            nav.navigate("/me/payroll"),
            Navigation::Rendered { path: "/me/payroll".into() }
        );
    }

    #[test]
    fn logout_while_on_protected_view_is_redecided() {
        let (tx, rx) = watch::channel(Some(admin()));
        let mut nav = Navigator::new(rx);
        nav.navigate("/admin/leaves/3");
        assert_eq!(nav.current(), "/admin/leaves/3");

        tx.send_replace(None);
        assert_eq!(nav.current(), "/login");
    }

    #[test]
    fn unknown_role_redirect_loop_lands_on_login() {
        let (_tx, rx) = watch::channel(Some(Session::new("t").with_role(Role::from("AUDITOR"))));
        let mut nav = Navigator::new(rx);
        assert_eq!(nav.navigate("/admin").path(), "/login");
    }

    #[test]
    fn force_login_is_idempotent() {
        let (_tx, rx) = watch::channel(None);
        let mut nav = Navigator::new(rx);
        assert!(nav.force_login());
        assert!(!nav.force_login());
        assert_eq!(nav.current(), "/login");
    }
}
