//! Ordered fallback chain over candidate endpoints.
//!
//! Candidates are tried in order. A "not found" answer (as defined by the
//! [`AdvancePolicy`]) moves the cursor to the next candidate; any other failure
//! is definitive and returned immediately; the first success wins and nothing
//! after it is attempted.

use reqwest::Method;
use std::fmt;
use std::future::Future;
use tracing::debug;

use crate::error::ClientError;
use crate::transport::ApiRequest;

/// One candidate `(method, path)` contract for a logical operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hypothesis {
    pub method: Method,
    pub path: String,
}

impl Hypothesis {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn request(&self) -> ApiRequest {
        ApiRequest::new(self.method.clone(), self.path.clone())
    }
}

impl fmt::Display for Hypothesis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Which failures mean "this contract does not exist here"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvancePolicy {
    /// Only HTTP 404
    NotFound,
    /// HTTP 404, 405 or 501
    RouteAbsent,
}

impl AdvancePolicy {
    pub fn advances(&self, err: &ClientError) -> bool {
        let ClientError::NotFound { status, .. } = err else {
            return false;
        };
        match self {
            AdvancePolicy::NotFound => *status == 404,
            AdvancePolicy::RouteAbsent => matches!(*status, 404 | 405 | 501),
        }
    }
}

#[derive(Debug)]
pub enum Probe<T> {
    Found { index: usize, value: T },
    /// Every candidate answered "not found"
    Exhausted {
        attempts: usize,
        last: Option<ClientError>,
    },
}

impl<T> Probe<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Probe::Found { value, .. } => Some(value),
            Probe::Exhausted { .. } => None,
        }
    }
}

/// Run `attempt` over `candidates` until one is reachable.
pub async fn first_reachable<H, T, F, Fut>(
    candidates: impl IntoIterator<Item = H>,
    policy: AdvancePolicy,
    mut attempt: F,
) -> Result<Probe<T>, ClientError>
where
    H: fmt::Display,
    F: FnMut(H) -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut attempts = 0;
    let mut last = None;

    for (index, candidate) in candidates.into_iter().enumerate() {
        attempts += 1;
        let label = candidate.to_string();

        match attempt(candidate).await {
            Ok(value) => {
                debug!(candidate = %label, index, "probe resolved");
                return Ok(Probe::Found { index, value });
            }
            Err(err) if policy.advances(&err) => {
                debug!(candidate = %label, index, "probe skipped: {}", err);
                last = Some(err);
            }
            Err(err) => {
                debug!(candidate = %label, index, "probe aborted: {}", err);
                return Err(err);
            }
        }
    }

    Ok(Probe::Exhausted { attempts, last })
}
