use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::{LinkedCreate, ResolverPlan, ResourceKind};
use crate::error::ClientError;
use crate::probe::{first_reachable, AdvancePolicy, Hypothesis, Probe};
use crate::transport::{ApiRequest, Transport};
use crate::types::IdentityClaim;

/// Locates the caller's own resources and adapts write payload shapes
pub struct ResourceResolver {
    transport: Arc<Transport>,
}

impl ResourceResolver {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    pub async fn resolve_mine(
        &self,
        identity: Option<&IdentityClaim>,
        kind: ResourceKind,
    ) -> Result<Value, ClientError> {
        self.resolve(identity, &kind.plan(), kind.name()).await
    }

    /// Probe the plan's candidates, then fall back to the owner-id lookup.
    ///
    /// Only 404 moves the cursor. Anything else aborts with that error.
    pub async fn resolve(
        &self,
        identity: Option<&IdentityClaim>,
        plan: &ResolverPlan,
        name: &str,
    ) -> Result<Value, ClientError> {
        let transport: &Transport = &self.transport;

        let probe = first_reachable(
            plan.candidates.iter().cloned(),
            AdvancePolicy::NotFound,
            move |hypothesis: Hypothesis| transport.send(hypothesis.request()),
        )
        .await?;

        if let Probe::Found { value, .. } = probe {
            return Ok(plan.shape.apply(value));
        }

        let Some(owner_lookup) = plan.owner_lookup else {
            return Err(ClientError::ResourceUnresolvable(format!(
                "no {} endpoint is available",
                name
            )));
        };

        let Some(owner) = identity.and_then(|claim| claim.user_id) else {
            return Err(ClientError::ResourceUnresolvable(format!(
                "no {} endpoint is available and the session has no user id",
                name
            )));
        };

        let hypothesis = owner_lookup(owner);
        debug!(candidate = %hypothesis, owner, "trying owner lookup");

        match transport.send(hypothesis.request()).await {
            Ok(value) => Ok(plan.shape.apply(value)),
            Err(e) if AdvancePolicy::NotFound.advances(&e) => Err(ClientError::ResourceUnresolvable(
                format!("no {} found for user {}", name, owner),
            )),
            Err(e) => Err(e),
        }
    }

    /// Create a resource that references another one by id.
    ///
    /// The nested encoding goes first; a 400/422 earns exactly one retry with
    /// the flat encoding, whose outcome is final.
    pub async fn create_with_fallback_shape(&self, create: &LinkedCreate) -> Result<Value, ClientError> {
        let nested = ApiRequest::post(create.path.as_str()).json(create.nested_payload());

        match self.transport.send(nested).await {
            Err(e) if is_shape_rejection(&e) => {
                debug!(path = %create.path, "nested reference rejected ({}), retrying flat", e);
                let flat = ApiRequest::post(create.path.as_str()).json(create.flat_payload());
                self.transport.send(flat).await
            }
            result => result,
        }
    }
}

fn is_shape_rejection(err: &ClientError) -> bool {
    matches!(err, ClientError::ValidationRejected { status: 400 | 422, .. })
}
