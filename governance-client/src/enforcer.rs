//! Decision seam shared by the client and the tool governance layer.

use async_trait::async_trait;
use governance_types::{GovernanceResult, PolicyDecision};
use tracing::warn;

/// Something that can evaluate actions against policy.
///
/// Only [`check`](Self::check) is required. [`enforce`](Self::enforce) is
/// derived from it so the two never disagree about the same action.
#[async_trait]
pub trait PolicyEnforcer: Send + Sync {
    /// Evaluates the action and returns the decision.
    ///
    /// Denials are returned as decisions, never as errors.
    async fn check(&self, action: &str, resource: Option<&str>) -> GovernanceResult<PolicyDecision>;

    /// Evaluates the action and fails with
    /// [`GovernanceError::PolicyDenied`](governance_types::GovernanceError::PolicyDenied)
    /// when it is denied. Allowed decisions are returned unchanged.
    async fn enforce(
        &self,
        action: &str,
        resource: Option<&str>,
    ) -> GovernanceResult<PolicyDecision> {
        let decision = self.check(action, resource).await?;
        match decision.to_denied() {
            Some(denied) => {
                warn!(
                    action,
                    trace_id = %decision.trace_id(),
                    policy = denied.policy().unwrap_or_default(),
                    rule = denied.rule().unwrap_or_default(),
                    reason = denied.reason(),
                    "action denied by policy"
                );
                Err(denied.into())
            }
            None => Ok(decision),
        }
    }
}
