//! Policy decision types returned by the gateway.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PolicyDenied;
use crate::ids::TraceId;

/// Describes the outcome of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    /// Action is permitted.
    Allow,
    /// Action is rejected.
    Deny,
}

impl DecisionKind {
    /// Returns the wire representation of the decision.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
        }
    }
}

impl fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable snapshot of a single policy evaluation.
///
/// `allowed` is never stored: it is derived from [`DecisionKind`], so the two
/// can not disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDecision {
    action: String,
    decision: DecisionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    trace_id: TraceId,
}

impl PolicyDecision {
    /// Returns an allow decision for the action, optionally naming the policy
    /// that granted it.
    #[must_use]
    pub fn allow(action: impl Into<String>, policy: Option<String>, trace_id: TraceId) -> Self {
        Self {
            action: action.into(),
            decision: DecisionKind::Allow,
            policy,
            rule: None,
            reason: None,
            trace_id,
        }
    }

    /// Returns a deny decision carrying whatever provenance the gateway sent.
    #[must_use]
    pub fn deny(
        action: impl Into<String>,
        policy: Option<String>,
        rule: Option<String>,
        reason: Option<String>,
        trace_id: TraceId,
    ) -> Self {
        Self {
            action: action.into(),
            decision: DecisionKind::Deny,
            policy,
            rule,
            reason,
            trace_id,
        }
    }

    /// Returns true when the action may proceed.
    #[must_use]
    pub fn allowed(&self) -> bool {
        self.decision == DecisionKind::Allow
    }

    /// Returns the decision kind.
    #[must_use]
    pub fn decision(&self) -> DecisionKind {
        self.decision
    }

    /// Returns the evaluated action.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns the policy that produced the decision, if reported.
    #[must_use]
    pub fn policy(&self) -> Option<&str> {
        self.policy.as_deref()
    }

    /// Returns the matched rule, if reported.
    #[must_use]
    pub fn rule(&self) -> Option<&str> {
        self.rule.as_deref()
    }

    /// Returns the denial reason, if reported.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Returns the correlation id of the client that made the request.
    #[must_use]
    pub fn trace_id(&self) -> &TraceId {
        &self.trace_id
    }

    /// Converts a deny decision into the matching [`PolicyDenied`] failure.
    ///
    /// Returns `None` for allow decisions.
    #[must_use]
    pub fn to_denied(&self) -> Option<PolicyDenied> {
        if self.allowed() {
            return None;
        }
        Some(PolicyDenied::new(
            self.action.clone(),
            self.policy.clone(),
            self.rule.clone(),
            self.reason.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_tracks_decision_kind() {
        let trace = TraceId::new("t-1");
        let allow = PolicyDecision::allow("read:contacts", Some("default".into()), trace.clone());
        assert!(allow.allowed());
        assert_eq!(allow.decision(), DecisionKind::Allow);
        assert_eq!(allow.policy(), Some("default"));
        assert!(allow.rule().is_none());
        assert!(allow.to_denied().is_none());

        let deny = PolicyDecision::deny("write:email", None, None, None, trace);
        assert!(!deny.allowed());
        assert_eq!(deny.decision(), DecisionKind::Deny);
    }

    #[test]
    fn deny_converts_to_error_with_provenance() {
        let deny = PolicyDecision::deny(
            "write:email",
            Some("strict".into()),
            Some("no-email".into()),
            Some("Email sending blocked".into()),
            TraceId::new("t-2"),
        );
        let denied = deny.to_denied().expect("deny decision");
        assert_eq!(denied.action(), "write:email");
        assert_eq!(denied.policy(), Some("strict"));
        assert_eq!(denied.rule(), Some("no-email"));
        assert_eq!(denied.reason(), "Email sending blocked");
    }

    #[test]
    fn serializes_with_camel_case_and_kind() {
        let decision = PolicyDecision::allow("read:contacts", None, TraceId::new("abc"));
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["decision"], "allow");
        assert_eq!(json["traceId"], "abc");
        assert!(json.get("policy").is_none());
    }
}
