//! Wire-level records exchanged with the gateway's admin and health endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::decision::DecisionKind;

/// Trust tier assigned to agents created without an explicit one.
pub const DEFAULT_TRUST_TIER: &str = "verified";

/// Number of audit entries requested when no limit is given.
pub const DEFAULT_AUDIT_LIMIT: u32 = 50;

/// Agent registered with the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    /// Agent identifier assigned by the gateway.
    pub id: String,
    /// Human readable name.
    pub name: String,
    /// Trust tier used by policies.
    #[serde(default = "default_trust_tier")]
    pub trust_tier: String,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Owning organisation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    /// Creation timestamp as reported by the gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Payload for creating an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAgent {
    /// Human readable name.
    pub name: String,
    /// Trust tier; defaults to [`DEFAULT_TRUST_TIER`].
    #[serde(default = "default_trust_tier")]
    pub trust_tier: String,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Owning organisation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
}

impl NewAgent {
    /// Creates a payload with the default trust tier and no tags.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trust_tier: default_trust_tier(),
            tags: Vec::new(),
            org_id: None,
        }
    }

    /// Overrides the trust tier.
    #[must_use]
    pub fn with_trust_tier(mut self, tier: impl Into<String>) -> Self {
        self.trust_tier = tier.into();
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the owning organisation.
    #[must_use]
    pub fn with_org_id(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }
}

/// Policy stored by the gateway. Fields the SDK does not model are kept in
/// `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRecord {
    /// Policy identifier.
    pub id: String,
    /// Policy name.
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Remaining fields as returned by the gateway.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Single entry of the gateway's audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Entry identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Time the decision was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Agent that requested the action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    /// Evaluated action.
    pub action: String,
    /// Resource the action targeted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// Outcome of the evaluation.
    pub decision: DecisionKind,
    /// Policy that produced the decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
    /// Rule that matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    /// Denial reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Correlation id of the originating request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// Filter for audit log retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditQuery {
    /// Maximum number of entries to return.
    pub limit: u32,
    /// Only return entries with this outcome.
    pub decision: Option<DecisionKind>,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_AUDIT_LIMIT,
            decision: None,
        }
    }
}

impl AuditQuery {
    /// Sets the maximum number of entries.
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Restricts the query to one outcome.
    #[must_use]
    pub fn with_decision(mut self, decision: DecisionKind) -> Self {
        self.decision = Some(decision);
        self
    }

    /// Renders the query string (without the leading `?`).
    #[must_use]
    pub fn to_query_string(&self) -> String {
        match self.decision {
            Some(decision) => format!("limit={}&decision={decision}", self.limit),
            None => format!("limit={}", self.limit),
        }
    }
}

/// Health report returned by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Reported status; `"healthy"` means the gateway is serving.
    pub status: String,
    /// Gateway version, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Remaining fields as returned by the gateway.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl HealthStatus {
    /// Returns true when the gateway reports itself healthy.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

fn default_trust_tier() -> String {
    DEFAULT_TRUST_TIER.to_owned()
}
