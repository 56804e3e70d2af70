//! Core shared types for the agent governance SDK.

#![warn(missing_docs, clippy::pedantic)]

mod admin;
mod decision;
mod error;
mod ids;

/// Records exchanged with the gateway's admin and health endpoints.
pub use admin::{
    AgentRecord, AuditEntry, AuditQuery, DEFAULT_AUDIT_LIMIT, DEFAULT_TRUST_TIER, HealthStatus,
    NewAgent, PolicyRecord,
};
/// Outcome of a single policy evaluation.
pub use decision::{DecisionKind, PolicyDecision};
/// Error taxonomy and result alias shared across the SDK.
pub use error::{DEFAULT_DENY_REASON, ErrorKind, GovernanceError, GovernanceResult, PolicyDenied};
/// Per-client correlation identifier.
pub use ids::TraceId;
