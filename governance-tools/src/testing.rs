//! Stub enforcer and counting tool used by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use governance_client::PolicyEnforcer;
use governance_types::{GovernanceError, GovernanceResult, PolicyDecision, TraceId};
use serde_json::Value;

use crate::tool::{Tool, ToolError, ToolMetadata, ToolResult};

#[derive(Clone, Copy)]
enum Outcome {
    Allow,
    Deny,
    AuthFailure,
}

/// Answers every check the same way and records what it was asked.
pub(crate) struct StubEnforcer {
    outcome: Outcome,
    seen: Mutex<Vec<(String, Option<String>)>>,
}

impl StubEnforcer {
    fn with(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn allowing() -> Arc<Self> {
        Self::with(Outcome::Allow)
    }

    pub(crate) fn denying() -> Arc<Self> {
        Self::with(Outcome::Deny)
    }

    pub(crate) fn failing_auth() -> Arc<Self> {
        Self::with(Outcome::AuthFailure)
    }

    pub(crate) fn actions(&self) -> Vec<String> {
        self.seen
            .lock()
            .expect("stub log poisoned")
            .iter()
            .map(|(action, _)| action.clone())
            .collect()
    }

    pub(crate) fn resources(&self) -> Vec<Option<String>> {
        self.seen
            .lock()
            .expect("stub log poisoned")
            .iter()
            .map(|(_, resource)| resource.clone())
            .collect()
    }
}

#[async_trait]
impl PolicyEnforcer for StubEnforcer {
    async fn check(&self, action: &str, resource: Option<&str>) -> GovernanceResult<PolicyDecision> {
        self.seen
            .lock()
            .expect("stub log poisoned")
            .push((action.to_owned(), resource.map(str::to_owned)));
        let trace = TraceId::new("stub");
        match self.outcome {
            Outcome::Allow => Ok(PolicyDecision::allow(action, None, trace)),
            Outcome::Deny => Ok(PolicyDecision::deny(
                action,
                Some("strict".into()),
                None,
                Some("blocked in tests".into()),
                trace,
            )),
            Outcome::AuthFailure => Err(GovernanceError::authentication("token expired")),
        }
    }
}

/// Tool that counts invocations and either echoes or fails.
pub(crate) struct CountingTool {
    metadata: ToolMetadata,
    failure: Option<&'static str>,
    invocations: AtomicUsize,
}

impl CountingTool {
    pub(crate) fn echo(name: &str) -> Self {
        Self {
            metadata: ToolMetadata::new(name)
                .expect("valid name")
                .with_description("counts invocations"),
            failure: None,
            invocations: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing(name: &str, reason: &'static str) -> Self {
        Self {
            failure: Some(reason),
            ..Self::echo(name)
        }
    }

    pub(crate) fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Tool for CountingTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    async fn invoke(&self, input: Value) -> ToolResult<Value> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        match self.failure {
            Some(reason) => Err(ToolError::execution(reason)),
            None => Ok(input),
        }
    }
}
