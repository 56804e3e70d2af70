//! Policy-gated tool wrapper.

use std::fmt;
use std::future::Future;
use std::ops::Deref;
use std::sync::Arc;

use async_trait::async_trait;
use governance_client::PolicyEnforcer;
use governance_types::{GovernanceError, PolicyDenied};
use serde_json::Value;
use tracing::{debug, info};

use crate::tool::{Tool, ToolMetadata, ToolResult};

/// Fallback run in place of a tool whose invocation was denied.
///
/// Only policy denials reach a handler; authentication, rate-limit and
/// transport failures always propagate.
#[async_trait]
pub trait DenyHandler: Send + Sync {
    /// Produces the result returned to the caller instead of the tool's.
    async fn on_deny(&self, denied: PolicyDenied, input: Value) -> ToolResult<Value>;
}

#[async_trait]
impl<F, Fut> DenyHandler for F
where
    F: Send + Sync + Fn(PolicyDenied, Value) -> Fut,
    Fut: Future<Output = ToolResult<Value>> + Send,
{
    async fn on_deny(&self, denied: PolicyDenied, input: Value) -> ToolResult<Value> {
        (self)(denied, input).await
    }
}

#[derive(Clone, Copy)]
enum Entry {
    Invoke,
    Call,
}

/// Wraps a tool so every invocation is enforced against `action` first.
///
/// Inputs and outputs pass through untouched. Everything except the
/// invocation entry points is delegated to the wrapped tool, including
/// inherent methods through [`Deref`].
pub struct GovernedTool<T> {
    inner: T,
    action: String,
    resource: Option<String>,
    enforcer: Arc<dyn PolicyEnforcer>,
    on_deny: Option<Arc<dyn DenyHandler>>,
}

impl<T: Tool> fmt::Debug for GovernedTool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GovernedTool")
            .field("tool", &self.inner.metadata().name())
            .field("action", &self.action)
            .field("resource", &self.resource)
            .field("has_deny_handler", &self.on_deny.is_some())
            .finish_non_exhaustive()
    }
}

impl<T: Tool> GovernedTool<T> {
    /// Wraps `tool` so it only runs when `enforcer` allows `action`.
    #[must_use]
    pub fn new(action: impl Into<String>, enforcer: Arc<dyn PolicyEnforcer>, tool: T) -> Self {
        Self {
            inner: tool,
            action: action.into(),
            resource: None,
            enforcer,
            on_deny: None,
        }
    }

    /// Runs `handler` instead of failing when the action is denied.
    #[must_use]
    pub fn with_deny_handler<H>(self, handler: H) -> Self
    where
        H: DenyHandler + 'static,
    {
        self.with_shared_deny_handler(Arc::new(handler))
    }

    /// Like [`with_deny_handler`](Self::with_deny_handler) for a handler
    /// shared between several tools.
    #[must_use]
    pub fn with_shared_deny_handler(mut self, handler: Arc<dyn DenyHandler>) -> Self {
        self.on_deny = Some(handler);
        self
    }

    /// Sends `resource` along with every enforcement check.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Returns the action enforced before each invocation.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns the wrapped tool.
    #[must_use]
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Unwraps the tool, discarding governance.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.inner
    }

    async fn governed(&self, entry: Entry, input: Value) -> ToolResult<Value> {
        let tool = self.inner.metadata().name();
        match self
            .enforcer
            .enforce(&self.action, self.resource.as_deref())
            .await
        {
            Ok(_) => {
                debug!(tool, action = %self.action, "governed tool allowed");
                match entry {
                    Entry::Invoke => self.inner.invoke(input).await,
                    Entry::Call => self.inner.call(input).await,
                }
            }
            Err(GovernanceError::PolicyDenied(denied)) => match &self.on_deny {
                Some(handler) => {
                    info!(tool, action = %self.action, "governed tool denied, running deny handler");
                    handler.on_deny(denied, input).await
                }
                None => Err(GovernanceError::PolicyDenied(denied).into()),
            },
            Err(other) => Err(other.into()),
        }
    }
}

#[async_trait]
impl<T: Tool> Tool for GovernedTool<T> {
    fn metadata(&self) -> &ToolMetadata {
        self.inner.metadata()
    }

    async fn invoke(&self, input: Value) -> ToolResult<Value> {
        self.governed(Entry::Invoke, input).await
    }

    async fn call(&self, input: Value) -> ToolResult<Value> {
        self.governed(Entry::Call, input).await
    }
}

impl<T> Deref for GovernedTool<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
