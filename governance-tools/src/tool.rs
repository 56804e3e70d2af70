//! Tool abstraction and metadata.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use governance_types::GovernanceError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Result alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Metadata describing a tool.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolMetadata {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

impl ToolMetadata {
    /// Creates metadata for the supplied tool name.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidMetadata`] if the name is empty.
    pub fn new(name: impl Into<String>) -> ToolResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ToolError::InvalidMetadata {
                reason: "tool name cannot be empty".into(),
            });
        }

        Ok(Self {
            name,
            description: None,
            version: None,
        })
    }

    /// Sets the human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the version string.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the optional version.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

/// A callable unit an agent can invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool's metadata.
    fn metadata(&self) -> &ToolMetadata;

    /// Invokes the tool with the given JSON input, returning JSON output.
    async fn invoke(&self, input: Value) -> ToolResult<Value>;

    /// Legacy entry point kept for frameworks that still call tools this way.
    /// Defaults to [`invoke`](Self::invoke).
    async fn call(&self, input: Value) -> ToolResult<Value> {
        self.invoke(input).await
    }
}

#[async_trait]
impl<T: Tool + ?Sized> Tool for Arc<T> {
    fn metadata(&self) -> &ToolMetadata {
        (**self).metadata()
    }

    async fn invoke(&self, input: Value) -> ToolResult<Value> {
        (**self).invoke(input).await
    }

    async fn call(&self, input: Value) -> ToolResult<Value> {
        (**self).call(input).await
    }
}

#[async_trait]
impl<T: Tool + ?Sized> Tool for Box<T> {
    fn metadata(&self) -> &ToolMetadata {
        (**self).metadata()
    }

    async fn invoke(&self, input: Value) -> ToolResult<Value> {
        (**self).invoke(input).await
    }

    async fn call(&self, input: Value) -> ToolResult<Value> {
        (**self).call(input).await
    }
}

/// Tool built from metadata and an async closure.
pub struct FnTool<F> {
    metadata: ToolMetadata,
    executor: F,
}

impl<F> fmt::Debug for FnTool<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTool")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl<F, Fut> FnTool<F>
where
    F: Send + Sync + Fn(Value) -> Fut,
    Fut: Future<Output = ToolResult<Value>> + Send,
{
    /// Creates a tool that runs `executor` on every invocation.
    #[must_use]
    pub fn new(metadata: ToolMetadata, executor: F) -> Self {
        Self { metadata, executor }
    }
}

#[async_trait]
impl<F, Fut> Tool for FnTool<F>
where
    F: Send + Sync + Fn(Value) -> Fut,
    Fut: Future<Output = ToolResult<Value>> + Send,
{
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    async fn invoke(&self, input: Value) -> ToolResult<Value> {
        (self.executor)(input).await
    }
}

/// Errors produced by tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool metadata failed validation.
    #[error("invalid tool metadata: {reason}")]
    InvalidMetadata {
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Tool execution failed.
    #[error("tool execution failed: {reason}")]
    Execution {
        /// Human-readable error returned by the tool implementation.
        reason: String,
    },

    /// Enforcement rejected or could not evaluate the invocation.
    #[error(transparent)]
    Governance(#[from] GovernanceError),
}

impl ToolError {
    /// Creates an execution error from the supplied reason.
    #[must_use]
    pub fn execution(reason: impl Into<String>) -> Self {
        Self::Execution {
            reason: reason.into(),
        }
    }

    /// Returns the governance failure, if this error came from enforcement.
    #[must_use]
    pub fn governance(&self) -> Option<&GovernanceError> {
        match self {
            Self::Governance(err) => Some(err),
            _ => None,
        }
    }
}
