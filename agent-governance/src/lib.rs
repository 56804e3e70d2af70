//! Client-side governance SDK for autonomous agents.
//!
//! Depend on this crate via `cargo add agent-governance`. It bundles the
//! internal crates behind feature flags: ask the gateway whether an action is
//! permitted ([`client`]), and wrap tools so every invocation is gated
//! ([`tools`]).
//!
//! ```no_run
//! use agent_governance::prelude::*;
//!
//! # async fn run() -> Result<(), GovernanceError> {
//! let client = GatewayClient::from_env()?;
//! let decision = client.check("read:contacts", None).await?;
//! if decision.allowed() {
//!     // proceed
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, clippy::pedantic)]

/// Decisions, error taxonomy, and wire records.
pub use governance_types as types;

/// Configuration resolution (enabled by `config` feature).
#[cfg(feature = "config")]
pub use governance_config as config;

/// Gateway client and decision protocol (enabled by `client` feature).
#[cfg(feature = "client")]
pub use governance_client as client;

/// Policy-gated tools (enabled by `tools` feature).
#[cfg(feature = "tools")]
pub use governance_tools as tools;

/// Commonly used items.
pub mod prelude {
    pub use governance_types::{
        DecisionKind, ErrorKind, GovernanceError, GovernanceResult, PolicyDecision, PolicyDenied,
        TraceId,
    };

    #[cfg(feature = "config")]
    pub use governance_config::GatewayConfig;

    #[cfg(feature = "client")]
    pub use governance_client::{GatewayClient, PolicyEnforcer, RequestOptions};

    #[cfg(feature = "tools")]
    pub use governance_tools::{
        DenyHandler, FnTool, GovernedTool, Tool, ToolError, ToolMetadata, ToolResult, Toolkit,
    };
}
