//! Policy-gated tools for agents.
//!
//! A [`Tool`] is any callable unit an agent can invoke. Wrapping one in a
//! [`GovernedTool`] makes every invocation pass through
//! [`PolicyEnforcer::enforce`](governance_client::PolicyEnforcer::enforce)
//! first; a [`Toolkit`] does the same for a whole collection, resolving each
//! tool's action by name.

#![warn(missing_docs, clippy::pedantic)]

pub mod governed;
pub mod tool;
pub mod toolkit;

#[cfg(test)]
mod testing;

pub use governed::{DenyHandler, GovernedTool};
pub use tool::{FnTool, Tool, ToolError, ToolMetadata, ToolResult};
pub use toolkit::Toolkit;
