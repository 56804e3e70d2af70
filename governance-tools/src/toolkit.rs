//! Governing a whole set of tools at once.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use governance_client::PolicyEnforcer;
use tracing::debug;

use crate::governed::{DenyHandler, GovernedTool};
use crate::tool::Tool;

/// Maps tool names to actions and wraps tools in [`GovernedTool`]s.
///
/// Tools without an entry in the action map fall back to the default action.
#[derive(Clone)]
pub struct Toolkit {
    enforcer: Arc<dyn PolicyEnforcer>,
    actions: HashMap<String, String>,
    default_action: String,
    on_deny: Option<Arc<dyn DenyHandler>>,
}

impl fmt::Debug for Toolkit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toolkit")
            .field("actions", &self.actions)
            .field("default_action", &self.default_action)
            .field("has_deny_handler", &self.on_deny.is_some())
            .finish_non_exhaustive()
    }
}

impl Toolkit {
    /// Creates a toolkit that enforces `default_action` for unmapped tools.
    #[must_use]
    pub fn new(enforcer: Arc<dyn PolicyEnforcer>, default_action: impl Into<String>) -> Self {
        Self {
            enforcer,
            actions: HashMap::new(),
            default_action: default_action.into(),
            on_deny: None,
        }
    }

    /// Maps a tool name to the action enforced for it.
    #[must_use]
    pub fn map_action(mut self, tool: impl Into<String>, action: impl Into<String>) -> Self {
        self.actions.insert(tool.into(), action.into());
        self
    }

    /// Adds several tool-to-action mappings.
    #[must_use]
    pub fn with_actions<I, K, V>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.actions
            .extend(actions.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Installs a deny handler shared by every wrapped tool.
    #[must_use]
    pub fn with_deny_handler<H>(mut self, handler: H) -> Self
    where
        H: DenyHandler + 'static,
    {
        self.on_deny = Some(Arc::new(handler));
        self
    }

    /// Returns the action enforced for the named tool.
    #[must_use]
    pub fn action_for(&self, tool: &str) -> &str {
        self.actions
            .get(tool)
            .map_or(self.default_action.as_str(), String::as_str)
    }

    /// Wraps every tool, in order, resolving each one's action by name.
    #[must_use]
    pub fn govern<T, I>(&self, tools: I) -> Vec<GovernedTool<T>>
    where
        T: Tool,
        I: IntoIterator<Item = T>,
    {
        tools
            .into_iter()
            .map(|tool| {
                let action = self.action_for(tool.metadata().name()).to_owned();
                debug!(tool = tool.metadata().name(), action = %action, "governing tool");
                let governed = GovernedTool::new(action, Arc::clone(&self.enforcer), tool);
                match &self.on_deny {
                    Some(handler) => governed.with_shared_deny_handler(Arc::clone(handler)),
                    None => governed,
                }
            })
            .collect()
    }
}
