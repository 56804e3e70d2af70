//! Governed agent example: checks, enforcement, and gated tools against a
//! running gateway.
//!
//! Point `GOVERNANCE_GATEWAY_URL` and `GOVERNANCE_AGENT_TOKEN` at a gateway,
//! then run with `RUST_LOG=debug` to see every decision.

use std::sync::Arc;

use agent_governance::prelude::*;
use anyhow::Result;
use serde_json::{Value, json};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    let client = GatewayClient::from_env()?;
    info!(gateway = client.gateway_url(), trace_id = %client.trace_id(), "=== Governed Agent ===");

    if !client.is_healthy().await {
        warn!("gateway is not healthy; decisions below will likely fail");
    }

    decisions(&client).await?;
    governed_tools(client).await?;

    Ok(())
}

/// Asking before acting, and refusing to act.
async fn decisions(client: &GatewayClient) -> Result<()> {
    info!("--- Checks ---");
    for action in ["read:contacts", "write:email"] {
        let decision = client.check(action, Some("crm")).await?;
        info!(
            action,
            decision = %decision.decision(),
            policy = decision.policy().unwrap_or("-"),
            reason = decision.reason().unwrap_or("-"),
            "decision"
        );
    }

    info!("--- Govern ---");
    match client
        .govern("write:email", None, || async { "email sent" })
        .await
    {
        Ok(outcome) => info!(outcome, "work ran"),
        Err(GovernanceError::PolicyDenied(denied)) => info!(%denied, "work skipped"),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

/// Wrapping a tool set so each invocation is enforced.
async fn governed_tools(client: GatewayClient) -> Result<()> {
    info!("--- Governed tools ---");
    let lookup = FnTool::new(
        ToolMetadata::new("lookup_contact")?.with_description("Find a contact by name"),
        |input: Value| async move { Ok::<_, ToolError>(json!({"contact": input})) },
    );
    let send = FnTool::new(
        ToolMetadata::new("send_email")?.with_description("Send an email"),
        |input: Value| async move { Ok::<_, ToolError>(json!({"sent": input})) },
    );
    let tools: Vec<Arc<dyn Tool>> = vec![Arc::new(lookup), Arc::new(send)];

    let enforcer: Arc<dyn PolicyEnforcer> = Arc::new(client);
    let toolkit = Toolkit::new(enforcer, "tool:use")
        .map_action("lookup_contact", "read:contacts")
        .map_action("send_email", "write:email")
        .with_deny_handler(|denied: PolicyDenied, _: Value| async move {
            Ok::<_, ToolError>(json!({"skipped": denied.action(), "reason": denied.reason()}))
        });

    for tool in toolkit.govern(tools) {
        let name = tool.metadata().name().to_owned();
        match tool.invoke(json!({"name": "alice"})).await {
            Ok(output) => info!(tool = %name, action = tool.action(), %output, "tool finished"),
            Err(err) => warn!(tool = %name, error = %err, "tool failed"),
        }
    }
    Ok(())
}
