//! Admin operations against the gateway's `/admin` namespace.

use bytes::Bytes;
use governance_types::{
    AgentRecord, AuditEntry, AuditQuery, GovernanceError, GovernanceResult, NewAgent,
    PolicyRecord,
};
use hyper::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use hyper::{HeaderMap, Method};
use tracing::info;

use crate::client::{ADMIN_TOKEN_HEADER, GatewayClient, header_value};
use crate::response::{Verdict, classify};
use crate::transport::GatewayResponse;

impl GatewayClient {
    /// Lists every agent registered with the gateway.
    ///
    /// # Errors
    ///
    /// [`GovernanceError::Authentication`] without an admin token (no request
    /// is sent), otherwise the usual status mapping.
    pub async fn list_agents(&self) -> GovernanceResult<Vec<AgentRecord>> {
        self.admin_call(Method::GET, "/admin/agents", "admin:list_agents", None)
            .await?
            .json()
    }

    /// Registers a new agent.
    ///
    /// # Errors
    ///
    /// See [`list_agents`](Self::list_agents).
    pub async fn create_agent(&self, agent: &NewAgent) -> GovernanceResult<AgentRecord> {
        let body = serde_json::to_vec(agent).map_err(|err| {
            GovernanceError::configuration(format!("failed to encode agent: {err}"))
        })?;
        let record: AgentRecord = self
            .admin_call(
                Method::POST,
                "/admin/agents",
                "admin:create_agent",
                Some(Bytes::from(body)),
            )
            .await?
            .json()?;
        info!(agent_id = %record.id, name = %record.name, trust_tier = %record.trust_tier, "agent created");
        Ok(record)
    }

    /// Revokes an agent. Success is the absence of an error.
    ///
    /// # Errors
    ///
    /// [`GovernanceError::Authentication`] without an admin token, then
    /// [`GovernanceError::Configuration`] for an id that can not form a path
    /// segment, otherwise see [`list_agents`](Self::list_agents).
    pub async fn revoke_agent(&self, agent_id: &str) -> GovernanceResult<()> {
        self.admin_headers(false)?;
        if agent_id.is_empty() || agent_id.contains(['/', '?', '#']) {
            return Err(GovernanceError::configuration(format!(
                "invalid agent id `{agent_id}`"
            )));
        }
        let path = format!("/admin/agents/{agent_id}");
        self.admin_call(Method::DELETE, &path, "admin:revoke_agent", None)
            .await?;
        info!(agent_id, "agent revoked");
        Ok(())
    }

    /// Lists the policies stored by the gateway.
    ///
    /// # Errors
    ///
    /// See [`list_agents`](Self::list_agents).
    pub async fn list_policies(&self) -> GovernanceResult<Vec<PolicyRecord>> {
        self.admin_call(Method::GET, "/admin/policies", "admin:list_policies", None)
            .await?
            .json()
    }

    /// Fetches audit log entries matching `query`.
    ///
    /// # Errors
    ///
    /// See [`list_agents`](Self::list_agents).
    pub async fn audit_log(&self, query: AuditQuery) -> GovernanceResult<Vec<AuditEntry>> {
        let path = format!("/admin/audit?{}", query.to_query_string());
        self.admin_call(Method::GET, &path, "admin:audit_log", None)
            .await?
            .json()
    }

    async fn admin_call(
        &self,
        method: Method,
        path: &str,
        operation: &str,
        body: Option<Bytes>,
    ) -> GovernanceResult<GatewayResponse> {
        let headers = self.admin_headers(body.is_some())?;
        let request = self.build_request(method, path, headers, body)?;
        match classify(self.send(request).await?)? {
            Verdict::Passed(response) => Ok(response),
            Verdict::Denied(body) => Err(body.into_denied(operation).into()),
        }
    }

    /// Fails before any I/O when no admin token is configured.
    fn admin_headers(&self, json: bool) -> GovernanceResult<HeaderMap> {
        let token = self.config().admin_token().ok_or_else(|| {
            GovernanceError::authentication("admin token is required for admin operations")
        })?;
        let mut headers = self.base_headers()?;
        headers.insert(
            HeaderName::from_static(ADMIN_TOKEN_HEADER),
            header_value(ADMIN_TOKEN_HEADER, token)?,
        );
        if json {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        Ok(headers)
    }
}
