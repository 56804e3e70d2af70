//! Gateway client and decision protocol.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use governance_config::GatewayConfig;
use governance_types::{
    GovernanceError, GovernanceResult, HealthStatus, PolicyDecision, TraceId,
};
use hyper::header::{AUTHORIZATION, HeaderName, HeaderValue, USER_AGENT};
use hyper::{HeaderMap, Method, StatusCode, Uri};
use tokio::time::timeout;
use tracing::debug;

use crate::enforcer::PolicyEnforcer;
use crate::response::{AllowBody, Verdict, classify};
use crate::transport::{GatewayRequest, GatewayResponse, HyperTransport, Transport};

/// Header carrying the client's trace id.
pub const TRACE_ID_HEADER: &str = "x-trace-id";
/// Header carrying the action being evaluated.
pub const ACTION_HEADER: &str = "x-action";
/// Header carrying the optional resource the action targets.
pub const RESOURCE_HEADER: &str = "x-resource";
/// Header carrying the admin credential.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

pub(crate) const CHECK_PATH: &str = "/proxy/check";
pub(crate) const HEALTH_PATH: &str = "/health";

const USER_AGENT_VALUE: &str = concat!("agent-governance/", env!("CARGO_PKG_VERSION"));

/// Client for the governance gateway.
///
/// The configuration is fixed at construction; clones share the transport and
/// may be used concurrently without coordination.
#[derive(Clone)]
pub struct GatewayClient {
    config: GatewayConfig,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayClient")
            .field("gateway_url", &self.config.gateway_url())
            .field("trace_id", self.config.trace_id())
            .field("timeout", &self.config.timeout())
            .finish_non_exhaustive()
    }
}

impl GatewayClient {
    /// Creates a client that talks to the gateway over HTTP(S).
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::Configuration`] if the gateway URL can not be
    /// used as a request URI.
    pub fn new(config: GatewayConfig) -> GovernanceResult<Self> {
        Self::with_transport(config, Arc::new(HyperTransport::new()))
    }

    /// Creates a client with configuration resolved from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::Configuration`] when resolution fails.
    pub fn from_env() -> GovernanceResult<Self> {
        let config = GatewayConfig::from_env()
            .map_err(|err| GovernanceError::configuration(err.to_string()))?;
        Self::new(config)
    }

    /// Creates a client that sends requests through the supplied transport.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::Configuration`] if the gateway URL can not be
    /// used as a request URI.
    pub fn with_transport(
        config: GatewayConfig,
        transport: Arc<dyn Transport>,
    ) -> GovernanceResult<Self> {
        config.gateway_url().parse::<Uri>().map_err(|err| {
            GovernanceError::configuration(format!(
                "invalid gateway url `{}`: {err}",
                config.gateway_url()
            ))
        })?;
        Ok(Self { config, transport })
    }

    /// Returns the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Returns the gateway base URL.
    #[must_use]
    pub fn gateway_url(&self) -> &str {
        self.config.gateway_url()
    }

    /// Returns the trace id attached to every request.
    #[must_use]
    pub fn trace_id(&self) -> &TraceId {
        self.config.trace_id()
    }

    /// Asks the gateway whether `action` is permitted.
    ///
    /// A denial is returned as a decision with `allowed() == false`; only
    /// credential, throttling, transport and other gateway failures are errors.
    ///
    /// # Errors
    ///
    /// [`GovernanceError::Authentication`] on 401,
    /// [`GovernanceError::RateLimited`] on 429, [`GovernanceError::Gateway`]
    /// on other failure statuses, [`GovernanceError::Transport`] when the
    /// gateway is unreachable or the request times out.
    pub async fn check(
        &self,
        action: &str,
        resource: Option<&str>,
    ) -> GovernanceResult<PolicyDecision> {
        let mut headers = self.base_headers()?;
        self.apply_agent_headers(&mut headers, action, resource)?;
        let request = self.build_request(Method::GET, CHECK_PATH, headers, None)?;

        debug!(action, resource, trace_id = %self.trace_id(), "checking action");
        let response = self.send(request).await?;
        let trace_id = self.trace_id().clone();

        match classify(response)? {
            Verdict::Passed(response) if response.status() == StatusCode::OK => {
                let body: AllowBody = serde_json::from_slice(response.body()).unwrap_or_default();
                debug!(action, trace_id = %trace_id, "action allowed");
                Ok(PolicyDecision::allow(action, body.policy, trace_id))
            }
            Verdict::Passed(response) => Err(GovernanceError::invalid_response(format!(
                "unexpected status {} from check endpoint",
                response.status()
            ))),
            Verdict::Denied(body) => Ok(PolicyDecision::deny(
                action,
                body.policy,
                body.rule,
                body.message,
                trace_id,
            )),
        }
    }

    /// Like [`check`](Self::check), but fails with
    /// [`GovernanceError::PolicyDenied`] when the action is denied.
    ///
    /// # Errors
    ///
    /// Everything [`check`](Self::check) returns, plus
    /// [`GovernanceError::PolicyDenied`].
    pub async fn enforce(
        &self,
        action: &str,
        resource: Option<&str>,
    ) -> GovernanceResult<PolicyDecision> {
        PolicyEnforcer::enforce(self, action, resource).await
    }

    /// Enforces `action` and, only if it is allowed, runs `f` and returns its
    /// output. `f` is never called for a denied action.
    ///
    /// # Errors
    ///
    /// Everything [`enforce`](Self::enforce) returns.
    pub async fn govern<F, Fut, T>(
        &self,
        action: &str,
        resource: Option<&str>,
        f: F,
    ) -> GovernanceResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.enforce(action, resource).await?;
        Ok(f().await)
    }

    /// Fetches the gateway's health report.
    ///
    /// # Errors
    ///
    /// Returns the mapped status error, a transport error, or
    /// [`GovernanceError::InvalidResponse`] for an undecodable body.
    pub async fn health(&self) -> GovernanceResult<HealthStatus> {
        let headers = self.base_headers()?;
        let request = self.build_request(Method::GET, HEALTH_PATH, headers, None)?;
        match classify(self.send(request).await?)? {
            Verdict::Passed(response) => response.json(),
            Verdict::Denied(body) => Err(body.into_denied("health").into()),
        }
    }

    /// Returns true only when the gateway answers with status `"healthy"`.
    /// Any failure, including an unreachable gateway, yields `false`.
    pub async fn is_healthy(&self) -> bool {
        match self.health().await {
            Ok(status) => status.is_healthy(),
            Err(err) => {
                debug!(error = %err, "gateway health check failed");
                false
            }
        }
    }

    pub(crate) fn base_headers(&self) -> GovernanceResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            HeaderName::from_static(TRACE_ID_HEADER),
            header_value(TRACE_ID_HEADER, self.trace_id().as_str())?,
        );
        Ok(headers)
    }

    /// Sets the trace, action, resource and bearer headers, replacing any values
    /// the caller put there. Without a resource, any caller `x-resource` is
    /// dropped.
    pub(crate) fn apply_agent_headers(
        &self,
        headers: &mut HeaderMap,
        action: &str,
        resource: Option<&str>,
    ) -> GovernanceResult<()> {
        headers.insert(
            HeaderName::from_static(TRACE_ID_HEADER),
            header_value(TRACE_ID_HEADER, self.trace_id().as_str())?,
        );
        headers.insert(
            HeaderName::from_static(ACTION_HEADER),
            header_value(ACTION_HEADER, action)?,
        );
        match resource {
            Some(resource) => {
                headers.insert(
                    HeaderName::from_static(RESOURCE_HEADER),
                    header_value(RESOURCE_HEADER, resource)?,
                );
            }
            None => {
                headers.remove(RESOURCE_HEADER);
            }
        }
        if let Some(token) = self.config.agent_token() {
            headers.insert(
                AUTHORIZATION,
                header_value("authorization", &format!("Bearer {token}"))?,
            );
        }
        Ok(())
    }

    pub(crate) fn build_request(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> GovernanceResult<GatewayRequest> {
        let url = format!("{}{path}", self.config.gateway_url());
        let uri = url.parse::<Uri>().map_err(|err| {
            GovernanceError::configuration(format!("invalid request url `{url}`: {err}"))
        })?;
        Ok(GatewayRequest::new(method, uri, headers).with_body(body))
    }

    /// Sends one request, bounded by the configured timeout.
    pub(crate) async fn send(&self, request: GatewayRequest) -> GovernanceResult<GatewayResponse> {
        let limit = self.config.timeout();
        timeout(limit, self.transport.send(request))
            .await
            .map_err(|_| {
                GovernanceError::transport(format!(
                    "gateway request timed out after {} ms",
                    limit.as_millis()
                ))
            })?
    }
}

#[async_trait]
impl PolicyEnforcer for GatewayClient {
    async fn check(
        &self,
        action: &str,
        resource: Option<&str>,
    ) -> GovernanceResult<PolicyDecision> {
        GatewayClient::check(self, action, resource).await
    }
}

pub(crate) fn header_value(name: &str, value: &str) -> GovernanceResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|err| {
        GovernanceError::configuration(format!("invalid value for header {name}: {err}"))
    })
}
