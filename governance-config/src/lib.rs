//! Configuration resolution for the governance client.
//!
//! Every field is resolved once, in order: explicit value, then environment,
//! then the documented default. The resulting [`GatewayConfig`] is immutable
//! and performs no ambient lookups of its own.

#![warn(missing_docs, clippy::pedantic)]

use std::fmt;
use std::time::Duration;

use governance_types::TraceId;
use thiserror::Error;
use tracing::debug;

/// Environment variable holding the gateway base URL.
pub const ENV_GATEWAY_URL: &str = "GOVERNANCE_GATEWAY_URL";
/// Environment variable holding the agent bearer token.
pub const ENV_AGENT_TOKEN: &str = "GOVERNANCE_AGENT_TOKEN";
/// Environment variable holding the admin token.
pub const ENV_ADMIN_TOKEN: &str = "GOVERNANCE_ADMIN_TOKEN";
/// Environment variable holding the request timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "GOVERNANCE_TIMEOUT_MS";
/// Environment variable holding a fixed trace id.
pub const ENV_TRACE_ID: &str = "GOVERNANCE_TRACE_ID";

/// Gateway URL used when none is configured.
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:8080";
/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Result alias for configuration resolution.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The gateway URL is not an absolute http(s) URL.
    #[error("invalid gateway url `{url}`: {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// A field held a value that could not be used.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Name of the field or environment variable.
        field: &'static str,
        /// Human-readable reason for rejection.
        reason: String,
    },
}

/// Fully resolved, immutable client configuration.
#[derive(Clone)]
pub struct GatewayConfig {
    gateway_url: String,
    agent_token: Option<String>,
    admin_token: Option<String>,
    timeout: Duration,
    trace_id: TraceId,
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("gateway_url", &self.gateway_url)
            .field("agent_token", &self.agent_token.as_ref().map(|_| "<redacted>"))
            .field("admin_token", &self.admin_token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("trace_id", &self.trace_id)
            .finish()
    }
}

impl GatewayConfig {
    /// Starts a builder with no explicit values.
    #[must_use]
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::default()
    }

    /// Resolves a configuration purely from the process environment.
    ///
    /// # Errors
    ///
    /// See [`GatewayConfigBuilder::resolve`].
    pub fn from_env() -> ConfigResult<Self> {
        Self::builder().resolve()
    }

    /// Returns the gateway base URL without trailing slashes.
    #[must_use]
    pub fn gateway_url(&self) -> &str {
        &self.gateway_url
    }

    /// Returns the agent bearer token, if configured.
    #[must_use]
    pub fn agent_token(&self) -> Option<&str> {
        self.agent_token.as_deref()
    }

    /// Returns the admin token, if configured.
    #[must_use]
    pub fn admin_token(&self) -> Option<&str> {
        self.admin_token.as_deref()
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the trace id attached to every request.
    #[must_use]
    pub fn trace_id(&self) -> &TraceId {
        &self.trace_id
    }
}

/// Collects explicit configuration values prior to resolution.
#[derive(Clone, Default)]
pub struct GatewayConfigBuilder {
    gateway_url: Option<String>,
    agent_token: Option<String>,
    admin_token: Option<String>,
    timeout: Option<Duration>,
    trace_id: Option<TraceId>,
}

impl fmt::Debug for GatewayConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfigBuilder")
            .field("gateway_url", &self.gateway_url)
            .field("timeout", &self.timeout)
            .field("trace_id", &self.trace_id)
            .finish_non_exhaustive()
    }
}

impl GatewayConfigBuilder {
    /// Sets the gateway base URL.
    #[must_use]
    pub fn gateway_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_url = Some(url.into());
        self
    }

    /// Sets the agent bearer token.
    #[must_use]
    pub fn agent_token(mut self, token: impl Into<String>) -> Self {
        self.agent_token = Some(token.into());
        self
    }

    /// Sets the admin token.
    #[must_use]
    pub fn admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(token.into());
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the per-request timeout in milliseconds.
    #[must_use]
    pub fn timeout_ms(self, millis: u64) -> Self {
        self.timeout(Duration::from_millis(millis))
    }

    /// Fixes the trace id instead of generating one.
    #[must_use]
    pub fn trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Resolves the configuration against the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] for a malformed gateway URL and
    /// [`ConfigError::InvalidValue`] for a zero or unparsable timeout.
    pub fn resolve(self) -> ConfigResult<GatewayConfig> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolves the configuration using `lookup` in place of the process
    /// environment.
    ///
    /// # Errors
    ///
    /// See [`GatewayConfigBuilder::resolve`].
    pub fn resolve_with<F>(self, lookup: F) -> ConfigResult<GatewayConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let raw_url = non_blank(self.gateway_url)
            .or_else(|| env(ENV_GATEWAY_URL))
            .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_owned());
        let gateway_url = normalize_url(&raw_url)?;

        let agent_token = non_blank(self.agent_token).or_else(|| env(ENV_AGENT_TOKEN));
        let admin_token = non_blank(self.admin_token).or_else(|| env(ENV_ADMIN_TOKEN));

        let timeout = match self.timeout {
            Some(timeout) => timeout,
            None => match env(ENV_TIMEOUT_MS) {
                Some(raw) => parse_timeout(&raw)?,
                None => Duration::from_millis(DEFAULT_TIMEOUT_MS),
            },
        };
        if timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "timeout",
                reason: "timeout must be greater than zero".into(),
            });
        }

        let trace_id = self
            .trace_id
            .or_else(|| env(ENV_TRACE_ID).map(TraceId::new))
            .unwrap_or_else(TraceId::random);

        debug!(gateway_url = %gateway_url, trace_id = %trace_id, "resolved gateway configuration");

        Ok(GatewayConfig {
            gateway_url,
            agent_token,
            admin_token,
            timeout,
            trace_id,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn parse_timeout(raw: &str) -> ConfigResult<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|err| ConfigError::InvalidValue {
            field: ENV_TIMEOUT_MS,
            reason: format!("`{raw}` is not a millisecond count: {err}"),
        })
}

/// Validates the scheme and strips trailing slashes.
fn normalize_url(input: &str) -> ConfigResult<String> {
    let trimmed = input.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidUrl {
            url: input.to_owned(),
            reason: "gateway URL must start with http:// or https://".into(),
        });
    }
    let normalized = trimmed.trim_end_matches('/');
    let host = normalized.split_once("://").map_or("", |(_, rest)| rest);
    if host.is_empty() {
        return Err(ConfigError::InvalidUrl {
            url: input.to_owned(),
            reason: "gateway URL has no host".into(),
        });
    }
    Ok(normalized.to_owned())
}
