//! Error taxonomy shared by the governance client and tool layer.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Result alias used throughout the governance SDK.
pub type GovernanceResult<T> = std::result::Result<T, GovernanceError>;

/// Reason used when the gateway denies an action without explaining why.
pub const DEFAULT_DENY_REASON: &str = "Access denied by policy";

/// Coarse classification callers match on instead of individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Credential missing, invalid, or expired.
    Authentication,
    /// The gateway rejected the action.
    PolicyDenied,
    /// The gateway throttled the request.
    RateLimit,
    /// Any other failure, including transport errors and timeouts.
    Generic,
}

/// Failures surfaced by the governance client.
#[derive(Debug, Error)]
pub enum GovernanceError {
    /// Credential missing locally or rejected by the gateway (HTTP 401).
    #[error("authentication failed: {message}")]
    Authentication {
        /// Additional context for the failure.
        message: String,
    },

    /// The action was denied by policy (HTTP 403).
    #[error(transparent)]
    PolicyDenied(PolicyDenied),

    /// The gateway throttled the request (HTTP 429).
    #[error("rate limited: {message}")]
    RateLimited {
        /// Body text returned by the gateway.
        message: String,
        /// Delay suggested by the `Retry-After` header, when present.
        retry_after: Option<Duration>,
    },

    /// The gateway answered with any other failure status.
    #[error("gateway returned {status}: {body}")]
    Gateway {
        /// HTTP status code.
        status: u16,
        /// Body text returned by the gateway.
        body: String,
    },

    /// The gateway answered successfully but the body could not be decoded.
    #[error("invalid gateway response: {reason}")]
    InvalidResponse {
        /// Additional context about the decoding failure.
        reason: String,
    },

    /// The gateway could not be reached, or the request timed out.
    #[error("gateway transport error: {reason}")]
    Transport {
        /// Additional context about the error.
        reason: String,
    },

    /// The client was configured with values it can not use.
    #[error("client not configured: {reason}")]
    Configuration {
        /// Additional context for the failure.
        reason: String,
    },
}

impl GovernanceError {
    /// Convenience constructor for authentication failures.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Convenience constructor for transport failures.
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for undecodable responses.
    #[must_use]
    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for configuration issues.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Returns the coarse kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::PolicyDenied(_) => ErrorKind::PolicyDenied,
            Self::RateLimited { .. } => ErrorKind::RateLimit,
            Self::Gateway { .. }
            | Self::InvalidResponse { .. }
            | Self::Transport { .. }
            | Self::Configuration { .. } => ErrorKind::Generic,
        }
    }

    /// Returns the denial details when this error is a policy denial.
    #[must_use]
    pub fn as_denied(&self) -> Option<&PolicyDenied> {
        match self {
            Self::PolicyDenied(denied) => Some(denied),
            _ => None,
        }
    }
}

impl From<PolicyDenied> for GovernanceError {
    fn from(value: PolicyDenied) -> Self {
        Self::PolicyDenied(value)
    }
}

/// Details of an action rejected by policy.
///
/// Displays as `Action '<action>' denied[ by policy '<policy>'][ (rule: <rule>)]: <reason>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDenied {
    action: String,
    policy: Option<String>,
    rule: Option<String>,
    reason: String,
}

impl PolicyDenied {
    /// Creates denial details, substituting [`DEFAULT_DENY_REASON`] when no
    /// reason is given.
    #[must_use]
    pub fn new(
        action: impl Into<String>,
        policy: Option<String>,
        rule: Option<String>,
        reason: Option<String>,
    ) -> Self {
        Self {
            action: action.into(),
            policy,
            rule,
            reason: reason.unwrap_or_else(|| DEFAULT_DENY_REASON.to_owned()),
        }
    }

    /// Returns the denied action.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns the policy that denied the action, if known.
    #[must_use]
    pub fn policy(&self) -> Option<&str> {
        self.policy.as_deref()
    }

    /// Returns the rule that matched, if known.
    #[must_use]
    pub fn rule(&self) -> Option<&str> {
        self.rule.as_deref()
    }

    /// Returns the denial reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for PolicyDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Action '{}' denied", self.action)?;
        if let Some(policy) = &self.policy {
            write!(f, " by policy '{policy}'")?;
        }
        if let Some(rule) = &self.rule {
            write!(f, " (rule: {rule})")?;
        }
        write!(f, ": {}", self.reason)
    }
}

impl std::error::Error for PolicyDenied {}
