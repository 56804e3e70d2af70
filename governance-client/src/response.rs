//! Status-to-outcome mapping shared by every gateway call.

use std::time::Duration;

use governance_types::{GovernanceError, GovernanceResult, PolicyDenied};
use hyper::StatusCode;
use hyper::header::RETRY_AFTER;
use serde::Deserialize;
use serde_json::Value;

use crate::transport::GatewayResponse;

/// Outcome of a gateway response that is not an error.
#[derive(Debug)]
pub(crate) enum Verdict {
    /// Any status below 400.
    Passed(GatewayResponse),
    /// HTTP 403 with whatever provenance the body carried.
    Denied(DenyBody),
}

/// Body of a 403 response. Each field is read on its own, so a missing or
/// mistyped field never discards the others; `message` wins over `reason`.
#[derive(Debug, Default)]
pub(crate) struct DenyBody {
    pub(crate) policy: Option<String>,
    pub(crate) rule: Option<String>,
    pub(crate) message: Option<String>,
}

impl DenyBody {
    pub(crate) fn from_slice(body: &[u8]) -> Self {
        let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) else {
            return Self::default();
        };
        let text = |key: &str| {
            fields
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_owned)
        };
        Self {
            policy: text("policy"),
            rule: text("rule"),
            message: text("message").or_else(|| text("reason")),
        }
    }

    pub(crate) fn into_denied(self, action: &str) -> PolicyDenied {
        PolicyDenied::new(action, self.policy, self.rule, self.message)
    }
}

/// Body of a 200 response from the check endpoint.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct AllowBody {
    #[serde(default)]
    pub(crate) policy: Option<String>,
}

/// Maps a response to a verdict, or to the error its status implies.
///
/// This is the only place a 403 is interpreted.
pub(crate) fn classify(response: GatewayResponse) -> GovernanceResult<Verdict> {
    let status = response.status();
    match status {
        StatusCode::FORBIDDEN => Ok(Verdict::Denied(DenyBody::from_slice(response.body()))),
        StatusCode::UNAUTHORIZED => Err(GovernanceError::authentication(non_empty_or(
            response.text(),
            "invalid or expired credentials",
        ))),
        StatusCode::TOO_MANY_REQUESTS => Err(GovernanceError::RateLimited {
            retry_after: retry_after(&response),
            message: non_empty_or(response.text(), "too many requests"),
        }),
        status if status.as_u16() >= 400 => Err(GovernanceError::Gateway {
            status: status.as_u16(),
            body: response.text(),
        }),
        _ => Ok(Verdict::Passed(response)),
    }
}

fn retry_after(response: &GatewayResponse) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn non_empty_or(text: String, fallback: &str) -> String {
    if text.trim().is_empty() {
        fallback.to_owned()
    } else {
        text
    }
}
