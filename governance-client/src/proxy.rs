//! Passthrough requests to services behind the gateway's proxy namespace.

use bytes::Bytes;
use governance_types::{GovernanceError, GovernanceResult};
use hyper::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use hyper::{HeaderMap, Method};
use serde::Serialize;
use tracing::debug;

use crate::client::GatewayClient;
use crate::response::{Verdict, classify};
use crate::transport::GatewayResponse;

/// Caller-supplied extras for a proxied request.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    headers: HeaderMap,
    body: Option<Bytes>,
    resource: Option<String>,
}

impl RequestOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header. Trace, action and resource headers set by the client
    /// always win over values supplied here.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::Configuration`] for an invalid header name
    /// or value.
    pub fn header(mut self, name: &str, value: &str) -> GovernanceResult<Self> {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
            GovernanceError::configuration(format!("invalid header name `{name}`: {err}"))
        })?;
        let value = HeaderValue::from_str(value).map_err(|err| {
            GovernanceError::configuration(format!("invalid value for header {name}: {err}"))
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Sets a raw body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serializes `value` as the JSON body and sets the content type.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::Configuration`] if `value` can not be
    /// serialized.
    pub fn json_body<T: Serialize + ?Sized>(mut self, value: &T) -> GovernanceResult<Self> {
        let encoded = serde_json::to_vec(value).map_err(|err| {
            GovernanceError::configuration(format!("failed to encode request body: {err}"))
        })?;
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(Bytes::from(encoded));
        Ok(self)
    }

    /// Names the resource the action targets.
    #[must_use]
    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }
}

impl GatewayClient {
    /// Sends a request through the gateway's proxy namespace under `action`.
    ///
    /// Unlike [`check`](Self::check), a denial here is an error.
    ///
    /// # Errors
    ///
    /// [`GovernanceError::PolicyDenied`] on 403, and the same failures as
    /// [`check`](Self::check) otherwise.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        action: &str,
        options: RequestOptions,
    ) -> GovernanceResult<GatewayResponse> {
        let RequestOptions {
            headers: caller_headers,
            body,
            resource,
        } = options;

        let mut headers = self.base_headers()?;
        headers.extend(caller_headers);
        self.apply_agent_headers(&mut headers, action, resource.as_deref())?;

        let path = format!("/proxy/{}", path.trim_start_matches('/'));
        debug!(%method, path = %path, action, trace_id = %self.trace_id(), "proxying request");
        let request = self.build_request(method, &path, headers, body)?;

        match classify(self.send(request).await?)? {
            Verdict::Passed(response) => Ok(response),
            Verdict::Denied(body) => {
                let denied = body.into_denied(action);
                debug!(action, reason = denied.reason(), "proxied request denied");
                Err(denied.into())
            }
        }
    }

    /// Proxies a `GET` request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn get(
        &self,
        path: &str,
        action: &str,
        options: RequestOptions,
    ) -> GovernanceResult<GatewayResponse> {
        self.request(Method::GET, path, action, options).await
    }

    /// Proxies a `POST` request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn post(
        &self,
        path: &str,
        action: &str,
        options: RequestOptions,
    ) -> GovernanceResult<GatewayResponse> {
        self.request(Method::POST, path, action, options).await
    }

    /// Proxies a `PUT` request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn put(
        &self,
        path: &str,
        action: &str,
        options: RequestOptions,
    ) -> GovernanceResult<GatewayResponse> {
        self.request(Method::PUT, path, action, options).await
    }

    /// Proxies a `DELETE` request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn delete(
        &self,
        path: &str,
        action: &str,
        options: RequestOptions,
    ) -> GovernanceResult<GatewayResponse> {
        self.request(Method::DELETE, path, action, options).await
    }
}
