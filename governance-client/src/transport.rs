//! Transport seam between the client and the gateway.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use governance_types::{GovernanceError, GovernanceResult};
use hyper::body::to_bytes;
use hyper::{Body, HeaderMap, Method, Request, StatusCode, Uri};
use serde::de::DeserializeOwned;

use crate::http_client::{HyperClient, build_https_client};

/// Fully assembled request handed to a [`Transport`].
#[derive(Clone, Debug)]
pub struct GatewayRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl GatewayRequest {
    /// Creates a request without a body.
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self {
            method,
            uri,
            headers,
            body: None,
        }
    }

    /// Attaches a body to the request.
    #[must_use]
    pub fn with_body(mut self, body: Option<Bytes>) -> Self {
        self.body = body;
        self
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the absolute request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the request body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Returns the value of a header as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Raw response returned by the gateway.
#[derive(Clone, Debug)]
pub struct GatewayResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl GatewayResponse {
    /// Creates a response from its parts.
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Returns the HTTP status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the raw body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body decoded as (lossy) UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::InvalidResponse`] when the body is not valid
    /// JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> GovernanceResult<T> {
        serde_json::from_slice(&self.body).map_err(|err| {
            GovernanceError::invalid_response(format!(
                "failed to decode gateway response: {err}"
            ))
        })
    }
}

/// Sends requests to the gateway.
///
/// Implementations report network-level failures as
/// [`GovernanceError::Transport`] and return every HTTP response, whatever its
/// status, as `Ok`. Status interpretation belongs to the client.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the buffered response.
    async fn send(&self, request: GatewayRequest) -> GovernanceResult<GatewayResponse>;
}

/// Default transport backed by a pooled `hyper` client with rustls.
#[derive(Clone)]
pub struct HyperTransport {
    client: HyperClient,
}

impl fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperTransport").finish_non_exhaustive()
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperTransport {
    /// Creates a transport that trusts the bundled web PKI roots.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: build_https_client(),
        }
    }
}

#[async_trait]
impl Transport for HyperTransport {
    async fn send(&self, request: GatewayRequest) -> GovernanceResult<GatewayResponse> {
        let GatewayRequest {
            method,
            uri,
            headers,
            body,
        } = request;

        let mut req = Request::new(body.map_or_else(Body::empty, Body::from));
        *req.method_mut() = method;
        *req.uri_mut() = uri;
        *req.headers_mut() = headers;

        let response = self
            .client
            .request(req)
            .await
            .map_err(|err| GovernanceError::transport(format!("gateway request failed: {err}")))?;

        let (parts, body) = response.into_parts();
        let bytes = to_bytes(body).await.map_err(|err| {
            GovernanceError::transport(format!("failed to read gateway response: {err}"))
        })?;

        Ok(GatewayResponse::new(parts.status, parts.headers, bytes))
    }
}
