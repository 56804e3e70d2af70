//! Client for the agent governance gateway.
//!
//! [`GatewayClient`] implements the decision protocol (`check`, `enforce`,
//! `govern`), passthrough proxying, admin operations, and health probes on top
//! of a pluggable [`Transport`]. The [`PolicyEnforcer`] trait is the seam the
//! tool governance layer builds on.

#![warn(missing_docs, clippy::pedantic)]

mod admin;
mod client;
mod enforcer;
mod http_client;
mod proxy;
mod response;
mod transport;

#[cfg(test)]
mod testing;

pub use client::{ACTION_HEADER, ADMIN_TOKEN_HEADER, GatewayClient, RESOURCE_HEADER, TRACE_ID_HEADER};
pub use enforcer::PolicyEnforcer;
pub use proxy::RequestOptions;
pub use transport::{GatewayRequest, GatewayResponse, HyperTransport, Transport};

/// HTTP vocabulary used in the client's public API.
pub use hyper::{HeaderMap, Method, StatusCode};
