//! Scripted transport used by unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use governance_config::{GatewayConfig, GatewayConfigBuilder};
use governance_types::{GovernanceError, GovernanceResult};
use hyper::{HeaderMap, StatusCode};

use crate::client::GatewayClient;
use crate::transport::{GatewayRequest, GatewayResponse, Transport};

type Responder = dyn Fn(&GatewayRequest) -> GovernanceResult<GatewayResponse> + Send + Sync;

/// Records every request and answers with a scripted response.
#[derive(Clone)]
pub(crate) struct ScriptedTransport {
    responder: Arc<Responder>,
    delay: Option<Duration>,
    requests: Arc<Mutex<Vec<GatewayRequest>>>,
}

impl ScriptedTransport {
    pub(crate) fn new<F>(responder: F) -> Self
    where
        F: Fn(&GatewayRequest) -> GovernanceResult<GatewayResponse> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            delay: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn always(response: GatewayResponse) -> Self {
        Self::new(move |_| Ok(response.clone()))
    }

    pub(crate) fn failing(reason: &'static str) -> Self {
        Self::new(move |_| Err(GovernanceError::transport(reason)))
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn requests(&self) -> Vec<GatewayRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: GatewayRequest) -> GovernanceResult<GatewayResponse> {
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.responder)(&request)
    }
}

pub(crate) fn json_response(status: u16, body: &'static str) -> GatewayResponse {
    GatewayResponse::new(
        StatusCode::from_u16(status).expect("valid status"),
        HeaderMap::new(),
        body,
    )
}

pub(crate) fn client_with<F>(transport: &ScriptedTransport, configure: F) -> GatewayClient
where
    F: FnOnce(GatewayConfigBuilder) -> GatewayConfigBuilder,
{
    let config = configure(GatewayConfig::builder().gateway_url("http://gateway.test"))
        .resolve_with(|_| None)
        .expect("valid test config");
    GatewayClient::with_transport(config, Arc::new(transport.clone())).expect("valid client")
}
