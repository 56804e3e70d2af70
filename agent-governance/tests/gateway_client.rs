//! Integration tests for GatewayClient against a mock gateway.
//!
//! Uses wiremock for HTTP mocking; requests go through the real hyper
//! transport.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use agent_governance::client::{ACTION_HEADER, ADMIN_TOKEN_HEADER, TRACE_ID_HEADER};
use agent_governance::prelude::*;
use agent_governance::types::{AuditQuery, NewAgent};
use futures::future::join_all;
use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, admin_token: Option<&str>) -> GatewayClient {
    let mut builder = GatewayConfig::builder()
        .gateway_url(format!("{}/", server.uri()))
        .agent_token("agent-token")
        .trace_id("trace-it")
        .timeout_ms(2_000);
    if let Some(token) = admin_token {
        builder = builder.admin_token(token);
    }
    let config = builder.resolve_with(|_| None).expect("valid config");
    GatewayClient::new(config).expect("client")
}

#[tokio::test]
async fn check_allow_sends_protocol_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/proxy/check"))
        .and(header(ACTION_HEADER, "read:contacts"))
        .and(header("x-resource", "crm"))
        .and(header(TRACE_ID_HEADER, "trace-it"))
        .and(header("authorization", "Bearer agent-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"policy": "default"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let decision = client.check("read:contacts", Some("crm")).await.unwrap();

    assert!(decision.allowed());
    assert_eq!(decision.policy(), Some("default"));
    assert_eq!(decision.trace_id().as_str(), "trace-it");
}

#[tokio::test]
async fn check_deny_does_not_error_but_enforce_does() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/proxy/check"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "policy": "strict",
            "rule": "no-email",
            "message": "Email sending blocked"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, None);

    let decision = client.check("write:email", None).await.unwrap();
    assert!(!decision.allowed());
    assert_eq!(decision.decision(), DecisionKind::Deny);
    assert_eq!(decision.reason(), Some("Email sending blocked"));

    let err = client.enforce("write:email", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PolicyDenied);
    let message = err.to_string();
    for needle in ["write:email", "strict", "no-email", "Email sending blocked"] {
        assert!(message.contains(needle), "{message} should mention {needle}");
    }
}

#[tokio::test]
async fn check_maps_failure_statuses() {
    for (status, kind) in [
        (401, ErrorKind::Authentication),
        (429, ErrorKind::RateLimit),
        (503, ErrorKind::Generic),
    ] {
        let server = MockServer::start().await;
        Mock::given(path("/proxy/check"))
            .respond_with(ResponseTemplate::new(status).set_body_string("failure"))
            .mount(&server)
            .await;

        let err = client_for(&server, None)
            .check("read:contacts", None)
            .await
            .expect_err("failure status should error");
        assert_eq!(err.kind(), kind, "status {status}");
    }
}

#[tokio::test]
async fn govern_never_runs_denied_work() {
    let server = MockServer::start().await;
    Mock::given(path("/proxy/check"))
        .and(header(ACTION_HEADER, "write:email"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(path("/proxy/check"))
        .and(header(ACTION_HEADER, "read:contacts"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let runs = AtomicUsize::new(0);
    let counter = &runs;

    let denied = client
        .govern("write:email", None, move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .await;
    assert!(matches!(denied, Err(GovernanceError::PolicyDenied(_))));
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    let allowed = client
        .govern("read:contacts", None, || async { "contacts" })
        .await
        .unwrap();
    assert_eq!(allowed, "contacts");
}

#[tokio::test]
async fn slow_gateway_is_a_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(path("/proxy/check"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let config = GatewayConfig::builder()
        .gateway_url(server.uri())
        .timeout_ms(50)
        .resolve_with(|_| None)
        .unwrap();
    let client = GatewayClient::new(config).unwrap();

    let err = client.check("read:contacts", None).await.unwrap_err();
    assert!(matches!(err, GovernanceError::Transport { .. }));
}

#[tokio::test]
async fn concurrent_checks_resolve_independently() {
    let server = MockServer::start().await;
    for i in 0..10 {
        let template = if i % 2 == 0 {
            ResponseTemplate::new(200).set_body_json(json!({"policy": format!("p{i}")}))
        } else {
            ResponseTemplate::new(403).set_body_json(json!({"rule": format!("r{i}")}))
        };
        Mock::given(path("/proxy/check"))
            .and(header(ACTION_HEADER, format!("action:{i}").as_str()))
            .respond_with(template.set_delay(Duration::from_millis(10 * (10 - i))))
            .mount(&server)
            .await;
    }

    let client = client_for(&server, None);
    let actions: Vec<String> = (0..10).map(|i| format!("action:{i}")).collect();
    let decisions = join_all(actions.iter().map(|action| client.check(action, None))).await;

    for (i, decision) in decisions.into_iter().enumerate() {
        let decision = decision.unwrap();
        assert_eq!(decision.action(), format!("action:{i}"));
        if i % 2 == 0 {
            assert!(decision.allowed());
            assert_eq!(decision.policy(), Some(format!("p{i}").as_str()));
        } else {
            assert!(!decision.allowed());
            assert_eq!(decision.rule(), Some(format!("r{i}").as_str()));
        }
    }
}

#[tokio::test]
async fn passthrough_merges_headers_and_raises_on_denial() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/proxy/email/send"))
        .and(header(ACTION_HEADER, "write:email"))
        .and(header("x-tenant", "acme"))
        .and(body_json(json!({"to": "bob@example.com"})))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"policy": "strict"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/proxy/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["alice"])))
        .mount(&server)
        .await;

    let client = client_for(&server, None);

    let options = RequestOptions::new()
        .header("x-tenant", "acme")
        .unwrap()
        .header(ACTION_HEADER, "read:everything")
        .unwrap()
        .json_body(&json!({"to": "bob@example.com"}))
        .unwrap();
    let err = client
        .post("/email/send", "write:email", options)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PolicyDenied);

    let response = client
        .get("contacts", "read:contacts", RequestOptions::new())
        .await
        .unwrap();
    let contacts: Vec<String> = response.json().unwrap();
    assert_eq!(contacts, vec!["alice"]);
}

#[tokio::test]
async fn admin_without_token_never_reaches_the_gateway() {
    let server = MockServer::start().await;
    Mock::given(path("/admin/agents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let err = client.list_agents().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);

    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}

#[tokio::test]
async fn admin_operations_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/agents"))
        .and(header(ADMIN_TOKEN_HEADER, "admin-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "a-1", "name": "mailer", "trustTier": "verified"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/agents"))
        .and(body_json(json!({"name": "crm", "trustTier": "verified", "tags": []})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "a-2", "name": "crm", "trustTier": "verified"
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/admin/agents/a-2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/policies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "p-1", "name": "strict", "rules": []}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/audit"))
        .and(query_param("limit", "50"))
        .and(query_param("decision", "deny"))
        .and(header_exists(TRACE_ID_HEADER))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"action": "write:email", "decision": "deny", "policy": "strict"}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("admin-token"));

    let agents = client.list_agents().await.unwrap();
    assert_eq!(agents[0].name, "mailer");
    assert!(agents[0].tags.is_empty());

    let created = client.create_agent(&NewAgent::new("crm")).await.unwrap();
    assert_eq!(created.id, "a-2");

    client.revoke_agent("a-2").await.unwrap();

    let policies = client.list_policies().await.unwrap();
    assert_eq!(policies[0].name, "strict");

    let entries = client
        .audit_log(AuditQuery::default().with_decision(DecisionKind::Deny))
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].policy.as_deref(), Some("strict"));
}

#[tokio::test]
async fn health_paths_are_independent() {
    let server = MockServer::start().await;
    Mock::given(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "healthy"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "degraded"})))
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    assert!(client.is_healthy().await);
    assert!(!client.is_healthy().await);

    let config = GatewayConfig::builder()
        .gateway_url("http://127.0.0.1:1")
        .resolve_with(|_| None)
        .unwrap();
    let unreachable = GatewayClient::new(config).unwrap();
    assert!(!unreachable.is_healthy().await);
}
