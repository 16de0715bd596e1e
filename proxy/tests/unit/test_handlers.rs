//! Handler tests against an in-memory upstream

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tower::ServiceExt;

use ccproxy::app::options::ProxyConfig;
use ccproxy::errors::ProxyError;
use ccproxy::http::deployments::VercelClient;
use ccproxy::http::transport::{UpstreamRequest, UpstreamResponse, UpstreamTransport};
use ccproxy::server::serve::router;
use ccproxy::server::state::ServerState;

type Reply = Box<dyn Fn(&UpstreamRequest) -> Result<UpstreamResponse, ProxyError> + Send + Sync>;

/// Records every call and answers with a canned reply
struct MockTransport {
    calls: Mutex<Vec<(String, UpstreamRequest)>>,
    reply: Reply,
}

impl MockTransport {
    fn replying<F>(reply: F) -> Arc<Self>
    where
        F: Fn(&UpstreamRequest) -> Result<UpstreamResponse, ProxyError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            reply: Box::new(reply),
        })
    }

    fn json(status: StatusCode, body: Value) -> Arc<Self> {
        Self::replying(move |_| {
            Ok(UpstreamResponse {
                status,
                body: body.to_string(),
            })
        })
    }

    fn unreachable() -> Arc<Self> {
        Self::replying(|request| {
            Err(ProxyError::Transport {
                operation: request.operation,
                detail: "connection refused".to_string(),
            })
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn last_call(&self) -> (String, UpstreamRequest) {
        self.calls
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no upstream call recorded")
    }
}

#[async_trait]
impl UpstreamTransport for MockTransport {
    async fn send(
        &self,
        token: &SecretString,
        request: UpstreamRequest,
    ) -> Result<UpstreamResponse, ProxyError> {
        let reply = (self.reply)(&request);
        self.calls
            .lock()
            .unwrap()
            .push((token.expose_secret().to_string(), request));
        reply
    }
}

fn configured() -> ProxyConfig {
    ProxyConfig::default().with_token("test-token")
}

fn app(config: ProxyConfig, transport: Arc<MockTransport>) -> Router {
    let state = ServerState::new(config, VercelClient::new(transport));
    router(Arc::new(state))
}

struct Captured {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl Captured {
    fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("response body is not JSON")
    }
}

async fn send(app: Router, method: Method, uri: &str, body: &str) -> Captured {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    Captured {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

const ROUTES: [(&str, &str); 3] = [
    ("/api/deploy", "POST, OPTIONS"),
    ("/api/vercel-status", "GET, OPTIONS"),
    ("/api/vercel-logs?deploymentId=dpl_1", "GET, OPTIONS"),
];

// ================================ SHARED ==================================== //

#[tokio::test]
async fn test_options_returns_empty_200_with_cors_headers() {
    for (uri, methods) in ROUTES {
        for config in [ProxyConfig::default(), configured()] {
            let transport = MockTransport::unreachable();
            let reply = send(app(config, transport.clone()), Method::OPTIONS, uri, "").await;

            assert_eq!(reply.status, StatusCode::OK, "{}", uri);
            assert!(reply.body.is_empty(), "{}", uri);
            assert_eq!(reply.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
            assert_eq!(reply.headers[header::ACCESS_CONTROL_ALLOW_METHODS], methods);
            assert_eq!(reply.headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
            assert_eq!(transport.call_count(), 0);
        }
    }
}

#[tokio::test]
async fn test_unsupported_methods_return_405_without_upstream_call() {
    let cases = [
        ("/api/deploy", vec![Method::GET, Method::PUT, Method::DELETE, Method::PATCH, Method::HEAD]),
        ("/api/vercel-status", vec![Method::POST, Method::PUT, Method::DELETE, Method::HEAD]),
        ("/api/vercel-logs?deploymentId=dpl_1", vec![Method::POST, Method::PATCH, Method::HEAD]),
    ];

    for (uri, methods) in cases {
        for method in methods {
            let transport = MockTransport::json(StatusCode::OK, json!({}));
            let is_head = method == Method::HEAD;
            let reply = send(app(configured(), transport.clone()), method, uri, "{}").await;

            assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED, "{}", uri);
            assert_eq!(reply.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
            if !is_head {
                assert_eq!(reply.json(), json!({"error": "Method not allowed"}));
            }
            assert_eq!(transport.call_count(), 0);
        }
    }
}

#[tokio::test]
async fn test_missing_credential_returns_503_without_upstream_call() {
    let requests = [
        (Method::POST, "/api/deploy", r#"{"projectName":"shop"}"#),
        (Method::GET, "/api/vercel-status", ""),
        (Method::GET, "/api/vercel-logs?deploymentId=dpl_1", ""),
    ];

    for (method, uri, body) in requests {
        let transport = MockTransport::json(StatusCode::OK, json!({}));
        let reply = send(app(ProxyConfig::default(), transport.clone()), method, uri, body).await;

        assert_eq!(reply.status, StatusCode::SERVICE_UNAVAILABLE, "{}", uri);
        let body = reply.json();
        assert_eq!(body["error"], "VERCEL_TOKEN not set");
        assert!(body["hint"].as_str().is_some_and(|hint| hint.contains("VERCEL_TOKEN")));
        assert_eq!(transport.call_count(), 0);
    }
}

#[tokio::test]
async fn test_network_error_returns_500_with_message() {
    let requests = [
        (Method::POST, "/api/deploy", "{}", "Deploy request failed"),
        (Method::GET, "/api/vercel-status", "", "Status check failed"),
        (Method::GET, "/api/vercel-logs?deploymentId=dpl_1", "", "Logs fetch failed"),
    ];

    for (method, uri, body, label) in requests {
        let transport = MockTransport::unreachable();
        let reply = send(app(configured(), transport.clone()), method, uri, body).await;

        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert_eq!(reply.json(), json!({"error": label, "detail": "connection refused"}));
        assert_eq!(transport.call_count(), 1);
    }
}

#[tokio::test]
async fn test_upstream_rejection_relays_status_and_truncates_detail() {
    let long_error = format!("{{\"error\":{{\"message\":\"{}\"}}}}", "x".repeat(1000));
    let requests = [
        (Method::POST, "/api/deploy", "{}", "Deploy failed", StatusCode::FORBIDDEN),
        (Method::GET, "/api/vercel-status", "", "Vercel API error", StatusCode::TOO_MANY_REQUESTS),
        (Method::GET, "/api/vercel-logs?deploymentId=dpl_1", "", "Vercel API error", StatusCode::NOT_FOUND),
    ];

    for (method, uri, body, label, upstream_status) in requests {
        let upstream_body = long_error.clone();
        let transport = MockTransport::replying(move |_| {
            Ok(UpstreamResponse {
                status: upstream_status,
                body: upstream_body.clone(),
            })
        });
        let reply = send(app(configured(), transport.clone()), method, uri, body).await;

        assert_eq!(reply.status, upstream_status, "{}", uri);
        let body = reply.json();
        assert_eq!(body["error"], label);
        let detail = body["detail"].as_str().unwrap();
        assert_eq!(detail.chars().count(), 300);
        assert!(long_error.starts_with(detail));
    }
}

#[tokio::test]
async fn test_short_upstream_error_is_relayed_whole() {
    let transport = MockTransport::replying(|_| {
        Ok(UpstreamResponse {
            status: StatusCode::BAD_REQUEST,
            body: "invalid project".to_string(),
        })
    });
    let reply = send(app(configured(), transport), Method::POST, "/api/deploy", "{}").await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json(), json!({"error": "Deploy failed", "detail": "invalid project"}));
}

// ================================ DEPLOY ==================================== //

#[tokio::test]
async fn test_deploy_normalizes_project_name() {
    let transport = MockTransport::json(
        StatusCode::OK,
        json!({
            "id": "dpl_42",
            "url": "my-project-abc.vercel.app",
            "readyState": "QUEUED",
            "alias": ["my-project.vercel.app"],
            "name": "my-project"
        }),
    );
    let reply = send(
        app(configured(), transport.clone()),
        Method::POST,
        "/api/deploy",
        r#"{"projectName":"My.Project"}"#,
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.json(),
        json!({
            "url": "my-project-abc.vercel.app",
            "status": "QUEUED",
            "id": "dpl_42",
            "alias": ["my-project.vercel.app"]
        })
    );

    assert_eq!(transport.call_count(), 1);
    let (token, request) = transport.last_call();
    assert_eq!(token, "test-token");
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.segments, vec!["v13", "deployments"]);
    assert_eq!(request.query_value("forceNew"), Some("1"));
    assert_eq!(
        request.body,
        Some(json!({"name": "my-project", "project": "my-project", "target": "production"}))
    );
}

#[tokio::test]
async fn test_deploy_defaults_project_and_alias() {
    let transport = MockTransport::json(StatusCode::OK, json!({"id": "dpl_1", "url": "x.vercel.app", "readyState": "BUILDING"}));
    let reply = send(app(configured(), transport.clone()), Method::POST, "/api/deploy", "").await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["alias"], json!([]));

    let (_, request) = transport.last_call();
    assert_eq!(request.body.unwrap()["name"], "ai-command-center");
}

#[tokio::test]
async fn test_deploy_uses_configured_default_project() {
    let mut config = configured();
    config.default_project = "Agency.Site".to_string();
    let transport = MockTransport::json(StatusCode::OK, json!({}));
    send(app(config, transport.clone()), Method::POST, "/api/deploy", r#"{"projectName":""}"#).await;

    let (_, request) = transport.last_call();
    assert_eq!(request.body.unwrap()["project"], "agency-site");
}

#[tokio::test]
async fn test_deploy_invalid_json_returns_400_without_upstream_call() {
    for body in ["{\"projectName\":", "not json", "null", r#"{"projectName": 12}"#] {
        let transport = MockTransport::json(StatusCode::OK, json!({}));
        let reply = send(app(configured(), transport.clone()), Method::POST, "/api/deploy", body).await;

        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(reply.json(), json!({"error": "Invalid JSON body"}));
        assert_eq!(transport.call_count(), 0);
    }
}

#[tokio::test]
async fn test_deploy_undecodable_success_body_returns_500() {
    let transport = MockTransport::replying(|_| {
        Ok(UpstreamResponse {
            status: StatusCode::OK,
            body: "<html>gateway</html>".to_string(),
        })
    });
    let reply = send(app(configured(), transport), Method::POST, "/api/deploy", "{}").await;

    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.json()["error"], "Deploy request failed");
}

// ================================ STATUS ==================================== //

#[tokio::test]
async fn test_status_maps_deployments() {
    let transport = MockTransport::json(
        StatusCode::OK,
        json!({"deployments": [{"uid": "d1", "url": "", "alias": ["a.com"], "state": "READY"}]}),
    );
    let reply = send(app(configured(), transport.clone()), Method::GET, "/api/vercel-status", "").await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.json(),
        json!({"deployments": [{"id": "d1", "url": "a.com", "state": "READY"}]})
    );

    let (_, request) = transport.last_call();
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.segments, vec!["v6", "deployments"]);
    assert_eq!(request.query_value("limit"), Some("20"));
    assert_eq!(request.query_value("target"), Some("production"));
    assert_eq!(request.query_value("projectId"), None);
}

#[tokio::test]
async fn test_status_scopes_to_configured_project() {
    let transport = MockTransport::json(StatusCode::OK, json!({}));
    let config = configured().with_project_id("prj_123");
    let reply = send(app(config, transport.clone()), Method::GET, "/api/vercel-status", "").await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!({"deployments": []}));

    let (_, request) = transport.last_call();
    assert_eq!(request.query_value("projectId"), Some("prj_123"));
}

#[tokio::test]
async fn test_status_state_fallbacks() {
    let transport = MockTransport::json(
        StatusCode::OK,
        json!({"deployments": [
            {"uid": "d1", "url": "one.app", "readyState": "ERROR"},
            {"uid": "d2", "url": "two.app", "state": "", "readyState": ""}
        ]}),
    );
    let reply = send(app(configured(), transport), Method::GET, "/api/vercel-status", "").await;

    assert_eq!(
        reply.json(),
        json!({"deployments": [
            {"id": "d1", "url": "one.app", "state": "ERROR"},
            {"id": "d2", "url": "two.app", "state": "UNKNOWN"}
        ]})
    );
}

// ================================= LOGS ===================================== //

#[tokio::test]
async fn test_logs_flattens_events() {
    let transport = MockTransport::json(
        StatusCode::OK,
        json!([
            {"payload": {"text": "line1"}},
            {"payload": {}},
            {"payload": {"message": "line2"}}
        ]),
    );
    let reply = send(
        app(configured(), transport.clone()),
        Method::GET,
        "/api/vercel-logs?deploymentId=dpl_abc",
        "",
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!({"logs": "line1\nline2"}));

    let (_, request) = transport.last_call();
    assert_eq!(request.segments, vec!["v3", "deployments", "dpl_abc", "events"]);
    assert_eq!(request.query_value("limit"), Some("200"));
    assert_eq!(request.query_value("direction"), Some("backward"));
}

#[tokio::test]
async fn test_logs_without_usable_events_returns_placeholder() {
    for upstream in [json!([]), json!([{"payload": {"text": ""}}, {"type": "stdout"}]), json!({})] {
        let transport = MockTransport::json(StatusCode::OK, upstream);
        let reply = send(
            app(configured(), transport),
            Method::GET,
            "/api/vercel-logs?deploymentId=dpl_1",
            "",
        )
        .await;

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.json(), json!({"logs": "No build log events returned."}));
    }
}

#[tokio::test]
async fn test_logs_requires_deployment_id() {
    for uri in ["/api/vercel-logs", "/api/vercel-logs?deploymentId="] {
        for config in [ProxyConfig::default(), configured()] {
            let transport = MockTransport::json(StatusCode::OK, json!([]));
            let reply = send(app(config, transport.clone()), Method::GET, uri, "").await;

            assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(reply.json(), json!({"error": "Missing deploymentId query"}));
            assert_eq!(transport.call_count(), 0);
        }
    }
}

#[tokio::test]
async fn test_logs_repeated_deployment_id_uses_first() {
    let transport = MockTransport::json(StatusCode::OK, json!([{"payload": {"text": "ok"}}]));
    let reply = send(
        app(configured(), transport.clone()),
        Method::GET,
        "/api/vercel-logs?deploymentId=a&deploymentId=b",
        "",
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!({"logs": "ok"}));
    assert_eq!(transport.call_count(), 1);
    let (_, request) = transport.last_call();
    assert_eq!(request.segments, vec!["v3", "deployments", "a", "events"]);
}

#[tokio::test]
async fn test_logs_blank_deployment_ids_answer_json_400() {
    let transport = MockTransport::json(StatusCode::OK, json!([]));
    let reply = send(
        app(configured(), transport.clone()),
        Method::GET,
        "/api/vercel-logs?deploymentId&deploymentId=&limit=5",
        "",
    )
    .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json(), json!({"error": "Missing deploymentId query"}));
    assert_eq!(transport.call_count(), 0);
}

// ================================ AMBIENT =================================== //

#[tokio::test]
async fn test_health_endpoint() {
    let reply = send(app(ProxyConfig::default(), MockTransport::unreachable()), Method::GET, "/health", "").await;

    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "ccproxy");
}
