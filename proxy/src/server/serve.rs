//! HTTP server setup

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue},
    routing::{get, post, MethodRouter},
    Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app::options::ServerOptions;
use crate::errors::ProxyError;
use crate::server::build_logs::build_logs_handler;
use crate::server::deploy::deploy_handler;
use crate::server::handlers::{
    health_handler, method_not_allowed, preflight_handler, version_handler,
};
use crate::server::state::ServerState;
use crate::server::status::status_handler;

type ApiRoute = MethodRouter<Arc<ServerState>>;

/// Attach the cross-origin headers every API response carries
fn with_cors(route: ApiRoute, methods: &'static str) -> ApiRoute {
    route
        .layer::<_, Infallible>(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer::<_, Infallible>(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(methods),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
}

/// A route accepting only `GET` (and `OPTIONS` preflight)
fn get_only(route: ApiRoute) -> ApiRoute {
    // axum routes HEAD to the GET handler unless told otherwise
    with_cors(
        route
            .head(method_not_allowed)
            .options(preflight_handler)
            .fallback(method_not_allowed),
        "GET, OPTIONS",
    )
}

/// A route accepting only `POST` (and `OPTIONS` preflight)
fn post_only(route: ApiRoute) -> ApiRoute {
    with_cors(
        route.options(preflight_handler).fallback(method_not_allowed),
        "POST, OPTIONS",
    )
}

/// Build the application router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        // Health and version
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        // Vercel proxy
        .route("/api/deploy", post_only(post(deploy_handler)))
        .route("/api/vercel-status", get_only(get(status_handler)))
        .route("/api/vercel-logs", get_only(get(build_logs_handler)))
        // State and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server
pub async fn serve(
    options: &ServerOptions,
    state: Arc<ServerState>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<JoinHandle<Result<(), ProxyError>>, ProxyError> {
    let app = router(state);

    let addr = format!("{}:{}", options.host, options.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| ProxyError::ServerError(format!("unable to bind {}: {}", addr, e)))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| ProxyError::ServerError(e.to_string()))?;
    info!("Listening on http://{}", local_addr);

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ProxyError::ServerError(e.to_string()))
    });

    Ok(handle)
}
