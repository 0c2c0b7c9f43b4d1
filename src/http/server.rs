//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, metrics)
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::handlers::{self, TRANSFER_ROUTES};
use crate::http::request::{request_id, track_requests, MakeRequestUuid, X_REQUEST_ID};
use crate::lifecycle::shutdown_requested;
use crate::relay::RelayService;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayService>,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    relay: Arc<RelayService>,
}

impl HttpServer {
    /// Create a new HTTP server around a relay service.
    pub fn new(relay: RelayService) -> Self {
        let relay = Arc::new(relay);
        let state = AppState {
            relay: relay.clone(),
        };
        let router = Self::build_router(relay.config(), state);
        Self { router, relay }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The body limit and timeout are separate `Router::layer` calls so each
    /// response body is re-boxed before the next layer sees it.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let mut router: Router<AppState> = Router::new();
        for path in TRANSFER_ROUTES {
            router = router.route(path, post(handlers::transfer));
        }

        router
            .route("/balance", get(handlers::balance))
            .route("/status", get(handlers::status))
            .route("/health", get(handlers::health))
            .route_layer(middleware::from_fn(track_requests))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            path = %request.uri().path(),
                            request_id = %request_id(request),
                        )
                    }))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until Ctrl+C / SIGTERM or the shutdown channel fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            wallet = ?self.relay.wallet().map(|w| w.address()),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_requested(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
