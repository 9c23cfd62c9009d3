//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the simulation handler
//! - Wire up middleware (request ID, tracing)
//! - Serve each accepted connection over HTTP/1.1 with a read-header timeout
//! - Stop accepting and drain connections on shutdown

use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::service::TowerToHyperService;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, watch};
use tower_http::trace::TraceLayer;

use crate::config::SimulatorConfig;
use crate::http::request::{request_id_layer, request_span};
use crate::net::{ConnectionGuard, ConnectionPermit, ConnectionTracker, Listener, ListenerError};
use crate::observability::metrics;
use crate::shaping::{shape, RequestParameters, SampleHeaderPool};

/// Path of the single simulation endpoint.
pub const REQUEST_PATH: &str = "/request";

/// Body sent with every rejected request.
pub const INVALID_PARAMS_BODY: &str = "invalid request params";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<SampleHeaderPool>,
}

/// HTTP server for the response simulator.
pub struct HttpServer {
    router: Router,
    config: SimulatorConfig,
}

impl HttpServer {
    /// Create a new HTTP server using the built-in sample header pool.
    pub fn new(config: SimulatorConfig) -> Self {
        Self::with_pool(config, SampleHeaderPool::builtin())
    }

    /// Create a new HTTP server with a custom sample header pool.
    pub fn with_pool(config: SimulatorConfig, pool: SampleHeaderPool) -> Self {
        let state = AppState {
            pool: Arc::new(pool),
        };
        let router = Self::build_router(state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route(REQUEST_PATH, any(simulate_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(request_id_layer())
    }

    /// The router, for serving through other transports or testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(self, listener: Listener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let read_header_timeout = Duration::from_secs(self.config.timeouts.read_header_secs);
        tracing::info!(
            address = %addr,
            read_header_timeout_secs = self.config.timeouts.read_header_secs,
            "HTTP server starting"
        );

        let mut builder = http1::Builder::new();
        builder.timer(TokioTimer::new()).header_read_timeout(read_header_timeout);

        let tracker = ConnectionTracker::new();

        loop {
            let (stream, peer_addr, permit) = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(ListenerError::Closed) => break,
                    Err(e) => {
                        tracing::warn!(error = %e, "Accept failed");
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        continue;
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
            };

            let connection = Connection {
                stream,
                peer_addr,
                _permit: permit,
                guard: tracker.track(),
                stopping: tracker.shutdown_receiver(),
            };
            tokio::spawn(connection.serve(builder.clone(), self.router.clone()));
        }

        tracker.begin_shutdown();
        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);
        if !tracker.wait_for_drain(grace).await {
            tracing::warn!(
                open_connections = tracker.active_count(),
                "Shutdown grace period elapsed with connections still open"
            );
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// An accepted connection and the resources it holds until it closes.
struct Connection {
    stream: TcpStream,
    peer_addr: SocketAddr,
    _permit: ConnectionPermit,
    guard: ConnectionGuard,
    stopping: watch::Receiver<bool>,
}

impl Connection {
    async fn serve(mut self, builder: http1::Builder, router: Router) {
        let io = TokioIo::new(self.stream);
        let conn = builder.serve_connection(io, TowerToHyperService::new(router));
        tokio::pin!(conn);

        let result = tokio::select! {
            result = conn.as_mut() => result,
            _ = self.stopping.changed() => {
                conn.as_mut().graceful_shutdown();
                conn.await
            }
        };

        // Client went away mid-response or sent a bad request; nothing to retry.
        if let Err(e) = result {
            tracing::debug!(
                connection_id = %self.guard.id(),
                peer_addr = %self.peer_addr,
                error = %e,
                "Connection closed with error"
            );
        }
    }
}

/// Validate, wait, then answer with a shaped response.
async fn simulate_handler(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let start_time = Instant::now();

    let params = match RequestParameters::from_query(query.as_deref()) {
        Ok(params) => params,
        Err(e) => {
            tracing::debug!(error = %e, "Rejecting request");
            metrics::record_rejection(e.param());
            return (StatusCode::BAD_REQUEST, INVALID_PARAMS_BODY).into_response();
        }
    };

    tracing::info!(
        wait_time = params.wait_millis,
        headers_length = params.header_bytes,
        body_length = params.body_bytes,
        "Request received"
    );

    if params.wait_millis > 0 {
        tokio::time::sleep(Duration::from_millis(params.wait_millis)).await;
    }

    let shaped = shape(&state.pool, &params);

    tracing::debug!(
        status = shaped.status.as_u16(),
        header_passes = shaped.padding.passes,
        header_budget_remaining = shaped.padding.remaining,
        "Response shaped"
    );
    metrics::record_request(shaped.status.as_u16(), start_time);

    shaped.into_response()
}
