//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, metrics)
//! - Serve on a listener until shutdown is signalled

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, MatchedPath, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::config::ServiceConfig;
use crate::http::handlers;
use crate::http::request::{UuidRequestId, X_REQUEST_ID};
use crate::observability::metrics;
use crate::pooling::SharedEngine;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: SharedEngine,
}

/// HTTP server for the car pooling service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    engine: SharedEngine,
}

impl HttpServer {
    /// Create a server around a fresh, empty engine.
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_engine(config, SharedEngine::new())
    }

    /// Create a server around an existing engine handle.
    pub fn with_engine(config: ServiceConfig, engine: SharedEngine) -> Self {
        let state = AppState {
            engine: engine.clone(),
        };
        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            engine,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let mut routes = Router::new()
            .route("/status", get(handlers::status))
            .route("/cars", put(handlers::put_cars))
            .route("/journey", post(handlers::post_journey))
            .route("/dropoff", post(handlers::post_dropoff))
            .route("/locate", post(handlers::post_locate));

        if config.admin.enabled {
            routes = routes.merge(admin::router());
        }

        routes
            .route_layer(middleware::from_fn(track_metrics))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.limits.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), UuidRequestId))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        let request_id = request
                            .headers()
                            .get(&X_REQUEST_ID)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("unknown");
                        tracing::info_span!(
                            "request",
                            request_id = %request_id,
                            method = %request.method(),
                            path = %request.uri().path(),
                        )
                    }))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone())),
            )
    }

    /// The fully layered router, for driving the service in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Handle to the engine behind this server.
    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, admin = self.config.admin.enabled, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());

    let response = next.run(request).await;
    metrics::record_request(endpoint, response.status().as_u16(), start);
    response
}
