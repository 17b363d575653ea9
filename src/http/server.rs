//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with both endpoints
//! - Wire up middleware, outermost first:
//!   request boundary → panic catcher → timeout → routes
//! - Attach the metrics layer to each route at startup
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{error_handling::HandleErrorLayer, middleware, routing::get, BoxError, Router};
use tokio::net::TcpListener;
use tower::{timeout::error::Elapsed, timeout::TimeoutLayer, ServiceBuilder};
use tower_http::catch_panic::CatchPanicLayer;

use crate::config::{ServiceConfig, WorkConfig};
use crate::http::handlers::{hello, validate_work_request, work, HELLO_ROUTE, WORK_ROUTE};
use crate::http::middleware::{request_boundary, MetricsLayer};
use crate::http::response::ApiError;
use crate::lifecycle::Shutdown;
use crate::work::WorkService;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub work: Arc<WorkService>,
    pub work_limits: WorkConfig,
}

/// HTTP server for the service.
pub struct HttpServer {
    router: Router,
    shutdown: Shutdown,
}

impl HttpServer {
    /// Create a new HTTP server. Triggering `shutdown` stops the listener
    /// and interrupts in-flight work.
    pub fn new(config: ServiceConfig, shutdown: Shutdown) -> Self {
        let state = AppState {
            work: Arc::new(WorkService::new(shutdown.clone())),
            work_limits: config.work,
        };

        Self {
            router: Self::build_router(&config, state),
            shutdown,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let work_route = get(work)
            .layer(MetricsLayer::new(WORK_ROUTE))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                validate_work_request,
            ));

        Router::new()
            .route(HELLO_ROUTE, get(hello).layer(MetricsLayer::new(HELLO_ROUTE)))
            .route(WORK_ROUTE, work_route)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(HandleErrorLayer::new(handle_timeout))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
            .layer(CatchPanicLayer::new())
            .layer(middleware::from_fn(request_boundary))
    }

    /// A clone of the fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let shutdown = self.shutdown.clone();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// The timeout drops the in-flight handler; the caller gets a generic 500.
async fn handle_timeout(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        tracing::warn!("Request timed out");
        ApiError::Internal("request timed out".to_string())
    } else {
        tracing::error!(error = %err, "Unhandled middleware error");
        ApiError::Internal("internal error".to_string())
    }
}
