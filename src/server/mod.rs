//! HTTP server for the issues API.
//!
//! # Endpoints
//!
//! - `GET /api/issues/` - every issue
//! - `GET /api/issues/{project}` - filtered list
//! - `POST /api/issues/{project}` - create
//! - `PUT /api/issues/{project}` - partial update by `_id`
//! - `DELETE /api/issues/{project}` - delete by `_id`

pub mod extract;
pub mod handlers;
pub mod response;

use anyhow::Context;
use axum::Router;
use axum::routing::get;
use issues_lib::IssueService;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: IssueService,
}

impl AppState {
    #[must_use]
    pub fn new(service: IssueService) -> Self {
        Self { service }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/issues", get(handlers::list_all))
        .route("/api/issues/", get(handlers::list_all))
        .route(
            "/api/issues/:project",
            get(handlers::list_issues)
                .post(handlers::create_issue)
                .put(handlers::update_issue)
                .delete(handlers::delete_issue),
        )
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(config: &ServerConfig, service: IssueService) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router(AppState::new(service)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
