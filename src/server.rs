// ABOUTME: Router assembly and HTTP serving
// ABOUTME: Merges all API domains and applies trace, CORS, and request-id layers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! HTTP server assembly
//!
//! Builds the complete router from the per-domain route modules and serves
//! it with graceful shutdown on SIGINT.

use std::sync::Arc;

use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::errors::AppResult;
use crate::resources::ServerResources;
use crate::routes::{
    AdminRoutes, AuditRoutes, AuthRoutes, HealthRoutes, KnowledgeBaseRoutes, TicketRoutes,
};

/// Build the complete application router
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    async fn not_found_handler() -> (axum::http::StatusCode, Json<serde_json::Value>) {
        (
            axum::http::StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "message": "Route not found" })),
        )
    }

    Router::new()
        .merge(HealthRoutes::routes())
        .merge(AuthRoutes::routes(resources.clone()))
        .merge(TicketRoutes::routes(resources.clone()))
        .merge(KnowledgeBaseRoutes::routes(resources.clone()))
        .merge(AuditRoutes::routes(resources.clone()))
        .merge(AdminRoutes::routes(resources))
        .fallback(not_found_handler)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
}

/// Serve the API until SIGINT
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve(resources: Arc<ServerResources>, port: u16) -> AppResult<()> {
    let app = router(resources);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|e| crate::errors::AppError::internal(format!("Failed to bind port {port}: {e}")))?;

    info!("Helpdesk API listening on port {port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| crate::errors::AppError::internal(format!("Server error: {e}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install shutdown handler: {error}");
        return;
    }
    info!("Shutdown signal received");
}
