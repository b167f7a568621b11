/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod endpoints;
pub mod error;


use addonpack_core::types::ServerState;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/api/packages", get(endpoints::packages::get_packages))
        .route("/api/packages/build", post(endpoints::packages::post_build))
        .route("/api/packages/{id}", get(endpoints::packages::get_package))
        .route(
            "/api/packages/hash/{hash}",
            get(endpoints::packages::get_package_by_hash),
        )
        .route(
            "/api/packages/hash/{hash}/status",
            get(endpoints::packages::get_package_status),
        )
        .route(
            "/api/packages/download/{hash}",
            get(endpoints::packages::get_download),
        )
        .route("/api/health", get(endpoints::get_health))
        .fallback(endpoints::handle_404)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve_web(state: Arc<ServerState>) -> std::io::Result<()> {
    let server_url = format!("{}:{}", state.cli.ip, state.cli.port);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&server_url).await?;
    info!(address = %server_url, "HTTP server listening");
    axum::serve(listener, app).await
}
