/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

#![allow(dead_code)]

use addonpack_core::types::*;
use axum::body::Body;
use axum::http::{Request, Response};
use chrono::NaiveDate;
use clap::Parser;
use entity::package_build::PackageBuildStatus;
use http_body_util::BodyExt;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use std::sync::Arc;
use tokio::sync::Notify;
use tower::ServiceExt;

pub fn create_mock_state(db: DatabaseConnection) -> Arc<ServerState> {
    let cli = Cli::parse_from([
        "addonpack-server",
        "--database-url",
        "mock://test",
        "--storage-path",
        "/tmp/addonpack-web-test",
    ]);

    Arc::new(ServerState {
        db,
        cli,
        build_notify: Notify::new(),
    })
}

pub fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

pub fn timestamp() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 2)
        .unwrap()
        .and_hms_opt(14, 0, 0)
        .unwrap()
}

pub fn package_build(id: i64, hash: &str, status: PackageBuildStatus) -> MPackageBuild {
    MPackageBuild {
        id,
        customer: Some(1),
        project: None,
        build_hash: hash.to_string(),
        selected_addons: "[]".to_string(),
        namespace: "devops".to_string(),
        domain: "example.com".to_string(),
        tls_enabled: true,
        keycloak_enabled: false,
        airgapped: false,
        registry_url: None,
        built_by: Some("ops".to_string()),
        deploy_env: Some("staging".to_string()),
        platform: None,
        status,
        progress: 0,
        file_path: None,
        total_size: None,
        expires_at: timestamp(),
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

/// Sends one request through the router and returns the response with its
/// collected body.
pub async fn send(state: Arc<ServerState>, request: Request<Body>) -> (Response<()>, Vec<u8>) {
    let response = web::create_router(state).oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = body.collect().await.unwrap().to_bytes().to_vec();
    (Response::from_parts(parts, ()), bytes)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn json(bytes: &[u8]) -> serde_json::Value {
    serde_json::from_slice(bytes).unwrap()
}
