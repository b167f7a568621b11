/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

#![allow(dead_code)]

use addonpack_core::types::*;
use chrono::NaiveDate;
use clap::Parser;
use entity::package_build::PackageBuildStatus;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use std::sync::Arc;
use tokio::sync::Notify;

pub fn create_mock_cli() -> Cli {
    Cli::parse_from([
        "addonpack-server",
        "--database-url",
        "mock://test",
        "--storage-path",
        "/tmp/addonpack-test",
    ])
}

pub fn create_mock_state(db: DatabaseConnection) -> Arc<ServerState> {
    Arc::new(ServerState {
        db,
        cli: create_mock_cli(),
        build_notify: Notify::new(),
    })
}

pub fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

pub fn timestamp() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 12)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

pub fn customer(id: i64) -> MCustomer {
    MCustomer {
        id,
        name: "Acme".to_string(),
        created_at: timestamp(),
    }
}

pub fn addon(id: i64, name: &str, install_order: i32, sso_capable: bool) -> MAddon {
    MAddon {
        id,
        name: name.to_string(),
        display_name: name.to_uppercase(),
        category: "SECURITY".to_string(),
        helm_repo_url: Some(format!("https://charts.example.org/{}", name)),
        helm_chart_name: Some(name.to_string()),
        upstream_images: Some(format!(r#"["quay.io/{0}/{0}", "busybox"]"#, name)),
        sso_capable,
        install_order,
        is_active: true,
        created_at: timestamp(),
    }
}

pub fn addon_version(id: i64, addon: i64, version: &str, is_latest: bool) -> MAddonVersion {
    MAddonVersion {
        id,
        addon,
        version: version.to_string(),
        helm_chart_version: Some(format!("{}-chart", version)),
        image_tags: Some(r#"["v1"]"#.to_string()),
        is_latest,
        created_at: timestamp(),
    }
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
        tls_enabled: false,
        keycloak_enabled: false,
        airgapped: false,
        registry_url: None,
        built_by: Some("ops".to_string()),
        deploy_env: None,
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

pub fn queue_job(id: i64, build: i64) -> MBuildQueue {
    MBuildQueue {
        id,
        build,
        enqueued_at: timestamp(),
        claimed_at: None,
        finished_at: None,
    }
}
