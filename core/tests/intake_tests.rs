/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

mod common;

use addonpack_core::error::PackageError;
use addonpack_core::intake::*;
use addonpack_core::types::*;
use common::*;
use entity::package_build::PackageBuildStatus;
use sea_orm::{DatabaseBackend, MockDatabase};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn request(addons: Vec<AddonSelectionRequest>) -> BuildRequest {
    BuildRequest {
        customer_id: Some(1),
        namespace: Some("team-a".to_string()),
        domain: Some("apps.corp.io".to_string()),
        tls_enabled: true,
        addons,
        ..Default::default()
    }
}

fn selection(addon_id: i64, version: Option<&str>) -> AddonSelectionRequest {
    AddonSelectionRequest {
        addon_id,
        version: version.map(str::to_string),
        helm_chart_version: None,
    }
}

#[tokio::test]
async fn test_empty_selection_is_rejected() {
    let state = create_mock_state(empty_db());

    let err = start_build(Arc::clone(&state), request(vec![]))
        .await
        .unwrap_err();

    assert!(matches!(err, PackageError::Validation(_)));
}

#[tokio::test]
async fn test_shell_metacharacters_in_domain_are_rejected() {
    let state = create_mock_state(empty_db());
    let mut request = request(vec![selection(1, None)]);
    request.domain = Some("$(touch${IFS}/tmp/x)`id`".to_string());

    let err = start_build(Arc::clone(&state), request).await.unwrap_err();
    assert!(matches!(err, PackageError::Validation(_)));

    let state = Arc::try_unwrap(state).unwrap();
    assert!(state.db.into_transaction_log().is_empty());
}

#[tokio::test]
async fn test_malformed_registry_is_rejected() {
    let state = create_mock_state(empty_db());
    let mut request = request(vec![selection(1, None)]);
    request.airgapped = true;
    request.registry_url = Some("registry.corp.io && reboot".to_string());

    let err = start_build(Arc::clone(&state), request).await.unwrap_err();
    assert!(matches!(err, PackageError::Validation(_)));
}

#[tokio::test]
async fn test_unknown_customer_is_rejected_before_insert() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<MCustomer>::new()])
        .into_connection();
    let state = create_mock_state(db);

    let err = start_build(Arc::clone(&state), request(vec![selection(1, None)]))
        .await
        .unwrap_err();

    assert!(matches!(err, PackageError::NotFound(_)));

    let state = Arc::try_unwrap(state).unwrap();
    let log = format!("{:?}", state.db.into_transaction_log());
    assert!(!log.contains("INSERT"));
}

#[tokio::test]
async fn test_unknown_addon_is_rejected() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![customer(1)]])
        .append_query_results([Vec::<MAddon>::new()])
        .into_connection();
    let state = create_mock_state(db);

    let err = start_build(state, request(vec![selection(42, None)]))
        .await
        .unwrap_err();

    match err {
        PackageError::NotFound(msg) => assert!(msg.contains("42")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_start_build_persists_and_enqueues() {
    let stored = package_build(11, "0123456789abcdef", PackageBuildStatus::Building);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![customer(1)]])
        .append_query_results([vec![addon(5, "cert-manager", 10, false)]])
        .append_query_results([vec![addon_version(8, 5, "1.14.4", true)]])
        .append_query_results([vec![stored.clone()]])
        .append_query_results([vec![queue_job(1, 11)]])
        .into_connection();
    let state = create_mock_state(db);

    let build = start_build(Arc::clone(&state), request(vec![selection(5, None)]))
        .await
        .unwrap();

    assert_eq!(build, stored);

    let woken = tokio::time::timeout(
        Duration::from_millis(200),
        state.build_notify.notified(),
    )
    .await;
    assert!(woken.is_ok(), "consumer was not notified after commit");

    let state = Arc::try_unwrap(state).unwrap();
    let log = format!("{:?}", state.db.into_transaction_log());
    assert!(log.contains("package_build"));
    assert!(log.contains("build_queue"));
    assert!(log.contains("team-a"));
    assert!(log.contains("apps.corp.io"));
    assert!(log.contains("1.14.4"));
}

#[tokio::test]
async fn test_resolve_falls_back_to_literal_version() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![addon(5, "harbor", 30, true)]])
        .append_query_results([Vec::<MAddonVersion>::new()])
        .into_connection();

    let resolved = resolve_selections(
        &db,
        &[AddonSelectionRequest {
            addon_id: 5,
            version: Some("2.11.0".to_string()),
            helm_chart_version: Some("1.15.0".to_string()),
        }],
    )
    .await
    .unwrap();

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].name, "harbor");
    assert_eq!(resolved[0].version.as_deref(), Some("2.11.0"));
    assert_eq!(resolved[0].helm_chart_version.as_deref(), Some("1.15.0"));
    assert_eq!(resolved[0].image_tags, None);
}

#[test]
fn test_build_hashes_are_unique() {
    let hashes: HashSet<String> = (0..200)
        .map(|_| generate_build_hash(Some(1), Some(2)))
        .collect();

    assert_eq!(hashes.len(), 200);
    for hash in &hashes {
        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

#[test]
fn test_build_request_deserialization_defaults() {
    let request: BuildRequest =
        serde_json::from_str(r#"{"addons":[{"addonId":3,"version":"1.0.0"}]}"#).unwrap();

    assert_eq!(request.addons.len(), 1);
    assert_eq!(request.addons[0].addon_id, 3);
    assert_eq!(request.addons[0].helm_chart_version, None);
    assert!(!request.tls_enabled);
    assert!(!request.keycloak_enabled);
    assert!(!request.airgapped);
    assert_eq!(request.customer_id, None);
}
