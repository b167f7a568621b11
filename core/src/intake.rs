/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::{Duration, Utc};
use entity::package_build::PackageBuildStatus;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::error::{PackageError, PackageResult};
use super::input::{
    is_valid_domain, is_valid_registry, sanitize_domain, sanitize_namespace, vec_to_hex,
};
use super::queue;
use super::selection::{ResolvedAddonSelection, encode_selections};
use super::types::*;

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    pub customer_id: Option<i64>,
    pub project_id: Option<i64>,
    #[serde(default)]
    pub addons: Vec<AddonSelectionRequest>,
    pub namespace: Option<String>,
    pub domain: Option<String>,
    #[serde(default)]
    pub tls_enabled: bool,
    #[serde(default)]
    pub keycloak_enabled: bool,
    #[serde(default)]
    pub airgapped: bool,
    pub registry_url: Option<String>,
    pub built_by: Option<String>,
    pub deploy_env: Option<String>,
    pub platform: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AddonSelectionRequest {
    pub addon_id: i64,
    pub version: Option<String>,
    pub helm_chart_version: Option<String>,
}

/// Validates the request, snapshots the selected add-ons and persists a new
/// build together with its queue entry in one transaction. The consumer is
/// woken only after the commit.
#[instrument(skip(state, request), fields(addons = request.addons.len()))]
pub async fn start_build(
    state: Arc<ServerState>,
    request: BuildRequest,
) -> PackageResult<MPackageBuild> {
    if request.addons.is_empty() {
        return Err(PackageError::Validation(
            "At least one add-on must be selected".to_string(),
        ));
    }

    let domain = sanitize_domain(request.domain.as_deref());
    if !is_valid_domain(&domain) {
        return Err(PackageError::Validation(format!(
            "Invalid domain {:?}: only letters, digits, '.' and '-' are allowed",
            domain
        )));
    }

    let registry_url = request
        .registry_url
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());
    if let Some(registry) = registry_url.as_deref().filter(|r| !is_valid_registry(r)) {
        return Err(PackageError::Validation(format!(
            "Invalid registry URL {:?}",
            registry
        )));
    }

    let txn = state.db.begin().await?;

    if let Some(customer_id) = request.customer_id {
        ECustomer::find_by_id(customer_id)
            .one(&txn)
            .await?
            .ok_or_else(|| PackageError::NotFound(format!("Customer {} not found", customer_id)))?;
    }

    if let Some(project_id) = request.project_id {
        EProject::find_by_id(project_id)
            .one(&txn)
            .await?
            .ok_or_else(|| PackageError::NotFound(format!("Project {} not found", project_id)))?;
    }

    let selections = resolve_selections(&txn, &request.addons).await?;
    let now = Utc::now().naive_utc();

    let abuild = APackageBuild {
        id: NotSet,
        customer: Set(request.customer_id),
        project: Set(request.project_id),
        build_hash: Set(generate_build_hash(request.customer_id, request.project_id)),
        selected_addons: Set(encode_selections(&selections)?),
        namespace: Set(sanitize_namespace(request.namespace.as_deref())),
        domain: Set(domain),
        tls_enabled: Set(request.tls_enabled),
        keycloak_enabled: Set(request.keycloak_enabled),
        airgapped: Set(request.airgapped),
        registry_url: Set(registry_url),
        built_by: Set(request.built_by),
        deploy_env: Set(request.deploy_env),
        platform: Set(request.platform),
        status: Set(PackageBuildStatus::Building),
        progress: Set(0),
        file_path: Set(None),
        total_size: Set(None),
        expires_at: Set(now + Duration::days(state.cli.expire_days)),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let build = abuild.insert(&txn).await?;
    queue::enqueue(&txn, build.id).await?;
    txn.commit().await?;

    state.build_notify.notify_one();

    info!(
        build_id = build.id,
        build_hash = %build.build_hash,
        airgapped = build.airgapped,
        "Package build queued"
    );

    Ok(build)
}

/// Looks up every selected add-on and the version row it refers to. A missing
/// version row is not an error; the selection keeps its literal values.
pub async fn resolve_selections<C: ConnectionTrait>(
    db: &C,
    requested: &[AddonSelectionRequest],
) -> PackageResult<Vec<ResolvedAddonSelection>> {
    let mut resolved = Vec::with_capacity(requested.len());

    for selection in requested {
        let addon = EAddon::find_by_id(selection.addon_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                PackageError::NotFound(format!("Add-on {} not found", selection.addon_id))
            })?;

        let requested_version = selection
            .version
            .as_deref()
            .filter(|v| !v.trim().is_empty());

        let version_row = match requested_version {
            Some(version) => {
                EAddonVersion::find()
                    .filter(CAddonVersion::Addon.eq(addon.id))
                    .filter(CAddonVersion::Version.eq(version))
                    .one(db)
                    .await?
            }
            None => {
                EAddonVersion::find()
                    .filter(CAddonVersion::Addon.eq(addon.id))
                    .filter(CAddonVersion::IsLatest.eq(true))
                    .one(db)
                    .await?
            }
        };

        resolved.push(ResolvedAddonSelection::resolve(
            &addon,
            version_row.as_ref(),
            requested_version,
            selection.helm_chart_version.as_deref(),
        ));
    }

    Ok(resolved)
}

/// 16 hex characters derived from the owners, the current time and a random
/// value. Identical requests never share a hash.
pub fn generate_build_hash(customer_id: Option<i64>, project_id: Option<i64>) -> String {
    let seed = format!(
        "{}-{}-{}-{}",
        format_id(customer_id),
        format_id(project_id),
        Utc::now().timestamp_millis(),
        Uuid::new_v4()
    );

    let digest = Sha256::digest(seed.as_bytes());
    vec_to_hex(&digest[..8])
}

fn format_id(id: Option<i64>) -> String {
    id.map(|id| id.to_string())
        .unwrap_or_else(|| "null".to_string())
}
