/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::NaiveDateTime;
use entity::package_build::PackageBuildStatus;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;
use std::path::PathBuf;

use super::consts::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use super::error::{PackageError, PackageResult};
use super::selection::{ResolvedAddonSelection, decode_selections};
use super::types::*;

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BuildResponse {
    pub id: i64,
    pub customer_id: Option<i64>,
    pub project_id: Option<i64>,
    pub build_hash: String,
    pub selections: Vec<ResolvedAddonSelection>,
    pub namespace: String,
    pub domain: String,
    pub tls_enabled: bool,
    pub keycloak_enabled: bool,
    pub airgapped: bool,
    pub registry_url: Option<String>,
    pub built_by: Option<String>,
    pub deploy_env: Option<String>,
    pub platform: Option<String>,
    pub status: PackageBuildStatus,
    pub progress: i32,
    pub file_path: Option<String>,
    pub total_size: Option<i64>,
    pub expires_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<MPackageBuild> for BuildResponse {
    type Error = PackageError;

    fn try_from(build: MPackageBuild) -> Result<Self, Self::Error> {
        Ok(Self {
            selections: decode_selections(&build.selected_addons)?,
            id: build.id,
            customer_id: build.customer,
            project_id: build.project,
            build_hash: build.build_hash,
            namespace: build.namespace,
            domain: build.domain,
            tls_enabled: build.tls_enabled,
            keycloak_enabled: build.keycloak_enabled,
            airgapped: build.airgapped,
            registry_url: build.registry_url,
            built_by: build.built_by,
            deploy_env: build.deploy_env,
            platform: build.platform,
            status: build.status,
            progress: build.progress,
            file_path: build.file_path,
            total_size: build.total_size,
            expires_at: build.expires_at,
            created_at: build.created_at,
            updated_at: build.updated_at,
        })
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatusResponse {
    pub status: PackageBuildStatus,
    pub progress: i32,
    pub file_path: Option<String>,
    pub total_size: Option<i64>,
    pub expires_at: NaiveDateTime,
    pub selections: Vec<ResolvedAddonSelection>,
}

impl TryFrom<MPackageBuild> for BuildStatusResponse {
    type Error = PackageError;

    fn try_from(build: MPackageBuild) -> Result<Self, Self::Error> {
        Ok(Self {
            selections: decode_selections(&build.selected_addons)?,
            status: build.status,
            progress: build.progress,
            file_path: build.file_path,
            total_size: build.total_size,
            expires_at: build.expires_at,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildFilter {
    pub customer_id: Option<i64>,
    pub project_id: Option<i64>,
}

pub async fn get_build(db: &DatabaseConnection, id: i64) -> PackageResult<MPackageBuild> {
    EPackageBuild::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| PackageError::NotFound(format!("Build {} not found", id)))
}

pub async fn get_build_by_hash(db: &DatabaseConnection, hash: &str) -> PackageResult<MPackageBuild> {
    EPackageBuild::find()
        .filter(CPackageBuild::BuildHash.eq(hash))
        .one(db)
        .await?
        .ok_or_else(|| PackageError::NotFound(format!("Build {} not found", hash)))
}

/// Newest first. A project filter wins over a customer filter.
pub async fn list_builds(
    db: &DatabaseConnection,
    filter: BuildFilter,
    page: u64,
    size: Option<u64>,
) -> PackageResult<Paginated<MPackageBuild>> {
    let size = size
        .filter(|s| *s > 0)
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .min(MAX_PAGE_SIZE);

    let mut query = EPackageBuild::find();

    if let Some(project_id) = filter.project_id {
        query = query.filter(CPackageBuild::Project.eq(project_id));
    } else if let Some(customer_id) = filter.customer_id {
        query = query.filter(CPackageBuild::Customer.eq(customer_id));
    }

    let paginator = query
        .order_by_desc(CPackageBuild::CreatedAt)
        .order_by_desc(CPackageBuild::Id)
        .paginate(db, size);

    let totals = paginator.num_items_and_pages().await?;
    let items = paginator.fetch_page(page).await?;

    Ok(Paginated {
        items,
        page,
        size,
        total_items: totals.number_of_items,
        total_pages: totals.number_of_pages,
    })
}

/// Returns the archive of a finished build. Unfinished builds are `NotReady`,
/// a vanished file is `NotFound`.
pub async fn get_build_file(
    db: &DatabaseConnection,
    hash: &str,
) -> PackageResult<(MPackageBuild, PathBuf)> {
    let build = get_build_by_hash(db, hash).await?;

    let path = match (&build.status, &build.file_path) {
        (PackageBuildStatus::Success, Some(path)) => PathBuf::from(path),
        _ => {
            return Err(PackageError::NotReady(
                "Build has not finished or has no artifact".to_string(),
            ));
        }
    };

    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Err(PackageError::NotFound(format!(
            "Artifact for build {} no longer exists",
            hash
        )));
    }

    Ok((build, path))
}
