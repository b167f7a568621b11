/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use addonpack_core::types::*;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use entity::package_build::PackageBuildStatus;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use std::sync::Arc;
use tracing::debug;

use super::pipeline::{BuildStore, progress};

/// `BuildStore` over the `package_build` table. Every write is conditional on
/// the build still being `Building`, so a terminal state is written once.
#[derive(Debug, Clone)]
pub struct DatabaseBuildStore {
    state: Arc<ServerState>,
}

impl DatabaseBuildStore {
    pub fn new(state: Arc<ServerState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl BuildStore for DatabaseBuildStore {
    async fn set_progress(&self, build_id: i64, progress: i32) -> Result<()> {
        let result = EPackageBuild::update_many()
            .col_expr(CPackageBuild::Progress, Expr::value(progress))
            .col_expr(CPackageBuild::UpdatedAt, Expr::value(Utc::now().naive_utc()))
            .filter(CPackageBuild::Id.eq(build_id))
            .filter(CPackageBuild::Status.eq(PackageBuildStatus::Building))
            .filter(CPackageBuild::Progress.lt(progress))
            .exec(&self.state.db)
            .await
            .with_context(|| format!("Failed to update progress of build {}", build_id))?;

        if result.rows_affected == 0 {
            debug!(build_id, progress, "Progress unchanged");
        }

        Ok(())
    }

    async fn mark_success(&self, build_id: i64, file_path: &str, total_size: i64) -> Result<()> {
        let result = EPackageBuild::update_many()
            .col_expr(CPackageBuild::Status, Expr::value(PackageBuildStatus::Success))
            .col_expr(CPackageBuild::Progress, Expr::value(progress::DONE))
            .col_expr(CPackageBuild::FilePath, Expr::value(file_path))
            .col_expr(CPackageBuild::TotalSize, Expr::value(total_size))
            .col_expr(CPackageBuild::UpdatedAt, Expr::value(Utc::now().naive_utc()))
            .filter(CPackageBuild::Id.eq(build_id))
            .filter(CPackageBuild::Status.eq(PackageBuildStatus::Building))
            .exec(&self.state.db)
            .await
            .with_context(|| format!("Failed to mark build {} successful", build_id))?;

        if result.rows_affected == 0 {
            debug!(build_id, "Build already terminal, success not recorded");
        }

        Ok(())
    }

    async fn mark_failed(&self, build_id: i64) -> Result<()> {
        let result = EPackageBuild::update_many()
            .col_expr(CPackageBuild::Status, Expr::value(PackageBuildStatus::Failed))
            .col_expr(CPackageBuild::Progress, Expr::value(progress::FAILED))
            .col_expr(CPackageBuild::UpdatedAt, Expr::value(Utc::now().naive_utc()))
            .filter(CPackageBuild::Id.eq(build_id))
            .filter(CPackageBuild::Status.eq(PackageBuildStatus::Building))
            .exec(&self.state.db)
            .await
            .with_context(|| format!("Failed to mark build {} failed", build_id))?;

        if result.rows_affected == 0 {
            debug!(build_id, "Build already terminal, failure not recorded");
        }

        Ok(())
    }
}
