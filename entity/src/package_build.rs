/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, DeriveActiveEnum, EnumIter, Deserialize, Serialize)]
#[sea_orm(rs_type = "i16", db_type = "SmallInteger")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageBuildStatus {
    #[sea_orm(num_value = 0)]
    Building,
    #[sea_orm(num_value = 1)]
    Success,
    #[sea_orm(num_value = 2)]
    Failed,
}

impl PackageBuildStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PackageBuildStatus::Building)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "package_build")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub customer: Option<i64>,
    pub project: Option<i64>,
    #[sea_orm(unique)]
    pub build_hash: String,
    /// Serialized list of resolved add-on selections, frozen at intake.
    #[sea_orm(column_type = "Text")]
    pub selected_addons: String,
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::Customer",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::Project",
        to = "super::project::Column::Id"
    )]
    Project,
}

impl ActiveModelBehavior for ActiveModel {}
