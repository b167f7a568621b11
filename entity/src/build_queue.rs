/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "build_queue")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub build: i64,
    pub enqueued_at: NaiveDateTime,
    pub claimed_at: Option<NaiveDateTime>,
    pub finished_at: Option<NaiveDateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::package_build::Entity",
        from = "Column::Build",
        to = "super::package_build::Column::Id"
    )]
    Build,
}

impl ActiveModelBehavior for ActiveModel {}
