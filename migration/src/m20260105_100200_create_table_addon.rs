/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Addon::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Addon::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Addon::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Addon::DisplayName).string().not_null())
                    .col(ColumnDef::new(Addon::Category).string().not_null())
                    .col(ColumnDef::new(Addon::HelmRepoUrl).string())
                    .col(ColumnDef::new(Addon::HelmChartName).string())
                    .col(ColumnDef::new(Addon::UpstreamImages).text())
                    .col(
                        ColumnDef::new(Addon::SsoCapable)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Addon::InstallOrder)
                            .integer()
                            .not_null()
                            .default(50),
                    )
                    .col(
                        ColumnDef::new(Addon::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Addon::CreatedAt).date_time().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Addon::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Addon {
    Table,
    Id,
    Name,
    DisplayName,
    Category,
    HelmRepoUrl,
    HelmChartName,
    UpstreamImages,
    SsoCapable,
    InstallOrder,
    IsActive,
    CreatedAt,
}
