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
                    .table(AddonVersion::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AddonVersion::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AddonVersion::Addon).big_integer().not_null())
                    .col(ColumnDef::new(AddonVersion::Version).string().not_null())
                    .col(ColumnDef::new(AddonVersion::HelmChartVersion).string())
                    .col(ColumnDef::new(AddonVersion::ImageTags).text())
                    .col(
                        ColumnDef::new(AddonVersion::IsLatest)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(AddonVersion::CreatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-addon_version-addon")
                            .from(AddonVersion::Table, AddonVersion::Addon)
                            .to(Addon::Table, Addon::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-addon_version-addon-version")
                    .table(AddonVersion::Table)
                    .col(AddonVersion::Addon)
                    .col(AddonVersion::Version)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AddonVersion::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AddonVersion {
    Table,
    Id,
    Addon,
    Version,
    HelmChartVersion,
    ImageTags,
    IsLatest,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Addon {
    Table,
    Id,
}
