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
                    .table(BuildQueue::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BuildQueue::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BuildQueue::Build).big_integer().not_null())
                    .col(
                        ColumnDef::new(BuildQueue::EnqueuedAt)
                            .date_time()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BuildQueue::ClaimedAt).date_time())
                    .col(ColumnDef::new(BuildQueue::FinishedAt).date_time())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-build_queue-build")
                            .from(BuildQueue::Table, BuildQueue::Build)
                            .to(PackageBuild::Table, PackageBuild::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-build_queue-claimed_at")
                    .table(BuildQueue::Table)
                    .col(BuildQueue::ClaimedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BuildQueue::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum BuildQueue {
    Table,
    Id,
    Build,
    EnqueuedAt,
    ClaimedAt,
    FinishedAt,
}

#[derive(DeriveIden)]
enum PackageBuild {
    Table,
    Id,
}
