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
                    .table(PackageBuild::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PackageBuild::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PackageBuild::Customer).big_integer())
                    .col(ColumnDef::new(PackageBuild::Project).big_integer())
                    .col(
                        ColumnDef::new(PackageBuild::BuildHash)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(PackageBuild::SelectedAddons)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PackageBuild::Namespace).string().not_null())
                    .col(ColumnDef::new(PackageBuild::Domain).string().not_null())
                    .col(ColumnDef::new(PackageBuild::TlsEnabled).boolean().not_null())
                    .col(
                        ColumnDef::new(PackageBuild::KeycloakEnabled)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PackageBuild::Airgapped).boolean().not_null())
                    .col(ColumnDef::new(PackageBuild::RegistryUrl).string())
                    .col(ColumnDef::new(PackageBuild::BuiltBy).string())
                    .col(ColumnDef::new(PackageBuild::DeployEnv).string())
                    .col(ColumnDef::new(PackageBuild::Platform).string())
                    .col(
                        ColumnDef::new(PackageBuild::Status)
                            .small_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PackageBuild::Progress)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(PackageBuild::FilePath).string_len(500))
                    .col(ColumnDef::new(PackageBuild::TotalSize).big_integer())
                    .col(ColumnDef::new(PackageBuild::ExpiresAt).date_time().not_null())
                    .col(ColumnDef::new(PackageBuild::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(PackageBuild::UpdatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-package_build-customer")
                            .from(PackageBuild::Table, PackageBuild::Customer)
                            .to(Customer::Table, Customer::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-package_build-project")
                            .from(PackageBuild::Table, PackageBuild::Project)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PackageBuild::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PackageBuild {
    Table,
    Id,
    Customer,
    Project,
    BuildHash,
    SelectedAddons,
    Namespace,
    Domain,
    TlsEnabled,
    KeycloakEnabled,
    Airgapped,
    RegistryUrl,
    BuiltBy,
    DeployEnv,
    Platform,
    Status,
    Progress,
    FilePath,
    TotalSize,
    ExpiresAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Customer {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Project {
    Table,
    Id,
}
