/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub use sea_orm_migration::prelude::*;

mod m20260105_100000_create_table_customer;
mod m20260105_100100_create_table_project;
mod m20260105_100200_create_table_addon;
mod m20260105_100300_create_table_addon_version;
mod m20260112_090000_create_table_package_build;
mod m20260112_090100_create_table_build_queue;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260105_100000_create_table_customer::Migration),
            Box::new(m20260105_100100_create_table_project::Migration),
            Box::new(m20260105_100200_create_table_addon::Migration),
            Box::new(m20260105_100300_create_table_addon_version::Migration),
            Box::new(m20260112_090000_create_table_package_build::Migration),
            Box::new(m20260112_090100_create_table_build_queue::Migration),
        ]
    }
}
