/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::input::{greater_than_zero, port_in_range};
use clap::Parser;
use entity::*;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Parser, Debug)]
#[command(name = "AddonPack", display_name = "AddonPack", bin_name = "addonpack-server", author = "Wavelens", version, about, long_about = None)]
pub struct Cli {
    #[arg(long, env = "ADDONPACK_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
    #[arg(long, env = "ADDONPACK_LOG_JSON", default_value = "false")]
    pub log_json: bool,
    #[arg(long, env = "ADDONPACK_IP", default_value = "127.0.0.1")]
    pub ip: String,
    #[arg(long, env = "ADDONPACK_PORT", value_parser = port_in_range, default_value_t = 3000)]
    pub port: u16,
    #[arg(long, env = "ADDONPACK_DATABASE_URL")]
    pub database_url: Option<String>,
    #[arg(long, env = "ADDONPACK_DATABASE_URL_FILE")]
    pub database_url_file: Option<String>,
    #[arg(
        long,
        env = "ADDONPACK_STORAGE_PATH",
        default_value = "/tmp/addonpack/packages"
    )]
    pub storage_path: String,
    #[arg(long, env = "ADDONPACK_EXPIRE_DAYS", value_parser = greater_than_zero::<i64>, default_value = "30")]
    pub expire_days: i64,
    #[arg(long, env = "ADDONPACK_MAX_CONCURRENT_BUILDS", value_parser = greater_than_zero::<usize>, default_value = "4")]
    pub max_concurrent_builds: usize,
    #[arg(long, env = "ADDONPACK_COMMAND_TIMEOUT", value_parser = greater_than_zero::<u64>, default_value = "900")]
    pub command_timeout: u64,
    #[arg(long, env = "ADDONPACK_QUEUE_POLL_INTERVAL", value_parser = greater_than_zero::<u64>, default_value = "5")]
    pub queue_poll_interval: u64,
    #[arg(long, env = "ADDONPACK_BINPATH_HELM", default_value = "helm")]
    pub binpath_helm: String,
    #[arg(long, env = "ADDONPACK_BINPATH_DOCKER", default_value = "docker")]
    pub binpath_docker: String,
    #[arg(long, env = "ADDONPACK_REPORT_ERRORS", default_value = "false")]
    pub report_errors: bool,
    #[arg(long, env = "ADDONPACK_SENTRY_DSN")]
    pub sentry_dsn: Option<String>,
}

impl Cli {
    pub fn storage_dir(&self) -> PathBuf {
        PathBuf::from(&self.storage_path)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout)
    }

    pub fn queue_poll_interval(&self) -> Duration {
        Duration::from_secs(self.queue_poll_interval)
    }
}

#[derive(Debug)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub cli: Cli,
    /// Woken after an intake transaction commits a new queue entry.
    pub build_notify: Notify,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BaseResponse<T> {
    pub error: bool,
    pub message: T,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

pub type ECustomer = customer::Entity;
pub type EProject = project::Entity;
pub type EAddon = addon::Entity;
pub type EAddonVersion = addon_version::Entity;
pub type EPackageBuild = package_build::Entity;
pub type EBuildQueue = build_queue::Entity;

pub type MCustomer = customer::Model;
pub type MProject = project::Model;
pub type MAddon = addon::Model;
pub type MAddonVersion = addon_version::Model;
pub type MPackageBuild = package_build::Model;
pub type MBuildQueue = build_queue::Model;

pub type ACustomer = customer::ActiveModel;
pub type AProject = project::ActiveModel;
pub type AAddon = addon::ActiveModel;
pub type AAddonVersion = addon_version::ActiveModel;
pub type APackageBuild = package_build::ActiveModel;
pub type ABuildQueue = build_queue::ActiveModel;

pub type CCustomer = customer::Column;
pub type CProject = project::Column;
pub type CAddon = addon::Column;
pub type CAddonVersion = addon_version::Column;
pub type CPackageBuild = package_build::Column;
pub type CBuildQueue = build_queue::Column;
