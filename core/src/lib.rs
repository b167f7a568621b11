/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod consts;
pub mod database;
pub mod error;
pub mod executer;
pub mod input;
pub mod intake;
pub mod queue;
pub mod records;
pub mod selection;
pub mod types;

use anyhow::{Context, Result};
use clap::Parser;
use database::connect_db;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::info;
use tracing_subscriber::EnvFilter;
use types::*;

pub fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_str()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if cli.log_json {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };

    if let Err(e) = result {
        eprintln!("Logging already initialised: {}", e);
    }
}

pub async fn init_state() -> Result<Arc<ServerState>> {
    let cli = Cli::parse();
    init_logging(&cli);

    info!(ip = %cli.ip, port = cli.port, "Starting AddonPack Server");

    let db = connect_db(&cli)
        .await
        .context("Failed to initialise database")?;

    Ok(Arc::new(ServerState {
        db,
        cli,
        build_notify: Notify::new(),
    }))
}
