/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use addonpack_core::init_state;
use anyhow::{Context, Result};
use std::sync::Arc;

#[tokio::main]
pub async fn main() -> Result<()> {
    let state = init_state().await?;

    builder::start_builder(Arc::clone(&state))
        .await
        .context("Failed to start build scheduler")?;
    web::serve_web(Arc::clone(&state))
        .await
        .context("HTTP server stopped")?;

    Ok(())
}
