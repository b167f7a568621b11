/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod archive;
pub mod generators;
pub mod mirror;
pub mod pipeline;
pub mod scheduler;
pub mod store;

#[cfg(test)]
mod tests;

use addonpack_core::types::ServerState;
use std::sync::Arc;

pub async fn start_builder(state: Arc<ServerState>) -> std::io::Result<()> {
    tokio::spawn(scheduler::schedule_build_loop(Arc::clone(&state)));
    Ok(())
}
