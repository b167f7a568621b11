/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use addonpack_core::executer::{CommandRunner, ProcessRunner};
use addonpack_core::queue;
use addonpack_core::types::*;
use anyhow::{Context, Result};
use entity::package_build::PackageBuildStatus;
use sea_orm::EntityTrait;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use super::pipeline::{BuildPlan, BuildStore, PipelineConfig, run_build};
use super::store::DatabaseBuildStore;

/// Handles shared by every job the consumer spawns.
#[derive(Clone)]
pub struct BuildWorker {
    pub state: Arc<ServerState>,
    pub store: Arc<dyn BuildStore>,
    pub runner: Arc<dyn CommandRunner>,
    pub config: Arc<PipelineConfig>,
}

impl BuildWorker {
    pub fn from_state(state: Arc<ServerState>) -> Self {
        Self {
            config: Arc::new(PipelineConfig::from_cli(&state.cli)),
            store: Arc::new(DatabaseBuildStore::new(Arc::clone(&state))),
            runner: Arc::new(ProcessRunner),
            state,
        }
    }
}

pub async fn schedule_build_loop(state: Arc<ServerState>) {
    let _guard = match (state.cli.report_errors, &state.cli.sentry_dsn) {
        (true, Some(dsn)) => Some(sentry::init(dsn.as_str())),
        (true, None) => {
            warn!("Error reporting enabled without a sentry DSN");
            None
        }
        _ => None,
    };

    let worker = BuildWorker::from_state(Arc::clone(&state));
    let semaphore = Arc::new(Semaphore::new(state.cli.max_concurrent_builds));
    let mut interval = time::interval(state.cli.queue_poll_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        max_concurrent_builds = state.cli.max_concurrent_builds,
        "Build scheduler loop started"
    );

    loop {
        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                error!(error = %e, "Build semaphore closed, stopping scheduler");
                return;
            }
        };

        match queue::claim_next(&worker.state.db).await {
            Ok(Some(job)) => {
                debug!(job_id = job.id, build_id = job.build, "Claimed build from queue");
                tokio::spawn(execute_job(worker.clone(), job, permit));
                continue;
            }
            Ok(None) => {}
            Err(e) => error!(error = %e, "Failed to claim build from queue"),
        }

        drop(permit);

        tokio::select! {
            _ = state.build_notify.notified() => debug!("Woken by new build"),
            _ = interval.tick() => {}
        }
    }
}

/// Runs one claimed job. The queue entry is closed only once the build has a
/// stored terminal state or needs no run; otherwise it stays claimed and
/// startup recovery runs it again.
#[instrument(skip_all, fields(job_id = job.id, build_id = job.build))]
pub async fn execute_job(worker: BuildWorker, job: MBuildQueue, _permit: OwnedSemaphorePermit) {
    match run_job(&worker, &job).await {
        Ok(Some(PackageBuildStatus::Failed)) => {
            sentry::capture_message(
                &format!("Package build {} failed", job.build),
                sentry::Level::Error,
            );
        }
        Ok(_) => {}
        Err(e) => {
            let message = format!("{:#}", e);
            error!(error = %message, "Build job failed, leaving queue entry open");
            sentry::capture_message(&message, sentry::Level::Error);
            return;
        }
    }

    if let Err(e) = queue::finish(&worker.state.db, job.id).await {
        error!(error = %e, "Failed to close queue entry");
    }
}

/// Returns the terminal status the job produced, or `None` when there was
/// nothing to run.
pub async fn run_job(worker: &BuildWorker, job: &MBuildQueue) -> Result<Option<PackageBuildStatus>> {
    let Some(build) = EPackageBuild::find_by_id(job.build)
        .one(&worker.state.db)
        .await
        .with_context(|| format!("Failed to load build {}", job.build))?
    else {
        warn!("Build record missing, dropping job");
        return Ok(None);
    };

    if build.status.is_terminal() {
        info!(status = ?build.status, "Build already finished, skipping");
        return Ok(None);
    }

    let plan = match BuildPlan::try_from(&build) {
        Ok(plan) => plan,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Unusable build snapshot");
            worker.store.mark_failed(build.id).await?;
            return Ok(Some(PackageBuildStatus::Failed));
        }
    };

    let status = run_build(
        worker.store.as_ref(),
        worker.runner.as_ref(),
        &worker.config,
        &plan,
    )
    .await?;

    Ok(Some(status))
}
