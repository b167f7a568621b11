/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use addonpack_core::executer::CommandRunner;
use addonpack_core::selection::{ResolvedAddonSelection, decode_selections};
use addonpack_core::types::{Cli, MPackageBuild};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use entity::package_build::PackageBuildStatus;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, instrument, warn};

use super::archive::create_archive;
use super::generators::GeneratedFile;
use super::generators::deploy::render_deploy_script;
use super::generators::keycloak::render_keycloak_script;
use super::generators::manifest::render_image_list;
use super::generators::readme::{render_install_wrapper, render_readme};
use super::generators::values::render_values;
use super::mirror;

pub mod progress {
    pub const WORK_DIR: i32 = 5;
    pub const DEPLOY_SCRIPT: i32 = 15;
    pub const VALUES: i32 = 25;
    pub const IMAGE_LIST: i32 = 30;
    pub const KEYCLOAK_SCRIPT: i32 = 35;
    pub const CHARTS: i32 = 55;
    pub const IMAGES: i32 = 80;
    pub const MIRROR_DONE: i32 = 82;
    pub const INSTALL_WRAPPER: i32 = 85;
    pub const README: i32 = 88;
    pub const ARCHIVE: i32 = 95;
    pub const DONE: i32 = 100;
    pub const FAILED: i32 = -1;
}

/// Where the pipeline records progress and the terminal state of a build.
#[async_trait]
pub trait BuildStore: Send + Sync {
    /// Raises the stored progress; lower values are ignored.
    async fn set_progress(&self, build_id: i64, progress: i32) -> Result<()>;
    async fn mark_success(&self, build_id: i64, file_path: &str, total_size: i64) -> Result<()>;
    async fn mark_failed(&self, build_id: i64) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub storage_path: PathBuf,
    pub binpath_helm: String,
    pub binpath_docker: String,
    pub command_timeout: Duration,
}

impl PipelineConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            storage_path: cli.storage_dir(),
            binpath_helm: cli.binpath_helm.clone(),
            binpath_docker: cli.binpath_docker.clone(),
            command_timeout: cli.command_timeout(),
        }
    }
}

/// Everything a pipeline run needs from the build record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub build_id: i64,
    pub build_hash: String,
    pub namespace: String,
    pub domain: String,
    pub tls_enabled: bool,
    pub keycloak_enabled: bool,
    pub airgapped: bool,
    pub registry_url: Option<String>,
    pub selections: Vec<ResolvedAddonSelection>,
}

impl BuildPlan {
    pub fn archive_name(&self) -> String {
        format!("{}.tar.gz", self.build_hash)
    }
}

impl TryFrom<&MPackageBuild> for BuildPlan {
    type Error = anyhow::Error;

    fn try_from(build: &MPackageBuild) -> Result<Self> {
        let selections = decode_selections(&build.selected_addons)
            .with_context(|| format!("Failed to decode selections of build {}", build.id))?;

        Ok(Self {
            build_id: build.id,
            build_hash: build.build_hash.clone(),
            namespace: build.namespace.clone(),
            domain: build.domain.clone(),
            tls_enabled: build.tls_enabled,
            keycloak_enabled: build.keycloak_enabled,
            airgapped: build.airgapped,
            registry_url: build
                .registry_url
                .clone()
                .filter(|url| !url.trim().is_empty()),
            selections,
        })
    }
}

/// Per-run handles passed to every stage.
pub struct StageContext<'a> {
    pub store: &'a dyn BuildStore,
    pub runner: &'a dyn CommandRunner,
    pub config: &'a PipelineConfig,
    pub plan: &'a BuildPlan,
    pub work_dir: &'a Path,
}

impl StageContext<'_> {
    pub async fn progress(&self, progress: i32) -> Result<()> {
        self.store
            .set_progress(self.plan.build_id, progress)
            .await
            .with_context(|| format!("Failed to record progress {}", progress))
    }

    pub async fn write(&self, file: &GeneratedFile) -> Result<PathBuf> {
        let path = self.work_dir.join(&file.relative_path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        tokio::fs::write(&path, &file.contents)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(path)
    }

    pub async fn write_script(&self, file: &GeneratedFile) -> Result<PathBuf> {
        let path = self.write(file).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
                .await
                .with_context(|| format!("Failed to mark {} executable", path.display()))?;
        }

        Ok(path)
    }

    /// Runs an external tool. Failures are logged and reported as `false`.
    pub async fn exec(&self, program: &str, args: Vec<String>) -> bool {
        match self
            .runner
            .run(program, &args, self.config.command_timeout)
            .await
        {
            Ok(output) if output.success() => true,
            Ok(output) => {
                warn!(
                    program,
                    args = ?args,
                    exit_code = output.exit_code,
                    output = %output.output.trim_end(),
                    "Command failed"
                );
                false
            }
            Err(e) => {
                warn!(program, args = ?args, error = %format!("{:#}", e), "Command could not be run");
                false
            }
        }
    }
}

/// Working directory removed on every exit path. `remove` does it off the
/// runtime threads; `Drop` only covers early returns.
struct WorkDir {
    path: PathBuf,
    removed: bool,
}

impl WorkDir {
    async fn create(path: PathBuf) -> Result<Self> {
        // leftovers from an interrupted run of the same build
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tokio::fs::remove_dir_all(&path)
                .await
                .with_context(|| format!("Failed to clear {}", path.display()))?;
        }

        tokio::fs::create_dir_all(&path)
            .await
            .with_context(|| format!("Failed to create working directory {}", path.display()))?;

        Ok(Self {
            path,
            removed: false,
        })
    }

    async fn remove(mut self) {
        if let Err(e) = tokio::fs::remove_dir_all(&self.path).await {
            if e.kind() != ErrorKind::NotFound {
                warn!(error = %e, path = %self.path.display(), "Failed to remove working directory");
            }
        }

        self.removed = true;
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if self.removed {
            return;
        }

        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            if e.kind() != ErrorKind::NotFound {
                warn!(error = %e, path = %self.path.display(), "Failed to remove working directory");
            }
        }
    }
}

async fn remove_archive(archive_path: &Path) {
    if let Err(e) = tokio::fs::remove_file(archive_path).await {
        if e.kind() != ErrorKind::NotFound {
            warn!(error = %e, "Failed to remove archive");
        }
    }
}

/// Runs every stage for one build and records the terminal state.
///
/// Stage errors end in `Failed`, and so does a success that could not be
/// stored. An `Err` is returned only when no terminal state could be stored
/// at all; the build is then still `Building`.
#[instrument(skip_all, fields(build_id = plan.build_id, build_hash = %plan.build_hash))]
pub async fn run_build(
    store: &dyn BuildStore,
    runner: &dyn CommandRunner,
    config: &PipelineConfig,
    plan: &BuildPlan,
) -> Result<PackageBuildStatus> {
    info!(
        addons = plan.selections.len(),
        tls = plan.tls_enabled,
        keycloak = plan.keycloak_enabled,
        airgapped = plan.airgapped,
        "Starting package build"
    );

    let archive_path = config.storage_path.join(plan.archive_name());

    let failure = match execute_stages(store, runner, config, plan, &archive_path).await {
        Ok(total_size) => match store
            .mark_success(plan.build_id, &archive_path.to_string_lossy(), total_size)
            .await
        {
            Ok(()) => {
                info!(total_size, archive = %archive_path.display(), "Package build finished");
                return Ok(PackageBuildStatus::Success);
            }
            Err(e) => e.context("Failed to record build success"),
        },
        Err(e) => e,
    };

    error!(error = %format!("{:#}", failure), "Package build failed");
    remove_archive(&archive_path).await;

    store
        .mark_failed(plan.build_id)
        .await
        .context("Failed to record build failure")?;
    Ok(PackageBuildStatus::Failed)
}

async fn execute_stages(
    store: &dyn BuildStore,
    runner: &dyn CommandRunner,
    config: &PipelineConfig,
    plan: &BuildPlan,
    archive_path: &Path,
) -> Result<i64> {
    tokio::fs::create_dir_all(&config.storage_path)
        .await
        .with_context(|| format!("Failed to create {}", config.storage_path.display()))?;

    let work_dir = WorkDir::create(config.storage_path.join(&plan.build_hash)).await?;
    let ctx = StageContext {
        store,
        runner,
        config,
        plan,
        work_dir: &work_dir.path,
    };
    ctx.progress(progress::WORK_DIR).await?;

    let deploy = render_deploy_script(plan, Utc::now().date_naive());
    ctx.write_script(&GeneratedFile::new("deploy.sh", deploy))
        .await?;
    ctx.progress(progress::DEPLOY_SCRIPT).await?;

    for file in render_values(plan) {
        ctx.write(&file).await?;
    }
    ctx.progress(progress::VALUES).await?;

    ctx.write(&GeneratedFile::new("images.txt", render_image_list(plan)))
        .await?;
    ctx.progress(progress::IMAGE_LIST).await?;

    if plan.keycloak_enabled {
        ctx.write_script(&GeneratedFile::new(
            "scripts/configure-keycloak.sh",
            render_keycloak_script(plan),
        ))
        .await?;
    }
    ctx.progress(progress::KEYCLOAK_SCRIPT).await?;

    if plan.airgapped {
        info!("Pulling charts for air-gapped delivery");
        let charts = mirror::pull_charts(&ctx).await?;
        ctx.progress(progress::CHARTS).await?;

        info!(charts, "Pulling and saving images");
        let images = mirror::pull_and_save_images(&ctx).await?;
        ctx.progress(progress::IMAGES).await?;
        info!(images, "Images saved");

        ctx.write_script(&GeneratedFile::new(
            "scripts/push-to-registry.sh",
            mirror::render_push_script(plan),
        ))
        .await?;
    }
    ctx.progress(progress::MIRROR_DONE).await?;

    ctx.write_script(&GeneratedFile::new(
        "scripts/install.sh",
        render_install_wrapper(),
    ))
    .await?;
    ctx.progress(progress::INSTALL_WRAPPER).await?;

    ctx.write(&GeneratedFile::new("README.md", render_readme(plan)))
        .await?;
    ctx.progress(progress::README).await?;

    let source = work_dir.path.clone();
    let target = archive_path.to_path_buf();
    let root = plan.build_hash.clone();
    let total_size = tokio::task::spawn_blocking(move || create_archive(&source, &target, &root))
        .await
        .context("Archive task failed")??;
    ctx.progress(progress::ARCHIVE).await?;
    work_dir.remove().await;

    i64::try_from(total_size).context("Archive size out of range")
}
