/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Air-gapped delivery: local chart and image copies plus the script that
//! pushes the images into a customer registry. Individual pull or save
//! failures are skipped.

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::generators::TextBuffer;
use super::generators::manifest::{image_archive_name, image_references, mirror_reference};
use super::pipeline::{BuildPlan, StageContext, progress};

const IMAGE_BAND: i32 = progress::IMAGES - progress::CHARTS;

/// All tagged image references of a plan, in selection order.
pub fn mirror_images(plan: &BuildPlan) -> Vec<String> {
    plan.selections.iter().flat_map(image_references).collect()
}

/// Where an image is pulled from: the intermediate registry when one is set.
pub fn pull_target(plan: &BuildPlan, image: &str) -> String {
    match &plan.registry_url {
        Some(registry) => mirror_reference(registry, image),
        None => image.to_string(),
    }
}

/// Progress after `done` of `total` images, within the image band.
pub fn image_progress(done: usize, total: usize) -> i32 {
    if total == 0 {
        return progress::IMAGES;
    }

    progress::CHARTS + (done * IMAGE_BAND as usize / total) as i32
}

fn args<const N: usize>(values: [&str; N]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub async fn pull_charts(ctx: &StageContext<'_>) -> Result<usize> {
    let charts_dir = ctx.work_dir.join("charts");
    tokio::fs::create_dir_all(&charts_dir)
        .await
        .with_context(|| format!("Failed to create {}", charts_dir.display()))?;
    let charts_dir = charts_dir.to_string_lossy().into_owned();
    let helm = ctx.config.binpath_helm.as_str();

    let mut pulled = 0;
    for selection in &ctx.plan.selections {
        let Some(repo) = selection.repo_url() else {
            continue;
        };

        let name = selection.name.as_str();
        let chart = format!("{}/{}", name, selection.chart_name());

        ctx.exec(helm, args(["repo", "add", "--force-update", name, repo]))
            .await;
        ctx.exec(helm, args(["repo", "update", name])).await;

        let mut pull = args(["pull", &chart, "-d", &charts_dir]);
        if let Some(version) = selection.chart_version() {
            pull.extend(args(["--version", version]));
        }

        if ctx.exec(helm, pull).await {
            info!(chart, "Pulled chart");
            pulled += 1;
        } else {
            warn!(chart, "Chart pull failed, skipping");
        }
    }

    Ok(pulled)
}

pub async fn pull_and_save_images(ctx: &StageContext<'_>) -> Result<usize> {
    let images_dir = ctx.work_dir.join("images");
    tokio::fs::create_dir_all(&images_dir)
        .await
        .with_context(|| format!("Failed to create {}", images_dir.display()))?;
    let docker = ctx.config.binpath_docker.as_str();

    let images = mirror_images(ctx.plan);
    let total = images.len();
    let mut saved = 0;

    for (index, image) in images.iter().enumerate() {
        let target = pull_target(ctx.plan, image);

        if ctx.exec(docker, args(["pull", &target])).await {
            let tar_path = images_dir.join(image_archive_name(image));
            let tar = tar_path.to_string_lossy().into_owned();

            if ctx.exec(docker, args(["save", "-o", &tar, &target])).await {
                info!(image = %target, "Saved image");
                saved += 1;
            } else {
                warn!(image = %target, "Image save failed, skipping");
                let _ = tokio::fs::remove_file(&tar_path).await;
            }
        } else {
            warn!(image = %target, "Image pull failed, skipping");
        }

        ctx.progress(image_progress(index + 1, total)).await?;
    }

    Ok(saved)
}

/// Renders `scripts/push-to-registry.sh`.
pub fn render_push_script(plan: &BuildPlan) -> String {
    let mut out = TextBuffer::new();

    out.line("#!/bin/bash")
        .line("set -e")
        .line(r#"SCRIPT_DIR="$(cd "$(dirname "$0")" && pwd)""#)
        .line(r#"BASE_DIR="$(dirname "$SCRIPT_DIR")""#)
        .blank()
        .line("# Usage: bash push-to-registry.sh <registry-url>")
        .blank()
        .line(r#"REGISTRY="${1:-${REGISTRY:-}}""#)
        .line(r#"if [ -z "$REGISTRY" ]; then"#)
        .line(r#"  echo "Usage: $0 <registry-url>""#)
        .line(r#"  echo "Example: $0 harbor.customer.com""#)
        .line("  exit 1")
        .line("fi")
        .blank()
        .line(r#"echo "Loading images...""#)
        .line("for img in $BASE_DIR/images/*.tar; do")
        .line(r#"  [ -f "$img" ] || continue"#)
        .line(r#"  echo "  loading $(basename $img)""#)
        .line(r#"  docker load -i "$img""#)
        .line("done")
        .blank()
        .line(r#"echo "Tagging and pushing to $REGISTRY...""#);

    for image in mirror_images(plan) {
        let source = pull_target(plan, &image);
        let destination = mirror_reference("$REGISTRY", &image);

        out.line(format!(r#"echo "  push: {}""#, image))
            .line(format!(
                r#"docker tag {} "{}" 2>/dev/null || true"#,
                source, destination
            ))
            .line(format!(
                r#"docker push "{}" 2>/dev/null || echo "    push failed: {}""#,
                destination, image
            ));
    }

    out.blank().line(r#"echo "Push finished: $REGISTRY""#);
    out.into_string()
}
