/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use addonpack_core::consts::UNKNOWN_VERSION;
use addonpack_core::selection::ResolvedAddonSelection;

use super::TextBuffer;
use crate::pipeline::BuildPlan;

/// Tagged image reference. Images without a registry path are shared base
/// images and always use `latest`.
pub fn image_reference(image: &str, version: &str) -> String {
    if image.contains('/') {
        format!("{}:{}", image, version)
    } else {
        format!("{}:{}", image, UNKNOWN_VERSION)
    }
}

pub fn image_references(selection: &ResolvedAddonSelection) -> Vec<String> {
    selection
        .upstream_images
        .iter()
        .map(|image| image_reference(image, selection.version_or_latest()))
        .collect()
}

/// Rewrites an image to live under an intermediate registry.
pub fn mirror_reference(registry: &str, image: &str) -> String {
    let registry = registry.trim_end_matches('/');
    if image.contains('/') {
        format!("{}/{}", registry, image)
    } else {
        format!("{}/library/{}", registry, image)
    }
}

pub fn image_archive_name(image: &str) -> String {
    let sanitized: String = image
        .chars()
        .map(|c| match c {
            '/' | ':' | '@' => '_',
            c => c,
        })
        .collect();

    format!("{}.tar", sanitized)
}

pub fn render_image_list(plan: &BuildPlan) -> String {
    let mut out = TextBuffer::new();
    out.line("# Container images required by this bundle").blank();

    for selection in &plan.selections {
        out.line(format!(
            "# {} v{}",
            selection.display_name,
            selection.version_or_latest()
        ));

        for reference in image_references(selection) {
            out.line(reference);
        }

        out.blank();
    }

    out.into_string()
}
