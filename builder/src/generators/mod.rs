/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Renderers for every text artifact in a bundle. Each returns the file
//! contents; writing them to disk is left to the pipeline.

pub mod deploy;
pub mod keycloak;
pub mod manifest;
pub mod readme;
pub mod values;

use addonpack_core::selection::ResolvedAddonSelection;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub relative_path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    pub fn new(relative_path: impl Into<PathBuf>, contents: String) -> Self {
        Self {
            relative_path: relative_path.into(),
            contents,
        }
    }
}

/// Chart argument for `helm upgrade --install`. Air-gapped bundles point at the
/// archive pulled into `charts/`, resolved relative to `base_var`.
pub fn chart_reference(selection: &ResolvedAddonSelection, airgapped: bool, base_var: &str) -> String {
    let chart = selection.chart_name();

    if !airgapped {
        return format!("{}/{}", selection.name, chart);
    }

    match selection.chart_version() {
        Some(version) => format!("${}/charts/{}-{}.tgz", base_var, chart, version),
        None => format!("$(ls ${}/charts/{}-*.tgz 2>/dev/null | head -1)", base_var, chart),
    }
}

/// ` --version <v>` for online installs. A local chart archive already pins
/// its version.
pub fn version_flag(selection: &ResolvedAddonSelection, airgapped: bool) -> String {
    match (airgapped, selection.chart_version()) {
        (false, Some(version)) => format!(" --version {}", version),
        _ => String::new(),
    }
}

pub fn ingress_host(name: &str, domain: &str) -> String {
    format!("{}.{}", name, domain)
}

/// Line-oriented text accumulator used by the script renderers.
#[derive(Debug, Default)]
pub struct TextBuffer {
    text: String,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, line: impl AsRef<str>) -> &mut Self {
        self.text.push_str(line.as_ref());
        self.text.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.text.push('\n');
        self
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(chart_name: Option<&str>, chart_version: Option<&str>) -> ResolvedAddonSelection {
        ResolvedAddonSelection {
            addon_id: 1,
            name: "monitoring".to_string(),
            display_name: "Monitoring".to_string(),
            category: "OBSERVABILITY".to_string(),
            version: Some("58.0.0".to_string()),
            helm_repo_url: Some("https://prometheus-community.github.io/helm-charts".to_string()),
            helm_chart_name: chart_name.map(str::to_string),
            helm_chart_version: chart_version.map(str::to_string),
            upstream_images: vec![],
            image_tags: None,
            sso_capable: false,
            install_order: 70,
        }
    }

    #[test]
    fn test_online_chart_reference() {
        let sel = selection(Some("kube-prometheus-stack"), Some("58.0.0"));
        assert_eq!(
            chart_reference(&sel, false, "SCRIPT_DIR"),
            "monitoring/kube-prometheus-stack"
        );

        let sel = selection(None, None);
        assert_eq!(chart_reference(&sel, false, "SCRIPT_DIR"), "monitoring/monitoring");
    }

    #[test]
    fn test_airgapped_chart_reference() {
        let sel = selection(Some("kube-prometheus-stack"), Some("58.0.0"));
        assert_eq!(
            chart_reference(&sel, true, "SCRIPT_DIR"),
            "$SCRIPT_DIR/charts/kube-prometheus-stack-58.0.0.tgz"
        );

        let sel = selection(Some("kube-prometheus-stack"), None);
        assert_eq!(
            chart_reference(&sel, true, "BASE_DIR"),
            "$(ls $BASE_DIR/charts/kube-prometheus-stack-*.tgz 2>/dev/null | head -1)"
        );
    }
}
