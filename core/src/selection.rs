/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::consts::UNKNOWN_VERSION;
use super::types::{MAddon, MAddonVersion};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// An add-on frozen at intake together with the version metadata it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAddonSelection {
    pub addon_id: i64,
    pub name: String,
    pub display_name: String,
    pub category: String,
    pub version: Option<String>,
    pub helm_repo_url: Option<String>,
    pub helm_chart_name: Option<String>,
    pub helm_chart_version: Option<String>,
    #[serde(default)]
    pub upstream_images: Vec<String>,
    pub image_tags: Option<String>,
    pub sso_capable: bool,
    pub install_order: i32,
}

impl ResolvedAddonSelection {
    /// Builds a snapshot from a catalog row. Without a matching version row the
    /// requested values are kept as given and the tag metadata stays empty.
    pub fn resolve(
        addon: &MAddon,
        version: Option<&MAddonVersion>,
        requested_version: Option<&str>,
        requested_chart_version: Option<&str>,
    ) -> Self {
        let (version, helm_chart_version, image_tags) = match version {
            Some(row) => (
                Some(row.version.clone()),
                row.helm_chart_version.clone(),
                row.image_tags.clone(),
            ),
            None => (
                requested_version.map(str::to_string),
                requested_chart_version.map(str::to_string),
                None,
            ),
        };

        Self {
            addon_id: addon.id,
            name: addon.name.clone(),
            display_name: addon.display_name.clone(),
            category: addon.category.clone(),
            version,
            helm_repo_url: addon.helm_repo_url.clone(),
            helm_chart_name: addon.helm_chart_name.clone(),
            helm_chart_version,
            upstream_images: parse_upstream_images(addon.upstream_images.as_deref()),
            image_tags,
            sso_capable: addon.sso_capable,
            install_order: addon.install_order,
        }
    }

    pub fn version_or_latest(&self) -> &str {
        non_empty(self.version.as_deref()).unwrap_or(UNKNOWN_VERSION)
    }

    pub fn chart_name(&self) -> &str {
        non_empty(self.helm_chart_name.as_deref()).unwrap_or(&self.name)
    }

    pub fn chart_version(&self) -> Option<&str> {
        non_empty(self.helm_chart_version.as_deref())
    }

    pub fn repo_url(&self) -> Option<&str> {
        non_empty(self.helm_repo_url.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Decodes the catalog's JSON image list. Malformed input yields no images.
pub fn parse_upstream_images(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = non_empty(raw) else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(images) => images
            .into_iter()
            .map(|image| image.trim().to_string())
            .filter(|image| !image.is_empty())
            .collect(),
        Err(e) => {
            warn!(error = %e, "Ignoring malformed upstream image list");
            Vec::new()
        }
    }
}

pub fn encode_selections(selections: &[ResolvedAddonSelection]) -> serde_json::Result<String> {
    serde_json::to_string(selections)
}

pub fn decode_selections(raw: &str) -> serde_json::Result<Vec<ResolvedAddonSelection>> {
    serde_json::from_str(raw)
}

/// Ascending install order; ties keep their submitted order.
pub fn sorted_by_install_order(selections: &[ResolvedAddonSelection]) -> Vec<&ResolvedAddonSelection> {
    let mut sorted: Vec<&ResolvedAddonSelection> = selections.iter().collect();
    sorted.sort_by_key(|s| s.install_order);
    sorted
}
