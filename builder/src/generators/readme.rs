/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use addonpack_core::selection::sorted_by_install_order;

use super::TextBuffer;
use super::deploy::mode_label;
use crate::pipeline::BuildPlan;

fn enabled(flag: bool) -> &'static str {
    if flag { "enabled" } else { "disabled" }
}

pub fn render_readme(plan: &BuildPlan) -> String {
    let mut out = TextBuffer::new();

    out.line("# Add-on package").blank();
    out.line(format!("- **Mode**: {}", mode_label(plan.airgapped)));
    if let Some(registry) = &plan.registry_url {
        out.line(format!("- **Registry**: {}", registry));
    }
    out.line(format!("- **TLS**: {}", enabled(plan.tls_enabled)))
        .line(format!("- **Keycloak SSO**: {}", enabled(plan.keycloak_enabled)))
        .blank();

    out.line("## Add-ons")
        .blank()
        .line("| Order | Add-on | Version | SSO |")
        .line("|-------|--------|---------|-----|");
    for selection in sorted_by_install_order(&plan.selections) {
        out.line(format!(
            "| {} | {} | {} | {} |",
            selection.install_order,
            selection.display_name,
            selection.version_or_latest(),
            if selection.sso_capable { "yes" } else { "" }
        ));
    }

    out.blank()
        .line("## Usage")
        .blank()
        .line("```bash")
        .line("# install everything")
        .line("bash deploy.sh install-all")
        .blank()
        .line("# single add-ons")
        .line("bash deploy.sh install keycloak")
        .line("bash deploy.sh uninstall harbor")
        .blank()
        .line("# deployment status")
        .line("bash deploy.sh status")
        .blank()
        .line("# override the defaults")
        .line("NAMESPACE=prod DOMAIN=prod.example.com bash deploy.sh install-all")
        .line("```");

    if plan.airgapped {
        out.blank()
            .line("## Air-gapped installation")
            .blank()
            .line("This bundle ships Helm charts (`charts/*.tgz`) and container images (`images/*.tar`).")
            .blank()
            .line("```bash")
            .line("# load images and install everything")
            .line("bash deploy.sh install-all")
            .blank()
            .line("# optional: push the images to an internal registry")
            .line("bash scripts/push-to-registry.sh harbor.customer.com")
            .line("```");
    }

    out.into_string()
}

/// `scripts/install.sh`, a thin wrapper around `deploy.sh install-all`.
pub fn render_install_wrapper() -> String {
    let mut out = TextBuffer::new();
    out.line("#!/bin/bash")
        .line("set -e")
        .line(r#"cd "$(dirname "$0")/..""#)
        .blank()
        .line("bash deploy.sh install-all");
    out.into_string()
}
