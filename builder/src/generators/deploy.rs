/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use addonpack_core::consts::HELM_TIMEOUT;
use addonpack_core::input::function_name;
use addonpack_core::selection::{ResolvedAddonSelection, sorted_by_install_order};
use chrono::NaiveDate;

use super::{TextBuffer, chart_reference, version_flag};
use crate::pipeline::BuildPlan;

const RULE: &str = "# ============================================================";

pub fn mode_label(airgapped: bool) -> &'static str {
    if airgapped {
        "air-gapped (local charts and images)"
    } else {
        "online"
    }
}

/// Renders `deploy.sh`: one install/uninstall function pair per add-on, the
/// aggregate actions and a subcommand dispatcher.
pub fn render_deploy_script(plan: &BuildPlan, generated_on: NaiveDate) -> String {
    let sorted = sorted_by_install_order(&plan.selections);
    let mut out = TextBuffer::new();

    out.line("#!/bin/bash")
        .line("set -e")
        .line(r#"SCRIPT_DIR="$(cd "$(dirname "$0")" && pwd)""#)
        .blank()
        .line(RULE)
        .line("# Add-on deployment script")
        .line(format!("# Generated: {}", generated_on))
        .line(format!("# Mode: {}", mode_label(plan.airgapped)))
        .line(RULE)
        .blank()
        .line(format!(r#"NAMESPACE="${{NAMESPACE:-{}}}""#, plan.namespace))
        .line(format!(r#"DOMAIN="${{DOMAIN:-{}}}""#, plan.domain))
        .line(r#"REGISTRY="harbor.${DOMAIN}""#)
        .line(format!(r#"TLS_ENABLED="{}""#, plan.tls_enabled))
        .line(format!(r#"KEYCLOAK_ENABLED="{}""#, plan.keycloak_enabled))
        .line(format!(r#"TIMEOUT="{}""#, HELM_TIMEOUT))
        .blank()
        .line(r#"RED='\033[0;31m'; GREEN='\033[0;32m'; YELLOW='\033[1;33m'; NC='\033[0m'"#)
        .blank();

    render_pre_check(&mut out);
    render_load_images(&mut out);

    for selection in &sorted {
        render_addon_functions(&mut out, plan, selection);
    }

    render_install_all(&mut out, plan, &sorted);
    render_uninstall_all(&mut out, &sorted);
    render_status(&mut out);
    render_usage(&mut out, plan, &sorted);
    render_dispatcher(&mut out);

    out.into_string()
}

fn render_pre_check(out: &mut TextBuffer) {
    out.line("pre_check() {")
        .line(r#"  echo "Running pre-flight checks...""#)
        .line(r#"  command -v helm >/dev/null 2>&1 || { echo -e "${RED}helm is not installed${NC}"; exit 1; }"#)
        .line(r#"  command -v kubectl >/dev/null 2>&1 || { echo -e "${RED}kubectl is not installed${NC}"; exit 1; }"#)
        .line(r#"  kubectl create namespace "$NAMESPACE" --dry-run=client -o yaml | kubectl apply -f - 2>/dev/null"#)
        .line(r#"  echo -e "${GREEN}Pre-flight checks passed (namespace: $NAMESPACE)${NC}""#)
        .line("}")
        .blank();
}

fn render_load_images(out: &mut TextBuffer) {
    out.line("load_images() {")
        .line(r#"  echo "Loading container images...""#)
        .line(r#"  if [ ! -d "$SCRIPT_DIR/images" ] || [ -z "$(ls -A $SCRIPT_DIR/images/*.tar 2>/dev/null)" ]; then"#)
        .line(r#"    echo -e "${YELLOW}No image archives found in images/${NC}""#)
        .line("    return 0")
        .line("  fi")
        .line("  for img in $SCRIPT_DIR/images/*.tar; do")
        .line(r#"    echo "  loading $(basename $img)""#)
        .line(r#"    docker load -i "$img""#)
        .line("  done")
        .line(r#"  echo -e "${GREEN}Images loaded${NC}""#)
        .line("}")
        .blank();
}

fn render_addon_functions(out: &mut TextBuffer, plan: &BuildPlan, selection: &ResolvedAddonSelection) {
    let name = &selection.name;
    let func = function_name(name);
    let chart = chart_reference(selection, plan.airgapped, "SCRIPT_DIR");

    out.line(format!("install_{}() {{", func))
        .line(format!(r#"  echo "Installing {}...""#, selection.display_name));

    if !plan.airgapped {
        if let Some(repo) = selection.repo_url() {
            out.line(format!("  helm repo add {} {} 2>/dev/null || true", name, repo))
                .line(format!("  helm repo update {} 2>/dev/null || true", name));
        }
    }

    out.line(format!(r#"  local VALUES="-f $SCRIPT_DIR/values/{}.yaml""#, name));

    if plan.tls_enabled {
        out.line(format!(
            r#"  [ -f "$SCRIPT_DIR/values/{0}-tls.yaml" ] && VALUES="$VALUES -f $SCRIPT_DIR/values/{0}-tls.yaml""#,
            name
        ));
    }

    if plan.keycloak_enabled && selection.sso_capable {
        out.line(format!(
            r#"  [ -f "$SCRIPT_DIR/values/{0}-keycloak.yaml" ] && VALUES="$VALUES -f $SCRIPT_DIR/values/{0}-keycloak.yaml""#,
            name
        ));
    }

    out.line(format!(
        r#"  helm upgrade --install {} {} -n "$NAMESPACE" --create-namespace $VALUES{} --wait --timeout "$TIMEOUT""#,
        name,
        chart,
        version_flag(selection, plan.airgapped)
    ))
    .line(format!(
        r#"  echo -e "${{GREEN}}  {} installed${{NC}}""#,
        selection.display_name
    ))
    .line("}")
    .blank();

    out.line(format!("uninstall_{}() {{", func))
        .line(format!(r#"  echo "Removing {}...""#, selection.display_name))
        .line(format!(
            r#"  helm uninstall {} -n "$NAMESPACE" 2>/dev/null || echo "  (already removed)""#,
            name
        ))
        .line("}")
        .blank();
}

fn render_install_all(out: &mut TextBuffer, plan: &BuildPlan, sorted: &[&ResolvedAddonSelection]) {
    out.line("install_all() {").line("  pre_check");

    if plan.airgapped {
        out.line("  load_images");
    }

    out.line(r#"  echo """#)
        .line(r#"  echo "========================================""#)
        .line(format!(r#"  echo "  Installing {} add-on(s)""#, sorted.len()))
        .line(format!(r#"  echo "  Mode: {}""#, mode_label(plan.airgapped)))
        .line(r#"  echo "========================================""#)
        .line(r#"  echo """#);

    for selection in sorted {
        out.line(format!("  install_{}", function_name(&selection.name)));
    }

    if plan.keycloak_enabled {
        out.line(r#"  echo """#)
            .line(r#"  echo "Configuring Keycloak SSO...""#)
            .line(r#"  bash "$SCRIPT_DIR/scripts/configure-keycloak.sh""#);
    }

    out.line(r#"  echo """#)
        .line(r#"  echo -e "${GREEN}All add-ons installed${NC}""#)
        .line("}")
        .blank();
}

fn render_uninstall_all(out: &mut TextBuffer, sorted: &[&ResolvedAddonSelection]) {
    out.line("uninstall_all() {")
        .line(r#"  echo "Removing all add-ons...""#);

    for selection in sorted.iter().rev() {
        out.line(format!("  uninstall_{}", function_name(&selection.name)));
    }

    out.line(r#"  echo -e "${GREEN}All add-ons removed${NC}""#)
        .line("}")
        .blank();
}

fn render_status(out: &mut TextBuffer) {
    out.line("status() {")
        .line(r#"  echo "Releases in namespace $NAMESPACE:""#)
        .line(r#"  helm list -n "$NAMESPACE" 2>/dev/null || echo "no releases deployed""#)
        .line(r#"  echo """#)
        .line(r#"  kubectl get pods -n "$NAMESPACE" 2>/dev/null || true"#)
        .line("}")
        .blank();
}

fn render_usage(out: &mut TextBuffer, plan: &BuildPlan, sorted: &[&ResolvedAddonSelection]) {
    out.line("usage() {")
        .line(r#"  echo "Usage: $0 <command> [addon]""#)
        .line(r#"  echo """#)
        .line(r#"  echo "Commands:""#)
        .line(r#"  echo "  install-all       install every add-on in dependency order""#)
        .line(r#"  echo "  uninstall-all     remove every add-on in reverse order""#)
        .line(r#"  echo "  install <addon>   install a single add-on""#)
        .line(r#"  echo "  uninstall <addon> remove a single add-on""#)
        .line(r#"  echo "  load-images       load bundled container images""#)
        .line(r#"  echo "  status            show deployment status""#)
        .line(r#"  echo """#)
        .line(r#"  echo "Add-ons:""#);

    for selection in sorted {
        out.line(format!(
            r#"  echo "  {:<20}{}""#,
            selection.name, selection.display_name
        ));
    }

    out.line(r#"  echo """#)
        .line(format!(
            r#"  echo "Defaults: NAMESPACE={} DOMAIN={}""#,
            plan.namespace, plan.domain
        ))
        .line(r#"  echo "Example:  NAMESPACE=prod DOMAIN=prod.example.com $0 install-all""#)
        .line("}")
        .blank();
}

fn render_dispatcher(out: &mut TextBuffer) {
    out.line(RULE)
        .line("# Entry point")
        .line(RULE)
        .line(r#"case "${1:-}" in"#)
        .line("  install-all)   install_all ;;")
        .line("  uninstall-all) uninstall_all ;;")
        .line("  load-images)   load_images ;;")
        .line("  status)        status ;;")
        .line("  install)")
        .line(r#"    [ -z "${2:-}" ] && { echo "Usage: $0 install <addon>"; exit 1; }"#)
        .line(r#"    FUNC="install_$(printf '%s' "$2" | tr -c '[:alnum:]' '_')""#)
        .line(r#"    if type "$FUNC" &>/dev/null; then pre_check; $FUNC"#)
        .line(r#"    else echo -e "${RED}Unknown add-on: $2${NC}"; exit 1; fi"#)
        .line("    ;;")
        .line("  uninstall)")
        .line(r#"    [ -z "${2:-}" ] && { echo "Usage: $0 uninstall <addon>"; exit 1; }"#)
        .line(r#"    FUNC="uninstall_$(printf '%s' "$2" | tr -c '[:alnum:]' '_')""#)
        .line(r#"    if type "$FUNC" &>/dev/null; then $FUNC"#)
        .line(r#"    else echo -e "${RED}Unknown add-on: $2${NC}"; exit 1; fi"#)
        .line("    ;;")
        .line("  *) usage ;;")
        .line("esac");
}
