/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use addonpack_core::consts::{
    HELM_TIMEOUT, IDENTITY_PROVIDER_ADDON, KEYCLOAK_REALM, SSO_SECRET_PLACEHOLDER,
};
use addonpack_core::selection::ResolvedAddonSelection;

use super::{TextBuffer, chart_reference, ingress_host, version_flag};
use crate::pipeline::BuildPlan;

const RULE: &str = "# ============================================================";

/// Add-ons that get an OIDC client: SSO-capable and not the identity provider.
pub fn sso_clients(plan: &BuildPlan) -> Vec<&ResolvedAddonSelection> {
    plan.selections
        .iter()
        .filter(|s| s.sso_capable && s.name != IDENTITY_PROVIDER_ADDON)
        .collect()
}

fn secret_var(name: &str) -> String {
    format!("SECRET_{}", name.to_uppercase().replace('-', "_"))
}

/// Renders `scripts/configure-keycloak.sh`.
///
/// Phase 1 registers one client per SSO add-on and patches the issued secret
/// over the placeholder in its `-keycloak` overlay. Phase 2 re-runs the Helm
/// upgrade so the patched values take effect.
pub fn render_keycloak_script(plan: &BuildPlan) -> String {
    let clients = sso_clients(plan);
    let mut out = TextBuffer::new();

    out.line("#!/bin/bash")
        .line("set -e")
        .line(r#"SCRIPT_DIR="$(cd "$(dirname "$0")" && pwd)""#)
        .line(r#"BASE_DIR="$(dirname "$SCRIPT_DIR")""#)
        .blank()
        .line(RULE)
        .line("# Keycloak SSO setup")
        .line("#  1) create the realm")
        .line("#  2) register OIDC clients and fetch their secrets")
        .line("#  3) patch the secrets into values/*-keycloak.yaml")
        .line("#  4) re-deploy the SSO add-ons")
        .line(RULE)
        .blank()
        .line(format!(r#"NAMESPACE="${{NAMESPACE:-{}}}""#, plan.namespace))
        .line(format!(r#"DOMAIN="${{DOMAIN:-{}}}""#, plan.domain))
        .line(format!(
            r#"KC_URL="https://{}""#,
            ingress_host(IDENTITY_PROVIDER_ADDON, "$DOMAIN")
        ))
        .line(r#"KC_ADMIN="${KC_ADMIN:-admin}""#)
        .line(r#"KC_PASS="${KC_PASS:-admin123}""#)
        .line(format!(r#"REALM="{}""#, KEYCLOAK_REALM))
        .line(format!(r#"PLACEHOLDER="{}""#, SSO_SECRET_PLACEHOLDER))
        .blank()
        .line("# GNU and BSD sed disagree on -i")
        .line("replace_in_file() {")
        .line(r#"  local file="$1" old="$2" new="$3""#)
        .line(r#"  if [[ "$OSTYPE" == "darwin"* ]]; then"#)
        .line(r#"    sed -i '' "s|${old}|${new}|g" "$file""#)
        .line("  else")
        .line(r#"    sed -i "s|${old}|${new}|g" "$file""#)
        .line("  fi")
        .line("}")
        .blank()
        .line(r#"echo "Waiting for Keycloak at $KC_URL""#)
        .line(r#"until curl -sf "$KC_URL/health/ready" > /dev/null 2>&1; do"#)
        .line(r#"  echo "  waiting...""#)
        .line("  sleep 5")
        .line("done")
        .line(r#"echo "Keycloak is ready""#)
        .blank()
        .line(r#"TOKEN=$(curl -sf -X POST "$KC_URL/realms/master/protocol/openid-connect/token" \"#)
        .line(r#"  -d "client_id=admin-cli" -d "username=$KC_ADMIN" -d "password=$KC_PASS" \"#)
        .line(r#"  -d "grant_type=password" | jq -r '.access_token')"#)
        .blank()
        .line(r#"if [ -z "$TOKEN" ] || [ "$TOKEN" = "null" ]; then"#)
        .line(r#"  echo "Failed to obtain a Keycloak admin token""#)
        .line("  exit 1")
        .line("fi")
        .blank()
        .line(r#"echo "Creating realm $REALM""#)
        .line(r#"curl -sf -X POST "$KC_URL/admin/realms" \"#)
        .line(r#"  -H "Authorization: Bearer $TOKEN" -H "Content-Type: application/json" \"#)
        .line(r#"  -d '{"realm":"'$REALM'","enabled":true,"sslRequired":"external"}' || echo "  (already exists)""#)
        .blank();

    phase_banner(&mut out, "Phase 1: register OIDC clients");
    for selection in &clients {
        render_client_registration(&mut out, selection);
    }

    phase_banner(&mut out, "Phase 2: re-deploy SSO add-ons");
    for selection in &clients {
        render_redeploy(&mut out, plan, selection);
    }

    let names: Vec<&str> = clients.iter().map(|s| s.name.as_str()).collect();
    out.line(r#"echo """#)
        .line(r#"echo "========================================""#)
        .line(r#"echo "  Keycloak SSO configured""#)
        .line(r#"echo "  realm:   $REALM""#)
        .line(format!(r#"echo "  clients: {}""#, names.join(", ")))
        .line(r#"echo "========================================""#);

    out.into_string()
}

fn phase_banner(out: &mut TextBuffer, title: &str) {
    out.line(r#"echo """#)
        .line(r#"echo "========================================""#)
        .line(format!(r#"echo "  {}""#, title))
        .line(r#"echo "========================================""#)
        .blank();
}

fn render_client_registration(out: &mut TextBuffer, selection: &ResolvedAddonSelection) {
    let name = &selection.name;
    let host = ingress_host(name, "$DOMAIN");
    let var = secret_var(name);
    let overlay = format!("$BASE_DIR/values/{}-keycloak.yaml", name);

    out.line(format!("# -- {} --", selection.display_name))
        .line(format!(r#"echo "Registering client for {}""#, selection.display_name))
        .line(r#"curl -sf -X POST "$KC_URL/admin/realms/$REALM/clients" \"#)
        .line(r#"  -H "Authorization: Bearer $TOKEN" -H "Content-Type: application/json" \"#)
        .line("  -d '{")
        .line(format!(r#"    "clientId": "{}","#, name))
        .line(format!(r#"    "name": "{}","#, selection.display_name))
        .line(r#"    "enabled": true,"#)
        .line(r#"    "publicClient": false,"#)
        .line(r#"    "clientAuthenticatorType": "client-secret","#)
        .line(r#"    "standardFlowEnabled": true,"#)
        .line(r#"    "directAccessGrantsEnabled": false,"#)
        .line(r#"    "protocol": "openid-connect","#)
        .line(format!(r#"    "redirectUris": ["https://'"{}"'/*"],"#, host))
        .line(format!(r#"    "webOrigins": ["https://'"{}"'"]"#, host))
        .line(r#"  }' 2>/dev/null || echo "  (already exists)""#)
        .blank()
        .line(format!(
            r#"CLIENT_UUID=$(curl -sf "$KC_URL/admin/realms/$REALM/clients?clientId={}" \"#,
            name
        ))
        .line(r#"  -H "Authorization: Bearer $TOKEN" | jq -r '.[0].id')"#)
        .line(format!(
            r#"{}=$(curl -sf "$KC_URL/admin/realms/$REALM/clients/$CLIENT_UUID/client-secret" \"#,
            var
        ))
        .line(r#"  -H "Authorization: Bearer $TOKEN" | jq -r '.value')"#)
        .line(format!(r#"echo "  {}: client secret issued""#, name))
        .blank()
        .line(format!(r#"if [ -f "{}" ]; then"#, overlay))
        .line(format!(
            r#"  replace_in_file "{}" "$PLACEHOLDER" "${}""#,
            overlay, var
        ))
        .line(format!(r#"  echo "  patched values/{}-keycloak.yaml""#, name))
        .line("fi")
        .blank();
}

fn render_redeploy(out: &mut TextBuffer, plan: &BuildPlan, selection: &ResolvedAddonSelection) {
    let name = &selection.name;
    let mut command = format!(
        r#"helm upgrade --install {} {} -n "$NAMESPACE"{} -f "$BASE_DIR/values/{}.yaml""#,
        name,
        chart_reference(selection, plan.airgapped, "BASE_DIR"),
        version_flag(selection, plan.airgapped),
        name
    );

    if plan.tls_enabled {
        command.push_str(&format!(r#" -f "$BASE_DIR/values/{}-tls.yaml""#, name));
    }

    command.push_str(&format!(
        r#" -f "$BASE_DIR/values/{}-keycloak.yaml" --wait --timeout {}"#,
        name, HELM_TIMEOUT
    ));

    out.line(format!(r#"echo "Re-deploying {}""#, selection.display_name))
        .line(command)
        .line(format!(r#"echo "  {} re-deployed""#, selection.display_name))
        .blank();
}
