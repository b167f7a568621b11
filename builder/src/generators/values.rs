/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use addonpack_core::consts::{CLUSTER_ISSUER, KEYCLOAK_REALM, SSO_SECRET_PLACEHOLDER};
use std::collections::HashMap;
use std::sync::LazyLock;

use super::{GeneratedFile, ingress_host};
use crate::pipeline::BuildPlan;

/// Inputs available to a values template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    pub name: &'a str,
    pub domain: &'a str,
}

impl TemplateContext<'_> {
    fn host(&self) -> String {
        ingress_host(self.name, self.domain)
    }

    fn secret_name(&self) -> String {
        format!("{}-tls", self.name)
    }

    fn keycloak_url(&self) -> String {
        format!("https://{}", ingress_host("keycloak", self.domain))
    }
}

pub type TemplateFn = fn(&TemplateContext) -> String;

/// Maps an add-on name to its template, with a fallback for unknown names.
pub struct TemplateRegistry {
    templates: HashMap<&'static str, TemplateFn>,
    fallback: TemplateFn,
}

impl TemplateRegistry {
    pub fn new(fallback: TemplateFn) -> Self {
        Self {
            templates: HashMap::new(),
            fallback,
        }
    }

    pub fn register(mut self, name: &'static str, template: TemplateFn) -> Self {
        self.templates.insert(name, template);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn render(&self, ctx: &TemplateContext) -> String {
        let template = self.templates.get(ctx.name).unwrap_or(&self.fallback);
        template(ctx)
    }
}

pub static BASE_VALUES: LazyLock<TemplateRegistry> = LazyLock::new(base_registry);
pub static TLS_VALUES: LazyLock<TemplateRegistry> = LazyLock::new(tls_registry);
pub static SSO_VALUES: LazyLock<TemplateRegistry> = LazyLock::new(sso_registry);

/// Values files for every selection: the base file, a `-tls` overlay when TLS is
/// on and a `-keycloak` overlay for SSO-capable add-ons when SSO is on.
pub fn render_values(plan: &BuildPlan) -> Vec<GeneratedFile> {
    let mut files = Vec::new();

    for selection in &plan.selections {
        let ctx = TemplateContext {
            name: &selection.name,
            domain: &plan.domain,
        };

        let header = format!(
            "# {} v{}\n\n",
            selection.display_name,
            selection.version_or_latest()
        );
        files.push(GeneratedFile::new(
            format!("values/{}.yaml", selection.name),
            header + &BASE_VALUES.render(&ctx),
        ));

        if plan.tls_enabled {
            files.push(GeneratedFile::new(
                format!("values/{}-tls.yaml", selection.name),
                TLS_VALUES.render(&ctx),
            ));
        }

        if plan.keycloak_enabled && selection.sso_capable {
            files.push(GeneratedFile::new(
                format!("values/{}-keycloak.yaml", selection.name),
                SSO_VALUES.render(&ctx),
            ));
        }
    }

    files
}

fn base_registry() -> TemplateRegistry {
    TemplateRegistry::new(|_| "# custom settings\n".to_string())
        .register("cert-manager", |_| {
            "installCRDs: true\nreplicaCount: 1\n".to_string()
        })
        .register("keycloak", |ctx| {
            format!(
                "replicas: 1
extraEnv: |
  - name: KEYCLOAK_ADMIN
    value: admin
  - name: KEYCLOAK_ADMIN_PASSWORD
    value: admin123
ingress:
  enabled: true
  rules:
    - host: {}
      paths:
        - path: /
          pathType: Prefix
",
                ctx.host()
            )
        })
        .register("harbor", |ctx| {
            format!(
                "expose:
  type: ingress
  ingress:
    hosts:
      core: {0}
externalURL: https://{0}
persistence:
  enabled: true
",
                ctx.host()
            )
        })
        .register("gitea", |ctx| {
            format!(
                "gitea:
  admin:
    username: gitea_admin
    password: admin123
ingress:
  enabled: true
  hosts:
    - host: {}
",
                ctx.host()
            )
        })
        .register("gitlab", |ctx| {
            format!(
                "global:
  hosts:
    domain: {}
    gitlab:
      name: {}
",
                ctx.domain,
                ctx.host()
            )
        })
        .register("jenkins", |ctx| {
            format!(
                "controller:
  adminUser: admin
  adminPassword: admin123
  ingress:
    enabled: true
    hostName: {}
",
                ctx.host()
            )
        })
        .register("argocd", |ctx| {
            format!(
                "server:
  ingress:
    enabled: true
    hosts:
      - {}
configs:
  params:
    server.insecure: true
",
                ctx.host()
            )
        })
        .register("sonarqube", |ctx| {
            format!(
                "ingress:
  enabled: true
  hosts:
    - name: {}
",
                ctx.host()
            )
        })
        .register("nexus", |ctx| {
            format!(
                "ingress:
  enabled: true
  hostRepo: {}
",
                ctx.host()
            )
        })
        .register("vault", |ctx| {
            format!(
                "server:
  ingress:
    enabled: true
    hosts:
      - host: {}
",
                ctx.host()
            )
        })
        .register("monitoring", |ctx| {
            format!(
                "grafana:
  adminPassword: admin123
  ingress:
    enabled: true
    hosts:
      - {}
prometheus:
  prometheusSpec:
    retention: 15d
",
                ingress_host("grafana", ctx.domain)
            )
        })
        .register("service-mesh", |_| {
            "pilot:
  resources:
    requests:
      cpu: 100m
      memory: 128Mi
"
            .to_string()
        })
}

fn ingress_tls(ctx: &TemplateContext, indent: &str) -> String {
    let body = format!(
        "ingress:
  annotations:
    cert-manager.io/cluster-issuer: {}
  tls:
    - secretName: {}
      hosts:
        - {}
",
        CLUSTER_ISSUER,
        ctx.secret_name(),
        ctx.host()
    );

    body.lines()
        .map(|line| format!("{}{}\n", indent, line))
        .collect()
}

fn tls_registry() -> TemplateRegistry {
    TemplateRegistry::new(|ctx| {
        format!(
            "# {} TLS settings\n# cert-manager ClusterIssuer: {}\n",
            ctx.name, CLUSTER_ISSUER
        )
    })
    .register("keycloak", |ctx| ingress_tls(ctx, ""))
    .register("gitea", |ctx| ingress_tls(ctx, ""))
    .register("sonarqube", |ctx| ingress_tls(ctx, ""))
    .register("nexus", |ctx| ingress_tls(ctx, ""))
    .register("jenkins", |ctx| format!("controller:\n{}", ingress_tls(ctx, "  ")))
    .register("vault", |ctx| format!("server:\n{}", ingress_tls(ctx, "  ")))
    .register("argocd", |ctx| {
        format!(
            "server:\n{}configs:\n  params:\n    server.insecure: false\n",
            ingress_tls(ctx, "  ")
        )
    })
    .register("harbor", |ctx| {
        format!(
            "expose:
  tls:
    enabled: true
    certSource: secret
    secret:
      secretName: {}
  ingress:
    annotations:
      cert-manager.io/cluster-issuer: {}
",
            ctx.secret_name(),
            CLUSTER_ISSUER
        )
    })
    .register("gitlab", |ctx| {
        format!(
            "global:
  ingress:
    configureCertmanager: true
    annotations:
      cert-manager.io/cluster-issuer: {}
    tls:
      - secretName: {}
        hosts:
          - {}
",
            CLUSTER_ISSUER,
            ctx.secret_name(),
            ctx.host()
        )
    })
    .register("monitoring", |ctx| {
        format!(
            "grafana:
  ingress:
    annotations:
      cert-manager.io/cluster-issuer: {}
    tls:
      - secretName: grafana-tls
        hosts:
          - {}
",
            CLUSTER_ISSUER,
            ingress_host("grafana", ctx.domain)
        )
    })
}

fn sso_registry() -> TemplateRegistry {
    TemplateRegistry::new(|ctx| {
        format!(
            "# {} Keycloak OIDC\n# OIDC endpoint: {}/realms/{}\n# Client ID: {}\n",
            ctx.name,
            ctx.keycloak_url(),
            KEYCLOAK_REALM,
            ctx.name
        )
    })
    .register("harbor", |ctx| {
        format!(
            "# Harbor reads OIDC settings from its admin UI, not from Helm values.
# After installation open Configuration > Authentication and set:
#   Auth Mode: OIDC
#   OIDC Endpoint: {}/realms/{}
#   OIDC Client ID: {}
#   OIDC Client Secret: issued by scripts/configure-keycloak.sh
#   OIDC Scope: openid,profile,email
",
            ctx.keycloak_url(),
            KEYCLOAK_REALM,
            ctx.name
        )
    })
    .register("gitea", |ctx| {
        format!(
            "gitea:
  oauth:
    - name: keycloak
      provider: openidConnect
      clientID: {client}
      clientSecret: {secret}
      autoDiscoverUrl: {kc}/realms/{realm}/.well-known/openid-configuration
      scopes: openid profile email
",
            client = ctx.name,
            secret = SSO_SECRET_PLACEHOLDER,
            kc = ctx.keycloak_url(),
            realm = KEYCLOAK_REALM
        )
    })
    .register("jenkins", |ctx| {
        format!(
            "controller:
  JCasC:
    securityRealm: |-
      oic:
        clientId: {client}
        clientSecret: {secret}
        wellKnownOpenIDConfigurationUrl: {kc}/realms/{realm}/.well-known/openid-configuration
        userNameField: preferred_username
        fullNameFieldName: name
        emailFieldName: email
        scopes: openid profile email
        logoutFromOpenidProvider: true
        endSessionEndpoint: {kc}/realms/{realm}/protocol/openid-connect/logout
  installPlugins:
    - oic-auth:latest
",
            client = ctx.name,
            secret = SSO_SECRET_PLACEHOLDER,
            kc = ctx.keycloak_url(),
            realm = KEYCLOAK_REALM
        )
    })
    .register("argocd", |ctx| {
        format!(
            "configs:
  cm:
    url: https://{host}
    oidc.config: |
      name: Keycloak
      issuer: {kc}/realms/{realm}
      clientID: {client}
      clientSecret: {secret}
      requestedScopes:
        - openid
        - profile
        - email
  rbac:
    policy.csv: |
      g, /devops-admin, role:admin
",
            host = ctx.host(),
            kc = ctx.keycloak_url(),
            realm = KEYCLOAK_REALM,
            client = ctx.name,
            secret = SSO_SECRET_PLACEHOLDER
        )
    })
    .register("sonarqube", |ctx| {
        format!(
            "sonarProperties:
  sonar.auth.oidc.enabled: \"true\"
  sonar.auth.oidc.issuerUri: {kc}/realms/{realm}
  sonar.auth.oidc.clientId.secured: {client}
  sonar.auth.oidc.clientSecret.secured: {secret}
  sonar.auth.oidc.scopes: openid profile email
plugins:
  install:
    - https://github.com/vaulttec/sonar-auth-oidc/releases/download/v2.1.1/sonar-auth-oidc-plugin-2.1.1.jar
",
            kc = ctx.keycloak_url(),
            realm = KEYCLOAK_REALM,
            client = ctx.name,
            secret = SSO_SECRET_PLACEHOLDER
        )
    })
    .register("nexus", |_| {
        "# OIDC login is a Nexus Pro feature; the community edition needs an
# oauth2-proxy sidecar in front of it instead.
nexus:
  env:
    - name: NEXUS_SECURITY_INITIAL_PASSWORD
      value: admin123
"
        .to_string()
    })
}
