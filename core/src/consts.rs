/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use std::ops::RangeInclusive;

pub const PORT_RANGE: RangeInclusive<usize> = 1..=65535;

pub const DEFAULT_NAMESPACE: &str = "devops";
pub const DEFAULT_DOMAIN: &str = "example.com";

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 200;

/// Written into SSO overlays until the identity provider issues the real client secret.
pub const SSO_SECRET_PLACEHOLDER: &str = "changeme-run-configure-keycloak-sh";
pub const IDENTITY_PROVIDER_ADDON: &str = "keycloak";
pub const KEYCLOAK_REALM: &str = "devops";
pub const CLUSTER_ISSUER: &str = "letsencrypt-prod";
pub const HELM_TIMEOUT: &str = "600s";

pub const UNKNOWN_VERSION: &str = "latest";
