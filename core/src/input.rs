/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::consts::*;

pub fn port_in_range(s: &str) -> Result<u16, String> {
    let port: usize = s
        .parse()
        .map_err(|_| format!("`{s}` is not a port number"))?;

    if PORT_RANGE.contains(&port) {
        Ok(port as u16)
    } else {
        Err(format!(
            "port not in range {}-{}",
            PORT_RANGE.start(),
            PORT_RANGE.end()
        ))
    }
}

pub fn greater_than_zero<
    T: std::str::FromStr + std::cmp::PartialOrd + std::fmt::Display + Default,
>(
    s: &str,
) -> Result<T, String> {
    let num: T = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid number", s))?;

    if num > T::default() {
        Ok(num)
    } else {
        Err(format!("`{}` is not larger than 0", s))
    }
}

pub fn vec_to_hex(v: &[u8]) -> String {
    v.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Keeps only characters valid in a Kubernetes namespace name.
pub fn sanitize_namespace(namespace: Option<&str>) -> String {
    let cleaned: String = namespace
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();

    if cleaned.is_empty() {
        DEFAULT_NAMESPACE.to_string()
    } else {
        cleaned
    }
}

pub fn sanitize_domain(domain: Option<&str>) -> String {
    let cleaned: String = domain
        .unwrap_or_default()
        .chars()
        .filter(|c| *c != ',' && *c != ';' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        DEFAULT_DOMAIN.to_string()
    } else {
        cleaned
    }
}

/// Host names end up in generated shell scripts, so only `[A-Za-z0-9.-]` is accepted.
pub fn is_valid_domain(domain: &str) -> bool {
    !domain.is_empty()
        && !domain.starts_with(['.', '-'])
        && !domain.ends_with(['.', '-'])
        && domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

/// Registry references allow a port and a path on top of a host name.
pub fn is_valid_registry(registry: &str) -> bool {
    !registry.starts_with(['-', '/'])
        && registry
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':' | '/'))
}

/// Shell-safe identifier for an add-on name, e.g. `cert-manager` -> `cert_manager`.
pub fn function_name(addon_name: &str) -> String {
    addon_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
