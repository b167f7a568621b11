/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Tests for input validation and sanitising

use addonpack_core::input::*;

#[test]
fn test_port_in_range() {
    let port = port_in_range("8080").unwrap();
    assert_eq!(port, 8080);

    let port = port_in_range("65535").unwrap();
    assert_eq!(port, 65535);

    let port = port_in_range("65536").unwrap_err();
    assert_eq!(port, "port not in range 1-65535");

    let port = port_in_range("0").unwrap_err();
    assert_eq!(port, "port not in range 1-65535");

    let port = port_in_range("http").unwrap_err();
    assert_eq!(port, "`http` is not a port number");
}

#[test]
fn test_greater_than_zero() {
    let num = greater_than_zero::<u64>("900").unwrap();
    assert_eq!(num, 900);

    let num = greater_than_zero::<i64>("0").unwrap_err();
    assert_eq!(num, "`0` is not larger than 0");

    let num = greater_than_zero::<i64>("-3").unwrap_err();
    assert_eq!(num, "`-3` is not larger than 0");

    let num = greater_than_zero::<usize>("four").unwrap_err();
    assert_eq!(num, "`four` is not a valid number");
}

#[test]
fn test_vec_to_hex() {
    assert_eq!(vec_to_hex(&[0x00, 0x0f, 0xab, 0xff]), "000fabff");
    assert_eq!(vec_to_hex(&[]), "");
}

#[test]
fn test_sanitize_namespace() {
    assert_eq!(sanitize_namespace(Some("team-a")), "team-a");
    assert_eq!(sanitize_namespace(Some("team a; rm -rf /")), "teamarm-rf");
    assert_eq!(sanitize_namespace(Some("   ")), "devops");
    assert_eq!(sanitize_namespace(Some("$()")), "devops");
    assert_eq!(sanitize_namespace(None), "devops");
}

#[test]
fn test_sanitize_domain() {
    assert_eq!(sanitize_domain(Some("apps.corp.io")), "apps.corp.io");
    assert_eq!(sanitize_domain(Some(" apps.corp.io;,\n")), "apps.corp.io");
    assert_eq!(sanitize_domain(Some("")), "example.com");
    assert_eq!(sanitize_domain(None), "example.com");
}

#[test]
fn test_domain_charset() {
    assert!(is_valid_domain("apps.corp.io"));
    assert!(is_valid_domain("k8s-01.example.com"));
    assert!(!is_valid_domain("$(touch${IFS}/tmp/x)`id`"));
    assert!(!is_valid_domain("corp.io\"'"));
    assert!(!is_valid_domain("-corp.io"));
    assert!(!is_valid_domain(""));
}

#[test]
fn test_registry_charset() {
    assert!(is_valid_registry("registry.corp.io:5000/mirror"));
    assert!(!is_valid_registry("registry.corp.io;reboot"));
    assert!(!is_valid_registry("--insecure"));
}

#[test]
fn test_function_name() {
    assert_eq!(function_name("cert-manager"), "cert_manager");
    assert_eq!(function_name("service-mesh"), "service_mesh");
    assert_eq!(function_name("keycloak"), "keycloak");
    assert_eq!(function_name("a.b/c"), "a_b_c");
}
