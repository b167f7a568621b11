/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod addon;
pub mod addon_version;
pub mod build_queue;
pub mod customer;
pub mod package_build;
pub mod project;
