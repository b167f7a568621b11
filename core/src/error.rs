/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    NotReady(String),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("failed to encode add-on selections: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type PackageResult<T> = Result<T, PackageError>;
