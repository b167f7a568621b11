/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use addonpack_core::intake::{BuildRequest, start_build};
use addonpack_core::records::{
    BuildFilter, BuildResponse, BuildStatusResponse, get_build, get_build_by_hash, get_build_file,
    list_builds,
};
use addonpack_core::types::*;
use anyhow::Context;
use axum::body::Body;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Json, Path, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::Response;
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::error::{WebError, WebResult};

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub customer_id: Option<i64>,
    pub project_id: Option<i64>,
    #[serde(default)]
    pub page: u64,
    pub size: Option<u64>,
}

fn respond<T>(message: T) -> Json<BaseResponse<T>> {
    Json(BaseResponse {
        error: false,
        message,
    })
}

pub async fn post_build(
    State(state): State<Arc<ServerState>>,
    body: Result<Json<BuildRequest>, JsonRejection>,
) -> WebResult<(StatusCode, Json<BaseResponse<BuildResponse>>)> {
    let Json(request) = body?;
    let build = start_build(Arc::clone(&state), request).await?;

    Ok((StatusCode::CREATED, respond(BuildResponse::try_from(build)?)))
}

pub async fn get_packages(
    State(state): State<Arc<ServerState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> WebResult<Json<BaseResponse<Paginated<BuildResponse>>>> {
    let Query(query) = query?;
    let filter = BuildFilter {
        customer_id: query.customer_id,
        project_id: query.project_id,
    };

    let page = list_builds(&state.db, filter, query.page, query.size).await?;
    let items = page
        .items
        .into_iter()
        .map(BuildResponse::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(respond(Paginated {
        items,
        page: page.page,
        size: page.size,
        total_items: page.total_items,
        total_pages: page.total_pages,
    }))
}

pub async fn get_package(
    State(state): State<Arc<ServerState>>,
    id: Result<Path<i64>, PathRejection>,
) -> WebResult<Json<BaseResponse<BuildResponse>>> {
    let Path(id) = id?;
    let build = get_build(&state.db, id).await?;

    Ok(respond(BuildResponse::try_from(build)?))
}

pub async fn get_package_by_hash(
    State(state): State<Arc<ServerState>>,
    Path(hash): Path<String>,
) -> WebResult<Json<BaseResponse<BuildResponse>>> {
    let build = get_build_by_hash(&state.db, &hash).await?;

    Ok(respond(BuildResponse::try_from(build)?))
}

pub async fn get_package_status(
    State(state): State<Arc<ServerState>>,
    Path(hash): Path<String>,
) -> WebResult<Json<BaseResponse<BuildStatusResponse>>> {
    let build = get_build_by_hash(&state.db, &hash).await?;

    Ok(respond(BuildStatusResponse::try_from(build)?))
}

pub async fn get_download(
    State(state): State<Arc<ServerState>>,
    Path(hash): Path<String>,
) -> WebResult<Response> {
    let (build, path) = get_build_file(&state.db, &hash).await?;

    let file = tokio::fs::File::open(&path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}.tar.gz\"",
        build.build_hash
    ))
    .context("Invalid archive file name")?;

    let mut response = Response::builder()
        .status(StatusCode::OK)
        .header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        )
        .header(header::CONTENT_DISPOSITION, disposition);

    if let Some(size) = build.total_size {
        response = response.header(header::CONTENT_LENGTH, size);
    }

    debug!(build_hash = %build.build_hash, "Streaming package archive");

    let body = Body::from_stream(ReaderStream::new(file));
    response
        .body(body)
        .context("Failed to build download response")
        .map_err(WebError::from)
}
