/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Durable build queue backed by the `build_queue` table.
//!
//! Entries are inserted inside the intake transaction, so a consumer only ever
//! sees jobs whose build record is already committed.

use chrono::{NaiveDateTime, Utc};
use entity::package_build::PackageBuildStatus;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};
use tracing::debug;

use super::types::*;

pub async fn enqueue<C: ConnectionTrait>(db: &C, build_id: i64) -> Result<MBuildQueue, DbErr> {
    let job = ABuildQueue {
        id: NotSet,
        build: Set(build_id),
        enqueued_at: Set(Utc::now().naive_utc()),
        claimed_at: Set(None),
        finished_at: Set(None),
    };

    job.insert(db).await
}

/// Claims the oldest unclaimed job. Only the caller whose conditional update
/// hits the row owns the job; a lost race moves on to the next candidate.
pub async fn claim_next(db: &DatabaseConnection) -> Result<Option<MBuildQueue>, DbErr> {
    loop {
        let Some(job) = EBuildQueue::find()
            .filter(CBuildQueue::ClaimedAt.is_null())
            .order_by_asc(CBuildQueue::Id)
            .one(db)
            .await?
        else {
            return Ok(None);
        };

        let now = Utc::now().naive_utc();
        let result = EBuildQueue::update_many()
            .col_expr(CBuildQueue::ClaimedAt, Expr::value(now))
            .filter(CBuildQueue::Id.eq(job.id))
            .filter(CBuildQueue::ClaimedAt.is_null())
            .exec(db)
            .await?;

        if result.rows_affected == 1 {
            return Ok(Some(MBuildQueue {
                claimed_at: Some(now),
                ..job
            }));
        }

        debug!(job_id = job.id, "Queue entry claimed by another consumer");
    }
}

pub async fn finish(db: &DatabaseConnection, job_id: i64) -> Result<(), DbErr> {
    EBuildQueue::update_many()
        .col_expr(CBuildQueue::FinishedAt, Expr::value(Utc::now().naive_utc()))
        .filter(CBuildQueue::Id.eq(job_id))
        .exec(db)
        .await?;

    Ok(())
}

/// Clears the claim on unfinished jobs whose build is still running so they execute again.
pub async fn release_stale(db: &DatabaseConnection) -> Result<u64, DbErr> {
    let result = EBuildQueue::update_many()
        .col_expr(CBuildQueue::ClaimedAt, Expr::value(None::<NaiveDateTime>))
        .filter(CBuildQueue::ClaimedAt.is_not_null())
        .filter(CBuildQueue::FinishedAt.is_null())
        .filter(CBuildQueue::Build.in_subquery(builds_with_status(true)))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Closes unfinished jobs whose build already reached a terminal status.
pub async fn finish_orphaned(db: &DatabaseConnection) -> Result<u64, DbErr> {
    let result = EBuildQueue::update_many()
        .col_expr(CBuildQueue::FinishedAt, Expr::value(Utc::now().naive_utc()))
        .filter(CBuildQueue::FinishedAt.is_null())
        .filter(CBuildQueue::Build.in_subquery(builds_with_status(false)))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

fn builds_with_status(building: bool) -> sea_orm::sea_query::SelectStatement {
    let condition = if building {
        CPackageBuild::Status.eq(PackageBuildStatus::Building)
    } else {
        CPackageBuild::Status.ne(PackageBuildStatus::Building)
    };

    Query::select()
        .column(CPackageBuild::Id)
        .from(EPackageBuild::default())
        .and_where(condition)
        .to_owned()
}
