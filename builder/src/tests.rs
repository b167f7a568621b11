/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use addonpack_core::executer::{CommandOutput, CommandRunner};
use addonpack_core::selection::{ResolvedAddonSelection, encode_selections};
use addonpack_core::types::*;
use async_trait::async_trait;
use chrono::NaiveDate;
use entity::package_build::PackageBuildStatus;
use mockall::mock;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use crate::pipeline::{BuildPlan, BuildStore, PipelineConfig, run_build};
use crate::scheduler::{BuildWorker, execute_job, run_job};
use crate::store::DatabaseBuildStore;

pub fn selection(name: &str, install_order: i32, sso_capable: bool) -> ResolvedAddonSelection {
    ResolvedAddonSelection {
        addon_id: install_order as i64,
        name: name.to_string(),
        display_name: name.to_uppercase(),
        category: "DEVOPS".to_string(),
        version: Some("1.0.0".to_string()),
        helm_repo_url: Some(format!("https://charts.example.org/{}", name)),
        helm_chart_name: Some(name.to_string()),
        helm_chart_version: Some("1.0.0-chart".to_string()),
        upstream_images: vec![],
        image_tags: None,
        sso_capable,
        install_order,
    }
}

pub fn plan(selections: Vec<ResolvedAddonSelection>) -> BuildPlan {
    BuildPlan {
        build_id: 1,
        build_hash: "0123456789abcdef".to_string(),
        namespace: "devops".to_string(),
        domain: "example.com".to_string(),
        tls_enabled: false,
        keycloak_enabled: false,
        airgapped: false,
        registry_url: None,
        selections,
    }
}

fn timestamp() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 12)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn build_record(id: i64, status: PackageBuildStatus, selected_addons: String) -> MPackageBuild {
    MPackageBuild {
        id,
        customer: Some(1),
        project: None,
        build_hash: "feedfacecafebeef".to_string(),
        selected_addons,
        namespace: "devops".to_string(),
        domain: "corp.io".to_string(),
        tls_enabled: true,
        keycloak_enabled: false,
        airgapped: true,
        registry_url: Some("  ".to_string()),
        built_by: None,
        deploy_env: None,
        platform: None,
        status,
        progress: 0,
        file_path: None,
        total_size: None,
        expires_at: timestamp(),
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum StoreEvent {
    Progress(i32),
    Success(String, i64),
    Failed,
}

#[derive(Default)]
struct RecordingStore {
    events: Mutex<Vec<StoreEvent>>,
    reject_success: bool,
    reject_failure: bool,
}

impl RecordingStore {
    fn rejecting(success: bool, failure: bool) -> Self {
        Self {
            reject_success: success,
            reject_failure: failure,
            ..Self::default()
        }
    }

    fn events(&self) -> Vec<StoreEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl BuildStore for RecordingStore {
    async fn set_progress(&self, _build_id: i64, progress: i32) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(StoreEvent::Progress(progress));
        Ok(())
    }

    async fn mark_success(&self, _build_id: i64, file_path: &str, total_size: i64) -> anyhow::Result<()> {
        if self.reject_success {
            anyhow::bail!("connection reset");
        }

        self.events
            .lock()
            .unwrap()
            .push(StoreEvent::Success(file_path.to_string(), total_size));
        Ok(())
    }

    async fn mark_failed(&self, _build_id: i64) -> anyhow::Result<()> {
        if self.reject_failure {
            anyhow::bail!("connection reset");
        }

        self.events.lock().unwrap().push(StoreEvent::Failed);
        Ok(())
    }
}

mock! {
    pub Runner {}

    #[async_trait]
    impl CommandRunner for Runner {
        async fn run(&self, program: &str, args: &[String], timeout: Duration) -> anyhow::Result<CommandOutput>;
    }
}

fn config(storage: &TempDir) -> PipelineConfig {
    PipelineConfig {
        storage_path: storage.path().to_path_buf(),
        binpath_helm: "helm".to_string(),
        binpath_docker: "docker".to_string(),
        command_timeout: Duration::from_secs(5),
    }
}

fn unreachable_runner() -> MockRunner {
    let mut runner = MockRunner::new();
    runner.expect_run().never();
    runner
}

#[test]
fn test_build_plan_from_record() {
    let selections = vec![selection("gitea", 40, true)];
    let record = build_record(
        7,
        PackageBuildStatus::Building,
        encode_selections(&selections).unwrap(),
    );

    let plan = BuildPlan::try_from(&record).unwrap();
    assert_eq!(plan.build_id, 7);
    assert_eq!(plan.build_hash, "feedfacecafebeef");
    assert_eq!(plan.domain, "corp.io");
    assert_eq!(plan.registry_url, None);
    assert_eq!(plan.selections, selections);
    assert_eq!(plan.archive_name(), "feedfacecafebeef.tar.gz");
}

#[test]
fn test_build_plan_rejects_corrupt_snapshot() {
    let record = build_record(7, PackageBuildStatus::Building, "{not json".to_string());
    assert!(BuildPlan::try_from(&record).is_err());
}

#[tokio::test]
async fn test_online_build_runs_no_commands() {
    let storage = TempDir::new().unwrap();
    let store = RecordingStore::default();
    let plan = plan(vec![selection("cert-manager", 10, false)]);

    let status = run_build(&store, &unreachable_runner(), &config(&storage), &plan)
        .await
        .unwrap();

    assert_eq!(status, PackageBuildStatus::Success);
    assert!(storage.path().join("0123456789abcdef.tar.gz").exists());
    assert!(!storage.path().join("0123456789abcdef").exists());

    let events = store.events();
    assert_eq!(
        events[..events.len() - 1],
        [5, 15, 25, 30, 35, 82, 85, 88, 95].map(StoreEvent::Progress)
    );
    match events.last() {
        Some(StoreEvent::Success(path, size)) => {
            assert!(path.ends_with("0123456789abcdef.tar.gz"));
            assert!(*size > 0);
        }
        other => panic!("unexpected final event {:?}", other),
    }
}

#[tokio::test]
async fn test_command_errors_are_soft_failures() {
    let storage = TempDir::new().unwrap();
    let store = RecordingStore::default();
    let mut sel = selection("harbor", 30, true);
    sel.upstream_images = vec!["goharbor/harbor-core".to_string()];
    let mut plan = plan(vec![sel]);
    plan.airgapped = true;

    let mut runner = MockRunner::new();
    runner
        .expect_run()
        .returning(|program, _, _| Err(anyhow::anyhow!("{} timed out after 5s", program)));

    let status = run_build(&store, &runner, &config(&storage), &plan)
        .await
        .unwrap();

    assert_eq!(status, PackageBuildStatus::Success);
    assert!(store.events().contains(&StoreEvent::Progress(80)));
}

#[tokio::test]
async fn test_unusable_storage_marks_failed() {
    let storage = TempDir::new().unwrap();
    let blocker = storage.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();

    let store = RecordingStore::default();
    let config = PipelineConfig {
        storage_path: blocker,
        ..config(&storage)
    };

    let status = run_build(
        &store,
        &unreachable_runner(),
        &config,
        &plan(vec![selection("vault", 60, true)]),
    )
    .await
    .unwrap();

    assert_eq!(status, PackageBuildStatus::Failed);
    assert_eq!(store.events(), vec![StoreEvent::Failed]);
}

#[tokio::test]
async fn test_stale_work_dir_is_replaced() {
    let storage = TempDir::new().unwrap();
    let stale = storage.path().join("0123456789abcdef");
    std::fs::create_dir_all(&stale).unwrap();
    std::fs::write(stale.join("leftover.txt"), "old").unwrap();

    let store = RecordingStore::default();
    run_build(
        &store,
        &unreachable_runner(),
        &config(&storage),
        &plan(vec![selection("vault", 60, true)]),
    )
    .await
    .unwrap();

    let file = std::fs::File::open(storage.path().join("0123456789abcdef.tar.gz")).unwrap();
    let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(file));
    let names: Vec<String> = archive
        .entries()
        .unwrap()
        .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
        .collect();

    assert!(names.iter().any(|n| n.ends_with("deploy.sh")));
    assert!(!names.iter().any(|n| n.contains("leftover.txt")));
    assert!(!stale.exists());
}

fn update_db(rows_affected: u64) -> sea_orm::DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }])
        .into_connection()
}

fn mock_state(db: sea_orm::DatabaseConnection) -> Arc<ServerState> {
    use clap::Parser;

    Arc::new(ServerState {
        db,
        cli: Cli::parse_from(["addonpack-server", "--database-url", "mock://test"]),
        build_notify: tokio::sync::Notify::new(),
    })
}

fn logged(state: Arc<ServerState>) -> String {
    let state = Arc::try_unwrap(state).unwrap();
    format!("{:?}", state.db.into_transaction_log())
}

#[tokio::test]
async fn test_store_progress_only_rises() {
    let state = mock_state(update_db(1));
    DatabaseBuildStore::new(Arc::clone(&state))
        .set_progress(9, 40)
        .await
        .unwrap();

    let log = logged(state);
    assert!(log.contains("UPDATE"));
    assert!(log.contains("Int(Some(40))"));
    assert!(log.contains("BigInt(Some(9))"));
    assert!(log.contains("<"));
}

#[tokio::test]
async fn test_store_success_records_artifact() {
    let state = mock_state(update_db(1));
    DatabaseBuildStore::new(Arc::clone(&state))
        .mark_success(9, "/tmp/addonpack/packages/abc.tar.gz", 2048)
        .await
        .unwrap();

    let log = logged(state);
    assert!(log.contains("SmallInt(Some(1))"));
    assert!(log.contains("Int(Some(100))"));
    assert!(log.contains("BigInt(Some(2048))"));
    assert!(log.contains("abc.tar.gz"));
    assert!(log.contains("SmallInt(Some(0))"));
}

#[tokio::test]
async fn test_store_failure_is_conditional() {
    let state = mock_state(update_db(0));
    DatabaseBuildStore::new(Arc::clone(&state))
        .mark_failed(9)
        .await
        .unwrap();

    let log = logged(state);
    assert!(log.contains("SmallInt(Some(2))"));
    assert!(log.contains("Int(Some(-1))"));
    assert!(log.contains("SmallInt(Some(0))"));
}

fn worker(db: sea_orm::DatabaseConnection, store: Arc<RecordingStore>, storage: &TempDir) -> BuildWorker {
    BuildWorker {
        state: mock_state(db),
        store,
        runner: Arc::new(unreachable_runner()),
        config: Arc::new(config(storage)),
    }
}

fn job(build: i64) -> MBuildQueue {
    MBuildQueue {
        id: 3,
        build,
        enqueued_at: timestamp(),
        claimed_at: Some(timestamp()),
        finished_at: None,
    }
}

#[tokio::test]
async fn test_job_for_missing_build_is_dropped() {
    let storage = TempDir::new().unwrap();
    let store = Arc::new(RecordingStore::default());
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<MPackageBuild>::new()])
        .into_connection();

    let result = run_job(&worker(db, Arc::clone(&store), &storage), &job(11))
        .await
        .unwrap();

    assert_eq!(result, None);
    assert!(store.events().is_empty());
}

#[tokio::test]
async fn test_job_for_finished_build_is_skipped() {
    let storage = TempDir::new().unwrap();
    let store = Arc::new(RecordingStore::default());
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![build_record(
            11,
            PackageBuildStatus::Success,
            "[]".to_string(),
        )]])
        .into_connection();

    let result = run_job(&worker(db, Arc::clone(&store), &storage), &job(11))
        .await
        .unwrap();

    assert_eq!(result, None);
    assert!(store.events().is_empty());
}

#[tokio::test]
async fn test_job_with_corrupt_snapshot_fails_build() {
    let storage = TempDir::new().unwrap();
    let store = Arc::new(RecordingStore::default());
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![build_record(
            11,
            PackageBuildStatus::Building,
            "{not json".to_string(),
        )]])
        .into_connection();

    let result = run_job(&worker(db, Arc::clone(&store), &storage), &job(11))
        .await
        .unwrap();

    assert_eq!(result, Some(PackageBuildStatus::Failed));
    assert_eq!(store.events(), vec![StoreEvent::Failed]);
}

#[tokio::test]
async fn test_job_runs_pipeline() {
    let storage = TempDir::new().unwrap();
    let store = Arc::new(RecordingStore::default());
    let mut record = build_record(
        11,
        PackageBuildStatus::Building,
        encode_selections(&[selection("gitea", 40, true)]).unwrap(),
    );
    record.airgapped = false;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![record]])
        .into_connection();

    let result = run_job(&worker(db, Arc::clone(&store), &storage), &job(11))
        .await
        .unwrap();

    assert_eq!(result, Some(PackageBuildStatus::Success));
    assert!(storage.path().join("feedfacecafebeef.tar.gz").exists());
}

#[tokio::test]
async fn test_unstored_success_falls_back_to_failed() {
    let storage = TempDir::new().unwrap();
    let store = RecordingStore::rejecting(true, false);

    let status = run_build(
        &store,
        &unreachable_runner(),
        &config(&storage),
        &plan(vec![selection("vault", 60, true)]),
    )
    .await
    .unwrap();

    assert_eq!(status, PackageBuildStatus::Failed);
    assert_eq!(store.events().last(), Some(&StoreEvent::Failed));
    assert!(!storage.path().join("0123456789abcdef.tar.gz").exists());
    assert!(!storage.path().join("0123456789abcdef").exists());
}

fn running_record() -> MPackageBuild {
    let mut record = build_record(
        11,
        PackageBuildStatus::Building,
        encode_selections(&[selection("gitea", 40, true)]).unwrap(),
    );
    record.airgapped = false;
    record
}

async fn permit() -> tokio::sync::OwnedSemaphorePermit {
    Arc::new(tokio::sync::Semaphore::new(1))
        .acquire_owned()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_job_without_terminal_state_stays_queued() {
    let storage = TempDir::new().unwrap();
    let store = Arc::new(RecordingStore::rejecting(true, true));
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![running_record()]])
        .into_connection();

    let worker = worker(db, Arc::clone(&store), &storage);
    let state = Arc::clone(&worker.state);
    execute_job(worker, job(11), permit().await).await;

    assert!(!store.events().contains(&StoreEvent::Failed));
    assert!(!storage.path().join("feedfacecafebeef.tar.gz").exists());

    let log = logged(state);
    assert!(!log.contains("build_queue"));
}

#[tokio::test]
async fn test_finished_job_closes_queue_entry() {
    let storage = TempDir::new().unwrap();
    let store = Arc::new(RecordingStore::default());
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![running_record()]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    let worker = worker(db, Arc::clone(&store), &storage);
    let state = Arc::clone(&worker.state);
    execute_job(worker, job(11), permit().await).await;

    assert!(matches!(store.events().last(), Some(StoreEvent::Success(_, _))));

    let log = logged(state);
    assert!(log.contains("UPDATE"));
    assert!(log.contains("build_queue"));
    assert!(log.contains("finished_at"));
}
