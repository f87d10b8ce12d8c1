//! Folder to finished batch: discovery, slot matching and the driver together.

mod common;

use std::sync::Arc;

use tempfile::TempDir;

use batchflow::config::load_config_from_str;
use batchflow::{build_tasks, new_job_id, BatchDriver, ControlState, TaskStatus};

use common::*;

const CONFIG: &str = r#"{
    "version": "1.0",
    "slots": [
        { "id": "12", "slotType": "image", "accept": ["image/*"] },
        { "id": "31", "slotType": "video", "accept": ["video/*"] }
    ],
    "eventCapacity": 64
}"#;

fn photo_folder() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("01_beach.jpg"), b"jpg").unwrap();
    std::fs::write(dir.path().join("02_readme.txt"), b"text").unwrap();
    std::fs::write(dir.path().join("03_corrupt.png"), b"png").unwrap();
    std::fs::write(dir.path().join("04_clip.mp4"), b"mp4").unwrap();
    std::fs::create_dir(dir.path().join("05_album")).unwrap();
    dir
}

#[tokio::test]
async fn test_folder_runs_to_completion() {
    let folder = photo_folder();
    let config = load_config_from_str(CONFIG).unwrap();
    let tasks = build_tasks(folder.path(), &config).unwrap();
    assert_eq!(tasks.len(), 4);

    let handle = BatchDriver::new(Arc::new(AutoEngine))
        .with_config(&config)
        .spawn();
    let job_id = new_job_id();
    handle
        .initialize(folder.path().to_string_lossy(), tasks, job_id.clone())
        .await
        .unwrap();
    handle.start().await.unwrap();

    let snapshot = wait_until(&handle, |s| s.control_state == ControlState::Completed).await;
    assert_eq!(snapshot.job_id, job_id);

    let statuses: Vec<TaskStatus> = snapshot.tasks.iter().map(|t| t.status).collect();
    assert_eq!(
        statuses,
        vec![
            TaskStatus::Completed,
            TaskStatus::Skipped,
            TaskStatus::Failed,
            TaskStatus::Completed,
        ]
    );
    assert_eq!(snapshot.tasks[2].error.as_deref(), Some("decode failed"));
    assert_eq!(snapshot.tasks[3].matched_slot_type.as_deref(), Some("video"));

    let progress = handle.progress().await.unwrap();
    assert_eq!(progress.completed_count, 2);
    assert_eq!(progress.failed_count, 1);
    assert_eq!(progress.skipped_count, 1);
    assert_eq!(progress.progress_percent, 100.0);
}

#[tokio::test]
async fn test_folder_without_matches_only_skips() {
    let folder = TempDir::new().unwrap();
    std::fs::write(folder.path().join("notes.txt"), b"text").unwrap();

    let config = load_config_from_str(CONFIG).unwrap();
    let tasks = build_tasks(folder.path(), &config).unwrap();
    assert!(tasks.iter().all(|t| !t.is_matched()));

    let engine = Arc::new(ManualEngine::new());
    let handle = BatchDriver::new(engine.clone()).spawn();
    handle.initialize("/notes", tasks, "job-notes").await.unwrap();
    handle.start().await.unwrap();

    let snapshot = wait_until(&handle, |s| s.control_state == ControlState::Completed).await;
    assert_eq!(snapshot.skipped_count(), 1);
    assert_eq!(engine.run_count(), 0);
}

#[tokio::test]
async fn test_empty_folder_never_starts() {
    let folder = TempDir::new().unwrap();
    let config = load_config_from_str(CONFIG).unwrap();
    let tasks = build_tasks(folder.path(), &config).unwrap();
    assert!(tasks.is_empty());

    let handle = BatchDriver::new(Arc::new(AutoEngine)).spawn();
    handle.initialize("/empty", tasks, "job-empty").await.unwrap();
    assert_eq!(handle.start().await.unwrap(), ControlState::Idle);

    let progress = handle.progress().await.unwrap();
    assert_eq!(progress.current_index, -1);
    assert_eq!(progress.elapsed_ms, 0);
    assert_eq!(progress.progress_percent, 0.0);
}
