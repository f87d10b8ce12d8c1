//! Default adapters that turn a folder into a list of batch tasks.
//!
//! The driver never calls these; callers build the task list up front and
//! check for an empty result before starting a batch.

pub mod matcher;
pub mod scanner;

use std::path::Path;

use log::info;

use crate::batch::FileTask;
use crate::config::BatchConfig;
use crate::error::DiscoveryError;

pub use matcher::SlotMatcher;
pub use scanner::{detect_content_type, DirectoryEntry, FolderScanner};

/// Lists `folder`, sniffs each file's content type and matches it to a slot.
///
/// Directories are left out. Files no slot accepts are kept as unmatched
/// tasks so they show up as skipped in the batch.
pub fn build_tasks<P: AsRef<Path>>(
    folder: P,
    config: &BatchConfig,
) -> Result<Vec<FileTask>, DiscoveryError> {
    let folder = folder.as_ref();
    let scanner = FolderScanner::new()
        .recursive(config.recursive)
        .include_hidden(config.include_hidden);
    let matcher = SlotMatcher::new(config.slots.clone());

    let tasks: Vec<FileTask> = scanner
        .list_files(folder)?
        .into_iter()
        .filter(|entry| !entry.is_directory)
        .map(|entry| {
            let content_type = detect_content_type(&entry.name);
            let path = entry.path.to_string_lossy().to_string();
            match matcher.match_to_slot(&content_type) {
                Some(slot) => FileTask::matched(
                    path,
                    entry.name,
                    content_type,
                    slot.slot_type.clone(),
                    slot.id.clone(),
                ),
                None => FileTask::unmatched(path, entry.name, content_type),
            }
        })
        .collect();

    let matched = tasks.iter().filter(|t| t.is_matched()).count();
    info!(
        "Built {} tasks from {} ({} matched to a slot)",
        tasks.len(),
        folder.display(),
        matched
    );
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SlotDefinition;
    use tempfile::TempDir;

    #[test]
    fn test_build_tasks_matches_and_orders() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("b_notes.txt"), b"text").unwrap();
        std::fs::write(temp_dir.path().join("a_photo.png"), b"png").unwrap();
        std::fs::write(temp_dir.path().join("c_clip.mp4"), b"mp4").unwrap();
        std::fs::create_dir(temp_dir.path().join("d_dir")).unwrap();

        let config = BatchConfig {
            slots: vec![
                SlotDefinition::new("12", "image", &["image/*"]),
                SlotDefinition::new("31", "video", &["video/*"]),
            ],
            ..BatchConfig::default()
        };

        let tasks = build_tasks(temp_dir.path(), &config).unwrap();
        assert_eq!(tasks.len(), 3);

        assert_eq!(tasks[0].name, "a_photo.png");
        assert_eq!(tasks[0].content_type, "image/png");
        assert_eq!(tasks[0].target_slot_id.as_deref(), Some("12"));

        assert_eq!(tasks[1].name, "b_notes.txt");
        assert!(!tasks[1].is_matched());

        assert_eq!(tasks[2].matched_slot_type.as_deref(), Some("video"));
    }

    #[test]
    fn test_build_tasks_unreadable_folder() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.png");
        std::fs::write(&file, b"png").unwrap();

        let err = build_tasks(&file, &BatchConfig::default()).unwrap_err();
        assert!(matches!(err, DiscoveryError::NotADirectory(_)));
    }
}
