use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use crate::error::DiscoveryError;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// One entry found in the batch folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub path: PathBuf,
    pub name: String,
    pub is_directory: bool,
}

pub struct FolderScanner {
    recursive: bool,
    include_hidden: bool,
}

impl FolderScanner {
    pub fn new() -> Self {
        Self {
            recursive: false,
            include_hidden: false,
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn include_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = include_hidden;
        self
    }

    /// Lists the folder's entries sorted by file name.
    ///
    /// Only the top level is listed unless the scanner is recursive.
    pub fn list_files<P: AsRef<Path>>(
        &self,
        folder: P,
    ) -> Result<Vec<DirectoryEntry>, DiscoveryError> {
        let folder = folder.as_ref();
        if !folder.is_dir() {
            return Err(DiscoveryError::NotADirectory(folder.to_path_buf()));
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let include_hidden = self.include_hidden;
        let mut entries = Vec::new();

        let walker = WalkDir::new(folder)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| include_hidden || !is_hidden(e.file_name()));

        for entry in walker {
            let entry = entry.map_err(|e| DiscoveryError::ReadDirectory {
                path: folder.to_path_buf(),
                source: e,
            })?;

            let name = entry.file_name().to_string_lossy().to_string();
            debug!("Found entry: {}", entry.path().display());
            entries.push(DirectoryEntry {
                path: entry.path().to_path_buf(),
                name,
                is_directory: entry.file_type().is_dir(),
            });
        }

        info!("Listed {} entries in {}", entries.len(), folder.display());
        Ok(entries)
    }
}

impl Default for FolderScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|s| s.starts_with('.')).unwrap_or(false)
}

/// Guesses a MIME type from a file name's extension.
pub fn detect_content_type(name: &str) -> String {
    mime_guess::from_path(name)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
}
