//! File and directory accessors. Every path goes through the sanitizer
//! before the filesystem is touched.

use std::path::PathBuf;

use porta_core::{DirEntry, EntryKind, FsError};

use crate::path::{PathSanitizer, PathScope};

/// Text content of a file that was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub path: PathBuf,
    pub content: String,
}

/// Immediate children of a directory, dirs first then by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirListing {
    pub path: PathBuf,
    pub entries: Vec<DirEntry>,
}

#[derive(Debug, Clone)]
pub struct FileAccessor {
    sanitizer: PathSanitizer,
}

impl FileAccessor {
    pub fn new(sanitizer: PathSanitizer) -> Self {
        Self { sanitizer }
    }

    pub fn sanitizer(&self) -> &PathSanitizer {
        &self.sanitizer
    }

    /// Write `content` to `path`, replacing anything already there. Parent
    /// directories are created as needed. Returns the resolved path.
    pub async fn write_file(&self, path: &str, content: &str) -> Result<PathBuf, FsError> {
        let full_path = self.sanitizer.sanitize(path, PathScope::File)?;
        let shown = full_path.display().to_string();

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FsError::from_io(&shown, &e))?;
        }
        tokio::fs::write(&full_path, content)
            .await
            .map_err(|e| FsError::from_io(&shown, &e))?;

        tracing::info!(path = %shown, bytes = content.len(), "File written");
        Ok(full_path)
    }

    /// Read `path` as UTF-8 text.
    pub async fn read_file(&self, path: &str) -> Result<FileContent, FsError> {
        let full_path = self.sanitizer.sanitize(path, PathScope::File)?;
        let shown = full_path.display().to_string();

        let metadata = tokio::fs::metadata(&full_path)
            .await
            .map_err(|e| FsError::from_io(&shown, &e))?;
        if !metadata.is_file() {
            return Err(FsError::NotAFile { path: shown });
        }

        let bytes = tokio::fs::read(&full_path)
            .await
            .map_err(|e| FsError::from_io(&shown, &e))?;
        let content =
            String::from_utf8(bytes).map_err(|_| FsError::Decode { path: shown.clone() })?;

        tracing::info!(path = %shown, bytes = content.len(), "File read");
        Ok(FileContent {
            path: full_path,
            content,
        })
    }

    /// List the immediate children of `path`. Hidden entries (leading dot)
    /// are skipped unless `include_hidden` is set.
    pub async fn list_dir(&self, path: &str, include_hidden: bool) -> Result<DirListing, FsError> {
        let full_path = self.sanitizer.sanitize(path, PathScope::Listing)?;
        let shown = full_path.display().to_string();

        let metadata = tokio::fs::metadata(&full_path)
            .await
            .map_err(|e| FsError::from_io(&shown, &e))?;
        if !metadata.is_dir() {
            return Err(FsError::NotADirectory { path: shown });
        }

        let mut reader = tokio::fs::read_dir(&full_path)
            .await
            .map_err(|e| FsError::from_io(&shown, &e))?;

        let mut entries = Vec::new();
        while let Some(item) = reader
            .next_entry()
            .await
            .map_err(|e| FsError::from_io(&shown, &e))?
        {
            let name = item.file_name().to_string_lossy().into_owned();
            if !include_hidden && name.starts_with('.') {
                continue;
            }
            // Follows symlinks; a dangling link counts as a file.
            let kind = match tokio::fs::metadata(item.path()).await {
                Ok(meta) if meta.is_dir() => EntryKind::Dir,
                _ => EntryKind::File,
            };
            entries.push(DirEntry { name, kind });
        }
        DirEntry::sort_listing(&mut entries);

        tracing::info!(path = %shown, count = entries.len(), "Directory listed");
        Ok(DirListing {
            path: full_path,
            entries,
        })
    }
}
