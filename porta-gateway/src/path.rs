//! Path confinement for file and directory operations.
//!
//! The check is a string heuristic on the caller's raw path: any `..` is
//! rejected, as is any path starting with a sensitive system prefix. The
//! surviving path is resolved against the base directory without touching
//! the filesystem (no symlink resolution, no canonicalization).

use std::path::{Component, Path, PathBuf};

use porta_core::FsError;

/// Prefixes denied for every operation.
pub const DENIED_PREFIXES: &[&str] = &["/etc", "/dev", "/sys"];

/// Extra prefixes denied when listing directories.
pub const LISTING_DENIED_PREFIXES: &[&str] = &["/proc"];

const TRAVERSAL_TOKEN: &str = "..";

/// Which deny-list applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathScope {
    /// Reading or writing a single file.
    File,
    /// Listing a directory.
    Listing,
}

#[derive(Debug, Clone)]
pub struct PathSanitizer {
    base_dir: PathBuf,
}

impl PathSanitizer {
    /// `base_dir` anchors relative paths. It should be absolute.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Anchor relative paths at the process working directory.
    pub fn from_current_dir() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// True when `raw` passes the string checks for `scope`.
    pub fn is_allowed(raw: &str, scope: PathScope) -> bool {
        if raw.contains(TRAVERSAL_TOKEN) {
            return false;
        }
        let denied = DENIED_PREFIXES.iter().any(|prefix| raw.starts_with(prefix));
        let denied_for_listing = scope == PathScope::Listing
            && LISTING_DENIED_PREFIXES
                .iter()
                .any(|prefix| raw.starts_with(prefix));
        !(denied || denied_for_listing)
    }

    /// Validate `raw` and resolve it to an absolute path.
    pub fn sanitize(&self, raw: &str, scope: PathScope) -> Result<PathBuf, FsError> {
        if !Self::is_allowed(raw, scope) {
            tracing::warn!(path = %raw, ?scope, "Rejected path");
            return Err(FsError::InvalidPath {
                path: raw.to_string(),
            });
        }
        Ok(self.resolve(raw))
    }

    /// Lexical resolution: join onto the base when relative, drop `.` and
    /// empty components.
    fn resolve(&self, raw: &str) -> PathBuf {
        let candidate = Path::new(raw);
        let joined = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.base_dir.join(candidate)
        };
        joined
            .components()
            .filter(|component| !matches!(component, Component::CurDir))
            .collect()
    }
}
