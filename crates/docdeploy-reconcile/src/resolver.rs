//! Maps a stored procedure's logical name to its source text.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::ResolveError;

/// Directories never searched for stored procedure sources.
const SKIPPED_DIRS: &[&str] = &["target", "node_modules"];

/// Resolves stored procedure bodies by logical name.
#[async_trait]
pub trait ContentResolver: Send + Sync {
    /// Returns the raw body for `name`.
    ///
    /// # Errors
    ///
    /// `ContentNotFound` when nothing matches, `AmbiguousContent` when more
    /// than one source matches.
    async fn resolve(&self, name: &str) -> Result<String, ResolveError>;
}

/// Finds sources by file-name prefix anywhere under a project root.
///
/// `SP1` matches `SP1.js` and `scripts/SP1.sproc.js`, but also `SP10.js`,
/// which then makes `SP1` ambiguous. Symlinked files are followed;
/// symlinked directories are not descended into.
#[derive(Debug, Clone)]
pub struct FsContentResolver {
    root: PathBuf,
}

impl FsContentResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All regular files under the root whose name starts with `name`, sorted.
    pub async fn find_matches(&self, name: &str) -> Result<Vec<PathBuf>, ResolveError> {
        let mut matches = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await.map_err(|source| {
                ResolveError::Io {
                    path: dir.clone(),
                    source,
                }
            })?;
            while let Some(entry) = entries.next_entry().await.map_err(|source| {
                ResolveError::Io {
                    path: dir.clone(),
                    source,
                }
            })? {
                let path = entry.path();
                let file_type = entry.file_type().await.map_err(|source| ResolveError::Io {
                    path: path.clone(),
                    source,
                })?;
                let file_name = entry.file_name();
                let file_name = file_name.to_string_lossy();

                if file_type.is_dir() {
                    if !is_skipped_dir(&file_name) {
                        pending.push(path);
                    }
                } else if file_name.starts_with(name) && is_source_file(&path, file_type).await {
                    matches.push(path);
                }
            }
        }

        matches.sort();
        Ok(matches)
    }
}

/// Regular files match, as do symlinks whose target is a regular file.
/// Broken links are skipped.
async fn is_source_file(path: &Path, file_type: std::fs::FileType) -> bool {
    if file_type.is_file() {
        return true;
    }
    if !file_type.is_symlink() {
        return false;
    }
    match tokio::fs::metadata(path).await {
        Ok(target) => target.is_file(),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "skipping broken symlink");
            false
        }
    }
}

fn is_skipped_dir(name: &str) -> bool {
    name.starts_with('.') || SKIPPED_DIRS.contains(&name)
}

#[async_trait]
impl ContentResolver for FsContentResolver {
    async fn resolve(&self, name: &str) -> Result<String, ResolveError> {
        let mut matches = self.find_matches(name).await?;
        match matches.len() {
            0 => Err(ResolveError::ContentNotFound {
                name: name.to_string(),
                searched: self.root.display().to_string(),
            }),
            1 => {
                let path = matches.remove(0);
                debug!(name, path = %path.display(), "resolved stored procedure source");
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| ResolveError::Io { path, source })
            }
            _ => Err(ResolveError::AmbiguousContent {
                name: name.to_string(),
                matches,
            }),
        }
    }
}

/// Resolves bodies from an in-memory map keyed by exact name.
#[derive(Debug, Clone, Default)]
pub struct StaticContentResolver {
    bodies: HashMap<String, String>,
}

impl StaticContentResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.insert(name.into(), body.into());
        self
    }
}

#[async_trait]
impl ContentResolver for StaticContentResolver {
    async fn resolve(&self, name: &str) -> Result<String, ResolveError> {
        self.bodies
            .get(name)
            .cloned()
            .ok_or_else(|| ResolveError::ContentNotFound {
                name: name.to_string(),
                searched: "static content".to_string(),
            })
    }
}
