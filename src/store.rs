//! Content stores: where repository files come from.
//!
//! A [`ContentStore`] exposes a repository as paths relative to its root
//! (`agents/bam/WORKING.md`, `notes/voice`). Two implementations exist:
//!
//! | Store | Backing |
//! |-------|---------|
//! | [`GitHubStore`](crate::store_github::GitHubStore) | GitHub contents API over HTTPS |
//! | [`LocalStore`](crate::store_local::LocalStore) | A checkout on the local filesystem |
//!
//! [`RepoDataSource`](crate::repo_source::RepoDataSource) turns either into a
//! full data source.

use async_trait::async_trait;
use serde::Deserialize;

/// Errors a store can report. Callers match on [`StoreError::NotFound`] to
/// treat optional files as absent.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unexpected HTTP status {status} for {path}")]
    Status { status: u16, path: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    #[serde(other)]
    Other,
}

/// One entry of a directory listing. `path` is relative to the store root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Human-readable location, for logs and `cmdc sources`.
    fn describe(&self) -> String;

    /// Entries directly under `path`. A missing directory is an empty listing.
    async fn list_dir(&self, path: &str) -> Result<Vec<DirEntry>, StoreError>;

    /// Full text of the file at `path`. A missing file is [`StoreError::NotFound`].
    async fn read(&self, path: &str) -> Result<String, StoreError>;

    /// Drop anything cached so the next call sees fresh content.
    fn invalidate(&self) {}
}

/// [`ContentStore::read`] with `NotFound` mapped to `None`.
pub async fn read_optional<S: ContentStore + ?Sized>(
    store: &S,
    path: &str,
) -> Result<Option<String>, StoreError> {
    match store.read(path).await {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Join a relative directory and a file name the way both stores expect.
pub fn join_path(dir: &str, name: &str) -> String {
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}
