//! Source backed by repository checkouts on the local filesystem

use crate::error::{RemoteError, RemoteResult};
use crate::source::{DirEntry, EntryKind, SpecSource};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Serves `{root}/{repo}/{path}`. The branch is ignored; whatever is checked
/// out is what gets read.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, repo: &str, path: &str) -> PathBuf {
        self.root.join(repo).join(path.trim_start_matches('/'))
    }
}

#[async_trait]
impl SpecSource for LocalSource {
    async fn list_directory(
        &self,
        repo: &str,
        dir: &str,
        _branch: &str,
    ) -> RemoteResult<Vec<DirEntry>> {
        let full = self.resolve(repo, dir);
        if !fs::metadata(&full).await?.is_dir() {
            return Err(RemoteError::NotADirectory(full.display().to_string()));
        }

        let mut entries = Vec::new();
        let mut reader = fs::read_dir(&full).await?;
        while let Some(item) = reader.next_entry().await? {
            let name = item.file_name().to_string_lossy().into_owned();
            let file_type = item.file_type().await?;
            let kind = if file_type.is_file() {
                EntryKind::File
            } else if file_type.is_dir() {
                EntryKind::Dir
            } else {
                EntryKind::Other
            };
            entries.push(DirEntry {
                path: format!("{}/{}", dir.trim_end_matches('/'), name),
                download_url: (kind == EntryKind::File)
                    .then(|| item.path().to_string_lossy().into_owned()),
                name,
                kind,
            });
        }

        // Listing order matches the contents API
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn read_entry(&self, entry: &DirEntry) -> RemoteResult<String> {
        let location = entry
            .download_url
            .as_deref()
            .ok_or_else(|| RemoteError::MissingDownloadUrl(entry.path.clone()))?;
        Ok(fs::read_to_string(location).await?)
    }

    async fn read_file(&self, repo: &str, path: &str, _branch: &str) -> RemoteResult<String> {
        Ok(fs::read_to_string(self.resolve(repo, path)).await?)
    }
}
