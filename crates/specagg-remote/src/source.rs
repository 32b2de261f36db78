//! Abstraction over where service spec files live

use crate::error::RemoteResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    #[serde(other)]
    Other,
}

/// One entry of a directory listing, shaped like the GitHub contents API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    /// Path relative to the repository root
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Location the raw content is read from
    #[serde(default)]
    pub download_url: Option<String>,
}

impl DirEntry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Read access to repositories at a given branch or ref
#[async_trait]
pub trait SpecSource: Send + Sync {
    /// List the entries of `dir` inside `repo`
    async fn list_directory(&self, repo: &str, dir: &str, branch: &str)
        -> RemoteResult<Vec<DirEntry>>;

    /// Read the raw content of a listed entry
    async fn read_entry(&self, entry: &DirEntry) -> RemoteResult<String>;

    /// Read the raw content of a file by path
    async fn read_file(&self, repo: &str, path: &str, branch: &str) -> RemoteResult<String>;
}
