//! GitHub contents API source

use crate::error::{RemoteError, RemoteResult};
use crate::source::{DirEntry, SpecSource};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use serde_json::Value as JsonValue;
use std::time::Duration;

pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("specagg/", env!("CARGO_PKG_VERSION"));

/// Reads spec files through `GET /repos/{repo}/contents/{path}?ref={branch}`
#[derive(Debug, Clone)]
pub struct GitHubSource {
    client: Client,
    api_url: String,
    token: String,
}

impl GitHubSource {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> RemoteResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self::with_client(client, api_url, token))
    }

    pub fn with_client(client: Client, api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn contents_url(&self, repo: &str, path: &str) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.api_url,
            repo,
            path.trim_start_matches('/')
        )
    }

    /// Metadata for a file, or the listing for a directory
    async fn contents(&self, repo: &str, path: &str, branch: &str) -> RemoteResult<JsonValue> {
        let url = self.contents_url(repo, path);
        tracing::debug!(repo, path, branch, "querying contents API");

        let response = self
            .client
            .get(&url)
            .query(&[("ref", branch)])
            .bearer_auth(&self.token)
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .await?;
        Ok(ensure_success(response, &url)?.json().await?)
    }
}

fn ensure_success(response: Response, url: &str) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(RemoteError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl SpecSource for GitHubSource {
    async fn list_directory(
        &self,
        repo: &str,
        dir: &str,
        branch: &str,
    ) -> RemoteResult<Vec<DirEntry>> {
        let listing = self.contents(repo, dir, branch).await?;
        if !listing.is_array() {
            return Err(RemoteError::NotADirectory(format!("{}/{}", repo, dir)));
        }
        serde_json::from_value(listing).map_err(|e| RemoteError::parse(dir, e))
    }

    async fn read_entry(&self, entry: &DirEntry) -> RemoteResult<String> {
        let url = entry
            .download_url
            .as_deref()
            .ok_or_else(|| RemoteError::MissingDownloadUrl(entry.path.clone()))?;

        let response = self.client.get(url).send().await?;
        Ok(ensure_success(response, url)?.text().await?)
    }

    async fn read_file(&self, repo: &str, path: &str, branch: &str) -> RemoteResult<String> {
        let metadata = self.contents(repo, path, branch).await?;
        let entry: DirEntry =
            serde_json::from_value(metadata).map_err(|e| RemoteError::parse(path, e))?;
        self.read_entry(&entry).await
    }
}
