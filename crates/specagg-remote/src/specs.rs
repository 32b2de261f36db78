//! Discover and load every spec file of one service

use crate::error::RemoteResult;
use crate::fetcher::parse_document;
use crate::resolver::{RefResolver, ResolutionCache};
use crate::source::{DirEntry, SpecSource};
use futures::future::join_all;
use serde_json::Value as JsonValue;
use specagg_core::{ServiceDescriptor, SpecDocument, SpecFile};

pub fn is_spec_file(name: &str) -> bool {
    name.ends_with(".yml") || name.ends_with(".yaml")
}

/// Fetch, parse and resolve the spec files of `service` at `branch`.
///
/// A listing failure or an empty specs directory yields no files; a file
/// that cannot be read or parsed is skipped.
pub async fn fetch_service_specs(
    source: &dyn SpecSource,
    service: &ServiceDescriptor,
    branch: &str,
) -> Vec<SpecFile> {
    tracing::info!(service = %service.name, repo = %service.repo, "fetching specs");

    let entries = match source
        .list_directory(&service.repo, &service.specs_path, branch)
        .await
    {
        Ok(entries) => entries,
        Err(err) => {
            tracing::error!(
                service = %service.name,
                repo = %service.repo,
                error = %err,
                "failed to list specs directory"
            );
            return Vec::new();
        }
    };

    let spec_entries: Vec<DirEntry> = entries
        .into_iter()
        .filter(|entry| entry.is_file() && is_spec_file(&entry.name))
        .collect();
    if spec_entries.is_empty() {
        tracing::warn!(
            service = %service.name,
            repo = %service.repo,
            specs_path = %service.specs_path,
            "no spec files found"
        );
        return Vec::new();
    }
    for entry in &spec_entries {
        tracing::info!(service = %service.name, file = %entry.name, "found spec file");
    }

    let loaded = join_all(spec_entries.iter().map(|entry| async move {
        match load_entry(source, entry).await {
            Ok(document) => Some((entry.name.clone(), document)),
            Err(err) => {
                tracing::error!(
                    service = %service.name,
                    file = %entry.name,
                    error = %err,
                    "failed to load spec file"
                );
                None
            }
        }
    }))
    .await;

    // One cache per service; resolution runs file by file so later files
    // reuse what earlier ones fetched.
    let resolver = RefResolver::new(source, &service.repo, &service.specs_path, branch);
    let mut cache = ResolutionCache::new();
    let mut specs = Vec::new();
    for (file_name, raw) in loaded.into_iter().flatten() {
        let resolved = resolver.resolve(raw, &mut cache).await;
        match SpecDocument::from_value(resolved) {
            Ok(document) => specs.push(SpecFile {
                file_name,
                document,
            }),
            Err(err) => tracing::warn!(
                service = %service.name,
                file = %file_name,
                error = %err,
                "skipping spec file"
            ),
        }
    }

    tracing::info!(
        service = %service.name,
        files = specs.len(),
        referenced = cache.len(),
        "fetched specs"
    );
    specs
}

async fn load_entry(source: &dyn SpecSource, entry: &DirEntry) -> RemoteResult<JsonValue> {
    let content = source.read_entry(entry).await?;
    parse_document(&entry.path, &content)
}
