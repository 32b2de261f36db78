//! Persist aggregated documents and summarise what was written

use crate::error::RuntimeResult;
use serde::Serialize;
use serde_json::Value as JsonValue;
use specagg_core::AggregatedSpec;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// `{dir}/{audience}-api.openapi.yaml`
pub fn output_path(dir: &Path, audience: &str) -> PathBuf {
    dir.join(format!("{}-api.openapi.yaml", audience))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecSummary {
    pub audience: String,
    pub path: PathBuf,
    pub paths: usize,
    pub schemas: usize,
    pub tags: usize,
    /// Sorted unique `"{description}: {url}"` entries across all operations
    pub servers: Vec<String>,
}

impl SpecSummary {
    pub fn from_spec(audience: &str, path: PathBuf, spec: &AggregatedSpec) -> Self {
        Self {
            audience: audience.to_string(),
            path,
            paths: spec.paths.len(),
            schemas: spec.components.schemas.len(),
            tags: spec.tags.len(),
            servers: operation_servers(spec),
        }
    }
}

fn operation_servers(spec: &AggregatedSpec) -> Vec<String> {
    let mut servers = BTreeSet::new();
    for item in spec.paths.values() {
        for operation in item.values() {
            let Some(list) = operation.get("servers").and_then(JsonValue::as_array) else {
                continue;
            };
            for server in list {
                let url = server.get("url").and_then(JsonValue::as_str).unwrap_or_default();
                match server.get("description").and_then(JsonValue::as_str) {
                    Some(description) => servers.insert(format!("{}: {}", description, url)),
                    None => servers.insert(url.to_string()),
                };
            }
        }
    }
    servers.into_iter().collect()
}

/// Serialise `spec` as YAML into `dir`, creating the directory if needed
pub async fn write_spec(dir: &Path, audience: &str, spec: &AggregatedSpec) -> RuntimeResult<SpecSummary> {
    tokio::fs::create_dir_all(dir).await?;
    let path = output_path(dir, audience);
    let yaml = serde_yaml::to_string(spec)?;
    tokio::fs::write(&path, yaml).await?;

    let summary = SpecSummary::from_spec(audience, path, spec);
    tracing::info!(
        audience,
        path = %summary.path.display(),
        paths = summary.paths,
        schemas = summary.schemas,
        tags = summary.tags,
        servers = summary.servers.len(),
        "generated spec"
    );
    for server in &summary.servers {
        tracing::debug!(audience, server = %server, "server in use");
    }
    Ok(summary)
}
