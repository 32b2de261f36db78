//! End-to-end aggregation run

use crate::error::RuntimeResult;
use crate::output::{write_spec, SpecSummary};
use futures::future::join_all;
use serde::Serialize;
use specagg_config::AggregatorConfig;
use specagg_core::{aggregate_for_audience, AggregatedSpec, AggregationSettings, ServiceSpecs};
use specagg_remote::{fetch_service_specs, GitHubSource, LocalSource, SpecSource};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceReport {
    pub name: String,
    pub files: usize,
}

/// Outcome of one [`Aggregator::run`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub branch: String,
    pub services: Vec<ServiceReport>,
    pub specs: Vec<SpecSummary>,
}

impl RunReport {
    /// Services that contributed no spec file
    pub fn skipped_services(&self) -> impl Iterator<Item = &str> {
        self.services
            .iter()
            .filter(|s| s.files == 0)
            .map(|s| s.name.as_str())
    }
}

pub struct Aggregator {
    config: AggregatorConfig,
    settings: AggregationSettings,
    source: Arc<dyn SpecSource>,
}

impl Aggregator {
    /// Validate `config` and bind it to `source`
    pub fn new(config: AggregatorConfig, source: Arc<dyn SpecSource>) -> RuntimeResult<Self> {
        config.validate()?;
        let settings = config.settings();
        Ok(Self {
            config,
            settings,
            source,
        })
    }

    /// Aggregator reading from the GitHub contents API. The access token is
    /// checked before anything else.
    pub fn github(config: AggregatorConfig) -> RuntimeResult<Self> {
        let token = config.github_token()?;
        let source = GitHubSource::new(config.github.api_url.clone(), token)?;
        Self::new(config, Arc::new(source))
    }

    /// Aggregator reading repository checkouts under `root`
    pub fn local(config: AggregatorConfig, root: impl Into<PathBuf>) -> RuntimeResult<Self> {
        Self::new(config, Arc::new(LocalSource::new(root)))
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn settings(&self) -> &AggregationSettings {
        &self.settings
    }

    /// Fetch every configured service concurrently
    pub async fn fetch_all(&self, branch: &str) -> Vec<ServiceSpecs> {
        let source = self.source.as_ref();
        let fetched = join_all(self.config.services.iter().map(|service| async move {
            ServiceSpecs {
                service: service.name.clone(),
                specs: fetch_service_specs(source, service, branch).await,
            }
        }))
        .await;

        for service in fetched.iter().filter(|s| s.specs.is_empty()) {
            tracing::warn!(service = %service.service, "service contributes no specs");
        }
        fetched
    }

    /// Build the document for one audience from already fetched specs
    pub fn generate(&self, fetched: &[ServiceSpecs], audience: &str) -> AggregatedSpec {
        tracing::info!(audience, "generating spec");
        aggregate_for_audience(fetched, audience, &self.settings)
    }

    pub async fn write(&self, audience: &str, spec: &AggregatedSpec) -> RuntimeResult<SpecSummary> {
        write_spec(&self.config.output_dir, audience, spec).await
    }

    /// Fetch once, then generate and write every audience in turn
    pub async fn run(&self, branch: &str) -> RuntimeResult<RunReport> {
        tracing::info!(
            services = self.config.services.len(),
            audiences = ?self.config.audiences,
            branch,
            prefix_schemas = self.settings.prefix_schemas,
            prefix_paths = self.settings.prefix_paths,
            "starting spec aggregation"
        );

        let fetched = self.fetch_all(branch).await;
        tokio::fs::create_dir_all(&self.config.output_dir).await?;

        let mut specs = Vec::with_capacity(self.config.audiences.len());
        for audience in &self.config.audiences {
            let spec = self.generate(&fetched, audience);
            specs.push(self.write(audience, &spec).await?);
        }

        tracing::info!(generated = specs.len(), "aggregation complete");
        Ok(RunReport {
            branch: branch.to_string(),
            services: fetched
                .iter()
                .map(|s| ServiceReport {
                    name: s.service.clone(),
                    files: s.specs.len(),
                })
                .collect(),
            specs,
        })
    }
}
