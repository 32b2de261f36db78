//! Per-audience aggregation: filter, transform, merge, prune, order

use crate::audience::{evaluate, Inclusion};
use crate::error::CoreResult;
use crate::merge::{merge_schemas, merge_security};
use crate::ordering::OrderingPolicy;
use crate::prune::prune_unused_schemas;
use crate::transform::{category_of, transform_operation, OperationContext};
use crate::types::{
    AggregationSettings, InfoSettings, ServiceSpecs, SpecDocument, HTTP_METHODS, OPENAPI_VERSION,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// HTTP method to operation
pub type PathItem = IndexMap<String, JsonValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    pub description: String,
    pub contact: Contact,
}

impl Info {
    pub fn for_audience(audience: &str, settings: &InfoSettings) -> Self {
        Self {
            title: format!("{} API", capitalize(audience)),
            version: settings.version.clone(),
            description: format!("Public APIs for {} integration", audience),
            contact: Contact {
                name: settings.contact_name.clone(),
                email: settings.contact_email.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub description: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            description: format!("{} operations", name),
            name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, JsonValue>,
    #[serde(default)]
    pub security_schemes: IndexMap<String, JsonValue>,
}

/// The published document for one audience
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedSpec {
    pub openapi: String,
    pub info: Info,
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    #[serde(default)]
    pub components: Components,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub security: Vec<JsonValue>,
}

impl AggregatedSpec {
    /// Empty document for `audience`
    pub fn new(audience: &str, info: &InfoSettings) -> Self {
        Self {
            openapi: OPENAPI_VERSION.to_string(),
            info: Info::for_audience(audience, info),
            paths: IndexMap::new(),
            components: Components::default(),
            tags: Vec::new(),
            security: Vec::new(),
        }
    }

    /// Register a category as a tag, first occurrence wins
    pub fn ensure_tag(&mut self, category: &str) {
        if !self.tags.iter().any(|t| t.name == category) {
            self.tags.push(Tag::new(category));
        }
    }

    /// Fold one fetched document of `service` into the aggregate
    pub fn fold_document(
        &mut self,
        doc: &SpecDocument,
        service: &str,
        file: &str,
        audience: &str,
        settings: &AggregationSettings,
    ) {
        self.fold_paths(doc, service, file, audience, settings);
        merge_schemas(self, doc, service, settings);
        merge_security(self, doc, service);
    }

    fn fold_paths(
        &mut self,
        doc: &SpecDocument,
        service: &str,
        file: &str,
        audience: &str,
        settings: &AggregationSettings,
    ) {
        let Some(paths) = doc.paths() else {
            tracing::info!(service, file, "no paths found in spec");
            return;
        };

        let spec_servers = doc.servers();
        let mut processed = 0usize;
        let mut skipped = 0usize;

        for (path, item) in paths {
            for method in HTTP_METHODS {
                let Some(operation) = item.get(method) else {
                    continue;
                };
                let ctx = OperationContext {
                    service,
                    file,
                    path,
                    method,
                };

                match evaluate(operation, audience) {
                    Inclusion::Included => {
                        if let Some(category) = category_of(operation) {
                            self.ensure_tag(category);
                        }
                        let cleaned = transform_operation(operation, &ctx, spec_servers, settings);
                        self.paths
                            .entry(ctx.output_path(settings))
                            .or_default()
                            .insert(method.to_string(), cleaned);
                        processed += 1;
                    }
                    Inclusion::NotPublic => {
                        skipped += 1;
                        tracing::info!(
                            service,
                            file,
                            path = %path,
                            method = %method.to_uppercase(),
                            "skipped: not marked as public (x-public: true)"
                        );
                    }
                    Inclusion::AudienceMismatch { audiences } => {
                        skipped += 1;
                        tracing::info!(
                            service,
                            file,
                            path = %path,
                            method = %method.to_uppercase(),
                            audience,
                            declared = ?audiences,
                            "skipped: audience not in x-audience"
                        );
                    }
                }
            }
        }

        tracing::info!(
            service,
            file,
            audience,
            processed,
            skipped,
            paths = paths.len(),
            "processed spec"
        );
    }

    /// Prune unused schemas, then order tags and paths
    pub fn finalize(&mut self, settings: &AggregationSettings) {
        prune_unused_schemas(self);
        let policy = OrderingPolicy::new(&settings.tag_order);
        policy.sort_tags(&mut self.tags);
        self.paths = policy.sort_paths(std::mem::take(&mut self.paths));
    }

    pub fn to_value(&self) -> CoreResult<JsonValue> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Build the finished document for one audience from every fetched spec
pub fn aggregate_for_audience(
    services: &[ServiceSpecs],
    audience: &str,
    settings: &AggregationSettings,
) -> AggregatedSpec {
    let mut aggregated = AggregatedSpec::new(audience, &settings.info);
    for service in services {
        for spec in &service.specs {
            aggregated.fold_document(
                &spec.document,
                &service.service,
                &spec.file_name,
                audience,
                settings,
            );
        }
    }
    aggregated.finalize(settings);
    aggregated
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
