//! Cleans an included operation for publication

use crate::document::{prefix_schema_ref, rewrite_refs};
use crate::types::{vendor, AggregationSettings};
use serde_json::{Map, Value as JsonValue};

/// Where an operation came from, for log context and path prefixing
#[derive(Debug, Clone, Copy)]
pub struct OperationContext<'a> {
    pub service: &'a str,
    pub file: &'a str,
    pub path: &'a str,
    pub method: &'a str,
}

impl OperationContext<'_> {
    /// Output path key, `/{service}{path}` when path prefixing is on
    pub fn output_path(&self, settings: &AggregationSettings) -> String {
        if settings.prefix_paths {
            format!("/{}{}", self.service, self.path)
        } else {
            self.path.to_string()
        }
    }
}

/// The `x-category` marker, if it is a non-empty string
pub fn category_of(operation: &JsonValue) -> Option<&str> {
    operation
        .get(vendor::CATEGORY)
        .and_then(JsonValue::as_str)
        .filter(|c| !c.is_empty())
}

/// Produce the published form of an operation.
///
/// Vendor markers and any existing `tags`/`servers` are dropped, schema
/// references are namespaced when schema prefixing is on, `tags` becomes
/// `[category]` (or `[]`), and `servers` is chosen from the operation's
/// `x-servers`, then `spec_servers`, then the configured defaults.
pub fn transform_operation(
    operation: &JsonValue,
    ctx: &OperationContext<'_>,
    spec_servers: &[JsonValue],
    settings: &AggregationSettings,
) -> JsonValue {
    let cleaned: Map<String, JsonValue> = operation
        .as_object()
        .map(|map| {
            map.iter()
                .filter(|(key, _)| !is_stripped_key(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
        .unwrap_or_default();

    let category = category_of(operation);
    if category.is_none() {
        tracing::warn!(
            service = ctx.service,
            file = ctx.file,
            path = ctx.path,
            method = %ctx.method.to_uppercase(),
            "public operation has no x-category defined"
        );
    }

    let mut cleaned = JsonValue::Object(cleaned);
    if settings.prefix_schemas {
        rewrite_refs(&mut cleaned, &mut |reference| {
            prefix_schema_ref(reference, ctx.service)
        });
    }

    if let JsonValue::Object(map) = &mut cleaned {
        let tags = category
            .map(|c| vec![JsonValue::String(c.to_string())])
            .unwrap_or_default();
        map.insert("tags".to_string(), JsonValue::Array(tags));
        map.insert(
            "servers".to_string(),
            JsonValue::Array(select_servers(operation, spec_servers, settings)),
        );
    }

    cleaned
}

fn is_stripped_key(key: &str) -> bool {
    key == "tags" || key == "servers" || vendor::ALL.contains(&key)
}

fn select_servers(
    operation: &JsonValue,
    spec_servers: &[JsonValue],
    settings: &AggregationSettings,
) -> Vec<JsonValue> {
    if let Some(overrides) = operation.get(vendor::SERVERS).and_then(JsonValue::as_array) {
        return overrides.clone();
    }
    if !spec_servers.is_empty() {
        return spec_servers.to_vec();
    }
    settings.default_server_nodes()
}
