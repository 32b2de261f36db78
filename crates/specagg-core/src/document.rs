//! Traversal helpers over document trees.
//!
//! A reference node is any mapping carrying a string `$ref` entry. Schema
//! references take the form `#/components/schemas/{Name}` where `Name` is a
//! single JSON pointer segment.

use serde_json::Value as JsonValue;
use std::collections::HashSet;

pub const REF_KEY: &str = "$ref";
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Visit every `$ref` string in the tree, depth first.
pub fn walk_refs<'a, F>(value: &'a JsonValue, visit: &mut F)
where
    F: FnMut(&'a str),
{
    match value {
        JsonValue::Object(map) => {
            for (key, child) in map {
                match child {
                    JsonValue::String(reference) if key == REF_KEY => visit(reference),
                    _ => walk_refs(child, visit),
                }
            }
        }
        JsonValue::Array(items) => {
            for item in items {
                walk_refs(item, visit);
            }
        }
        _ => {}
    }
}

/// Replace `$ref` strings in place. The mapper returns `None` to keep a
/// reference unchanged.
pub fn rewrite_refs<F>(value: &mut JsonValue, rewrite: &mut F)
where
    F: FnMut(&str) -> Option<String>,
{
    match value {
        JsonValue::Object(map) => {
            for (key, child) in map.iter_mut() {
                if key == REF_KEY {
                    if let JsonValue::String(reference) = child {
                        if let Some(updated) = rewrite(reference) {
                            *reference = updated;
                        }
                        continue;
                    }
                }
                rewrite_refs(child, rewrite);
            }
        }
        JsonValue::Array(items) => {
            for item in items.iter_mut() {
                rewrite_refs(item, rewrite);
            }
        }
        _ => {}
    }
}

/// Name of the schema a reference points at, if it is a schema reference.
pub fn schema_ref_name(reference: &str) -> Option<String> {
    let (_, segment, _) = split_schema_ref(reference)?;
    Some(unescape_segment(segment))
}

/// Rewrite a schema reference to the namespaced `{service}_{Name}` form.
/// Returns `None` for references that do not point into
/// `components.schemas`.
pub fn prefix_schema_ref(reference: &str, service: &str) -> Option<String> {
    let (head, segment, tail) = split_schema_ref(reference)?;
    Some(format!(
        "{}{}{}_{}{}",
        head,
        SCHEMA_REF_PREFIX,
        escape_segment(service),
        segment,
        tail
    ))
}

/// The stored name of a schema once namespaced under `service`.
pub fn prefixed_schema_name(service: &str, name: &str) -> String {
    format!("{}_{}", service, name)
}

/// Collect the names of all schemas referenced anywhere in the tree.
pub fn collect_schema_refs(value: &JsonValue, names: &mut HashSet<String>) {
    walk_refs(value, &mut |reference| {
        if let Some(name) = schema_ref_name(reference) {
            names.insert(name);
        }
    });
}

/// Splits `head#/components/schemas/Name/tail` into its three parts.
fn split_schema_ref(reference: &str) -> Option<(&str, &str, &str)> {
    let start = reference.find(SCHEMA_REF_PREFIX)?;
    let head = &reference[..start];
    let rest = &reference[start + SCHEMA_REF_PREFIX.len()..];
    let end = rest.find('/').unwrap_or(rest.len());
    let (segment, tail) = rest.split_at(end);
    if segment.is_empty() {
        return None;
    }
    Some((head, segment, tail))
}

fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_walk_refs_finds_nested_references() {
        let doc = json!({
            "responses": {
                "200": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/Parcel"}}}}
            },
            "parameters": [{"$ref": "./common.yaml#/parameters/Id"}]
        });

        let mut seen = Vec::new();
        walk_refs(&doc, &mut |r| seen.push(r.to_string()));
        seen.sort();
        assert_eq!(seen, vec!["#/components/schemas/Parcel", "./common.yaml#/parameters/Id"]);
    }

    #[test]
    fn test_walk_refs_ignores_non_string_ref_entries() {
        // A property literally named "$ref" inside `properties`
        let doc = json!({"properties": {"$ref": {"type": "string"}}});
        let mut count = 0;
        walk_refs(&doc, &mut |_| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_schema_ref_name() {
        assert_eq!(schema_ref_name("#/components/schemas/Parcel"), Some("Parcel".to_string()));
        assert_eq!(
            schema_ref_name("#/components/schemas/Parcel/properties/id"),
            Some("Parcel".to_string())
        );
        assert_eq!(schema_ref_name("#/components/schemas/a~1b"), Some("a/b".to_string()));
        assert_eq!(schema_ref_name("#/components/parameters/Id"), None);
        assert_eq!(schema_ref_name("#/components/schemas/"), None);
    }

    #[test]
    fn test_prefix_schema_ref() {
        assert_eq!(
            prefix_schema_ref("#/components/schemas/Parcel", "lastmile"),
            Some("#/components/schemas/lastmile_Parcel".to_string())
        );
        assert_eq!(
            prefix_schema_ref("#/components/schemas/Parcel/properties/id", "iam"),
            Some("#/components/schemas/iam_Parcel/properties/id".to_string())
        );
        assert_eq!(prefix_schema_ref("#/components/responses/NotFound", "iam"), None);
    }

    #[test]
    fn test_prefixed_ref_matches_prefixed_name() {
        let rewritten = prefix_schema_ref("#/components/schemas/Parcel", "cbt-docs").unwrap();
        assert_eq!(
            schema_ref_name(&rewritten),
            Some(prefixed_schema_name("cbt-docs", "Parcel"))
        );
    }

    #[test]
    fn test_rewrite_refs_in_place() {
        let mut doc = json!({
            "allOf": [
                {"$ref": "#/components/schemas/Base"},
                {"$ref": "#/components/responses/Err"}
            ]
        });
        rewrite_refs(&mut doc, &mut |r| prefix_schema_ref(r, "svc"));
        assert_eq!(doc["allOf"][0]["$ref"], "#/components/schemas/svc_Base");
        assert_eq!(doc["allOf"][1]["$ref"], "#/components/responses/Err");
    }

    #[test]
    fn test_collect_schema_refs() {
        let doc = json!({
            "a": {"$ref": "#/components/schemas/A"},
            "b": [{"$ref": "#/components/schemas/B"}, {"$ref": "#/components/schemas/A"}],
            "c": {"$ref": "#/components/headers/H"}
        });
        let mut names = HashSet::new();
        collect_schema_refs(&doc, &mut names);
        assert_eq!(names.len(), 2);
        assert!(names.contains("A") && names.contains("B"));
    }
}
