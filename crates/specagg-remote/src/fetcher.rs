//! Fetch a single file and parse it into a document tree

use crate::error::{RemoteError, RemoteResult};
use crate::source::SpecSource;
use serde_json::{Map, Number, Value as JsonValue};
use serde_yaml::Value as YamlValue;

/// Parse file content: JSON for `.json` paths, YAML for anything else.
///
/// YAML mapping keys that are not strings (`200:` response codes, booleans)
/// are stringified so the tree stays a valid JSON document. Merge keys
/// (`<<: *anchor`) are expanded first.
pub fn parse_document(path: &str, content: &str) -> RemoteResult<JsonValue> {
    if path.ends_with(".json") {
        return serde_json::from_str(content).map_err(|e| RemoteError::parse(path, e));
    }
    let mut yaml: YamlValue = serde_yaml::from_str(content).map_err(|e| RemoteError::parse(path, e))?;
    yaml.apply_merge().map_err(|e| RemoteError::parse(path, e))?;
    yaml_to_json(yaml).map_err(|message| RemoteError::Parse {
        path: path.to_string(),
        message,
    })
}

fn yaml_to_json(value: YamlValue) -> Result<JsonValue, String> {
    Ok(match value {
        YamlValue::Null => JsonValue::Null,
        YamlValue::Bool(b) => JsonValue::Bool(b),
        YamlValue::Number(n) => yaml_number(&n),
        YamlValue::String(s) => JsonValue::String(s),
        YamlValue::Sequence(items) => JsonValue::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        YamlValue::Mapping(mapping) => {
            let mut object = Map::with_capacity(mapping.len());
            for (key, child) in mapping {
                object.insert(mapping_key(key)?, yaml_to_json(child)?);
            }
            JsonValue::Object(object)
        }
        YamlValue::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

fn yaml_number(n: &serde_yaml::Number) -> JsonValue {
    if let Some(i) = n.as_i64() {
        JsonValue::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        JsonValue::Number(u.into())
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null)
    }
}

fn mapping_key(key: YamlValue) -> Result<String, String> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Null => Ok("null".to_string()),
        YamlValue::Tagged(tagged) => mapping_key(tagged.value),
        other => Err(format!("unsupported mapping key: {:?}", other)),
    }
}

/// Read and parse one file. Failures are logged and reported as `None` so
/// callers can skip the file and carry on.
pub async fn fetch_document(
    source: &dyn SpecSource,
    repo: &str,
    path: &str,
    branch: &str,
) -> Option<JsonValue> {
    let result = match source.read_file(repo, path, branch).await {
        Ok(content) => parse_document(path, &content),
        Err(err) => Err(err),
    };

    match result {
        Ok(document) => Some(document),
        Err(err) => {
            tracing::error!(repo, path, branch, error = %err, "failed to fetch file");
            None
        }
    }
}
