use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// OpenAPI version stamped on every aggregated document
pub const OPENAPI_VERSION: &str = "3.1.0";

/// HTTP methods considered when reading path items, in precedence order
pub const HTTP_METHODS: [&str; 5] = ["get", "post", "put", "patch", "delete"];

/// Vendor extension markers read from source operations
pub mod vendor {
    pub const PUBLIC: &str = "x-public";
    pub const AUDIENCE: &str = "x-audience";
    pub const CATEGORY: &str = "x-category";
    pub const SERVERS: &str = "x-servers";

    pub const ALL: [&str; 4] = [PUBLIC, AUDIENCE, CATEGORY, SERVERS];
}

/// A service whose specs directory contributes to the aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDescriptor {
    /// Short service name, also used as the namespace prefix
    pub name: String,
    /// Repository identifier in `owner/name` form
    pub repo: String,
    /// Directory inside the repository holding the spec files
    pub specs_path: String,
}

impl ServiceDescriptor {
    pub fn new(
        name: impl Into<String>,
        repo: impl Into<String>,
        specs_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            repo: repo.into(),
            specs_path: specs_path.into(),
        }
    }
}

/// OpenAPI server entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Server {
    pub fn new(url: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: Some(description.into()),
        }
    }
}

/// Static fields of the generated `info` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoSettings {
    pub version: String,
    pub contact_name: String,
    pub contact_email: String,
}

impl Default for InfoSettings {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            contact_name: "Platform Support".to_string(),
            contact_email: "platform-support@serhafen.com".to_string(),
        }
    }
}

/// Resolved settings passed into every aggregation step
#[derive(Debug, Clone, Default)]
pub struct AggregationSettings {
    /// Prefix schema names (and their references) with `{service}_`
    pub prefix_schemas: bool,
    /// Prefix path templates with `/{service}`
    pub prefix_paths: bool,
    /// Servers used when neither the operation nor its spec declares any
    pub default_servers: Vec<Server>,
    /// Tags listed here are emitted first, in this order
    pub tag_order: Vec<String>,
    pub info: InfoSettings,
}

impl AggregationSettings {
    /// Default servers as document nodes, ready to attach to an operation
    pub fn default_server_nodes(&self) -> Vec<JsonValue> {
        self.default_servers
            .iter()
            .filter_map(|server| serde_json::to_value(server).ok())
            .collect()
    }
}

/// A parsed OpenAPI document owned by one service for one run.
///
/// The tree is kept as a generic node so fields the aggregator does not
/// interpret survive untouched; accessors expose the parts it does read.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecDocument(JsonValue);

impl SpecDocument {
    /// Wrap a parsed document; the root must be a mapping
    pub fn from_value(value: JsonValue) -> CoreResult<Self> {
        if value.is_object() {
            Ok(Self(value))
        } else {
            Err(CoreError::Invalid(
                "document root is not a mapping".to_string(),
            ))
        }
    }

    pub fn as_value(&self) -> &JsonValue {
        &self.0
    }

    pub fn into_value(self) -> JsonValue {
        self.0
    }

    /// `paths` mapping, if present
    pub fn paths(&self) -> Option<&Map<String, JsonValue>> {
        self.0.get("paths").and_then(JsonValue::as_object)
    }

    /// `components.schemas` mapping, if present
    pub fn schemas(&self) -> Option<&Map<String, JsonValue>> {
        self.components_entry("schemas")
    }

    /// `components.securitySchemes` mapping, if present
    pub fn security_schemes(&self) -> Option<&Map<String, JsonValue>> {
        self.components_entry("securitySchemes")
    }

    /// Spec-level `servers`; empty when absent or malformed
    pub fn servers(&self) -> &[JsonValue] {
        self.0
            .get("servers")
            .and_then(JsonValue::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Spec-level `security` requirements; empty when absent
    pub fn security(&self) -> &[JsonValue] {
        self.0
            .get("security")
            .and_then(JsonValue::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn components_entry(&self, key: &str) -> Option<&Map<String, JsonValue>> {
        self.0
            .get("components")
            .and_then(|components| components.get(key))
            .and_then(JsonValue::as_object)
    }
}

/// One fetched spec file of a service
#[derive(Debug, Clone)]
pub struct SpecFile {
    pub file_name: String,
    pub document: SpecDocument,
}

/// Everything fetched for one service
#[derive(Debug, Clone)]
pub struct ServiceSpecs {
    pub service: String,
    pub specs: Vec<SpecFile>,
}

impl ServiceSpecs {
    pub fn empty(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            specs: Vec::new(),
        }
    }
}
