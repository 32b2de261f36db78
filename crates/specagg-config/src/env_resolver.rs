//! Environment variable expansion for configuration files

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::env;
use thiserror::Error;

// ${VAR} or ${VAR:default}
static VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}:]+)(?::([^}]*))?\}").expect("valid variable pattern"));

/// Errors that can occur during environment variable resolution
#[derive(Debug, Error)]
pub enum EnvResolverError {
    #[error("Environment variable '{0}' not found and no default provided")]
    VarNotFound(String),
    #[error("Environment variable '{0}' is not in whitelist. Allowed prefixes: {1:?}")]
    VarNotWhitelisted(String, Vec<String>),
    #[error("Maximum nesting depth exceeded while resolving '{0}'")]
    TooDeep(String),
}

/// Expands `${VAR}` and `${VAR:default}` in every string of a document
#[derive(Debug, Clone)]
pub struct EnvResolver {
    /// Allowed prefixes for variable names; empty means no restriction
    allowed_prefixes: Vec<String>,
    max_depth: usize,
}

impl Default for EnvResolver {
    fn default() -> Self {
        Self {
            allowed_prefixes: vec!["SPECAGG_".to_string(), "GITHUB_".to_string()],
            max_depth: 32,
        }
    }
}

impl EnvResolver {
    pub fn new(allowed_prefixes: Vec<String>) -> Self {
        Self {
            allowed_prefixes,
            ..Self::default()
        }
    }

    /// Resolver that accepts any variable name
    pub fn unrestricted() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Resolve variables in every string of `value`.
    ///
    /// A string that is exactly one placeholder and expands to `true`,
    /// `false` or an integer becomes that scalar, so flags and numbers can
    /// be driven from the environment.
    pub fn resolve(&self, value: &JsonValue) -> Result<JsonValue, EnvResolverError> {
        self.resolve_at(value, 0)
    }

    fn resolve_at(&self, value: &JsonValue, depth: usize) -> Result<JsonValue, EnvResolverError> {
        if depth > self.max_depth {
            return Err(EnvResolverError::TooDeep(value.to_string()));
        }

        match value {
            JsonValue::String(s) => self.resolve_string(s),
            JsonValue::Object(obj) => {
                let mut resolved = serde_json::Map::new();
                for (key, val) in obj {
                    resolved.insert(key.clone(), self.resolve_at(val, depth + 1)?);
                }
                Ok(JsonValue::Object(resolved))
            }
            JsonValue::Array(arr) => arr
                .iter()
                .map(|item| self.resolve_at(item, depth + 1))
                .collect::<Result<Vec<_>, _>>()
                .map(JsonValue::Array),
            other => Ok(other.clone()),
        }
    }

    fn resolve_string(&self, input: &str) -> Result<JsonValue, EnvResolverError> {
        if !input.contains("${") {
            return Ok(JsonValue::String(input.to_string()));
        }

        let whole_placeholder = VAR_PATTERN
            .find(input)
            .map(|m| m.start() == 0 && m.end() == input.len())
            .unwrap_or(false);

        let mut result = String::with_capacity(input.len());
        let mut last = 0;
        for caps in VAR_PATTERN.captures_iter(input) {
            let Some(full) = caps.get(0) else {
                continue;
            };
            let var_name = &caps[1];
            self.validate_var_name(var_name)?;

            let value = match env::var(var_name) {
                Ok(value) => value,
                Err(_) => match caps.get(2) {
                    Some(default) => default.as_str().to_string(),
                    None => return Err(EnvResolverError::VarNotFound(var_name.to_string())),
                },
            };

            result.push_str(&input[last..full.start()]);
            result.push_str(&value);
            last = full.end();
        }
        result.push_str(&input[last..]);

        if whole_placeholder {
            if let Ok(flag) = result.parse::<bool>() {
                return Ok(JsonValue::Bool(flag));
            }
            if let Ok(number) = result.parse::<i64>() {
                return Ok(JsonValue::Number(number.into()));
            }
        }
        Ok(JsonValue::String(result))
    }

    fn validate_var_name(&self, var_name: &str) -> Result<(), EnvResolverError> {
        if self.allowed_prefixes.is_empty()
            || self
                .allowed_prefixes
                .iter()
                .any(|prefix| var_name.starts_with(prefix))
        {
            return Ok(());
        }

        Err(EnvResolverError::VarNotWhitelisted(
            var_name.to_string(),
            self.allowed_prefixes.clone(),
        ))
    }
}
