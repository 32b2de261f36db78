use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use specagg_core::{AggregationSettings, InfoSettings, Server, ServiceDescriptor};
use std::collections::HashSet;
use std::path::PathBuf;

/// Top-level aggregator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatorConfig {
    /// Services whose specs are aggregated
    #[serde(default)]
    pub services: Vec<ServiceDescriptor>,
    /// One output document is generated per audience
    #[serde(default)]
    pub audiences: Vec<String>,
    /// Directory receiving `{audience}-api.openapi.yaml`
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Force schema prefixing on or off; absent means auto
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_schemas: Option<bool>,
    /// Force path prefixing on or off; absent means auto
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_paths: Option<bool>,
    /// Fallback servers for operations whose spec declares none
    #[serde(default)]
    pub default_servers: Vec<Server>,
    /// Display order for tags; unlisted tags follow alphabetically
    #[serde(default)]
    pub tag_order: Vec<String>,
    #[serde(default)]
    pub info: InfoConfig,
    #[serde(default)]
    pub github: GitHubConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InfoConfig {
    pub version: String,
    pub contact_name: String,
    pub contact_email: String,
}

impl Default for InfoConfig {
    fn default() -> Self {
        let defaults = InfoSettings::default();
        Self {
            version: defaults.version,
            contact_name: defaults.contact_name,
            contact_email: defaults.contact_email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GitHubConfig {
    /// Base URL of the contents API
    pub api_url: String,
    /// Environment variable holding the access token
    pub token_env: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("../specs")
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            services: vec![
                ServiceDescriptor::new(
                    "customs-declaration",
                    "serhafen-tech/customs-declaration",
                    "specs",
                ),
                ServiceDescriptor::new("cbt-docs", "serhafen-tech/cbt-docs", "specs"),
                ServiceDescriptor::new("iam", "serhafen-tech/iam-service", "specs"),
            ],
            audiences: vec![
                "customs".to_string(),
                "lastmile".to_string(),
                "cross-border".to_string(),
            ],
            output_dir: default_output_dir(),
            prefix_schemas: Some(false),
            prefix_paths: Some(false),
            default_servers: vec![
                Server::new("https://api.serhafen-tech.com", "Production server"),
                Server::new("https://api-staging.serhafen-tech.com", "Staging server"),
            ],
            tag_order: vec![
                "Declarations".to_string(),
                "Shipments".to_string(),
                "Tracking".to_string(),
            ],
            info: InfoConfig::default(),
            github: GitHubConfig::default(),
        }
    }
}

impl AggregatorConfig {
    /// Explicit setting wins; otherwise prefix when several services share
    /// one output
    fn resolve_prefix(&self, forced: Option<bool>) -> bool {
        forced.unwrap_or(self.services.len() > 1)
    }

    pub fn should_prefix_schemas(&self) -> bool {
        self.resolve_prefix(self.prefix_schemas)
    }

    pub fn should_prefix_paths(&self) -> bool {
        self.resolve_prefix(self.prefix_paths)
    }

    /// Settings value handed to the aggregation engine
    pub fn settings(&self) -> AggregationSettings {
        AggregationSettings {
            prefix_schemas: self.should_prefix_schemas(),
            prefix_paths: self.should_prefix_paths(),
            default_servers: self.default_servers.clone(),
            tag_order: self.tag_order.clone(),
            info: InfoSettings {
                version: self.info.version.clone(),
                contact_name: self.info.contact_name.clone(),
                contact_email: self.info.contact_email.clone(),
            },
        }
    }

    /// Read the access token from the configured environment variable
    pub fn github_token(&self) -> ConfigResult<String> {
        match std::env::var(&self.github.token_env) {
            Ok(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(ConfigError::MissingCredential(self.github.token_env.clone())),
        }
    }

    /// Validate services and audiences
    pub fn validate(&self) -> ConfigResult<()> {
        if self.services.is_empty() {
            return Err(ConfigError::NoServices);
        }
        if self.audiences.is_empty() {
            return Err(ConfigError::NoAudiences);
        }

        let mut names = HashSet::new();
        for service in &self.services {
            if service.name.trim().is_empty() {
                return Err(ConfigError::Validation("Empty service name".to_string()));
            }
            if service.repo.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "Service '{}' has no repository",
                    service.name
                )));
            }
            if !names.insert(service.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Duplicate service name '{}'",
                    service.name
                )));
            }
        }

        if self.audiences.iter().any(|a| a.trim().is_empty()) {
            return Err(ConfigError::Validation("Empty audience name".to_string()));
        }

        Ok(())
    }

    /// Keep only the named audiences; unknown names are rejected
    pub fn restrict_audiences(&mut self, selected: &[String]) -> ConfigResult<()> {
        if selected.is_empty() {
            return Ok(());
        }
        if let Some(unknown) = selected.iter().find(|a| !self.audiences.contains(a)) {
            return Err(ConfigError::Validation(format!(
                "Audience '{}' is not configured",
                unknown
            )));
        }
        self.audiences.retain(|a| selected.contains(a));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AggregatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.services.len(), 3);
        assert!(!config.should_prefix_schemas());
        assert!(!config.should_prefix_paths());
    }

    #[test]
    fn test_auto_prefixing_follows_service_count() {
        let mut config = AggregatorConfig {
            prefix_schemas: None,
            prefix_paths: None,
            ..Default::default()
        };
        assert!(config.should_prefix_schemas());
        assert!(config.should_prefix_paths());

        config.services.truncate(1);
        assert!(!config.should_prefix_schemas());

        config.prefix_paths = Some(true);
        assert!(config.settings().prefix_paths);
        assert!(!config.settings().prefix_schemas);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = AggregatorConfig::default();
        config.audiences.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoAudiences)));

        config.services.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoServices)));

        let mut config = AggregatorConfig::default();
        config.services.push(config.services[0].clone());
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_missing_token() {
        let mut config = AggregatorConfig::default();
        config.github.token_env = "SPECAGG_TEST_TOKEN_UNSET".to_string();
        std::env::remove_var("SPECAGG_TEST_TOKEN_UNSET");
        assert!(matches!(
            config.github_token(),
            Err(ConfigError::MissingCredential(name)) if name == "SPECAGG_TEST_TOKEN_UNSET"
        ));

        std::env::set_var("SPECAGG_TEST_TOKEN_SET", "ghp_test");
        config.github.token_env = "SPECAGG_TEST_TOKEN_SET".to_string();
        assert_eq!(config.github_token().unwrap(), "ghp_test");
        std::env::remove_var("SPECAGG_TEST_TOKEN_SET");
    }

    #[test]
    fn test_restrict_audiences() {
        let mut config = AggregatorConfig::default();
        config.restrict_audiences(&["lastmile".to_string()]).unwrap();
        assert_eq!(config.audiences, vec!["lastmile"]);
        assert!(config.restrict_audiences(&["pharma".to_string()]).is_err());
    }
}
