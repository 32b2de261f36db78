use crate::env_resolver::EnvResolver;
use crate::error::{ConfigError, ConfigResult};
use crate::schema::AggregatorConfig;
use serde_json::Value as JsonValue;
use std::fs;
use std::path::Path;

/// Supported file formats for configuration
#[derive(Debug, Clone, PartialEq)]
pub enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    /// Detect file format from extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
            Some("json") => Ok(FileFormat::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }
}

/// Loads an [`AggregatorConfig`] from YAML or JSON, expanding environment
/// placeholders first
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    env: EnvResolver,
}

impl ConfigLoader {
    pub fn new(env: EnvResolver) -> Self {
        Self { env }
    }

    /// Load configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<AggregatorConfig> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path)?;
        let content = fs::read_to_string(path)?;

        tracing::debug!(path = %path.display(), "loading configuration file");
        self.parse_content(&content, format)
    }

    /// Parse configuration content directly
    pub fn parse_content(&self, content: &str, format: FileFormat) -> ConfigResult<AggregatorConfig> {
        let raw: JsonValue = match format {
            FileFormat::Yaml => serde_yaml::from_str(content)?,
            FileFormat::Json => serde_json::from_str(content)?,
        };
        if !raw.is_object() {
            return Err(ConfigError::Validation(
                "Configuration root must be a mapping".to_string(),
            ));
        }

        let resolved = self.env.resolve(&raw)?;
        Ok(serde_json::from_value(resolved)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_path("a.yml").unwrap(), FileFormat::Yaml);
        assert_eq!(FileFormat::from_path("a.yaml").unwrap(), FileFormat::Yaml);
        assert_eq!(FileFormat::from_path("a.json").unwrap(), FileFormat::Json);
        assert!(matches!(
            FileFormat::from_path("a.toml"),
            Err(ConfigError::UnsupportedFormat(ext)) if ext == "toml"
        ));
        assert!(FileFormat::from_path("config").is_err());
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(
            file,
            r#"
services:
  - name: tracking
    repo: acme/tracking
    specsPath: openapi
audiences: [lastmile]
outputDir: ./out
prefixSchemas: true
defaultServers:
  - url: https://api.acme.test
    description: Production
"#
        )
        .unwrap();

        let config = ConfigLoader::default().load_from_file(file.path()).unwrap();
        assert_eq!(config.services[0].specs_path, "openapi");
        assert_eq!(config.audiences, vec!["lastmile"]);
        assert_eq!(config.prefix_schemas, Some(true));
        assert_eq!(config.prefix_paths, None);
        assert_eq!(config.default_servers[0].url, "https://api.acme.test");
        assert_eq!(config.github.token_env, "GITHUB_TOKEN");
        assert_eq!(config.info.version, "1.0.0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_with_env_placeholders() {
        std::env::set_var("SPECAGG_LOADER_OUT", "/var/specs");

        let config = ConfigLoader::default()
            .parse_content(
                r#"{
                    "services": [{"name": "iam", "repo": "acme/iam", "specsPath": "specs"}],
                    "audiences": ["customs"],
                    "outputDir": "${SPECAGG_LOADER_OUT}",
                    "prefixPaths": "${SPECAGG_LOADER_PREFIX:false}"
                }"#,
                FileFormat::Json,
            )
            .unwrap();
        assert_eq!(config.output_dir, std::path::PathBuf::from("/var/specs"));
        assert_eq!(config.prefix_paths, Some(false));

        std::env::remove_var("SPECAGG_LOADER_OUT");
    }

    #[test]
    fn test_non_mapping_root_rejected() {
        let result = ConfigLoader::default().parse_content("- a\n- b\n", FileFormat::Yaml);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
