//! Job configuration loaded from YAML.
//!
//! The YAML file names the environment variables that hold the credentials;
//! they are resolved here so the connector only ever sees secret values.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use xetra_connector::{ConnectorConfig, Credentials, XetraError};

/// Top-level job configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Bucket connection settings.
    pub s3: S3Section,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Section {
    /// Name of the environment variable holding the access key id.
    #[serde(default = "default_access_key_env")]
    pub access_key_env: String,

    /// Name of the environment variable holding the secret access key.
    #[serde(default = "default_secret_key_env")]
    pub secret_key_env: String,

    /// Name of the environment variable holding a session token, if any.
    #[serde(default)]
    pub session_token_env: Option<String>,

    pub endpoint_url: String,

    pub bucket: String,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub allow_http: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Default filter directive, used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_access_key_env() -> String {
    "AWS_ACCESS_KEY_ID".to_string()
}

fn default_secret_key_env() -> String {
    "AWS_SECRET_ACCESS_KEY".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

impl JobConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, XetraError> {
        serde_yaml::from_str(yaml).map_err(|e| XetraError::Config {
            message: format!("invalid job configuration: {e}"),
        })
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Ok(Self::from_yaml_str(&yaml)?)
    }

    /// Build the connector configuration, resolving credentials from the
    /// process environment.
    pub fn connector_config(&self) -> Result<ConnectorConfig, XetraError> {
        self.connector_config_with(|name| std::env::var(name).ok())
    }

    /// Build the connector configuration, resolving credential variable
    /// names through `lookup`.
    pub fn connector_config_with<F>(&self, lookup: F) -> Result<ConnectorConfig, XetraError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let s3 = &self.s3;
        let require = |name: &str| {
            lookup(name).ok_or_else(|| XetraError::Authentication {
                message: format!("environment variable {name} is not set"),
            })
        };

        let mut credentials = Credentials::new(
            require(s3.access_key_env.as_str())?,
            require(s3.secret_key_env.as_str())?,
        );
        if let Some(token_env) = &s3.session_token_env {
            credentials = credentials.with_session_token(require(token_env.as_str())?);
        }

        let mut config = ConnectorConfig::new(&s3.endpoint_url, &s3.bucket, credentials);
        config.region = s3.region.clone();
        config.allow_http = s3.allow_http;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const YAML: &str = r#"
s3:
  endpoint_url: https://s3.eu-central-1.amazonaws.com
  bucket: xetra-1234
  region: eu-central-1
logging:
  level: debug
"#;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_parse_with_defaults() {
        let config = JobConfig::from_yaml_str(YAML).unwrap();
        assert_eq!(config.s3.access_key_env, "AWS_ACCESS_KEY_ID");
        assert_eq!(config.s3.secret_key_env, "AWS_SECRET_ACCESS_KEY");
        assert_eq!(config.s3.bucket, "xetra-1234");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_logging_section_optional() {
        let yaml = "s3:\n  endpoint_url: http://localhost:9000\n  bucket: b\n";
        let config = JobConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = JobConfig::from_yaml_str("s3: [not, a, map]").unwrap_err();
        assert!(matches!(err, XetraError::Config { .. }));
    }

    #[test]
    fn test_resolves_credentials_from_named_variables() {
        let config = JobConfig::from_yaml_str(YAML).unwrap();
        let resolved = config
            .connector_config_with(env(&[
                ("AWS_ACCESS_KEY_ID", "KEY1"),
                ("AWS_SECRET_ACCESS_KEY", "KEY2"),
            ]))
            .unwrap();
        assert_eq!(resolved.credentials.access_key_id, "KEY1");
        assert_eq!(resolved.credentials.secret_access_key, "KEY2");
        assert_eq!(resolved.region.as_deref(), Some("eu-central-1"));
        assert_eq!(resolved.bucket, "xetra-1234");
    }

    #[test]
    fn test_custom_variable_names() {
        let mut config = JobConfig::from_yaml_str(YAML).unwrap();
        config.s3.access_key_env = "XETRA_KEY".into();
        config.s3.secret_key_env = "XETRA_SECRET".into();
        let resolved = config
            .connector_config_with(env(&[("XETRA_KEY", "a"), ("XETRA_SECRET", "b")]))
            .unwrap();
        assert_eq!(resolved.credentials.access_key_id, "a");
    }

    #[test]
    fn test_missing_variable_is_authentication_error() {
        let config = JobConfig::from_yaml_str(YAML).unwrap();
        let err = config
            .connector_config_with(env(&[("AWS_ACCESS_KEY_ID", "KEY1")]))
            .unwrap_err();
        match err {
            XetraError::Authentication { message } => {
                assert!(message.contains("AWS_SECRET_ACCESS_KEY"))
            }
            other => panic!("Expected Authentication, got {other:?}"),
        }
    }

    #[test]
    fn test_session_token_variable() {
        let mut config = JobConfig::from_yaml_str(YAML).unwrap();
        config.s3.session_token_env = Some("AWS_SESSION_TOKEN".into());
        let resolved = config
            .connector_config_with(env(&[
                ("AWS_ACCESS_KEY_ID", "KEY1"),
                ("AWS_SECRET_ACCESS_KEY", "KEY2"),
                ("AWS_SESSION_TOKEN", "TOKEN"),
            ]))
            .unwrap();
        assert_eq!(resolved.credentials.session_token.as_deref(), Some("TOKEN"));
    }
}
