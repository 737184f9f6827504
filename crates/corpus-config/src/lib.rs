//! # corpus-config
//!
//! Layered configuration loading via figment.
//!
//! Configuration sources (in priority order, highest first):
//! 1. Environment variables (`CORPUS_*`, double-underscore nested)
//! 2. Project-level `./corpus.toml`
//! 3. User-level `~/.config/corpus/config.toml`
//! 4. Built-in defaults

pub mod backend;
pub mod embedder;
pub mod error;
pub mod general;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub use backend::BackendConfig;
pub use embedder::EmbedderConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;

const ENV_PREFIX: &str = "CORPUS_";
const PROJECT_CONFIG_FILE: &str = "corpus.toml";

/// Builds a nested JSON object from flat `CORPUS_SECTION__FIELD=value`
/// override pairs, the same shape [`Env::prefixed`] produces from real
/// process environment variables — so external overrides (e.g. pulled
/// from a secrets backend) merge at the same nesting depth.
fn overrides_to_nested_value(env_overrides: &[(String, String)]) -> serde_json::Value {
    let mut root = serde_json::Map::new();
    for (key, value) in env_overrides {
        let trimmed = key.strip_prefix(ENV_PREFIX).unwrap_or(key);
        let mut segments = trimmed.split("__").map(str::to_lowercase).peekable();
        let mut current = &mut root;
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                current.insert(segment, serde_json::Value::String(value.clone()));
            } else {
                current = current
                    .entry(segment)
                    .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()))
                    .as_object_mut()
                    .expect("override path collides with a scalar value at a shallower depth");
            }
        }
    }
    serde_json::Value::Object(root)
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub embedder: EmbedderConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl ServiceConfig {
    /// Loads layered configuration with no additional external overrides.
    ///
    /// # Errors
    /// Returns [`ConfigError::Figment`] on a malformed TOML file or type
    /// mismatch.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env_overrides(&[])
    }

    /// Loads layered configuration, additionally merging `env_overrides`
    /// (e.g. values pulled from an external secrets backend) at a priority
    /// below process environment variables but above every file source —
    /// mirroring the teacher's `load_with_env_overrides` precedence
    /// ("process env beats external overrides").
    ///
    /// # Errors
    /// Returns [`ConfigError::Figment`] on a malformed TOML file or type
    /// mismatch.
    pub fn load_with_env_overrides(env_overrides: &[(String, String)]) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(user_config_dir) = dirs::config_dir() {
            let user_config_path = user_config_dir.join("corpus").join("config.toml");
            figment = figment.merge(Toml::file(user_config_path));
        }
        figment = figment.merge(Toml::file(PROJECT_CONFIG_FILE));

        if !env_overrides.is_empty() {
            figment = figment.merge(Serialized::defaults(overrides_to_nested_value(env_overrides)));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        Ok(figment.extract()?)
    }

    /// Startup validation: the backend must be configured before the
    /// service accepts its first request (§6: "Absent required values,
    /// startup fails with a configuration error and the service does not
    /// accept requests").
    ///
    /// # Errors
    /// Returns [`ConfigError::NotConfigured`] if the backend section is
    /// missing `url` or `api_key`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.backend.is_configured() {
            return Err(ConfigError::NotConfigured { section: "backend".to_string() });
        }
        if !self.embedder.is_configured() {
            return Err(ConfigError::NotConfigured { section: "embedder".to_string() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_fail_validation_without_backend_credentials() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_vars_populate_nested_backend_section() {
        Jail::expect_with(|jail| {
            jail.set_env("CORPUS_BACKEND__URL", "https://backend.example");
            jail.set_env("CORPUS_BACKEND__API_KEY", "secret-key");
            let config = ServiceConfig::load().expect("config loads");
            assert_eq!(config.backend.url, "https://backend.example");
            assert_eq!(config.backend.api_key, "secret-key");
            assert!(config.validate().is_ok());
            Ok(())
        });
    }

    #[test]
    fn project_toml_is_merged_under_environment() {
        Jail::expect_with(|jail| {
            jail.create_file(
                PROJECT_CONFIG_FILE,
                r#"
[backend]
url = "https://from-toml.example"
api_key = "toml-key"
collection_documents = "docs-toml"
"#,
            )?;
            let config = ServiceConfig::load().expect("config loads");
            assert_eq!(config.backend.url, "https://from-toml.example");
            assert_eq!(config.backend.collection_documents, "docs-toml");

            jail.set_env("CORPUS_BACKEND__URL", "https://from-env.example");
            let config = ServiceConfig::load().expect("config loads");
            assert_eq!(config.backend.url, "https://from-env.example");
            Ok(())
        });
    }

    #[test]
    fn process_env_beats_external_overrides() {
        Jail::expect_with(|jail| {
            jail.set_env("CORPUS_BACKEND__API_KEY", "from-process-env");
            let overrides = vec![("CORPUS_BACKEND__API_KEY".to_string(), "from-external".to_string())];
            let config = ServiceConfig::load_with_env_overrides(&overrides).expect("config loads");
            assert_eq!(config.backend.api_key, "from-process-env");
            Ok(())
        });
    }
}
