//! Vector store backend configuration (§6 "Configuration (environment)").

use serde::{Deserialize, Serialize};

fn default_documents_collection() -> String {
    "documents".to_string()
}

fn default_code_collection() -> String {
    "code".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Vector store backend URL.
    #[serde(default)]
    pub url: String,

    /// Backend API key.
    #[serde(default)]
    pub api_key: String,

    /// Logical collection name for whole documents (§6: "two logical
    /// collections — one for documents, one for code").
    #[serde(default = "default_documents_collection")]
    pub collection_documents: String,

    /// Logical collection name for code records.
    #[serde(default = "default_code_collection")]
    pub collection_code: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            collection_documents: default_documents_collection(),
            collection_code: default_code_collection(),
        }
    }
}

impl BackendConfig {
    /// Both `url` and `api_key` are required before the service will
    /// accept requests (§6: "Absent required values, startup fails with a
    /// configuration error").
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured_but_has_collection_defaults() {
        let config = BackendConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.collection_documents, "documents");
        assert_eq!(config.collection_code, "code");
    }

    #[test]
    fn configured_when_url_and_key_set() {
        let config = BackendConfig { url: "https://backend.example".into(), api_key: "key".into(), ..Default::default() };
        assert!(config.is_configured());
    }
}
