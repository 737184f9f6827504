//! Embedder configuration (§6 "embedder model identifier").

use serde::{Deserialize, Serialize};

fn default_model_id() -> String {
    "BAAI/bge-small-en-v1.5".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbedderConfig {
    /// Embedder model identifier, passed through to `fastembed`'s model
    /// registry.
    #[serde(default = "default_model_id")]
    pub model_id: String,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self { model_id: default_model_id() }
    }
}

impl EmbedderConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.model_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_id_is_configured() {
        let config = EmbedderConfig::default();
        assert!(config.is_configured());
        assert_eq!(config.model_id, "BAAI/bge-small-en-v1.5");
    }
}
