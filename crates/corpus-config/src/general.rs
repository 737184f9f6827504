//! General service configuration: the ambient knobs not owned by the
//! backend or embedder sections (§6, §8).

use serde::{Deserialize, Serialize};

fn default_verify_pass_threshold() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Optional directory backups are written under (§6: "an optional path
    /// for backups"). Absent, the backup tools return a configuration
    /// error rather than writing to an implicit location.
    #[serde(default)]
    pub backup_dir: Option<String>,

    /// Default pass threshold for `verify_document`/`verify_category`
    /// when the caller doesn't supply one (§4.H: "pass threshold is
    /// configurable (default 1.0)").
    #[serde(default = "default_verify_pass_threshold")]
    pub verify_pass_threshold: f64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { backup_dir: None, verify_pass_threshold: default_verify_pass_threshold() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert!(config.backup_dir.is_none());
        assert_eq!(config.verify_pass_threshold, 1.0);
    }
}
