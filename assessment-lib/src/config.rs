use crate::types::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const TEMPLATE_LIBRARY: &str = "template_library";

const DEFAULT_FEATURES: &[(&str, bool)] = &[(TEMPLATE_LIBRARY, true)];

/// Paths, storage key and feature flags shared by every front end.
///
/// Every field has a default, so a config file only lists overrides:
///
/// ```json
/// { "builder_path": "/builder", "features": { "template_library": false } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub start_path: String,
    pub results_path: String,
    pub builder_path: String,
    pub storage_key: String,
    pub features: BTreeMap<String, bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            start_path: "/start".to_string(),
            results_path: "/results".to_string(),
            builder_path: "/money-model".to_string(),
            storage_key: "selectedTemplate".to_string(),
            features: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Flags missing from the config fall back to their built-in default,
    /// and unknown flags are off.
    pub fn feature(&self, name: &str) -> bool {
        self.features.get(name).copied().unwrap_or_else(|| {
            DEFAULT_FEATURES
                .iter()
                .find(|(flag, _)| *flag == name)
                .map(|(_, enabled)| *enabled)
                .unwrap_or(false)
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("start_path", &self.start_path),
            ("results_path", &self.results_path),
            ("builder_path", &self.builder_path),
        ] {
            if !value.starts_with('/') || value.contains(|c: char| c == '?' || c == '#') {
                return Err(ConfigError::InvalidPath {
                    field,
                    value: value.clone(),
                });
            }
        }
        if self.storage_key.is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        Ok(())
    }
}
