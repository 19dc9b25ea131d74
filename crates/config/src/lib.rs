//! Display configuration: the user-editable description of a fallback
//! chain, loadable from YAML or JSON.

#![forbid(unsafe_code)]

use std::path::Path;

use anyhow::{bail, Context, Result};
use fallfmt_core::FormatterSpec;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn default_field_type() -> String {
    "text".to_string()
}

/// One configured formatter in a display chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChainEntry {
    /// Formatter id as registered in the catalog.
    pub formatter: String,
    /// Disabled entries stay in the config but are dropped at prepare time.
    #[serde(default = "default_true")]
    pub status: bool,
    #[serde(default)]
    pub weight: i32,
    #[serde(default)]
    pub settings: serde_json::Value,
}

/// A fallback chain for one field display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    #[serde(default = "default_field_type")]
    pub field_type: String,
    #[serde(default)]
    pub formatters: Vec<ChainEntry>,
}

impl DisplayConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        serde_yaml::from_str(s).context("parsing display config YAML")
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("parsing display config JSON")
    }

    /// Load from a file, picking the format by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str());
        let yaml = match ext {
            Some("yaml") | Some("yml") => true,
            Some("json") => false,
            other => bail!(
                "unsupported display config extension {:?} for {}",
                other,
                path.display()
            ),
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading display config {}", path.display()))?;
        if yaml {
            Self::from_yaml_str(&raw)
        } else {
            Self::from_json_str(&raw)
        }
    }

    /// Configured entries as core specs, in config order. Filtering and
    /// weight ordering happen at prepare time.
    pub fn specs(&self) -> Vec<FormatterSpec> {
        self.formatters
            .iter()
            .map(|e| FormatterSpec {
                id: e.formatter.clone(),
                weight: e.weight,
                enabled: e.status,
                settings: e.settings.clone(),
            })
            .collect()
    }
}
