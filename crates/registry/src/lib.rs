//! Fallfmt formatter catalog: definitions, capability lookup, and chain
//! preparation.
//!
//! The registry is assembled at load time and handed to callers as a plain
//! value; nothing here is discovered or fetched from ambient state.

#![forbid(unsafe_code)]

use std::sync::Arc;

use fallfmt_core::{FormatterSpec, PreparedFormatter, RenderCapability};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Static description of one formatter implementation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormatterDef {
    pub id: String,
    pub label: String,
    /// Field types this formatter can render.
    pub field_types: Vec<String>,
    /// Defaults merged into configured settings (shallow; config keys win).
    pub default_settings: serde_json::Value,
}

impl FormatterDef {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            field_types: Vec::new(),
            default_settings: serde_json::Value::Object(Default::default()),
        }
    }

    pub fn field_types(mut self, types: &[&str]) -> Self {
        self.field_types = types.iter().map(|s| (*s).to_string()).collect();
        self
    }

    pub fn default_settings(mut self, defaults: serde_json::Value) -> Self {
        self.default_settings = defaults;
        self
    }

    pub fn supports(&self, field_type: &str) -> bool {
        self.field_types.iter().any(|t| t == field_type)
    }
}

/// A problem found in a configured chain. Reported as data so front ends
/// can surface it without consulting registry internals.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChainIssue {
    #[error("unknown formatter: {0}")]
    Unknown(String),
    #[error("formatter {id} does not support field type {field_type}")]
    UnsupportedFieldType { id: String, field_type: String },
}

struct Entry {
    def: FormatterDef,
    capability: Arc<dyn RenderCapability>,
}

/// In-process formatter catalog, keyed by formatter id.
#[derive(Default)]
pub struct Registry {
    entries: FxHashMap<String, Entry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a formatter. Re-registering an id replaces the previous
    /// entry.
    pub fn register(&mut self, def: FormatterDef, capability: Arc<dyn RenderCapability>) {
        let id = def.id.clone();
        if self.entries.insert(id.clone(), Entry { def, capability }).is_some() {
            warn!(id = %id, "formatter re-registered; previous entry replaced");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capability(&self, id: &str) -> Option<Arc<dyn RenderCapability>> {
        self.entries.get(id).map(|e| e.capability.clone())
    }

    pub fn definition(&self, id: &str) -> Option<&FormatterDef> {
        self.entries.get(id).map(|e| &e.def)
    }

    /// All definitions, sorted by id for stable listings.
    pub fn definitions(&self) -> Vec<&FormatterDef> {
        let mut defs: Vec<&FormatterDef> = self.entries.values().map(|e| &e.def).collect();
        defs.sort_by(|a, b| a.id.cmp(&b.id));
        defs
    }

    /// Definitions able to render `field_type`, sorted by id for stable
    /// listings.
    pub fn definitions_for(&self, field_type: &str) -> Vec<&FormatterDef> {
        let mut defs: Vec<&FormatterDef> = self
            .entries
            .values()
            .map(|e| &e.def)
            .filter(|d| d.supports(field_type))
            .collect();
        defs.sort_by(|a, b| a.id.cmp(&b.id));
        defs
    }

    /// Normalize a configured chain into execution order.
    ///
    /// Specs that are unknown, do not support `field_type`, or are disabled
    /// are dropped. Surviving specs get the definition's default settings
    /// merged in (shallow; configured keys win) and are stably sorted by
    /// weight ascending, so ties keep their configured order.
    pub fn prepare(&self, field_type: &str, specs: &[FormatterSpec]) -> Vec<PreparedFormatter> {
        let mut chain: Vec<PreparedFormatter> = Vec::with_capacity(specs.len());
        for spec in specs {
            let entry = match self.entries.get(&spec.id) {
                Some(e) => e,
                None => {
                    warn!(id = %spec.id, "dropping unknown formatter from chain");
                    continue;
                }
            };
            if !entry.def.supports(field_type) {
                warn!(id = %spec.id, field_type, "dropping formatter: unsupported field type");
                continue;
            }
            if !spec.enabled {
                debug!(id = %spec.id, "dropping disabled formatter from chain");
                continue;
            }
            let mut spec = spec.clone();
            merge_default_settings(&mut spec.settings, &entry.def.default_settings);
            chain.push(PreparedFormatter::new(spec, entry.capability.clone()));
        }
        chain.sort_by_key(|p| p.spec.weight);
        chain
    }

    /// Report configuration problems without altering the chain. Disabled
    /// specs are not an issue; they are a user choice.
    pub fn verify(&self, field_type: &str, specs: &[FormatterSpec]) -> Vec<ChainIssue> {
        let mut issues = Vec::new();
        for spec in specs {
            match self.entries.get(&spec.id) {
                None => issues.push(ChainIssue::Unknown(spec.id.clone())),
                Some(e) if !e.def.supports(field_type) => {
                    issues.push(ChainIssue::UnsupportedFieldType {
                        id: spec.id.clone(),
                        field_type: field_type.to_string(),
                    });
                }
                Some(_) => {}
            }
        }
        issues
    }
}

/// Shallow merge: keys present in `defaults` but absent from `settings` are
/// filled in. A non-object settings value is replaced by the defaults.
fn merge_default_settings(settings: &mut serde_json::Value, defaults: &serde_json::Value) {
    let defaults = match defaults.as_object() {
        Some(d) if !d.is_empty() => d,
        _ => return,
    };
    match settings.as_object_mut() {
        Some(map) => {
            for (k, v) in defaults {
                map.entry(k.clone()).or_insert_with(|| v.clone());
            }
        }
        None => *settings = serde_json::Value::Object(defaults.clone()),
    }
}
