//! Built-in formatters.
//!
//! Each built-in is a capability plus a catalog definition; `install`
//! registers the whole set on a registry.

#![forbid(unsafe_code)]

use std::sync::Arc;

use fallfmt_core::{FieldValue, Fragment, RenderCapability, RenderMap};
use fallfmt_registry::{FormatterDef, Registry};
use tracing::warn;

/// Field types every built-in can render.
const TEXT_TYPES: &[&str] = &["text", "text_long", "string"];

fn str_setting<'a>(settings: &'a serde_json::Value, key: &str, fallback: &'a str) -> &'a str {
    settings.get(key).and_then(|v| v.as_str()).unwrap_or(fallback)
}

/// Renders every delta verbatim: the processed rendition when the host
/// provided one, the raw value otherwise. The natural catch-all tail of a
/// chain.
pub struct Plain;

impl RenderCapability for Plain {
    fn render(&self, values: &[FieldValue], _settings: &serde_json::Value) -> RenderMap {
        values
            .iter()
            .enumerate()
            .map(|(delta, v)| (delta, Fragment::new(v.display())))
            .collect()
    }
}

/// Renders every delta as `<prefix><value>`.
pub struct Prefixed;

impl RenderCapability for Prefixed {
    fn render(&self, values: &[FieldValue], settings: &serde_json::Value) -> RenderMap {
        let prefix = str_setting(settings, "prefix", "");
        values
            .iter()
            .enumerate()
            .map(|(delta, v)| (delta, Fragment::new(format!("{}{}", prefix, v.display()))))
            .collect()
    }
}

/// Renders every delta truncated to `trim_length` characters, appending
/// `ellipsis` when truncation happened.
pub struct Trimmed;

impl Trimmed {
    fn trim(text: &str, limit: usize, ellipsis: &str) -> String {
        if text.chars().count() <= limit {
            return text.to_string();
        }
        let mut out: String = text.chars().take(limit).collect();
        out.push_str(ellipsis);
        out
    }
}

impl RenderCapability for Trimmed {
    fn render(&self, values: &[FieldValue], settings: &serde_json::Value) -> RenderMap {
        let limit = settings
            .get("trim_length")
            .and_then(|v| v.as_u64())
            .unwrap_or(600) as usize;
        let ellipsis = str_setting(settings, "ellipsis", "…");
        values
            .iter()
            .enumerate()
            .map(|(delta, v)| (delta, Fragment::new(Self::trim(v.display(), limit, ellipsis))))
            .collect()
    }
}

/// Renders only deltas whose value matches the `pattern` regex, as
/// `<prefix><value>`. An empty or invalid pattern renders nothing.
pub struct Matching;

impl RenderCapability for Matching {
    fn render(&self, values: &[FieldValue], settings: &serde_json::Value) -> RenderMap {
        let pattern = str_setting(settings, "pattern", "");
        if pattern.is_empty() {
            return RenderMap::new();
        }
        let re = match regex::Regex::new(pattern) {
            Ok(re) => re,
            Err(e) => {
                warn!(pattern, error = %e, "invalid match pattern; rendering nothing");
                return RenderMap::new();
            }
        };
        let prefix = str_setting(settings, "prefix", "");
        values
            .iter()
            .enumerate()
            .filter(|(_, v)| re.is_match(v.display()))
            .map(|(delta, v)| (delta, Fragment::new(format!("{}{}", prefix, v.display()))))
            .collect()
    }
}

/// Register all built-ins on `registry`.
pub fn install(registry: &mut Registry) {
    registry.register(
        FormatterDef::new("plain", "Plain text").field_types(TEXT_TYPES),
        Arc::new(Plain),
    );
    registry.register(
        FormatterDef::new("prefixed", "Prefixed text")
            .field_types(TEXT_TYPES)
            .default_settings(serde_json::json!({"prefix": ""})),
        Arc::new(Prefixed),
    );
    registry.register(
        FormatterDef::new("trimmed", "Trimmed text")
            .field_types(TEXT_TYPES)
            .default_settings(serde_json::json!({"trim_length": 600, "ellipsis": "…"})),
        Arc::new(Trimmed),
    );
    registry.register(
        FormatterDef::new("matching", "Pattern match")
            .field_types(TEXT_TYPES)
            .default_settings(serde_json::json!({"pattern": "", "prefix": ""})),
        Arc::new(Matching),
    );
}

/// A registry pre-loaded with every built-in.
pub fn builtin_registry() -> Registry {
    let mut registry = Registry::new();
    install(&mut registry);
    registry
}
