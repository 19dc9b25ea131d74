//! Fallfmt core types and the fallback resolver.

#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

mod resolver;

pub use resolver::resolve;

/// Zero-based position of a value within a multi-value field.
pub type Delta = usize;

/// One value of a multi-value field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldValue {
    pub value: String,
    /// Host-prepared rendition (filtered/escaped), when the host did one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed: Option<String>,
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self { value: value.into(), processed: None }
    }

    /// Processed rendition if present, raw value otherwise.
    pub fn display(&self) -> &str {
        self.processed.as_deref().unwrap_or(&self.value)
    }
}

/// Rendered output for a single delta.
///
/// A formatter may emit a fragment and still withhold it from the final
/// result by marking it hidden; the resolver drops hidden fragments before
/// merging, so the delta falls through to the next formatter in the chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fragment {
    pub markup: String,
    pub visible: bool,
}

impl Fragment {
    pub fn new(markup: impl Into<String>) -> Self {
        Self { markup: markup.into(), visible: true }
    }

    pub fn hidden(markup: impl Into<String>) -> Self {
        Self { markup: markup.into(), visible: false }
    }
}

/// One configured entry of a fallback chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatterSpec {
    /// Formatter identifier as registered in the catalog.
    pub id: String,
    /// Lower weight runs earlier and wins contested deltas.
    pub weight: i32,
    pub enabled: bool,
    /// Opaque settings payload, passed through to the capability unchanged.
    pub settings: serde_json::Value,
}

impl FormatterSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            weight: 0,
            enabled: true,
            settings: serde_json::Value::Object(Default::default()),
        }
    }
}

/// Partial per-delta output of one capability invocation.
///
/// Entries for deltas the capability chose not to render are simply absent.
/// Out-of-range or duplicate deltas are tolerated here; the resolver
/// discards them before merging.
pub type RenderMap = SmallVec<[(Delta, Fragment); 8]>;

/// A unit of rendering logic. Given the full value sequence it decides, per
/// delta, whether it can represent that value, and returns output only for
/// the deltas it chooses to handle.
///
/// Implementations must be deterministic for identical inputs and must not
/// mutate or retain the values.
pub trait RenderCapability: Send + Sync {
    fn render(&self, values: &[FieldValue], settings: &serde_json::Value) -> RenderMap;
}

/// A ready-to-run chain entry: a spec paired with its capability.
///
/// Produced by the catalog's prepare step, which drops disabled specs and
/// sorts by weight; `resolve` assumes the chain is already in execution
/// order.
#[derive(Clone)]
pub struct PreparedFormatter {
    pub spec: FormatterSpec,
    pub capability: Arc<dyn RenderCapability>,
}

impl PreparedFormatter {
    pub fn new(spec: FormatterSpec, capability: Arc<dyn RenderCapability>) -> Self {
        Self { spec, capability }
    }
}

impl std::fmt::Debug for PreparedFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedFormatter")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

/// Delta-ordered resolution result. Deltas no formatter rendered are absent.
pub type Resolution = BTreeMap<Delta, Fragment>;

pub mod prelude {
    pub use super::{
        resolve, Delta, FieldValue, FormatterSpec, Fragment, PreparedFormatter, RenderCapability,
        RenderMap, Resolution,
    };
}
