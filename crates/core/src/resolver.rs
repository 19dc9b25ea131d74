//! Per-delta fallback resolution over an ordered formatter chain.

use std::collections::BTreeSet;

use crate::{FieldValue, Fragment, PreparedFormatter, Resolution};

/// Run `values` through `chain` in order, keeping the first visible fragment
/// produced for each delta.
///
/// The chain must already be enabled-filtered and weight-sorted (stable on
/// ties); `resolve` does not reorder it. Each capability is invoked with the
/// full value slice and decides on its own which deltas to render. Fragments
/// for deltas an earlier formatter already resolved — and fragments marked
/// hidden, or for deltas outside `0..values.len()` — are discarded, so an
/// earlier formatter's output is never overwritten.
///
/// Once every delta is accounted for, the remaining formatters are not
/// invoked at all. Deltas no formatter rendered are absent from the result;
/// that is an expected outcome, not an error.
pub fn resolve(values: &[FieldValue], chain: &[PreparedFormatter]) -> Resolution {
    let mut out = Resolution::new();
    let mut remaining: BTreeSet<usize> = (0..values.len()).collect();

    for entry in chain {
        if remaining.is_empty() {
            break;
        }
        let rendered = entry.capability.render(values, &entry.spec.settings);
        for (delta, fragment) in rendered {
            if !fragment.visible {
                continue;
            }
            // remove() is false for out-of-range, duplicate, and
            // already-resolved deltas alike.
            if !remaining.remove(&delta) {
                continue;
            }
            out.insert(delta, fragment);
        }
    }

    // BTreeMap iteration is ascending by delta, which is the caller-facing
    // ordering contract.
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{FieldValue, FormatterSpec, Fragment, PreparedFormatter, RenderCapability, RenderMap};

    use super::resolve;

    /// Renders a fixed set of (delta, fragment) pairs, ignoring the values.
    struct Fixed(Vec<(usize, Fragment)>);

    impl RenderCapability for Fixed {
        fn render(&self, _values: &[FieldValue], _settings: &serde_json::Value) -> RenderMap {
            self.0.iter().cloned().collect()
        }
    }

    fn entry(id: &str, pairs: Vec<(usize, Fragment)>) -> PreparedFormatter {
        PreparedFormatter::new(FormatterSpec::new(id), Arc::new(Fixed(pairs)))
    }

    fn values(n: usize) -> Vec<FieldValue> {
        (0..n).map(|i| FieldValue::text(format!("v{}", i))).collect()
    }

    #[test]
    fn empty_values_yield_empty_resolution() {
        let chain = vec![entry("a", vec![(0, Fragment::new("x"))])];
        assert!(resolve(&[], &chain).is_empty());
    }

    #[test]
    fn empty_chain_yields_empty_resolution() {
        assert!(resolve(&values(3), &[]).is_empty());
    }

    #[test]
    fn first_formatter_wins_contested_delta() {
        let chain = vec![
            entry("first", vec![(0, Fragment::new("first"))]),
            entry("second", vec![(0, Fragment::new("second")), (1, Fragment::new("other"))]),
        ];
        let out = resolve(&values(2), &chain);
        assert_eq!(out[&0].markup, "first");
        assert_eq!(out[&1].markup, "other");
    }

    #[test]
    fn out_of_range_deltas_are_discarded() {
        let chain = vec![entry("a", vec![(0, Fragment::new("ok")), (7, Fragment::new("junk"))])];
        let out = resolve(&values(2), &chain);
        assert_eq!(out.len(), 1);
        assert!(out.contains_key(&0));
    }

    #[test]
    fn duplicate_deltas_keep_first_entry() {
        let chain = vec![entry("a", vec![(1, Fragment::new("one")), (1, Fragment::new("two"))])];
        let out = resolve(&values(2), &chain);
        assert_eq!(out[&1].markup, "one");
    }

    #[test]
    fn hidden_fragments_fall_through() {
        let chain = vec![
            entry("deny", vec![(0, Fragment::hidden("withheld"))]),
            entry("catch", vec![(0, Fragment::new("caught"))]),
        ];
        let out = resolve(&values(1), &chain);
        assert_eq!(out[&0].markup, "caught");
    }

    #[test]
    fn unrendered_deltas_are_absent() {
        let chain = vec![entry("a", vec![(2, Fragment::new("last"))])];
        let out = resolve(&values(3), &chain);
        assert_eq!(out.keys().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn result_keys_are_delta_ordered() {
        // Later formatters fill earlier deltas; iteration must still ascend.
        let chain = vec![
            entry("tail", vec![(2, Fragment::new("c"))]),
            entry("head", vec![(0, Fragment::new("a")), (1, Fragment::new("b"))]),
        ];
        let out = resolve(&values(3), &chain);
        let keys: Vec<_> = out.keys().copied().collect();
        assert_eq!(keys, vec![0, 1, 2]);
    }

    #[test]
    fn resolve_is_idempotent() {
        let vals = values(3);
        let chain = vec![
            entry("a", vec![(0, Fragment::new("a0"))]),
            entry("b", vec![(1, Fragment::new("b1")), (2, Fragment::new("b2"))]),
        ];
        assert_eq!(resolve(&vals, &chain), resolve(&vals, &chain));
    }
}
