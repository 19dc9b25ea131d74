//! End-to-end: display config -> prepared chain -> resolution.

use fallfmt_config::DisplayConfig;
use fallfmt_core::{resolve, FieldValue};
use fallfmt_formatters::builtin_registry;

fn fruit() -> Vec<FieldValue> {
    vec![FieldValue::text("Apple"), FieldValue::text("Banana"), FieldValue::text("Carrot")]
}

const CHAIN_YAML: &str = r#"
field_type: text
formatters:
  - formatter: matching
    settings:
      pattern: "^[aA]"
      prefix: "A: "
  - formatter: matching
    weight: 1
    settings:
      pattern: "^[bB]"
      prefix: "B: "
  - formatter: prefixed
    weight: 2
    settings:
      prefix: "DEFAULT: "
"#;

#[test]
fn configured_chain_resolves_per_delta() {
    let cfg = DisplayConfig::from_yaml_str(CHAIN_YAML).unwrap();
    let registry = builtin_registry();
    let chain = registry.prepare(&cfg.field_type, &cfg.specs());
    assert_eq!(chain.len(), 3);

    let out = resolve(&fruit(), &chain);
    let got: Vec<_> = out.iter().map(|(d, f)| (*d, f.markup.as_str())).collect();
    assert_eq!(got, vec![(0, "A: Apple"), (1, "B: Banana"), (2, "DEFAULT: Carrot")]);
}

#[test]
fn negative_weight_moves_the_catch_all_first() {
    let mut cfg = DisplayConfig::from_yaml_str(CHAIN_YAML).unwrap();
    // Same chain, but the catch-all is reweighted to run before the
    // pattern formatters; it then resolves every delta and nothing else
    // contributes.
    cfg.formatters[2].weight = -1;
    let registry = builtin_registry();
    let chain = registry.prepare(&cfg.field_type, &cfg.specs());
    assert_eq!(chain[0].spec.id, "prefixed");

    let out = resolve(&fruit(), &chain);
    let got: Vec<_> = out.iter().map(|(d, f)| (*d, f.markup.as_str())).collect();
    assert_eq!(
        got,
        vec![(0, "DEFAULT: Apple"), (1, "DEFAULT: Banana"), (2, "DEFAULT: Carrot")]
    );
}

#[test]
fn disabled_entries_are_dropped_before_resolution() {
    let mut cfg = DisplayConfig::from_yaml_str(CHAIN_YAML).unwrap();
    cfg.formatters[0].status = false;
    let registry = builtin_registry();
    let chain = registry.prepare(&cfg.field_type, &cfg.specs());
    assert_eq!(chain.len(), 2);

    let out = resolve(&fruit(), &chain);
    // With the "A" formatter disabled, Apple falls through to the catch-all.
    assert_eq!(out[&0].markup, "DEFAULT: Apple");
    assert_eq!(out[&1].markup, "B: Banana");
}

#[test]
fn trimmed_defaults_apply_through_prepare() {
    let cfg = DisplayConfig::from_yaml_str(
        r#"
formatters:
  - formatter: trimmed
    settings:
      trim_length: 4
"#,
    )
    .unwrap();
    let registry = builtin_registry();
    let chain = registry.prepare(&cfg.field_type, &cfg.specs());
    // trim_length from config, ellipsis from the definition defaults.
    assert_eq!(chain[0].spec.settings["trim_length"], 4);
    assert_eq!(chain[0].spec.settings["ellipsis"], "…");

    let out = resolve(&[FieldValue::text("Dragonfruit")], &chain);
    assert_eq!(out[&0].markup, "Drag…");
}
