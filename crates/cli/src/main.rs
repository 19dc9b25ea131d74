use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use fallfmt_config::DisplayConfig;
use fallfmt_core::{resolve, Delta, FieldValue};
use fallfmt_formatters::builtin_registry;
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "fallctl", version, about = "Fallfmt CLI")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output {
    Human,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List registered formatters
    Formatters {
        /// Only formatters supporting this field type
        #[arg(long = "field-type")]
        field_type: Option<String>,
    },
    /// Validate a display config and show the effective chain order
    Check {
        /// Display config file (.yaml/.yml/.json)
        config: PathBuf,
    },
    /// Render values through a configured fallback chain
    Render {
        /// Display config file (.yaml/.yml/.json)
        config: PathBuf,
        /// Field values given inline
        values: Vec<String>,
        /// JSON file with an array of strings or {value, processed} objects
        #[arg(long = "values-file", conflicts_with = "values")]
        values_file: Option<PathBuf>,
    },
}

/// One entry of a values file: a bare string or a full field value.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ValueEntry {
    Text(String),
    Full(FieldValue),
}

impl From<ValueEntry> for FieldValue {
    fn from(e: ValueEntry) -> Self {
        match e {
            ValueEntry::Text(s) => FieldValue::text(s),
            ValueEntry::Full(v) => v,
        }
    }
}

fn init_tracing() {
    let env = std::env::var("FALLFMT_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

fn load_values(inline: Vec<String>, file: Option<&PathBuf>) -> Result<Vec<FieldValue>> {
    if let Some(path) = file {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading values file {}", path.display()))?;
        let entries: Vec<ValueEntry> =
            serde_json::from_str(&raw).context("parsing values file JSON")?;
        return Ok(entries.into_iter().map(FieldValue::from).collect());
    }
    Ok(inline.into_iter().map(FieldValue::text).collect())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let registry = builtin_registry();

    match cli.command {
        Commands::Formatters { field_type } => {
            let defs = match field_type.as_deref() {
                Some(ft) => registry.definitions_for(ft),
                None => registry.definitions(),
            };
            match cli.output {
                Output::Human => {
                    for def in defs {
                        println!("{} • {} • {}", def.id, def.label, def.field_types.join(","));
                    }
                }
                Output::Json => println!("{}", serde_json::to_string_pretty(&defs)?),
            }
        }
        Commands::Check { config } => {
            let cfg = DisplayConfig::load(&config)?;
            let specs = cfg.specs();
            let issues = registry.verify(&cfg.field_type, &specs);
            let chain = registry.prepare(&cfg.field_type, &specs);
            let order: Vec<String> = chain
                .iter()
                .map(|p| format!("{} (weight {})", p.spec.id, p.spec.weight))
                .collect();
            match cli.output {
                Output::Human => {
                    for issue in &issues {
                        println!("issue: {}", issue);
                    }
                    for (i, entry) in order.iter().enumerate() {
                        println!("{}. {}", i + 1, entry);
                    }
                    if chain.is_empty() {
                        println!("no formatters selected");
                    }
                }
                Output::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&serde_json::json!({
                            "issues": issues,
                            "chain": order,
                        }))?
                    );
                }
            }
            if !issues.is_empty() {
                std::process::exit(1);
            }
        }
        Commands::Render { config, values, values_file } => {
            let cfg = DisplayConfig::load(&config)?;
            let values = load_values(values, values_file.as_ref())?;
            for issue in registry.verify(&cfg.field_type, &cfg.specs()) {
                warn!(%issue, "chain issue");
            }
            let chain = registry.prepare(&cfg.field_type, &cfg.specs());
            info!(formatters = chain.len(), values = values.len(), "rendering");
            let out = resolve(&values, &chain);
            match cli.output {
                Output::Human => {
                    for (delta, fragment) in &out {
                        println!("{}\t{}", delta, fragment.markup);
                    }
                }
                Output::Json => {
                    let by_delta: BTreeMap<Delta, &str> =
                        out.iter().map(|(d, f)| (*d, f.markup.as_str())).collect();
                    println!("{}", serde_json::to_string_pretty(&by_delta)?);
                }
            }
        }
    }

    Ok(())
}
