//! Schema Validator CLI
//!
//! Checks schema documents and validates JSON instances against them.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use familiar_validator::{ErrorRecord, Validator, ValidatorConfig};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-validator")]
#[command(about = "Check schemas and validate JSON documents against them")]
struct Cli {
    /// Configuration file (defaults to validator.toml lookup)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Print errors as a JSON array
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a schema document is well formed
    Check {
        /// Schema file
        schema: PathBuf,
    },

    /// Validate an instance document
    Validate {
        /// Schema file (omit when using --name)
        #[arg(required_unless_present = "name")]
        schema: Option<PathBuf>,

        /// Instance file
        instance: Option<PathBuf>,

        /// Validate against a registered schema instead of a file
        #[arg(short, long)]
        name: Option<String>,

        /// Directory of schemas to register before validating
        #[arg(short = 'd', long)]
        schema_dir: Vec<PathBuf>,
    },

    /// List registered format names
    Formats,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

/// Returns whether the input was valid
fn run(cli: Cli) -> anyhow::Result<bool> {
    let config =
        ValidatorConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    let mut validator = Validator::from_config(&config)?;

    match cli.command {
        Commands::Check { schema } => {
            let document = read_json(&schema)?;
            let errors = validator.validate_schema(&document);
            report(&errors, cli.json, &format!("{} is a valid schema", schema.display()))
        }

        Commands::Validate {
            schema,
            instance,
            name,
            schema_dir,
        } => {
            for dir in &schema_dir {
                let summary = validator.load_schema_dir(dir)?;
                for (path, errors) in &summary.rejected {
                    eprintln!(
                        "⚠️  {} rejected ({} schema errors)",
                        path.display(),
                        errors.len()
                    );
                }
            }

            // with --name the single positional is the instance
            let (schema, instance) = match (&name, schema, instance) {
                (Some(_), Some(instance), None) | (Some(_), None, Some(instance)) => {
                    (None, instance)
                }
                (None, Some(schema), Some(instance)) => (Some(schema), instance),
                (Some(_), Some(_), Some(_)) => {
                    bail!("pass either a schema file or --name, not both")
                }
                _ => bail!("missing instance file"),
            };

            let value = read_json(&instance)?;
            let errors = match (&name, &schema) {
                (Some(name), _) => validator.validate(name, &value),
                (None, Some(path)) => validator.validate(&read_json(path)?, &value),
                (None, None) => bail!("missing schema"),
            };
            report(&errors, cli.json, &format!("{} is valid", instance.display()))
        }

        Commands::Formats => {
            for name in validator.formats().names() {
                println!("{}", name);
            }
            Ok(true)
        }
    }
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn report(errors: &[ErrorRecord], json: bool, success: &str) -> anyhow::Result<bool> {
    if json {
        println!("{}", serde_json::to_string_pretty(errors)?);
    } else if errors.is_empty() {
        println!("✅ {}", success);
    } else {
        println!("❌ {} error(s)", errors.len());
        for error in errors {
            println!("   └─ {}", error);
        }
    }
    Ok(errors.is_empty())
}
