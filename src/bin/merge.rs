//! OpenAPI Merge CLI
//!
//! Splits a file of concatenated OpenAPI documents and writes one merged
//! document with internal-only references.

use std::path::PathBuf;

use clap::Parser;
use openapi_complexity::{files, merge_text, AnalyzerConfig, Severity, SpecError};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "openapi-merge")]
#[command(about = "Merge concatenated OpenAPI documents into one")]
struct Cli {
    /// Path to the concatenated OpenAPI YAML
    input: PathBuf,

    /// Overwrite the input file (the original is kept as <input>.bak)
    #[arg(long)]
    in_place: bool,

    /// Configuration file
    #[arg(short, long)]
    config: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("❌ Error: {:#}", e);
        let code = e.downcast_ref::<SpecError>().map_or(1, SpecError::exit_code);
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AnalyzerConfig::load_from(cli.config.as_deref())?;
    let text = files::read_text(&cli.input)?;

    let outcome = merge_text(&text, &config.merge)?;

    for item in &outcome.diagnostics {
        if item.severity() == Severity::Warning {
            eprintln!("⚠️  {}", item);
        }
    }
    if !outcome.conflicts.is_empty() {
        eprintln!("⚠️  {} value(s) from later documents were shadowed by earlier ones:", outcome.conflicts.len());
        for conflict in &outcome.conflicts {
            eprintln!(
                "   └─ {} (document {}): kept '{}', ignored '{}'",
                conflict.address, conflict.document, conflict.kept, conflict.ignored
            );
        }
    }

    let yaml = outcome.to_yaml()?;
    let written = files::write_merged(&cli.input, &yaml, cli.in_place)?;

    match written.backup {
        Some(backup) => println!(
            "✅ Wrote merged OpenAPI to {} (backup at {})",
            written.output.display(),
            backup.display()
        ),
        None => println!("✅ Wrote merged OpenAPI to {}", written.output.display()),
    }
    if outcome.rewritten_refs > 0 {
        println!("   {} external reference(s) rewritten to internal form", outcome.rewritten_refs);
    }

    Ok(())
}
