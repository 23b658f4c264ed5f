//! OpenAPI Complexity CLI
//!
//! Computes the structural complexity report of an OpenAPI document and,
//! optionally, a Markdown assessment.

use std::path::PathBuf;

use clap::Parser;
use openapi_complexity::{
    analyze, files, merge_text, parse_document, render_assessment, AnalyzerConfig, SpecError,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "openapi-complexity")]
#[command(about = "Measure the structural complexity of an OpenAPI document")]
struct Cli {
    /// Path to the OpenAPI YAML/JSON document
    spec: PathBuf,

    /// Write the JSON report here instead of stdout
    #[arg(long)]
    json_out: Option<PathBuf>,

    /// Also write a Markdown assessment
    #[arg(long)]
    markdown_out: Option<PathBuf>,

    /// Split and merge concatenated documents before analysis
    #[arg(long)]
    merge: bool,

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
    let text = files::read_text(&cli.spec)?;

    let doc = if cli.merge {
        let outcome = merge_text(&text, &config.merge)?;
        for item in outcome.diagnostics.warnings() {
            eprintln!("⚠️  {}", item);
        }
        outcome.document
    } else {
        parse_document(&text)?
    };

    let report = analyze(&doc, &config);
    let json = report.to_json_pretty()?;

    match &cli.json_out {
        Some(path) => {
            files::write_text(path, &json)?;
            eprintln!("✅ Wrote complexity report to {}", path.display());
        }
        None => println!("{}", json),
    }

    if let Some(path) = &cli.markdown_out {
        files::write_text(path, &render_assessment(&report))?;
        eprintln!("✅ Wrote assessment to {}", path.display());
    }

    if report.waveform_serialization.issue_detected {
        eprintln!(
            "⚠️  {} sample array(s) serialized as JSON numbers with no binary alternative",
            report.waveform_serialization.properties.len()
        );
    }

    Ok(())
}
