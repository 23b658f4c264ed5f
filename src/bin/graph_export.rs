use std::path::PathBuf;

use clap::Parser;
use openapi_complexity::{files, find_cyclic_schemas, merge_text, parse_document, AnalyzerConfig, SchemaGraph, SpecError};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-graph-export")]
#[command(about = "Export the named-schema reference graph to DOT format")]
struct Cli {
    /// Path to the OpenAPI YAML/JSON document
    spec: PathBuf,

    /// Output file (defaults to schemas.dot)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Split and merge concatenated documents first
    #[arg(long)]
    merge: bool,
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
    let text = files::read_text(&cli.spec)?;
    let doc = if cli.merge {
        let config = AnalyzerConfig::load()?;
        merge_text(&text, &config.merge)?.document
    } else {
        parse_document(&text)?
    };

    println!("Loading schema graph from: {}", cli.spec.display());
    let graph = SchemaGraph::from_document(&doc);
    let cyclic = find_cyclic_schemas(&graph);

    println!(
        "Graph loaded: {} schemas, {} edges, {} cyclic",
        graph.schema_count(),
        graph.edge_count(),
        cyclic.len()
    );

    let output_path = cli.output.unwrap_or_else(|| PathBuf::from("schemas.dot"));
    files::write_text(&output_path, &graph.to_dot())?;
    println!("✅ Exported DOT to: {}", output_path.display());

    Ok(())
}
