//! Export the OpenAPI specification as JSON
//!
//! Usage:
//!   cargo run --bin export_openapi > openapi.json
//!   cargo run --bin export_openapi -- --output docs/openapi.json

use anyhow::Context;
use clap::Parser;
use utoipa::OpenApi;

use anchor_remit::gateway::openapi::ApiDoc;

#[derive(Parser, Debug)]
struct Args {
    /// Write to this file instead of stdout
    #[arg(long)]
    output: Option<std::path::PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .context("serializing OpenAPI spec")?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, &json)
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("OpenAPI spec exported to: {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
