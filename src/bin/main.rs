//! IIIF Presentation Upgrade CLI
//!
//! Command-line tool for upgrading Presentation 2 manifests and collections
//! to Presentation 3.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use iiif_upgrade::{
    load_document, to_json_string, upgrade, Dereferencer, DocumentSource, HttpDereferencer,
    NoOpDereferencer, UpgradeError, UpgradeOptions, UpgradeResult,
};

#[derive(Parser)]
#[command(name = "iiif-upgrade")]
#[command(about = "Upgrade IIIF Presentation 2 documents to Presentation 3")]
#[command(version)]
struct Cli {
    /// Path to a Presentation 2 JSON file, or its URL
    source: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Write diagnostics as JSON to this file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Move `description` into `summary` instead of a metadata pair
    #[arg(long)]
    description_as_summary: bool,

    /// Language tag for strings that carry none
    #[arg(long, default_value = iiif_upgrade::vocab::DEFAULT_LANGUAGE)]
    default_lang: String,

    /// Don't fetch untyped references to find out their type
    #[arg(long)]
    no_deref: bool,

    /// Follow referenced documents
    #[arg(long)]
    crawl: bool,

    /// Keep extension contexts and properties
    #[arg(long)]
    allow_extensions: bool,

    /// HTTP timeout in seconds for dereferencing (0 disables it)
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

impl Cli {
    fn options(&self) -> UpgradeOptions {
        UpgradeOptions {
            crawl: self.crawl,
            description_is_metadata: !self.description_as_summary,
            allow_extensions: self.allow_extensions,
            default_lang: self.default_lang.clone(),
            deref_links: !self.no_deref,
        }
    }
}

/// Write output to file or stdout
fn write_output(content: &str, output: Option<&PathBuf>) -> Result<(), UpgradeError> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            eprintln!("Wrote upgraded document to {}", path.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

fn write_report(result: &UpgradeResult, path: &PathBuf) -> Result<(), UpgradeError> {
    let report = serde_json::json!({
        "diagnostics": result.diagnostics,
        "stats": result.stats,
    });
    fs::write(path, serde_json::to_string_pretty(&report)?)?;
    eprintln!("Wrote diagnostics report to {}", path.display());
    Ok(())
}

fn run(cli: Cli) -> Result<(), UpgradeError> {
    let source = DocumentSource::parse(&cli.source);
    let document = load_document(&source)?;
    let options = cli.options();

    let dereferencer: Box<dyn Dereferencer> = if options.deref_links {
        let timeout = (cli.timeout > 0).then(|| Duration::from_secs(cli.timeout));
        Box::new(HttpDereferencer::with_timeout(timeout)?)
    } else {
        Box::new(NoOpDereferencer)
    };

    let result = upgrade(document, &options, dereferencer.as_ref())?;

    eprintln!(
        "Upgraded {} nodes, {} references dereferenced, {} ranges nested ({} dropped), {} diagnostics",
        result.stats.nodes_processed,
        result.stats.references_dereferenced,
        result.stats.ranges_reparented,
        result.stats.ranges_dropped,
        result.diagnostics.len()
    );

    if let Some(path) = &cli.report {
        write_report(&result, path)?;
    }

    let output = to_json_string(&result, cli.pretty)?;
    write_output(&output, cli.output.as_ref())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
