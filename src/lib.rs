use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crate::config::{ExportConfig, PageRules};
use crate::export::{ExportSummary, Exporter};
use crate::fs::DirectorySink;
use crate::source::{CachedSource, DynalistClient};

pub mod config;
pub mod content;
pub mod domain;
pub mod error;
pub mod export;
pub mod fs;
pub mod logging;
pub mod source;
pub mod tree;

pub use error::{Error, Result};

#[derive(Parser, Debug)]
#[command(author, version, about = "Export Dynalist to markdown", long_about = None)]
pub struct Args {
    /// Path to config file
    #[arg(long, default_value = "dynalist_to_markdown.yaml")]
    pub config: PathBuf,

    /// Directory for output
    #[arg(long, default_value = "dynalist")]
    pub directory: PathBuf,

    /// Overwrite files in output directory
    #[arg(long)]
    pub overwrite: bool,

    /// Cache API responses on disk (useful for development)
    #[arg(long)]
    pub cache: bool,

    /// Where cached API responses are kept
    #[arg(long, default_value = ".dynalist_cache")]
    pub cache_dir: PathBuf,

    /// Log every request and page rule match
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

pub async fn export_dynalist(args: &Args) -> anyhow::Result<ExportSummary> {
    let config = ExportConfig::load(&args.config)
        .with_context(|| format!("failed to read config {}", args.config.display()))?;
    let rules = PageRules::new(config.pages)?;
    let client = match config.api_base.as_deref() {
        Some(api_base) => DynalistClient::with_api_base(config.api_key, api_base)?,
        None => DynalistClient::new(config.api_key)?,
    };
    let sink = DirectorySink::new(&args.directory, args.overwrite);

    let summary = if args.cache {
        let source = CachedSource::new(client, &args.cache_dir);
        Exporter::new(source, sink, rules).export().await?
    } else {
        Exporter::new(client, sink, rules).export().await?
    };
    Ok(summary)
}
