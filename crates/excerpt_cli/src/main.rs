mod app;
mod logging;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use excerpt_core::PluginConfiguration;
use excerpt_engine::{ExcerptResolver, JsonFieldResolver, SchemaFieldBinder};
use excerpt_logging::{excerpt_info, excerpt_warn};
use futures_util::future::join_all;
use log::LevelFilter;
use serde_json::Value;

use crate::logging::LogDestination;

/// Derive excerpt fields for a set of content nodes.
#[derive(Debug, Parser)]
#[command(name = "excerpts", version)]
struct Cli {
    /// Excerpt configuration (.json or .ron)
    #[arg(short, long)]
    config: PathBuf,

    /// JSON array of content nodes; node type is read from `internal.type`
    #[arg(short, long)]
    nodes: PathBuf,

    /// Also write the log to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log per-source decisions
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let destination = match cli.log_file {
        Some(path) => LogDestination::Both(path),
        None => LogDestination::Terminal,
    };
    logging::initialize(destination, level);

    let config = PluginConfiguration::load(&cli.config)?;
    for problem in config.validate() {
        excerpt_warn!("configuration: {problem}");
    }

    let text = fs::read_to_string(&cli.nodes)
        .with_context(|| format!("failed to read nodes from {:?}", cli.nodes))?;
    let nodes: Vec<Value> = serde_json::from_str(&text)
        .with_context(|| format!("{:?} is not a JSON array of nodes", cli.nodes))?;
    excerpt_info!("resolving excerpts for {} node(s)", nodes.len());

    let resolver = ExcerptResolver::new(Arc::new(config), Arc::new(JsonFieldResolver));
    let binder = SchemaFieldBinder::new(Arc::new(resolver));

    let results = join_all(nodes.iter().map(|node| app::excerpts_for_node(&binder, node))).await;
    for result in results {
        println!("{}", serde_json::to_string(&result?)?);
    }
    Ok(())
}
