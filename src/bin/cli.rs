//! refgraph CLI - lexical reference graphs for Python trees.
//!
//! Usage:
//!   refgraph analyze                 # Graph JSON on stdout
//!   refgraph analyze --pretty -o g.json
//!   refgraph stats --top 20          # Counts + most referenced
//!   refgraph files                   # Files that would be analyzed
//!
//! Logs go to stderr; set `RUST_LOG=debug` for per-file detail.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;

use refgraph::cli::{apply_overrides, Cli, Commands};
use refgraph::parser::{discover_files, display_path, relative_path};
use refgraph::run_analysis;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.load_config()?;
    let root = cli.root;

    match cli.command {
        Commands::Analyze {
            pretty,
            output,
            top_level,
            no_receivers,
        } => {
            let config = apply_overrides(config, top_level, no_receivers);
            let graph = run_analysis(&root, &config).to_graph();
            let json = if pretty {
                graph.to_json_pretty()?
            } else {
                graph.to_json()?
            };

            match output {
                Some(path) => {
                    fs::write(&path, json + "\n")
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!(
                        "✓ Wrote {} nodes, {} edges to {}",
                        graph.nodes.len(),
                        graph.edges.len(),
                        path.display()
                    );
                }
                None => println!("{}", json),
            }
        }

        Commands::Stats { top } => {
            let stats = run_analysis(&root, &config).stats(top);
            println!("{}", stats);
        }

        Commands::Files => {
            for path in discover_files(&root, &config) {
                println!("{}", display_path(&relative_path(&root, &path)));
            }
        }
    }

    Ok(())
}
