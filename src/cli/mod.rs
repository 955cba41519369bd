//! CLI module for refgraph.
//!
//! Commands:
//! - analyze: emit the `{nodes, edges}` graph as JSON
//! - stats: definition and edge counts, most-referenced definitions
//! - files: list the source files an analysis would read

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{AnalyzerConfig, TopLevelPolicy, CONFIG_FILE_NAME};
use crate::error::Result;

#[derive(Parser)]
#[command(name = "refgraph")]
#[command(about = "Lexical reference graphs for Python source trees")]
#[command(version)]
pub struct Cli {
    /// Root of the Python tree to analyze (default: current directory)
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Config file (default: <root>/refgraph.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Emit the reference graph as JSON
    Analyze {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Where usages outside any class or function are attributed
        #[arg(long, value_enum)]
        top_level: Option<TopLevelPolicy>,

        /// Do not look up the receiver of `obj.method()` calls
        #[arg(long)]
        no_receivers: bool,
    },

    /// Show graph statistics
    Stats {
        /// How many of the most-referenced definitions to list
        #[arg(short, long, default_value = "10")]
        top: usize,
    },

    /// List the source files that would be analyzed
    Files,
}

impl Cli {
    /// Resolve the analyzer config.
    ///
    /// An explicit `--config` must load; the implicit `<root>/refgraph.toml`
    /// falls back to defaults when absent or invalid.
    pub fn load_config(&self) -> Result<AnalyzerConfig> {
        match &self.config {
            Some(path) => AnalyzerConfig::from_file(path),
            None => Ok(AnalyzerConfig::load(&default_config_path(&self.root))),
        }
    }
}

pub fn default_config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Apply `analyze` flag overrides on top of a loaded config.
pub fn apply_overrides(
    mut config: AnalyzerConfig,
    top_level: Option<TopLevelPolicy>,
    no_receivers: bool,
) -> AnalyzerConfig {
    if let Some(policy) = top_level {
        config.top_level_policy = policy;
    }
    if no_receivers {
        config.link_call_receivers = false;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze_flags() {
        let cli = Cli::parse_from([
            "refgraph",
            "--root",
            "src",
            "analyze",
            "--pretty",
            "--top-level",
            "module-node",
            "--no-receivers",
        ]);
        assert_eq!(cli.root, PathBuf::from("src"));
        match cli.command {
            Commands::Analyze {
                pretty,
                output,
                top_level,
                no_receivers,
            } => {
                assert!(pretty);
                assert!(output.is_none());
                assert_eq!(top_level, Some(TopLevelPolicy::ModuleNode));
                assert!(no_receivers);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_overrides() {
        let config = apply_overrides(
            AnalyzerConfig::default(),
            Some(TopLevelPolicy::Skip),
            true,
        );
        assert_eq!(config.top_level_policy, TopLevelPolicy::Skip);
        assert!(!config.link_call_receivers);

        let config = apply_overrides(AnalyzerConfig::default(), None, false);
        assert_eq!(config, AnalyzerConfig::default());
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let cli = Cli::parse_from([
            "refgraph",
            "--config",
            missing.to_str().unwrap(),
            "files",
        ]);
        assert!(cli.load_config().is_err());

        let cli = Cli::parse_from([
            "refgraph",
            "--root",
            dir.path().to_str().unwrap(),
            "files",
        ]);
        assert_eq!(cli.load_config().unwrap(), AnalyzerConfig::default());
    }
}
