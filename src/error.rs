//! Error types for refgraph.
//!
//! None of these escape `analyze`: per-file failures are logged and the
//! file is skipped. They surface only from config loading and the CLI.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while reading, parsing, or configuring an analysis.
#[derive(Debug, Error)]
pub enum RefGraphError {
    /// A source or config file could not be read (permissions, missing, not UTF-8).
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but is not syntactically valid Python.
    #[error("syntax error in {}", .0.display())]
    Parse(PathBuf),

    /// The file parsed but nests too deeply to walk safely.
    #[error("syntax tree of {} is {depth} levels deep", path.display())]
    TooDeep { path: PathBuf, depth: usize },

    /// The tree-sitter grammar could not be loaded into the parser.
    #[error("failed to load Python grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    /// A config file exists but does not deserialize.
    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RefGraphError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RefGraphError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RefGraphError>;
