//! Analyzer configuration, loaded from an optional `refgraph.toml`.
//!
//! ```toml
//! extensions = ["py"]
//! excluded_dirs = [".git", ".venv", "venv"]
//! respect_gitignore = false
//! top_level_policy = "first_definition"
//! link_call_receivers = true
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::error::{RefGraphError, Result};

/// Default config file name looked up next to the analyzed tree.
pub const CONFIG_FILE_NAME: &str = "refgraph.toml";

/// How usages at module top level (outside any class or def) pick a context.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum TopLevelPolicy {
    /// Attribute the usage to the first definition (in qualified-name order)
    /// from the same module. The chosen source is arbitrary.
    #[default]
    FirstDefinition,
    /// Attribute the usage to a synthetic `module` node named after the module
    /// path. If another definition already holds that name (`pkg.py` defining
    /// `class a` collides with module `pkg.a`), the usages stay unresolved.
    ModuleNode,
    /// Leave top-level usages unresolved; they produce no edges.
    Skip,
}

/// Knobs for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// File extensions (without the dot) treated as Python sources.
    pub extensions: Vec<String>,
    /// Directory names pruned from traversal wherever they appear.
    pub excluded_dirs: Vec<String>,
    /// Honor `.gitignore` files under the root.
    pub respect_gitignore: bool,
    pub top_level_policy: TopLevelPolicy,
    /// For `obj.method()` calls, also look up `obj` when it is a bare name.
    pub link_call_receivers: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["py".to_string()],
            excluded_dirs: [
                ".git",
                ".hg",
                ".svn",
                ".venv",
                "venv",
                "node_modules",
                "__pycache__",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            respect_gitignore: false,
            top_level_policy: TopLevelPolicy::default(),
            link_call_receivers: true,
        }
    }
}

impl AnalyzerConfig {
    /// Parse a config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| RefGraphError::io(path, e))?;
        toml::from_str(&text).map_err(|source| RefGraphError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a config file, falling back to defaults if it is absent or invalid.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "ignoring config, using defaults");
                Self::default()
            }
        }
    }

    /// Whether `path` has one of the configured source extensions.
    pub fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }

    /// Whether a directory with this name is pruned from traversal.
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.excluded_dirs.iter().any(|d| d == name)
    }
}
