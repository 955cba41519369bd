//! Source file discovery.
//!
//! Walks the analysis root with `ignore`, prunes dependency and
//! version-control directories, and returns files in sorted order. The
//! order feeds collection order, and therefore the serialized ids.

use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

use crate::config::AnalyzerConfig;

/// All candidate source files under `root`, sorted by path.
pub fn discover_files(root: &Path, config: &AnalyzerConfig) -> Vec<PathBuf> {
    let prune = config.clone();

    let mut files: Vec<PathBuf> = WalkBuilder::new(root)
        .standard_filters(false)
        .git_ignore(config.respect_gitignore)
        .git_exclude(config.respect_gitignore)
        .require_git(false)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            !(is_dir
                && entry.depth() > 0
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| prune.is_excluded_dir(name)))
        })
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping unreadable path");
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .filter(|entry| config.is_source_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    debug!(root = %root.display(), count = files.len(), "discovered source files");
    files
}

/// `path` relative to `root`, or `path` unchanged if it is not under `root`.
pub fn relative_path(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

/// Dotted module path for a root-relative file: separators become `.`
/// and the extension is dropped (`pkg/__init__.py` -> `pkg.__init__`).
pub fn module_path(relative: &Path) -> String {
    normal_components(&relative.with_extension("")).join(".")
}

/// Root-relative path with `/` separators on every platform.
pub fn display_path(relative: &Path) -> String {
    normal_components(relative).join("/")
}

fn normal_components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}
