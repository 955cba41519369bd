//! Parser module — file discovery and tree-sitter parsing of Python sources.

pub mod discovery;
pub mod syntax;

pub use discovery::{discover_files, display_path, module_path, relative_path};
pub use syntax::SyntaxKind;

use std::fs;
use std::path::{Path, PathBuf};
use tree_sitter::{Language, Node, Parser, Tree};

use crate::error::{RefGraphError, Result};

/// One source file that parsed cleanly, kept alive between the two passes.
pub struct ParsedFile {
    /// Path as discovered (under the analysis root).
    pub path: PathBuf,
    /// Path relative to the analysis root.
    pub relative: PathBuf,
    /// Dotted module path, e.g. `pkg.sub.mod` for `pkg/sub/mod.py`.
    pub module: String,
    pub source: String,
    pub tree: Tree,
}

impl ParsedFile {
    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn source_bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }
}

impl std::fmt::Debug for ParsedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedFile")
            .field("path", &self.path)
            .field("module", &self.module)
            .finish()
    }
}

/// Deepest syntax tree accepted. Both analysis passes recurse once per
/// level, so deeper files are skipped instead of exhausting the stack.
pub const MAX_TREE_DEPTH: usize = 400;

/// The tree-sitter grammar for Python.
pub fn python_language() -> Language {
    tree_sitter_python::LANGUAGE.into()
}

/// Parse Python source text.
///
/// tree-sitter always produces a tree; one containing error or missing
/// nodes counts as a syntax error so broken files contribute nothing, and
/// a tree nested deeper than [`MAX_TREE_DEPTH`] is rejected the same way.
pub fn parse_source(path: &Path, source: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    parser.set_language(&python_language())?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| RefGraphError::Parse(path.to_path_buf()))?;
    if tree.root_node().has_error() {
        return Err(RefGraphError::Parse(path.to_path_buf()));
    }
    let depth = syntax::tree_depth(&tree.root_node());
    if depth > MAX_TREE_DEPTH {
        return Err(RefGraphError::TooDeep {
            path: path.to_path_buf(),
            depth,
        });
    }
    Ok(tree)
}

/// Read and parse one file under `root`.
pub fn parse_file(root: &Path, path: &Path) -> Result<ParsedFile> {
    let source = fs::read_to_string(path).map_err(|e| RefGraphError::io(path, e))?;
    let tree = parse_source(path, &source)?;
    let relative = relative_path(root, path);
    let module = module_path(&relative);
    Ok(ParsedFile {
        path: path.to_path_buf(),
        relative,
        module,
        source,
        tree,
    })
}
