//! # refgraph
//!
//! Lexical reference graphs for Python source trees.
//!
//! refgraph walks a directory, finds every class, method, and function
//! definition, and links each definition to the definitions its body
//! refers to by name. Matching is purely lexical: no imports, types, or
//! runtime values are resolved, so a name shared by several definitions
//! links to all of them.
//!
//! ## Key Features
//!
//! - **Two passes**: all definitions are known before any usage is linked
//! - **Deterministic**: same tree, same nodes, ids, and edges
//! - **Fault-tolerant**: unreadable or unparsable files are skipped
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use refgraph::analyze;
//! use std::path::Path;
//!
//! let graph = analyze(Path::new("."));
//! println!("{}", graph.to_json().unwrap_or_default());
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod parser;

use std::path::Path;

// Re-exports for convenience
pub use config::{AnalyzerConfig, TopLevelPolicy};
pub use error::{RefGraphError, Result};

// Graph re-exports
pub use graph::{
    run_analysis, Analysis, Definition, DefinitionIndex, DefinitionKind, Graph, GraphEdge,
    GraphNode, GraphStats,
};

/// Analyze the tree under `root` with default settings.
///
/// Never fails: a missing root or a tree without Python files yields an
/// empty graph, and bad files are skipped.
pub fn analyze(root: &Path) -> Graph {
    analyze_with(root, &AnalyzerConfig::default())
}

/// Analyze the tree under `root` with explicit settings.
pub fn analyze_with(root: &Path, config: &AnalyzerConfig) -> Graph {
    run_analysis(root, config).to_graph()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tree(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (rel, source) in files {
            let path = dir.path().join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, source).unwrap();
        }
        dir
    }

    #[test]
    fn test_fan_out_to_every_shared_name() {
        let dir = tree(&[
            ("a.py", "def foo():\n    bar()\n\ndef bar():\n    pass\n"),
            ("b.py", "def bar():\n    pass\n"),
        ]);
        let graph = analyze(dir.path());

        let names: Vec<&str> = graph.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["a.bar", "a.foo", "b.bar"]);
        assert_eq!(
            graph.edge_names(),
            vec![("a.foo", "a.bar"), ("a.foo", "b.bar")]
        );
    }

    #[test]
    fn test_empty_directory() {
        let dir = tree(&[]);
        let graph = analyze(dir.path());
        assert_eq!(graph.to_json().unwrap(), r#"{"nodes":[],"edges":[]}"#);
    }

    #[test]
    fn test_missing_root_is_empty() {
        let dir = tree(&[]);
        let graph = analyze(&dir.path().join("does-not-exist"));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_method_to_own_class_without_self_edge() {
        let dir = tree(&[(
            "pkg.py",
            "class C:\n    def m(self):\n        self.m()\n        return C()\n",
        )]);
        let graph = analyze(dir.path());

        assert_eq!(
            graph.node("pkg.C").map(|n| n.kind),
            Some(DefinitionKind::Class)
        );
        assert_eq!(
            graph.node("pkg.C.m").map(|n| n.kind),
            Some(DefinitionKind::Method)
        );
        assert_eq!(graph.edge_names(), vec![("pkg.C.m", "pkg.C")]);
    }

    #[test]
    fn test_deterministic_output() {
        let dir = tree(&[
            ("z/last.py", "def tail():\n    head()\n"),
            ("a/first.py", "def head():\n    tail()\n"),
            (
                "m.py",
                "class Mid:\n    def head(self):\n        return Mid\n",
            ),
        ]);
        let first = analyze(dir.path()).to_json().unwrap();
        let second = analyze(dir.path()).to_json().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_analyze_with_receiver_knob() {
        let dir = tree(&[
            ("svc.py", "class repo:\n    pass\n\ndef save():\n    pass\n"),
            ("main.py", "def run():\n    repo.save()\n"),
        ]);
        let config = AnalyzerConfig {
            link_call_receivers: false,
            ..Default::default()
        };
        let graph = analyze_with(dir.path(), &config);
        assert_eq!(graph.edge_names(), vec![("main.run", "svc.save")]);
    }
}
