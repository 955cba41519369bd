//! Graph builder — runs both passes over a directory.
//!
//! Discovers source files, parses each with tree-sitter, collects every
//! definition into one index (pass 1), then links usages against the
//! complete index (pass 2). Files that cannot be read or parsed are
//! skipped with a warning; they never abort the run.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::collector::DefinitionCollector;
use super::index::DefinitionIndex;
use super::linker::{link_file, UsageLinker};
use super::scope::ScopeResolver;
use super::serializer::ReferenceGraph;
use super::stats::GraphStats;
use super::types::{Definition, EdgeSet, Graph};
use crate::config::AnalyzerConfig;
use crate::parser::{discover_files, display_path, parse_file, ParsedFile};

/// A file left out of the analysis, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Accumulates definitions and edges across files.
pub struct GraphBuilder {
    root: PathBuf,
    index: DefinitionIndex,
    edges: EdgeSet,
    resolver: ScopeResolver,
    linker: UsageLinker,
    files: Vec<ParsedFile>,
    skipped: Vec<SkippedFile>,
}

impl GraphBuilder {
    pub fn new(root: &Path, config: &AnalyzerConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            index: DefinitionIndex::new(),
            edges: EdgeSet::new(),
            resolver: ScopeResolver::new(config.top_level_policy),
            linker: UsageLinker::new(config.link_call_receivers),
            files: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Pass 1 for one file. A file that fails to read or parse is recorded
    /// as skipped and contributes nothing.
    pub fn collect_file(&mut self, path: &Path) {
        match parse_file(&self.root, path) {
            Ok(file) => {
                let count = DefinitionCollector::new(&file, &mut self.index).collect();
                debug!(file = %display_path(&file.relative), definitions = count, "collected");
                self.files.push(file);
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "skipping file");
                self.skipped.push(SkippedFile {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }
    }

    /// Pass 2 over every collected file, in collection order.
    pub fn link_usages(&mut self) {
        debug!(
            policy = ?self.resolver.policy(),
            definitions = self.index.len(),
            "linking usages"
        );
        for file in &self.files {
            let before = self.edges.len();
            let sites = link_file(
                file,
                &mut self.index,
                &mut self.edges,
                &self.resolver,
                &self.linker,
            );
            debug!(
                file = %display_path(&file.relative),
                sites,
                edges = self.edges.len() - before,
                "linked"
            );
        }
    }

    pub fn finish(self) -> Analysis {
        Analysis {
            root: self.root,
            index: self.index,
            edges: self.edges,
            parsed_files: self.files.into_iter().map(|f| f.relative).collect(),
            skipped_files: self.skipped,
        }
    }
}

/// The in-memory result of one run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub root: PathBuf,
    index: DefinitionIndex,
    edges: EdgeSet,
    /// Root-relative paths of files that contributed, in analysis order.
    pub parsed_files: Vec<PathBuf>,
    pub skipped_files: Vec<SkippedFile>,
}

impl Analysis {
    pub fn index(&self) -> &DefinitionIndex {
        &self.index
    }

    /// All definitions in qualified-name order.
    pub fn definitions(&self) -> impl Iterator<Item = &Definition> {
        self.index.iter()
    }

    pub fn edges(&self) -> &EdgeSet {
        &self.edges
    }

    pub fn reference_graph(&self) -> ReferenceGraph<'_> {
        ReferenceGraph::build(&self.index, &self.edges)
    }

    /// The serialized `{nodes, edges}` payload.
    pub fn to_graph(&self) -> Graph {
        self.reference_graph().to_graph()
    }

    pub fn stats(&self, top: usize) -> GraphStats {
        let mut stats = GraphStats::from_graph(
            &self.reference_graph(),
            self.parsed_files.len(),
            self.skipped_files.len(),
            top,
        );
        stats.unique_names = self.index.unique_short_names();
        stats
    }
}

/// Discover, parse, and link everything under `root`.
pub fn run_analysis(root: &Path, config: &AnalyzerConfig) -> Analysis {
    let files = discover_files(root, config);
    let mut builder = GraphBuilder::new(root, config);

    for path in &files {
        builder.collect_file(path);
    }
    builder.link_usages();

    let analysis = builder.finish();
    info!(
        root = %root.display(),
        files = analysis.parsed_files.len(),
        skipped = analysis.skipped_files.len(),
        definitions = analysis.index.len(),
        edges = analysis.edges.len(),
        "analysis complete"
    );
    analysis
}
