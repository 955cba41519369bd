//! Core types for the reference graph.
//!
//! Defines definition kinds, the in-memory model built during analysis,
//! and the serialized node/edge payload.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use crate::error::Result;

/// The kind of a discovered definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    /// A whole module, used only as a synthetic top-level context.
    Module,
    /// A class definition.
    Class,
    /// A function not defined directly in a class body.
    Function,
    /// A function defined directly in a class body.
    Method,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionKind::Module => write!(f, "module"),
            DefinitionKind::Class => write!(f, "class"),
            DefinitionKind::Function => write!(f, "function"),
            DefinitionKind::Method => write!(f, "method"),
        }
    }
}

/// One discovered symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    /// Unique key: module path plus nesting, e.g. `pkg.mod.Class.method`.
    pub qualified_name: String,
    /// Final component of `qualified_name`.
    pub short_name: String,
    pub kind: DefinitionKind,
    /// Dotted module path of the defining file.
    pub module: String,
    /// Defining file, relative to the analysis root.
    pub source_file: PathBuf,
    /// 1-indexed line of the `class`/`def` keyword (0 for modules).
    pub line: usize,
}

impl Definition {
    pub fn new(
        module: &str,
        scope: &[&str],
        kind: DefinitionKind,
        source_file: PathBuf,
        line: usize,
    ) -> Self {
        let mut parts = Vec::with_capacity(scope.len() + 1);
        parts.push(module);
        parts.extend_from_slice(scope);
        let qualified_name = parts.join(".");
        let short_name = scope
            .last()
            .copied()
            .or_else(|| module.rsplit('.').next())
            .unwrap_or(module)
            .to_string();
        Self {
            qualified_name,
            short_name,
            kind,
            module: module.to_string(),
            source_file,
            line,
        }
    }

    /// Synthetic definition standing for a module's top-level code.
    pub fn module(module: &str, source_file: PathBuf) -> Self {
        Self::new(module, &[], DefinitionKind::Module, source_file, 0)
    }
}

/// A directed reference from one definition to another, by qualified name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Deduplicated edges, ordered by `(source, target)`.
pub type EdgeSet = BTreeSet<Edge>;

// ─── Serialized Payload ─────────────────────────────────────────

/// A node of the output graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Ordinal id, dense from 0 in qualified-name order.
    pub id: usize,
    /// Qualified name.
    pub name: String,
    pub kind: DefinitionKind,
    /// File path relative to the analysis root, `/`-separated.
    pub file: String,
    pub line: usize,
}

/// An edge of the output graph, referencing node ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: usize,
    pub target: usize,
}

/// The final analysis payload: `{ "nodes": [...], "edges": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl Graph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Look up a node by qualified name.
    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Edges as `(source name, target name)` pairs, in payload order.
    pub fn edge_names(&self) -> Vec<(&str, &str)> {
        self.edges
            .iter()
            .filter_map(|e| {
                let source = self.nodes.get(e.source)?;
                let target = self.nodes.get(e.target)?;
                Some((source.name.as_str(), target.name.as_str()))
            })
            .collect()
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.edge_names().contains(&(source, target))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
