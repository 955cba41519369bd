//! Graph serializer — assigns ordinal ids and emits the output payload.
//!
//! Definitions are added to a petgraph `DiGraph` in qualified-name order,
//! so a node's `NodeIndex` is its serialized id and ids are dense from 0.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;
use tracing::debug;

use super::index::DefinitionIndex;
use super::types::{Definition, EdgeSet, Graph, GraphEdge, GraphNode};
use crate::parser::display_path;

/// The reference graph over borrowed definitions.
pub struct ReferenceGraph<'a> {
    graph: DiGraph<&'a Definition, ()>,
    /// Index: qualified name -> node index.
    node_index: HashMap<&'a str, NodeIndex>,
}

impl<'a> ReferenceGraph<'a> {
    /// Build the graph. Edges whose endpoints are not both known, and
    /// self-edges, are dropped.
    pub fn build(index: &'a DefinitionIndex, edges: &EdgeSet) -> Self {
        let mut graph = DiGraph::with_capacity(index.len(), edges.len());
        let mut node_index = HashMap::with_capacity(index.len());

        for definition in index.iter() {
            let idx = graph.add_node(definition);
            node_index.insert(definition.qualified_name.as_str(), idx);
        }

        for edge in edges {
            if edge.source == edge.target {
                continue;
            }
            match (
                node_index.get(edge.source.as_str()),
                node_index.get(edge.target.as_str()),
            ) {
                (Some(&from), Some(&to)) => {
                    graph.add_edge(from, to, ());
                }
                _ => debug!(
                    source = %edge.source,
                    target = %edge.target,
                    "dropping edge with unknown endpoint"
                ),
            }
        }

        Self { graph, node_index }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Definitions in id order.
    pub fn definitions(&self) -> impl Iterator<Item = &'a Definition> + '_ {
        self.graph.node_weights().copied()
    }

    /// Number of distinct definitions referencing `qualified_name`.
    pub fn in_degree(&self, qualified_name: &str) -> usize {
        self.node_index
            .get(qualified_name)
            .map(|&idx| self.graph.edges_directed(idx, Direction::Incoming).count())
            .unwrap_or(0)
    }

    /// Up to `limit` definitions with the most incoming references, highest
    /// first; ties by qualified name. Unreferenced definitions are omitted.
    pub fn most_referenced(&self, limit: usize) -> Vec<(&'a Definition, usize)> {
        let mut ranked: Vec<(&'a Definition, usize)> = self
            .graph
            .node_indices()
            .map(|idx| {
                let degree = self.graph.edges_directed(idx, Direction::Incoming).count();
                (self.graph[idx], degree)
            })
            .filter(|(_, degree)| *degree > 0)
            .collect();
        ranked.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| a.0.qualified_name.cmp(&b.0.qualified_name))
        });
        ranked.truncate(limit);
        ranked
    }

    /// The serializable payload. Edges are ordered by `(source, target)` id.
    pub fn to_graph(&self) -> Graph {
        let nodes = self
            .graph
            .node_indices()
            .map(|idx| {
                let definition = self.graph[idx];
                GraphNode {
                    id: idx.index(),
                    name: definition.qualified_name.clone(),
                    kind: definition.kind,
                    file: display_path(&definition.source_file),
                    line: definition.line,
                }
            })
            .collect();

        let mut edges: Vec<GraphEdge> = self
            .graph
            .edge_references()
            .map(|e| GraphEdge {
                source: e.source().index(),
                target: e.target().index(),
            })
            .collect();
        edges.sort();

        Graph { nodes, edges }
    }
}
