//! Summary statistics for an analysis run.

use std::fmt;

use super::serializer::ReferenceGraph;
use super::types::DefinitionKind;

/// One entry of the most-referenced ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedDefinition {
    pub name: String,
    pub kind: DefinitionKind,
    pub references: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub parsed_files: usize,
    pub skipped_files: usize,
    pub classes: usize,
    pub functions: usize,
    pub methods: usize,
    pub modules: usize,
    /// Distinct short names across all definitions.
    pub unique_names: usize,
    pub total_edges: usize,
    pub most_referenced: Vec<RankedDefinition>,
}

impl GraphStats {
    pub fn from_graph(
        graph: &ReferenceGraph<'_>,
        parsed_files: usize,
        skipped_files: usize,
        top: usize,
    ) -> Self {
        let mut stats = GraphStats {
            parsed_files,
            skipped_files,
            total_edges: graph.edge_count(),
            ..Default::default()
        };

        for definition in graph.definitions() {
            match definition.kind {
                DefinitionKind::Class => stats.classes += 1,
                DefinitionKind::Function => stats.functions += 1,
                DefinitionKind::Method => stats.methods += 1,
                DefinitionKind::Module => stats.modules += 1,
            }
        }

        stats.most_referenced = graph
            .most_referenced(top)
            .into_iter()
            .map(|(definition, references)| RankedDefinition {
                name: definition.qualified_name.clone(),
                kind: definition.kind,
                references,
            })
            .collect();

        stats
    }

    pub fn total_definitions(&self) -> usize {
        self.classes + self.functions + self.methods + self.modules
    }
}

impl fmt::Display for GraphStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Parsed {} files ({} skipped)",
            self.parsed_files, self.skipped_files
        )?;
        writeln!(
            f,
            "Found {} definitions (classes: {}, functions: {}, methods: {}, modules: {})",
            self.total_definitions(),
            self.classes,
            self.functions,
            self.methods,
            self.modules
        )?;
        writeln!(f, "Found {} distinct names", self.unique_names)?;
        write!(f, "Found {} edges", self.total_edges)?;

        if !self.most_referenced.is_empty() {
            write!(f, "\n\nMost referenced:")?;
            for entry in &self.most_referenced {
                write!(
                    f,
                    "\n  {:>4}  {} ({})",
                    entry.references, entry.name, entry.kind
                )?;
            }
        }
        Ok(())
    }
}
