//! Reference graph module — the two analysis passes and the output model.
//!
//! Pass 1 ([`collector`]) fills the [`DefinitionIndex`]; pass 2
//! ([`linker`], with [`scope`] deciding each usage's source) accumulates
//! edges; [`serializer`] turns both into the `{nodes, edges}` payload.

pub mod builder;
pub mod collector;
pub mod index;
pub mod linker;
pub mod scope;
pub mod serializer;
pub mod stats;
pub mod types;

pub use builder::{run_analysis, Analysis, GraphBuilder, SkippedFile};
pub use collector::DefinitionCollector;
pub use index::DefinitionIndex;
pub use linker::{UsageLinker, UsageSite, UsageVisitor};
pub use scope::{Context, ScopeFrame, ScopeResolver};
pub use serializer::ReferenceGraph;
pub use stats::{GraphStats, RankedDefinition};
pub use types::{Definition, DefinitionKind, Edge, EdgeSet, Graph, GraphEdge, GraphNode};
