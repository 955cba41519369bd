//! Scope resolution — which definition a usage site belongs to.
//!
//! The usage walker threads a stack of [`ScopeFrame`]s (one per enclosing
//! class or function) instead of annotating the tree with parent links.
//! The innermost frame decides the context:
//!
//! | innermost frame            | candidates, first hit wins                 |
//! |----------------------------|--------------------------------------------|
//! | method `m` of class `C`    | `mod.C.m`, `mod.m`, `mod.C`                |
//! | function `f`               | `mod.f`                                    |
//! | class `C`                  | `mod.C`                                    |
//! | none (module top level)    | per [`TopLevelPolicy`]                     |

use std::path::{Path, PathBuf};

use tracing::debug;

use super::index::DefinitionIndex;
use super::types::DefinitionKind;
use crate::config::TopLevelPolicy;

/// One enclosing definition on the walker's scope stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeFrame {
    Class {
        name: String,
    },
    /// `owner` is set when the function is a direct statement of a class body.
    Function {
        name: String,
        owner: Option<String>,
    },
}

/// The source that edges from a usage site are attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Context {
    /// An existing definition, by qualified name.
    Definition(String),
    /// A module's top-level code. The module node is created in the index
    /// when it first sources an edge.
    Module {
        module: String,
        source_file: PathBuf,
    },
    /// No edges are produced under this context.
    Unresolved,
}

impl Context {
    /// Qualified name edges are attributed to, if resolved.
    pub fn source_name(&self) -> Option<&str> {
        match self {
            Context::Definition(name) => Some(name),
            Context::Module { module, .. } => Some(module),
            Context::Unresolved => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeResolver {
    policy: TopLevelPolicy,
}

impl ScopeResolver {
    pub fn new(policy: TopLevelPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> TopLevelPolicy {
        self.policy
    }

    /// Context for a usage nested inside `frames` (outermost first).
    pub fn resolve(
        &self,
        index: &DefinitionIndex,
        module: &str,
        source_file: &Path,
        frames: &[ScopeFrame],
    ) -> Context {
        match frames.last() {
            Some(frame) => self.frame_context(index, module, frame),
            None => self.top_level_context(index, module, source_file),
        }
    }

    /// Context for usages whose innermost enclosing definition is `frame`.
    pub fn frame_context(
        &self,
        index: &DefinitionIndex,
        module: &str,
        frame: &ScopeFrame,
    ) -> Context {
        let candidates = match frame {
            ScopeFrame::Function {
                name,
                owner: Some(class),
            } => vec![
                format!("{module}.{class}.{name}"),
                format!("{module}.{name}"),
                format!("{module}.{class}"),
            ],
            ScopeFrame::Function { name, owner: None } => vec![format!("{module}.{name}")],
            ScopeFrame::Class { name } => vec![format!("{module}.{name}")],
        };

        candidates
            .into_iter()
            .find(|candidate| index.contains(candidate))
            .map(Context::Definition)
            .unwrap_or(Context::Unresolved)
    }

    /// Context for usages outside any class or function.
    pub fn top_level_context(
        &self,
        index: &DefinitionIndex,
        module: &str,
        source_file: &Path,
    ) -> Context {
        match self.policy {
            TopLevelPolicy::FirstDefinition => index
                .first_in_module(module)
                .map(|def| Context::Definition(def.qualified_name.clone()))
                .unwrap_or(Context::Unresolved),
            TopLevelPolicy::ModuleNode => match index.get(module) {
                Some(existing) if existing.kind != DefinitionKind::Module => {
                    debug!(
                        module = %module,
                        holder = %existing.kind,
                        "module name taken by another definition; top-level usages unresolved"
                    );
                    Context::Unresolved
                }
                _ => Context::Module {
                    module: module.to_string(),
                    source_file: source_file.to_path_buf(),
                },
            },
            TopLevelPolicy::Skip => Context::Unresolved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::{Definition, DefinitionKind};

    /// `(module, dotted scope, kind)` triples.
    fn index_with(names: &[(&str, &str, DefinitionKind)]) -> DefinitionIndex {
        let mut index = DefinitionIndex::new();
        for (module, scope, kind) in names {
            let scope: Vec<&str> = scope.split('.').collect();
            index.insert(Definition::new(
                module,
                &scope,
                *kind,
                PathBuf::from("x.py"),
                1,
            ));
        }
        index
    }

    fn method(name: &str, class: &str) -> ScopeFrame {
        ScopeFrame::Function {
            name: name.to_string(),
            owner: Some(class.to_string()),
        }
    }

    fn resolved(name: &str) -> Context {
        Context::Definition(name.to_string())
    }

    #[test]
    fn test_method_prefers_class_qualified_name() {
        let index = index_with(&[
            ("m", "C", DefinitionKind::Class),
            ("m", "C.run", DefinitionKind::Method),
            ("m", "run", DefinitionKind::Function),
        ]);
        let resolver = ScopeResolver::default();
        assert_eq!(
            resolver.frame_context(&index, "m", &method("run", "C")),
            resolved("m.C.run")
        );
    }

    #[test]
    fn test_method_falls_back_to_module_function_then_class() {
        let resolver = ScopeResolver::default();

        let index = index_with(&[
            ("m", "C", DefinitionKind::Class),
            ("m", "run", DefinitionKind::Function),
        ]);
        assert_eq!(
            resolver.frame_context(&index, "m", &method("run", "C")),
            resolved("m.run")
        );

        let index = index_with(&[("m", "C", DefinitionKind::Class)]);
        assert_eq!(
            resolver.frame_context(&index, "m", &method("run", "C")),
            resolved("m.C")
        );

        let index = DefinitionIndex::new();
        assert_eq!(
            resolver.frame_context(&index, "m", &method("run", "C")),
            Context::Unresolved
        );
    }

    #[test]
    fn test_function_and_class_frames() {
        let index = index_with(&[
            ("m", "helper", DefinitionKind::Function),
            ("m", "K", DefinitionKind::Class),
        ]);
        let resolver = ScopeResolver::default();

        let function = ScopeFrame::Function {
            name: "helper".to_string(),
            owner: None,
        };
        assert_eq!(
            resolver.frame_context(&index, "m", &function),
            resolved("m.helper")
        );

        let class = ScopeFrame::Class {
            name: "K".to_string(),
        };
        assert_eq!(resolver.frame_context(&index, "m", &class), resolved("m.K"));

        let missing = ScopeFrame::Function {
            name: "gone".to_string(),
            owner: None,
        };
        assert_eq!(
            resolver.frame_context(&index, "m", &missing),
            Context::Unresolved
        );
    }

    #[test]
    fn test_innermost_frame_wins() {
        let index = index_with(&[
            ("m", "outer", DefinitionKind::Function),
            ("m", "Local", DefinitionKind::Class),
        ]);
        let frames = vec![
            ScopeFrame::Function {
                name: "outer".to_string(),
                owner: None,
            },
            ScopeFrame::Class {
                name: "Local".to_string(),
            },
        ];
        let resolver = ScopeResolver::default();
        let file = PathBuf::from("m.py");
        assert_eq!(
            resolver.resolve(&index, "m", &file, &frames),
            resolved("m.Local")
        );
        assert_eq!(
            resolver.resolve(&index, "m", &file, &frames[..1]),
            resolved("m.outer")
        );
    }

    #[test]
    fn test_module_node_name_taken_by_other_definition() {
        // `pkg.py` defines `class a`, so module `pkg.a` cannot get its own node.
        let index = index_with(&[("pkg", "a", DefinitionKind::Class)]);
        let resolver = ScopeResolver::new(TopLevelPolicy::ModuleNode);
        let file = PathBuf::from("pkg/a.py");
        assert_eq!(
            resolver.top_level_context(&index, "pkg.a", &file),
            Context::Unresolved
        );

        let mut index = DefinitionIndex::new();
        index.insert(Definition::module("pkg.a", file.clone()));
        let context = resolver.top_level_context(&index, "pkg.a", &file);
        assert_eq!(context.source_name(), Some("pkg.a"));
    }

    #[test]
    fn test_top_level_policies() {
        let index = index_with(&[
            ("m", "zeta", DefinitionKind::Function),
            ("m", "alpha", DefinitionKind::Function),
        ]);
        let file = PathBuf::from("m.py");

        let first = ScopeResolver::new(TopLevelPolicy::FirstDefinition);
        assert_eq!(first.policy(), TopLevelPolicy::FirstDefinition);
        assert_eq!(first.resolve(&index, "m", &file, &[]), resolved("m.alpha"));
        assert_eq!(
            first.resolve(&index, "other", &file, &[]),
            Context::Unresolved
        );

        let module = ScopeResolver::new(TopLevelPolicy::ModuleNode);
        assert_eq!(module.policy(), TopLevelPolicy::ModuleNode);
        let context = module.resolve(&index, "m", &file, &[]);
        assert_eq!(context.source_name(), Some("m"));

        let skip = ScopeResolver::new(TopLevelPolicy::Skip);
        assert_eq!(skip.resolve(&index, "m", &file, &[]), Context::Unresolved);
        assert_eq!(Context::Unresolved.source_name(), None);
    }
}
