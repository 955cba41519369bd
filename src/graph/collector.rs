//! Pass 1 — definition discovery.
//!
//! Walks a parsed file and registers every class, method, and function
//! in the [`DefinitionIndex`]:
//!
//! - `class C` anywhere            -> `module.C`         (class)
//! - `def m` directly in `class C` -> `module.C.m`       (method)
//! - any other `def f`             -> `module.f`         (function)
//!
//! Nesting inside functions does not qualify names further, so an inner
//! helper `def g` inside `def f` becomes `module.g`.

use tree_sitter::Node;

use super::index::DefinitionIndex;
use super::types::{Definition, DefinitionKind};
use crate::parser::syntax::{self, SyntaxKind};
use crate::parser::ParsedFile;

/// Collects definitions from one file into an index.
pub struct DefinitionCollector<'a> {
    file: &'a ParsedFile,
    index: &'a mut DefinitionIndex,
    collected: usize,
}

impl<'a> DefinitionCollector<'a> {
    pub fn new(file: &'a ParsedFile, index: &'a mut DefinitionIndex) -> Self {
        Self {
            file,
            index,
            collected: 0,
        }
    }

    /// Walk the whole file. Returns how many definitions were registered.
    pub fn collect(mut self) -> usize {
        let file = self.file;
        self.visit(file.root_node(), None);
        self.collected
    }

    /// `owner` is the enclosing class name when `node` is a direct
    /// statement of that class's body.
    fn visit(&mut self, node: Node<'_>, owner: Option<&str>) {
        match SyntaxKind::of(&node) {
            SyntaxKind::Class => self.visit_class(node),
            SyntaxKind::Function => self.visit_function(node, owner),
            SyntaxKind::Decorated => {
                if let Some((definition, _)) = syntax::unwrap_decorated(&node) {
                    self.visit(definition, owner);
                }
            }
            _ => {
                for child in syntax::named_children(&node) {
                    self.visit(child, None);
                }
            }
        }
    }

    fn visit_class(&mut self, node: Node<'_>) {
        let source = self.file.source_bytes();
        let Some(name) = syntax::definition_name(&node, source) else {
            return;
        };
        self.register(&[&name], DefinitionKind::Class, &node);

        for statement in syntax::class_body_statements(&node) {
            self.visit(statement, Some(&name));
        }
    }

    fn visit_function(&mut self, node: Node<'_>, owner: Option<&str>) {
        let source = self.file.source_bytes();
        if let Some(name) = syntax::definition_name(&node, source) {
            match owner {
                Some(class) => self.register(&[class, &name], DefinitionKind::Method, &node),
                None => self.register(&[&name], DefinitionKind::Function, &node),
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            self.visit(body, None);
        }
    }

    fn register(&mut self, scope: &[&str], kind: DefinitionKind, node: &Node<'_>) {
        let definition = Definition::new(
            &self.file.module,
            scope,
            kind,
            self.file.relative.clone(),
            syntax::line_of(node),
        );
        self.index.insert(definition);
        self.collected += 1;
    }
}
