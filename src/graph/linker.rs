//! Pass 2 — usage resolution.
//!
//! [`UsageVisitor`] walks one file's tree with an explicit scope stack and
//! reports every usage site; [`UsageLinker`] turns a site into edges from
//! the current context to every definition sharing the referenced short
//! name. Matching is purely lexical: a name shared by unrelated
//! definitions fans out to all of them.

use tracing::trace;
use tree_sitter::Node;

use super::index::DefinitionIndex;
use super::scope::{Context, ScopeFrame, ScopeResolver};
use super::types::{Definition, Edge, EdgeSet};
use crate::parser::syntax::{self, SyntaxKind};
use crate::parser::ParsedFile;

/// A place in the source that refers to a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageSite<'s> {
    /// `callee(...)` or `receiver.callee(...)`.
    Call {
        callee: &'s str,
        receiver: Option<&'s str>,
    },
    /// `expr.attribute`
    Attribute(&'s str),
    /// A bare identifier in load position.
    Name(&'s str),
}

/// Turns usage sites into edges.
#[derive(Debug, Clone, Copy)]
pub struct UsageLinker {
    link_call_receivers: bool,
}

impl Default for UsageLinker {
    fn default() -> Self {
        Self::new(true)
    }
}

impl UsageLinker {
    pub fn new(link_call_receivers: bool) -> Self {
        Self {
            link_call_receivers,
        }
    }

    /// Short names a site looks up, each independently.
    pub fn lookup_names<'s>(&self, site: &UsageSite<'s>) -> Vec<&'s str> {
        match *site {
            UsageSite::Call { callee, receiver } => {
                let mut names = vec![callee];
                if self.link_call_receivers {
                    names.extend(receiver);
                }
                names
            }
            UsageSite::Attribute(name) | UsageSite::Name(name) => vec![name],
        }
    }

    /// Add an edge from `context` to every definition named `short_name`,
    /// except the context itself. Returns the number of new edges.
    pub fn link(
        &self,
        index: &mut DefinitionIndex,
        edges: &mut EdgeSet,
        context: &Context,
        short_name: &str,
    ) -> usize {
        let Some(source) = context.source_name() else {
            return 0;
        };
        let targets: Vec<String> = index
            .matching(short_name)
            .filter(|target| *target != source)
            .map(str::to_string)
            .collect();
        if targets.is_empty() {
            return 0;
        }

        if let Context::Module {
            module,
            source_file,
        } = context
        {
            if index.insert_if_absent(Definition::module(module, source_file.clone())) {
                trace!(module = %module, "created module node");
            }
        }

        targets
            .into_iter()
            .filter(|target| edges.insert(Edge::new(source, target.as_str())))
            .count()
    }
}

/// Walks one parsed file, resolving each usage site's context and linking it.
pub struct UsageVisitor<'a> {
    file: &'a ParsedFile,
    index: &'a mut DefinitionIndex,
    edges: &'a mut EdgeSet,
    resolver: &'a ScopeResolver,
    linker: &'a UsageLinker,
    /// Context of each enclosing class/function, outermost first.
    scopes: Vec<Context>,
    top_level: Context,
    sites: usize,
}

impl<'a> UsageVisitor<'a> {
    pub fn new(
        file: &'a ParsedFile,
        index: &'a mut DefinitionIndex,
        edges: &'a mut EdgeSet,
        resolver: &'a ScopeResolver,
        linker: &'a UsageLinker,
    ) -> Self {
        let top_level = resolver.top_level_context(index, &file.module, &file.relative);
        Self {
            file,
            index,
            edges,
            resolver,
            linker,
            scopes: Vec::new(),
            top_level,
            sites: 0,
        }
    }

    /// Walk the file. Returns the number of usage sites visited.
    pub fn run(mut self) -> usize {
        let file = self.file;
        self.visit(file.root_node());
        self.sites
    }

    fn text(&self, node: &Node<'a>) -> &'a str {
        syntax::node_text(node, self.file.source_bytes())
    }

    fn current_context(&self) -> &Context {
        self.scopes.last().unwrap_or(&self.top_level)
    }

    fn record(&mut self, site: UsageSite<'a>) {
        self.sites += 1;
        let context = self.current_context().clone();
        if matches!(context, Context::Unresolved) {
            return;
        }
        for name in self.linker.lookup_names(&site) {
            self.linker.link(self.index, self.edges, &context, name);
        }
    }

    fn push_scope(&mut self, frame: ScopeFrame) {
        let context = self
            .resolver
            .frame_context(self.index, &self.file.module, &frame);
        self.scopes.push(context);
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn visit(&mut self, node: Node<'a>) {
        match SyntaxKind::of(&node) {
            SyntaxKind::Class => self.visit_class(node, &[]),
            SyntaxKind::Function => self.visit_function(node, &[], None),
            SyntaxKind::Decorated => self.visit_decorated(node, None),
            SyntaxKind::Call => self.visit_call(node),
            SyntaxKind::Attribute => self.visit_attribute(node),
            SyntaxKind::Identifier => {
                let name = self.text(&node);
                self.record(UsageSite::Name(name));
            }
            SyntaxKind::Assignment
            | SyntaxKind::AugmentedAssignment
            | SyntaxKind::For
            | SyntaxKind::ForInClause => self.visit_binding(node, "left"),
            SyntaxKind::NamedExpression => self.visit_binding(node, "name"),
            SyntaxKind::AsPattern => self.visit_binding(node, "alias"),
            SyntaxKind::ExceptClause => self.visit_except(node),
            SyntaxKind::KeywordArgument => {
                if let Some(value) = node.child_by_field_name("value") {
                    self.visit(value);
                }
            }
            SyntaxKind::Parameters => self.visit_parameters(node),
            SyntaxKind::Lambda => {
                for (field, child) in syntax::children_with_fields(&node) {
                    match field {
                        Some("parameters") => self.visit_parameters(child),
                        _ if child.is_named() => self.visit(child),
                        _ => {}
                    }
                }
            }
            SyntaxKind::CasePattern => self.visit_pattern(node),
            SyntaxKind::TypeAlias => {
                // The first operand is the alias being bound.
                for (position, child) in syntax::named_children(&node).into_iter().enumerate() {
                    if position == 0 {
                        self.visit_alias_target(child);
                    } else {
                        self.visit(child);
                    }
                }
            }
            SyntaxKind::Import | SyntaxKind::Declaration => {}
            SyntaxKind::Other => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: Node<'a>) {
        for child in syntax::named_children(&node) {
            self.visit(child);
        }
    }

    fn visit_class(&mut self, node: Node<'a>, decorators: &[Node<'a>]) {
        let Some(name) = syntax::definition_name(&node, self.file.source_bytes()) else {
            return;
        };
        self.push_scope(ScopeFrame::Class { name: name.clone() });

        for decorator in decorators {
            self.visit(*decorator);
        }
        for (field, child) in syntax::children_with_fields(&node) {
            match field {
                Some("name") => {}
                Some("type_parameters") => self.visit_type_parameters(child),
                Some("body") => self.visit_class_body(child, &name),
                _ if child.is_named() => self.visit(child),
                _ => {}
            }
        }

        self.pop_scope();
    }

    fn visit_class_body(&mut self, body: Node<'a>, class: &str) {
        for statement in syntax::named_children(&body) {
            match SyntaxKind::of(&statement) {
                SyntaxKind::Function => self.visit_function(statement, &[], Some(class)),
                SyntaxKind::Decorated => self.visit_decorated(statement, Some(class)),
                _ => self.visit(statement),
            }
        }
    }

    fn visit_decorated(&mut self, node: Node<'a>, owner: Option<&str>) {
        let Some((definition, decorators)) = syntax::unwrap_decorated(&node) else {
            self.visit_children(node);
            return;
        };
        match SyntaxKind::of(&definition) {
            SyntaxKind::Class => self.visit_class(definition, &decorators),
            SyntaxKind::Function => self.visit_function(definition, &decorators, owner),
            _ => self.visit_children(node),
        }
    }

    /// Decorators, defaults, and annotations are attributed to the function
    /// itself, like its body.
    fn visit_function(&mut self, node: Node<'a>, decorators: &[Node<'a>], owner: Option<&str>) {
        let Some(name) = syntax::definition_name(&node, self.file.source_bytes()) else {
            return;
        };
        self.push_scope(ScopeFrame::Function {
            name,
            owner: owner.map(str::to_string),
        });

        for decorator in decorators {
            self.visit(*decorator);
        }
        for (field, child) in syntax::children_with_fields(&node) {
            match field {
                Some("name") => {}
                Some("type_parameters") => self.visit_type_parameters(child),
                Some("parameters") => self.visit_parameters(child),
                _ if child.is_named() => self.visit(child),
                _ => {}
            }
        }

        self.pop_scope();
    }

    fn visit_call(&mut self, node: Node<'a>) {
        for (field, child) in syntax::children_with_fields(&node) {
            match field {
                Some("function") => self.visit_callee(child),
                _ if child.is_named() => self.visit(child),
                _ => {}
            }
        }
    }

    /// A bare-name receiver (`obj` in `obj.m()`) is looked up only through
    /// the call site, so the receiver knob controls it.
    fn visit_callee(&mut self, function: Node<'a>) {
        match SyntaxKind::of(&function) {
            SyntaxKind::Identifier => {
                let callee = self.text(&function);
                self.record(UsageSite::Call {
                    callee,
                    receiver: None,
                });
            }
            SyntaxKind::Attribute => {
                let object = function.child_by_field_name("object");
                let receiver = object
                    .filter(|object| SyntaxKind::of(object) == SyntaxKind::Identifier)
                    .map(|object| self.text(&object));
                if let Some(attribute) = function.child_by_field_name("attribute") {
                    let callee = self.text(&attribute);
                    self.record(UsageSite::Call { callee, receiver });
                }
                if let (Some(object), None) = (object, receiver) {
                    self.visit(object);
                }
            }
            _ => self.visit(function),
        }
    }

    fn visit_attribute(&mut self, node: Node<'a>) {
        if let Some(attribute) = node.child_by_field_name("attribute") {
            let name = self.text(&attribute);
            self.record(UsageSite::Attribute(name));
        }
        if let Some(object) = node.child_by_field_name("object") {
            self.visit(object);
        }
    }

    /// Visit a binding construct whose `target_field` child is a store.
    fn visit_binding(&mut self, node: Node<'a>, target_field: &str) {
        for (field, child) in syntax::children_with_fields(&node) {
            if !child.is_named() {
                continue;
            }
            if field == Some(target_field) || child.kind() == "as_pattern_target" {
                self.visit_target(child);
            } else {
                self.visit(child);
            }
        }
    }

    /// Bare names in a binding target are stores, not usages. Attribute and
    /// subscript targets still read their base expressions.
    fn visit_target(&mut self, node: Node<'a>) {
        let kind = node.kind();
        if kind == "identifier" {
            return;
        }
        if SyntaxKind::is_target_container(kind) {
            for child in syntax::named_children(&node) {
                self.visit_target(child);
            }
        } else {
            self.visit(node);
        }
    }

    /// `except E as e:` binds `e`.
    fn visit_except(&mut self, node: Node<'a>) {
        let mut after_as = false;
        for (field, child) in syntax::children_with_fields(&node) {
            if !child.is_named() {
                after_as = child.kind() == "as";
                continue;
            }
            if field == Some("alias") || (after_as && child.kind() == "identifier") {
                self.visit_target(child);
            } else {
                self.visit(child);
            }
            after_as = false;
        }
    }

    /// Parameter names are bindings; defaults and annotations are usages.
    fn visit_parameters(&mut self, node: Node<'a>) {
        for parameter in syntax::named_children(&node) {
            match parameter.kind() {
                "default_parameter" => {
                    if let Some(value) = parameter.child_by_field_name("value") {
                        self.visit(value);
                    }
                }
                "typed_parameter" => {
                    if let Some(annotation) = parameter.child_by_field_name("type") {
                        self.visit(annotation);
                    }
                }
                "typed_default_parameter" => {
                    for field in ["type", "value"] {
                        if let Some(child) = parameter.child_by_field_name(field) {
                            self.visit(child);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// `type Alias[T] = ...` binds `Alias` and `T`.
    fn visit_alias_target(&mut self, node: Node<'a>) {
        match node.kind() {
            "identifier" => {}
            "type_parameter" => self.visit_type_parameters(node),
            _ => {
                for child in syntax::named_children(&node) {
                    self.visit_alias_target(child);
                }
            }
        }
    }

    /// PEP 695 parameters (`[T, U: Bound]`) bind their names; bounds are reads.
    fn visit_type_parameters(&mut self, node: Node<'a>) {
        for parameter in syntax::named_children(&node) {
            let Some(first) = syntax::named_children(&parameter).into_iter().next() else {
                continue;
            };
            match first.kind() {
                "identifier" | "splat_type" => {}
                "constrained_type" => {
                    for bound in syntax::named_children(&first).into_iter().skip(1) {
                        self.visit(bound);
                    }
                }
                _ => self.visit(parameter),
            }
        }
    }

    /// `match` patterns: bare names are captures; class patterns and dotted
    /// value patterns (`Color.RED`) are reads.
    fn visit_pattern(&mut self, node: Node<'a>) {
        match node.kind() {
            "identifier" => {}
            "class_pattern" => {
                for child in syntax::named_children(&node) {
                    if child.kind() == "dotted_name" {
                        self.record_dotted(child);
                    } else {
                        self.visit_pattern(child);
                    }
                }
            }
            "dotted_name" => {
                if node.named_child_count() > 1 {
                    self.record_dotted(node);
                }
            }
            _ => {
                for child in syntax::named_children(&node) {
                    self.visit_pattern(child);
                }
            }
        }
    }

    fn record_dotted(&mut self, node: Node<'a>) {
        for (position, part) in syntax::named_children(&node).into_iter().enumerate() {
            let name = self.text(&part);
            if position == 0 {
                self.record(UsageSite::Name(name));
            } else {
                self.record(UsageSite::Attribute(name));
            }
        }
    }
}

/// Run pass 2 over one file. Returns the number of usage sites visited.
pub fn link_file(
    file: &ParsedFile,
    index: &mut DefinitionIndex,
    edges: &mut EdgeSet,
    resolver: &ScopeResolver,
    linker: &UsageLinker,
) -> usize {
    UsageVisitor::new(file, index, edges, resolver, linker).run()
}
