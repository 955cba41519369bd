//! Typed dispatch over tree-sitter Python node kinds.
//!
//! Both passes match on [`SyntaxKind`] instead of comparing kind strings
//! throughout the walkers. Kinds the analyzer has no special rule for map
//! to [`SyntaxKind::Other`] and are walked generically.

use tree_sitter::Node;

/// The node kinds the analyzer treats specially.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxKind {
    Class,
    Function,
    /// `@decorator` wrapper around a class or function definition.
    Decorated,
    Call,
    Attribute,
    Identifier,
    Assignment,
    AugmentedAssignment,
    For,
    ForInClause,
    NamedExpression,
    AsPattern,
    ExceptClause,
    KeywordArgument,
    Parameters,
    Lambda,
    CasePattern,
    /// `type Alias = ...`
    TypeAlias,
    /// `import x`, `from x import y`, `from __future__ import y`.
    Import,
    /// `global x`, `nonlocal x`.
    Declaration,
    Other,
}

impl SyntaxKind {
    pub fn of(node: &Node<'_>) -> Self {
        match node.kind() {
            "class_definition" => SyntaxKind::Class,
            "function_definition" => SyntaxKind::Function,
            "decorated_definition" => SyntaxKind::Decorated,
            "call" => SyntaxKind::Call,
            "attribute" => SyntaxKind::Attribute,
            "identifier" => SyntaxKind::Identifier,
            "assignment" => SyntaxKind::Assignment,
            "augmented_assignment" => SyntaxKind::AugmentedAssignment,
            "for_statement" => SyntaxKind::For,
            "for_in_clause" => SyntaxKind::ForInClause,
            "named_expression" => SyntaxKind::NamedExpression,
            "as_pattern" => SyntaxKind::AsPattern,
            "except_clause" | "except_group_clause" => SyntaxKind::ExceptClause,
            "keyword_argument" => SyntaxKind::KeywordArgument,
            "parameters" | "lambda_parameters" => SyntaxKind::Parameters,
            "lambda" => SyntaxKind::Lambda,
            "case_pattern" => SyntaxKind::CasePattern,
            "type_alias_statement" => SyntaxKind::TypeAlias,
            "import_statement" | "import_from_statement" | "future_import_statement" => {
                SyntaxKind::Import
            }
            "global_statement" | "nonlocal_statement" => SyntaxKind::Declaration,
            _ => SyntaxKind::Other,
        }
    }

    /// Kinds that can appear as binding targets and are destructured
    /// rather than read (`a, (b, *c) = ...`).
    pub fn is_target_container(kind: &str) -> bool {
        matches!(
            kind,
            "pattern_list"
                | "tuple_pattern"
                | "list_pattern"
                | "tuple"
                | "list"
                | "parenthesized_expression"
                | "list_splat_pattern"
                | "list_splat"
                | "as_pattern_target"
        )
    }
}

/// Source text of a node. Empty if the span is not valid UTF-8.
pub fn node_text<'s>(node: &Node<'_>, source: &'s [u8]) -> &'s str {
    node.utf8_text(source).unwrap_or("")
}

/// The `name` field of a class or function definition.
pub fn definition_name(node: &Node<'_>, source: &[u8]) -> Option<String> {
    node.child_by_field_name("name")
        .map(|n| node_text(&n, source).to_string())
        .filter(|name| !name.is_empty())
}

/// 1-indexed line of a node's first token.
pub fn line_of(node: &Node<'_>) -> usize {
    node.start_position().row + 1
}

/// All children of `node` (named and anonymous) with the field each occupies.
///
/// Fields like `for_in_clause.right` may repeat, so this walks the cursor
/// instead of relying on `child_by_field_name`.
pub fn children_with_fields<'t>(node: &Node<'t>) -> Vec<(Option<&'static str>, Node<'t>)> {
    let mut out = Vec::with_capacity(node.child_count());
    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            out.push((cursor.field_name(), cursor.node()));
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
    out
}

/// Deepest nesting level under `node`, counting `node` as 1.
///
/// Walks with a cursor so arbitrarily deep trees are measured without
/// recursion.
pub fn tree_depth(node: &Node<'_>) -> usize {
    let mut cursor = node.walk();
    let mut depth = 1;
    let mut deepest = 1;
    loop {
        if cursor.goto_first_child() {
            depth += 1;
            deepest = deepest.max(depth);
            continue;
        }
        while !cursor.goto_next_sibling() {
            if depth == 1 || !cursor.goto_parent() {
                return deepest;
            }
            depth -= 1;
        }
    }
}

pub fn named_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Split a `decorated_definition` into its inner definition and decorators.
pub fn unwrap_decorated<'t>(node: &Node<'t>) -> Option<(Node<'t>, Vec<Node<'t>>)> {
    let definition = node.child_by_field_name("definition")?;
    let decorators = named_children(node)
        .into_iter()
        .filter(|child| child.kind() == "decorator")
        .collect();
    Some((definition, decorators))
}

/// Statements directly inside a class body.
pub fn class_body_statements<'t>(class: &Node<'t>) -> Vec<Node<'t>> {
    class
        .child_by_field_name("body")
        .map(|body| named_children(&body))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use std::path::Path;

    #[test]
    fn test_kind_dispatch() {
        let source = "@wrap\ndef f(a, b=1):\n    return g(a).h\n";
        let tree = parse_source(Path::new("t.py"), source).unwrap();
        let root = tree.root_node();
        let decorated = root.named_child(0).unwrap();
        assert_eq!(SyntaxKind::of(&decorated), SyntaxKind::Decorated);

        let (def, decorators) = unwrap_decorated(&decorated).unwrap();
        assert_eq!(SyntaxKind::of(&def), SyntaxKind::Function);
        assert_eq!(decorators.len(), 1);
        assert_eq!(
            definition_name(&def, source.as_bytes()).as_deref(),
            Some("f")
        );
        assert_eq!(line_of(&def), 2);

        let params = def.child_by_field_name("parameters").unwrap();
        assert_eq!(SyntaxKind::of(&params), SyntaxKind::Parameters);
    }

    #[test]
    fn test_children_with_fields_reports_field_names() {
        let source = "x = y\n";
        let tree = parse_source(Path::new("t.py"), source).unwrap();
        let stmt = tree.root_node().named_child(0).unwrap();
        let assignment = stmt.named_child(0).unwrap();
        assert_eq!(SyntaxKind::of(&assignment), SyntaxKind::Assignment);

        let fields: Vec<_> = children_with_fields(&assignment)
            .into_iter()
            .filter_map(|(field, child)| field.map(|f| (f, node_text(&child, source.as_bytes()))))
            .collect();
        assert_eq!(fields, vec![("left", "x"), ("right", "y")]);
    }

    #[test]
    fn test_class_body_statements() {
        let source = "class C(Base):\n    x = 1\n    def m(self):\n        pass\n";
        let tree = parse_source(Path::new("t.py"), source).unwrap();
        let class = tree.root_node().named_child(0).unwrap();
        let body = class_body_statements(&class);
        assert_eq!(body.len(), 2);
        assert_eq!(SyntaxKind::of(&body[1]), SyntaxKind::Function);
    }

    #[test]
    fn test_tree_depth() {
        let flat = parse_source(Path::new("t.py"), "x = 1\n").unwrap();
        let nested = parse_source(Path::new("t.py"), "x = ((((1))))\n").unwrap();
        let flat_depth = tree_depth(&flat.root_node());
        assert!(flat_depth >= 3);
        assert_eq!(tree_depth(&nested.root_node()), flat_depth + 4);

        let stmt = flat.root_node().named_child(0).unwrap();
        let literal = stmt
            .named_child(0)
            .and_then(|a| a.child_by_field_name("right"))
            .unwrap();
        assert_eq!(tree_depth(&literal), 1);
    }

    #[test]
    fn test_target_containers() {
        assert!(SyntaxKind::is_target_container("pattern_list"));
        assert!(SyntaxKind::is_target_container("list_splat_pattern"));
        assert!(!SyntaxKind::is_target_container("attribute"));
        assert!(!SyntaxKind::is_target_container("subscript"));
    }
}
