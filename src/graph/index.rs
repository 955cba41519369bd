//! The definition index — two views over the same set of definitions.
//!
//! `by_qualified_name` gives exact lookup; `by_short_name` maps an
//! unqualified name to every qualified name registered under it. Both are
//! ordered maps so iteration (and everything derived from it) is
//! deterministic.

use std::collections::{BTreeMap, BTreeSet};

use super::types::{Definition, DefinitionKind};

#[derive(Debug, Clone, Default)]
pub struct DefinitionIndex {
    /// Index: qualified name -> definition.
    by_qualified_name: BTreeMap<String, Definition>,
    /// Index: short name -> qualified names sharing it. Never collapsed.
    by_short_name: BTreeMap<String, BTreeSet<String>>,
}

impl DefinitionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition. A definition already stored under the same
    /// qualified name is replaced (last write wins) and returned.
    ///
    /// Module definitions are not registered by short name: no usage site
    /// refers to a module by its last path component.
    pub fn insert(&mut self, definition: Definition) -> Option<Definition> {
        if definition.kind != DefinitionKind::Module {
            self.by_short_name
                .entry(definition.short_name.clone())
                .or_default()
                .insert(definition.qualified_name.clone());
        }
        self.by_qualified_name
            .insert(definition.qualified_name.clone(), definition)
    }

    /// Insert `definition` only if its qualified name is free.
    /// Returns whether it was inserted.
    pub fn insert_if_absent(&mut self, definition: Definition) -> bool {
        if self.contains(&definition.qualified_name) {
            return false;
        }
        self.insert(definition);
        true
    }

    pub fn get(&self, qualified_name: &str) -> Option<&Definition> {
        self.by_qualified_name.get(qualified_name)
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.by_qualified_name.contains_key(qualified_name)
    }

    /// Every qualified name registered under `short_name`, in sorted order.
    pub fn matching(&self, short_name: &str) -> impl Iterator<Item = &str> {
        self.by_short_name
            .get(short_name)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// The first definition, in qualified-name order, from `module`.
    pub fn first_in_module(&self, module: &str) -> Option<&Definition> {
        let prefix = format!("{module}.");
        self.by_qualified_name
            .range(prefix.clone()..)
            .take_while(|(name, _)| name.starts_with(&prefix))
            .map(|(_, def)| def)
            .find(|def| def.module == module)
    }

    /// All definitions in qualified-name order.
    pub fn iter(&self) -> impl Iterator<Item = &Definition> {
        self.by_qualified_name.values()
    }

    pub fn len(&self) -> usize {
        self.by_qualified_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_qualified_name.is_empty()
    }

    pub fn unique_short_names(&self) -> usize {
        self.by_short_name.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn def(module: &str, scope: &[&str], kind: DefinitionKind, line: usize) -> Definition {
        Definition::new(
            module,
            scope,
            kind,
            PathBuf::from(format!("{}.py", module.replace('.', "/"))),
            line,
        )
    }

    #[test]
    fn test_empty_index() {
        let index = DefinitionIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.matching("anything").count(), 0);
        assert!(index.first_in_module("m").is_none());
    }

    #[test]
    fn test_short_name_ambiguity_preserved() {
        let mut index = DefinitionIndex::new();
        index.insert(def("a", &["bar"], DefinitionKind::Function, 4));
        index.insert(def("b", &["bar"], DefinitionKind::Function, 1));
        index.insert(def("c", &["K", "bar"], DefinitionKind::Method, 2));

        let matches: Vec<&str> = index.matching("bar").collect();
        assert_eq!(matches, vec!["a.bar", "b.bar", "c.K.bar"]);
        assert_eq!(index.unique_short_names(), 1);
    }

    #[test]
    fn test_last_write_wins() {
        let mut index = DefinitionIndex::new();
        assert!(index
            .insert(def("m", &["f"], DefinitionKind::Function, 1))
            .is_none());
        let previous = index.insert(def("m", &["f"], DefinitionKind::Function, 9));

        assert_eq!(previous.map(|d| d.line), Some(1));
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("m.f").map(|d| d.line), Some(9));
        assert_eq!(index.matching("f").count(), 1);
    }

    #[test]
    fn test_insert_if_absent_keeps_existing() {
        let mut index = DefinitionIndex::new();
        index.insert(def("pkg", &["a"], DefinitionKind::Class, 3));
        assert!(
            !index.insert_if_absent(Definition::module("pkg.a", PathBuf::from("pkg/a.py")))
        );
        assert_eq!(
            index.get("pkg.a").map(|d| d.kind),
            Some(DefinitionKind::Class)
        );
    }

    #[test]
    fn test_modules_not_indexed_by_short_name() {
        let mut index = DefinitionIndex::new();
        index.insert(Definition::module("pkg.util", PathBuf::from("pkg/util.py")));
        assert!(index.contains("pkg.util"));
        assert_eq!(index.matching("util").count(), 0);
    }

    #[test]
    fn test_first_in_module_ignores_submodules() {
        let mut index = DefinitionIndex::new();
        index.insert(def("a.b", &["aaa"], DefinitionKind::Function, 1));
        index.insert(def("a", &["zed"], DefinitionKind::Function, 1));
        index.insert(def("a", &["mid"], DefinitionKind::Function, 5));
        index.insert(def("ab", &["first"], DefinitionKind::Function, 1));

        let first = index.first_in_module("a").unwrap();
        assert_eq!(first.qualified_name, "a.mid");
        assert_eq!(
            index.first_in_module("a.b").unwrap().qualified_name,
            "a.b.aaa"
        );
        assert!(index.first_in_module("zz").is_none());
    }
}
