//! Lexical alias scoping for extraction.
//!
//! Each SELECT subtree gets its own scope holding the alias → table map
//! built from that SELECT's FROM and JOIN list. Nested subqueries get a
//! child scope: lookups are local-first, so an alias letter reused for a
//! different table shadows the outer binding, while genuinely correlated
//! references still resolve through the parent link. Definitions never
//! propagate upward.

use std::collections::HashMap;

use super::facts::Table;

/// An alias → canonical-table mapping with an optional parent scope.
#[derive(Debug, Default)]
pub struct Scope<'p> {
    aliases: HashMap<String, Table>,
    parent: Option<&'p Scope<'p>>,
}

impl<'p> Scope<'p> {
    /// The root scope for one statement.
    pub fn root() -> Self {
        Scope {
            aliases: HashMap::new(),
            parent: None,
        }
    }

    /// A child scope for a nested SELECT. Dropped when the subtree walk
    /// finishes; it is never merged into the parent.
    pub fn child(&self) -> Scope<'_> {
        Scope {
            aliases: HashMap::new(),
            parent: Some(self),
        }
    }

    /// Binds an alias to its canonical table in this scope.
    pub fn define(&mut self, alias: impl Into<String>, table: Table) {
        self.aliases.insert(alias.into(), table);
    }

    /// Resolves an alias, local scope first, then outward.
    pub fn resolve(&self, alias: &str) -> Option<&Table> {
        match self.aliases.get(alias) {
            Some(table) => Some(table),
            None => self.parent.and_then(|parent| parent.resolve(alias)),
        }
    }

    /// The sole table in this scope, if there is exactly one. Used to
    /// attribute unqualified column references.
    pub fn sole_table(&self) -> Option<&Table> {
        let mut tables = self.aliases.values();
        let first = tables.next()?;
        if tables.all(|table| table == first) {
            Some(first)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str) -> Table {
        Table::new(None, name)
    }

    #[test]
    fn resolves_through_parent() {
        let mut outer = Scope::root();
        outer.define("u", table("users"));
        let inner = outer.child();
        assert_eq!(inner.resolve("u"), Some(&table("users")));
    }

    #[test]
    fn local_binding_shadows_parent() {
        let mut outer = Scope::root();
        outer.define("t", table("users"));
        let mut inner = outer.child();
        inner.define("t", table("teams"));
        assert_eq!(inner.resolve("t"), Some(&table("teams")));
        assert_eq!(outer.resolve("t"), Some(&table("users")));
    }
}
