//! Name bookkeeping for a translated definition.

use std::fmt;

/// Where a name in the definition comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeOrigin {
    /// A declared parameter, turned into a placeholder.
    Parameter,
    /// Bound by an assignment or loop target inside the body.
    LocalBinding,
    /// Read but never bound; resolved by the caller's environment.
    External,
}

impl ScopeOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeOrigin::Parameter => "parameter",
            ScopeOrigin::LocalBinding => "local",
            ScopeOrigin::External => "external",
        }
    }
}

impl fmt::Display for ScopeOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeEntry {
    pub name: String,
    pub origin: ScopeOrigin,
}

/// Names in first-seen order. A name keeps the origin it was first
/// recorded with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    entries: Vec<ScopeEntry>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name`; returns false if it was already known.
    pub fn insert(&mut self, name: &str, origin: ScopeOrigin) -> bool {
        if self.contains(name) {
            return false;
        }
        self.entries.push(ScopeEntry {
            name: name.to_string(),
            origin,
        });
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn origin(&self, name: &str) -> Option<ScopeOrigin> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.origin)
    }

    pub fn entries(&self) -> &[ScopeEntry] {
        &self.entries
    }

    /// Names with the given origin, in first-seen order.
    pub fn names(&self, origin: ScopeOrigin) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.origin == origin)
            .map(|e| e.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_origin_wins() {
        let mut scope = Scope::new();
        assert!(scope.insert("x", ScopeOrigin::Parameter));
        assert!(!scope.insert("x", ScopeOrigin::LocalBinding));
        assert_eq!(scope.origin("x"), Some(ScopeOrigin::Parameter));
    }

    #[test]
    fn names_by_origin_keep_order() {
        let mut scope = Scope::new();
        scope.insert("b", ScopeOrigin::LocalBinding);
        scope.insert("p", ScopeOrigin::Parameter);
        scope.insert("a", ScopeOrigin::LocalBinding);
        assert_eq!(scope.names(ScopeOrigin::LocalBinding), vec!["b", "a"]);
        assert_eq!(scope.len(), 3);
    }
}
