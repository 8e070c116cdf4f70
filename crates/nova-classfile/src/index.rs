use std::collections::{BTreeMap, BTreeSet};

use crate::stub::ClassStub;

/// Read-only, already-indexed view of dependency classes.
///
/// Lookups never perform I/O; implementations are expected to be built up front
/// (from jars, `ct.sym`, or in tests by hand).
pub trait ClassProvider {
    /// Looks up a class by its internal name (`java/util/Map$Entry`).
    fn lookup_class(&self, internal_name: &str) -> Option<&ClassStub>;

    /// Whether any class lives in the package with the given internal name (`java/util`).
    fn has_package(&self, internal_package: &str) -> bool;

    /// Internal names of the member types declared directly in `outer`.
    fn member_classes(&self, outer_internal_name: &str) -> Vec<String>;
}

/// A [`ClassProvider`] backed by an in-memory map of stubs.
#[derive(Debug, Clone, Default)]
pub struct StubIndex {
    classes: BTreeMap<String, ClassStub>,
    packages: BTreeSet<String>,
}

impl StubIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a stub, returning the previous one.
    pub fn insert(&mut self, stub: ClassStub) -> Option<ClassStub> {
        let package = match stub.internal_name.rfind('/') {
            Some(idx) => stub.internal_name[..idx].to_string(),
            None => String::new(),
        };
        let mut prefix = String::new();
        for segment in package.split('/').filter(|s| !s.is_empty()) {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            self.packages.insert(prefix.clone());
        }
        self.classes.insert(stub.internal_name.clone(), stub)
    }

    pub fn with(mut self, stub: ClassStub) -> Self {
        self.insert(stub);
        self
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassStub> {
        self.classes.values()
    }
}

impl ClassProvider for StubIndex {
    fn lookup_class(&self, internal_name: &str) -> Option<&ClassStub> {
        self.classes.get(internal_name)
    }

    fn has_package(&self, internal_package: &str) -> bool {
        self.packages.contains(internal_package)
    }

    fn member_classes(&self, outer_internal_name: &str) -> Vec<String> {
        let prefix = format!("{outer_internal_name}$");
        self.classes
            .range(prefix.clone()..)
            .take_while(|(name, _)| name.starts_with(&prefix))
            .filter(|(name, _)| !name[prefix.len()..].contains('$'))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::{ACC_PUBLIC, ACC_STATIC};

    #[test]
    fn member_classes_only_lists_direct_members() {
        let index = StubIndex::new()
            .with(ClassStub::new("p/Outer", ACC_PUBLIC))
            .with(ClassStub::new("p/Outer$A", ACC_PUBLIC | ACC_STATIC))
            .with(ClassStub::new("p/Outer$A$Deep", ACC_PUBLIC | ACC_STATIC))
            .with(ClassStub::new("p/Outer$B", ACC_PUBLIC))
            .with(ClassStub::new("p/OuterX", ACC_PUBLIC));

        assert_eq!(
            index.member_classes("p/Outer"),
            vec!["p/Outer$A".to_string(), "p/Outer$B".to_string()]
        );
        assert!(index.has_package("p"));
        assert!(!index.has_package("q"));
    }
}
