use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use nova_classfile::ClassStub;
use nova_core::{FileId, PackageName, TypeName};
use nova_hir::{CompilationUnit, TypeDecl};

use crate::project::Project;

/// A source type declaration together with the unit it was declared in.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SourceType<'p> {
    pub(crate) file: FileId,
    pub(crate) unit: &'p CompilationUnit,
    pub(crate) decl: &'p TypeDecl,
}

/// Where a named type is declared.
#[derive(Debug, Clone, Copy)]
pub(crate) enum DeclRef<'p> {
    Source(SourceType<'p>),
    Dependency(&'p ClassStub),
}

/// Maps binary type names and packages to their raw declarations for one project snapshot.
///
/// Source declarations shadow dependency classes of the same name.
#[derive(Debug)]
pub(crate) struct DeclTable<'p> {
    project: &'p Project,
    types: HashMap<TypeName, SourceType<'p>>,
    packages: HashSet<PackageName>,
}

impl<'p> DeclTable<'p> {
    pub(crate) fn new(project: &'p Project) -> Self {
        let mut table = Self {
            project,
            types: HashMap::new(),
            packages: HashSet::new(),
        };
        for unit in project.units() {
            let package = unit.package_name();
            let mut prefix = Vec::new();
            for segment in package.segments() {
                prefix.push(segment.clone());
                table
                    .packages
                    .insert(PackageName::from_segments(prefix.clone()));
            }
            for decl in &unit.types {
                let name = TypeName::in_package(&package, decl.name.as_str());
                table.insert(unit, name, decl);
            }
        }
        table
    }

    fn insert(&mut self, unit: &'p CompilationUnit, name: TypeName, decl: &'p TypeDecl) {
        for nested in &decl.nested {
            self.insert(unit, name.nested(nested.name.as_str()), nested);
        }
        match self.types.entry(name) {
            Entry::Vacant(entry) => {
                entry.insert(SourceType {
                    file: unit.file,
                    unit,
                    decl,
                });
            }
            Entry::Occupied(entry) => {
                tracing::debug!(
                    name = %entry.key(),
                    first = ?entry.get().file,
                    second = ?unit.file,
                    "duplicate source type; keeping the first declaration"
                );
            }
        }
    }

    pub(crate) fn project(&self) -> &'p Project {
        self.project
    }

    pub(crate) fn lookup(&self, name: &TypeName) -> Option<DeclRef<'p>> {
        if let Some(source) = self.types.get(name) {
            return Some(DeclRef::Source(*source));
        }
        self.project
            .classes()
            .lookup_class(&name.to_internal())
            .map(DeclRef::Dependency)
    }

    pub(crate) fn source(&self, name: &TypeName) -> Option<SourceType<'p>> {
        self.types.get(name).copied()
    }

    pub(crate) fn has_package(&self, name: &PackageName) -> bool {
        name.is_default()
            || self.packages.contains(name)
            || self.project.classes().has_package(&name.to_internal())
    }

    /// Binary names of the member types declared directly in `outer`.
    pub(crate) fn member_types(&self, outer: &TypeName) -> Vec<TypeName> {
        match self.lookup(outer) {
            Some(DeclRef::Source(source)) => source
                .decl
                .nested
                .iter()
                .map(|nested| outer.nested(nested.name.as_str()))
                .collect(),
            Some(DeclRef::Dependency(stub)) => self
                .project
                .classes()
                .member_classes(&stub.internal_name)
                .iter()
                .map(|name| TypeName::from_internal(name))
                .collect(),
            None => Vec::new(),
        }
    }
}
