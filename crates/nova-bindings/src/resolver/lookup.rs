//! Field, method and type lookup by name from within a scope.

use std::collections::{HashSet, VecDeque};

use nova_core::{Name, PackageName, QualifiedName};
use nova_hir::{Expr, ExprKind, ImportKind};

use crate::binding::{Binding, BindingId};
use crate::resolver::scope::Scope;
use crate::session::Session;

impl<'p> Session<'p> {
    /// The class types whose members are visible on values of `ty`: itself for class types,
    /// the bounds for type variables and captures, `Object` for arrays.
    pub(crate) fn member_owners(&mut self, ty: BindingId) -> Vec<BindingId> {
        match self.binding(ty) {
            Binding::Type(_) | Binding::Parameterized(_) | Binding::Raw(_) => vec![ty],
            Binding::TypeVariable(_) | Binding::Capture(_) | Binding::Wildcard(_) => {
                let bounds = self.type_bounds(ty);
                if bounds.is_empty() {
                    vec![self.object()]
                } else {
                    bounds
                        .into_iter()
                        .flat_map(|bound| self.member_owners(bound))
                        .collect()
                }
            }
            Binding::Array(_) => vec![self.object()],
            _ => Vec::new(),
        }
    }

    /// Class types of `ty` and all its supertypes, nearest first.
    fn supertype_closure(&mut self, ty: BindingId) -> Vec<BindingId> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::from(self.member_owners(ty));
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            order.push(current);
            queue.extend(self.direct_supertypes(current));
        }
        order
    }

    /// The field `name` declared in `ty` or inherited from its supertypes.
    pub(crate) fn find_field(&mut self, ty: BindingId, name: &Name) -> Option<BindingId> {
        for owner in self.supertype_closure(ty) {
            let found = self.declared_fields(owner).into_iter().find(|&field| {
                matches!(self.binding(field), Binding::Variable(var) if &var.name == name)
            });
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// Methods named `name` that are members of `ty`, nearest declaration first. Methods
    /// overridden in a subtype (same erased parameter types) are left out.
    pub(crate) fn find_methods(&mut self, ty: BindingId, name: &Name) -> Vec<BindingId> {
        let mut found = Vec::new();
        let mut signatures: Vec<Vec<BindingId>> = Vec::new();
        for owner in self.supertype_closure(ty) {
            for method in self.declared_methods(owner) {
                let (matches, params) = match self.binding(method) {
                    Binding::Method(m) => (&m.name == name && !m.is_constructor, m.params.clone()),
                    _ => (false, Vec::new()),
                };
                if !matches {
                    continue;
                }
                let erased = params
                    .into_iter()
                    .map(|param| self.erasure(param))
                    .collect::<Vec<_>>();
                if !signatures.contains(&erased) {
                    signatures.push(erased);
                    found.push(method);
                }
            }
        }
        found
    }

    pub(crate) fn constructors(&mut self, ty: BindingId) -> Vec<BindingId> {
        self.declared_methods(ty)
            .into_iter()
            .filter(|&method| matches!(self.binding(method), Binding::Method(m) if m.is_constructor))
            .collect()
    }

    /// A field visible by simple name: declared in or inherited by an enclosing type, or
    /// statically imported.
    pub(crate) fn lookup_field_in_scope(&mut self, scope: &Scope<'p>, name: &Name) -> Option<BindingId> {
        for &ty in scope.types.iter().rev() {
            if let Some(field) = self.find_field(ty, name) {
                return Some(field);
            }
        }
        let imports = &scope.unit.imports;
        for import in imports {
            if let ImportKind::StaticSingle { ty, member } = &import.kind {
                if member == name {
                    if let Some(field) = self
                        .resolve_qualified_type(ty)
                        .and_then(|owner| self.find_field(owner, name))
                    {
                        return Some(field);
                    }
                }
            }
        }
        for import in imports {
            if let ImportKind::StaticOnDemand(ty) = &import.kind {
                if let Some(field) = self
                    .resolve_qualified_type(ty)
                    .and_then(|owner| self.find_field(owner, name))
                {
                    return Some(field);
                }
            }
        }
        None
    }

    /// Methods callable by simple name: the innermost enclosing type declaring or inheriting
    /// a method with that name, else static imports. Returns the receiver type too.
    pub(crate) fn lookup_methods_in_scope(
        &mut self,
        scope: &Scope<'p>,
        name: &Name,
    ) -> Option<(BindingId, Vec<BindingId>)> {
        for &ty in scope.types.iter().rev() {
            let methods = self.find_methods(ty, name);
            if !methods.is_empty() {
                return Some((ty, methods));
            }
        }
        for import in &scope.unit.imports {
            let owner = match &import.kind {
                ImportKind::StaticSingle { ty, member } if member == name => ty,
                ImportKind::StaticOnDemand(ty) => ty,
                _ => continue,
            };
            let Some(owner) = self.resolve_qualified_type(owner) else {
                continue;
            };
            let methods = self
                .find_methods(owner, name)
                .into_iter()
                .filter(|&m| matches!(self.binding(m), Binding::Method(m) if m.modifiers.is_static))
                .collect::<Vec<_>>();
            if !methods.is_empty() {
                return Some((owner, methods));
            }
        }
        None
    }

    /// What a dotted name expression (`a.b.C`) denotes when it is not a variable: a type
    /// reference or a package.
    pub(crate) fn name_path(&mut self, scope: &Scope<'p>, expr: &Expr) -> Option<NamePath> {
        match &expr.kind {
            ExprKind::Name(name) => {
                if let Some(ty) = self.lookup_type_name(scope, name) {
                    return Some(NamePath::Type(ty));
                }
                let package = PackageName::from_segments(vec![name.clone()]);
                self.lookup_package(&package).map(NamePath::Package)
            }
            ExprKind::FieldAccess { target, name } => {
                let qualifier = self.name_path(scope, target)?;
                self.member_path(qualifier, name)
            }
            _ => None,
        }
    }

    /// What `qualifier.name` denotes: a member type of a type, or a type or subpackage of a
    /// package.
    pub(crate) fn member_path(&mut self, qualifier: NamePath, name: &Name) -> Option<NamePath> {
        match qualifier {
            NamePath::Type(outer) => {
                let outer = self.generic_of(outer)?;
                let member = self.find_member_type(outer, name)?;
                Some(NamePath::Type(self.plain_reference(member)))
            }
            NamePath::Package(package) => {
                let Binding::Package(pkg) = self.binding(package) else {
                    return None;
                };
                let mut segments = pkg.name.segments().to_vec();
                segments.push(name.clone());
                let qualified = QualifiedName::from_segments(segments.clone());
                if let Some(ty) = self.resolve_qualified_type(&qualified) {
                    return Some(NamePath::Type(self.plain_reference(ty)));
                }
                self.lookup_package(&PackageName::from_segments(segments))
                    .map(NamePath::Package)
            }
        }
    }
}

/// A name that denotes a type or a package rather than a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NamePath {
    Type(BindingId),
    Package(BindingId),
}
