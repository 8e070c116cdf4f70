//! Type name lookup and type reference resolution.

use std::collections::HashSet;

use nova_classfile::BaseType;
use nova_core::{FileId, Name, PackageName, QualifiedName, TextRange, TypeName};
use nova_hir::{
    CompilationUnit, ImportKind, NodeFlags, NodeId, PrimitiveType, TypeRef, TypeRefKind,
    TypeRefSegment, WildcardBoundKind,
};

use crate::binding::{Binding, BindingId, WildcardKind};
use crate::session::Session;

/// The lexical context a name is resolved in.
#[derive(Debug, Clone)]
pub(crate) struct Scope<'p> {
    pub(crate) file: FileId,
    pub(crate) unit: &'p CompilationUnit,
    /// Enclosing type declarations, outermost first.
    pub(crate) types: Vec<BindingId>,
    /// Type variables of enclosing methods.
    pub(crate) type_vars: Vec<BindingId>,
    pub(crate) method: Option<BindingId>,
    pub(crate) is_static: bool,
}

impl<'p> Scope<'p> {
    pub(crate) fn new(file: FileId, unit: &'p CompilationUnit, types: Vec<BindingId>) -> Self {
        Self {
            file,
            unit,
            types,
            type_vars: Vec::new(),
            method: None,
            is_static: false,
        }
    }

    pub(crate) fn current_type(&self) -> Option<BindingId> {
        self.types.last().copied()
    }
}

/// A type reference node and what it resolved to.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TypeRefNode {
    pub(crate) id: NodeId,
    pub(crate) range: TextRange,
    pub(crate) flags: NodeFlags,
    pub(crate) binding: Option<BindingId>,
}

#[derive(Debug, Clone, Copy)]
enum SimpleType {
    Var(BindingId),
    Type(BindingId),
}

pub(crate) fn base_type(prim: PrimitiveType) -> BaseType {
    match prim {
        PrimitiveType::Boolean => BaseType::Boolean,
        PrimitiveType::Byte => BaseType::Byte,
        PrimitiveType::Char => BaseType::Char,
        PrimitiveType::Short => BaseType::Short,
        PrimitiveType::Int => BaseType::Int,
        PrimitiveType::Long => BaseType::Long,
        PrimitiveType::Float => BaseType::Float,
        PrimitiveType::Double => BaseType::Double,
    }
}

impl<'p> Session<'p> {
    /// Resolves a type reference, recording every nested type reference node in `out`.
    ///
    /// With `recover`, unresolvable names become missing types instead of `None`.
    pub(crate) fn resolve_type(
        &mut self,
        scope: &Scope<'p>,
        ty: &TypeRef,
        recover: bool,
        out: &mut Vec<TypeRefNode>,
    ) -> Option<BindingId> {
        let binding = match &ty.kind {
            TypeRefKind::Primitive(prim) => Some(self.primitive(base_type(*prim))),
            TypeRefKind::Void => Some(self.void_type()),
            TypeRefKind::Named(segments) => self.resolve_named_type(scope, segments, recover, out),
            TypeRefKind::Array { element, dims } => self
                .resolve_type(scope, element, recover, out)
                .map(|element| self.array_of(element, *dims)),
            TypeRefKind::Wildcard { bound: None } => {
                Some(self.wildcard(WildcardKind::Unbounded, None))
            }
            TypeRefKind::Wildcard {
                bound: Some((kind, bound)),
            } => {
                let kind = match kind {
                    WildcardBoundKind::Extends => WildcardKind::Extends,
                    WildcardBoundKind::Super => WildcardKind::Super,
                };
                self.resolve_type(scope, bound, recover, out)
                    .map(|bound| self.wildcard(kind, Some(bound)))
            }
            TypeRefKind::Missing => None,
        };
        out.push(TypeRefNode {
            id: ty.id,
            range: ty.range,
            flags: ty.flags,
            binding,
        });
        binding
    }

    fn resolve_type_args(
        &mut self,
        scope: &Scope<'p>,
        args: &Option<Vec<TypeRef>>,
        recover: bool,
        out: &mut Vec<TypeRefNode>,
    ) -> Option<Option<Vec<BindingId>>> {
        let Some(args) = args else {
            return Some(None);
        };
        let mut resolved = Vec::with_capacity(args.len());
        for arg in args {
            resolved.push(self.resolve_type(scope, arg, recover, out));
        }
        resolved.into_iter().collect::<Option<Vec<_>>>().map(Some)
    }

    fn resolve_named_type(
        &mut self,
        scope: &Scope<'p>,
        segments: &[TypeRefSegment],
        recover: bool,
        out: &mut Vec<TypeRefNode>,
    ) -> Option<BindingId> {
        let (current, consumed) = match self.resolve_type_prefix(scope, segments) {
            Some(found) => found,
            None => {
                for segment in segments {
                    let _ = self.resolve_type_args(scope, &segment.args, recover, out);
                }
                if !recover {
                    return None;
                }
                let name = if let [single] = segments {
                    TypeName::in_package(&scope.unit.package_name(), single.name.as_str())
                } else {
                    let dotted = segments
                        .iter()
                        .map(|segment| segment.name.as_str())
                        .collect::<Vec<_>>()
                        .join(".");
                    TypeName::new(dotted)
                };
                return Some(self.missing_type(&name));
            }
        };

        // Type arguments of the segments that named a package are dropped.
        let mut current = match current {
            SimpleType::Var(var) => {
                let _ = self.resolve_type_args(scope, &segments[consumed - 1].args, recover, out);
                var
            }
            SimpleType::Type(decl) => {
                let args = self.resolve_type_args(scope, &segments[consumed - 1].args, recover, out)?;
                match args {
                    Some(args) => self.class_type(decl, None, Some(args)),
                    None => self.simple_reference(scope, decl),
                }
            }
        };

        for segment in &segments[consumed..] {
            let Some(outer) = self.generic_of(current) else {
                return recover.then(|| {
                    let name = TypeName::new(segment.name.as_str());
                    self.missing_type(&name)
                });
            };
            let Some(member) = self.find_member_type(outer, &segment.name) else {
                let _ = self.resolve_type_args(scope, &segment.args, recover, out);
                if !recover {
                    return None;
                }
                let name = match self.binary_name(outer) {
                    Some(outer) => outer.nested(segment.name.as_str()),
                    None => TypeName::new(segment.name.as_str()),
                };
                return Some(self.missing_type(&name));
            };
            let args = self.resolve_type_args(scope, &segment.args, recover, out)?;
            current = self.class_type(member, Some(current), args);
        }
        Some(current)
    }

    /// Finds the type named by the longest meaningful prefix of `segments`: a type variable or
    /// type in scope, or a type in a (possibly qualified) package. Returns how many segments
    /// were consumed.
    fn resolve_type_prefix(
        &mut self,
        scope: &Scope<'p>,
        segments: &[TypeRefSegment],
    ) -> Option<(SimpleType, usize)> {
        let first = segments.first()?;
        if let Some(found) = self.lookup_simple_type(scope, &first.name) {
            return Some((found, 1));
        }
        let names = segments
            .iter()
            .map(|segment| segment.name.clone())
            .collect::<Vec<_>>();
        self.resolve_package_prefix(&names)
            .map(|(decl, consumed)| (SimpleType::Type(decl), consumed))
    }

    /// `a.b.C`: grows the package prefix until a type is found in it.
    fn resolve_package_prefix(&mut self, names: &[Name]) -> Option<(BindingId, usize)> {
        for split in 1..names.len() {
            let package = PackageName::from_segments(names[..split].to_vec());
            let name = TypeName::in_package(&package, names[split].as_str());
            if let Some(decl) = self.lookup_type(&name) {
                return Some((decl, split + 1));
            }
        }
        None
    }

    /// Resolves a fully qualified (possibly nested) type name such as `java.util.Map.Entry`.
    pub(crate) fn resolve_qualified_type(&mut self, name: &QualifiedName) -> Option<BindingId> {
        let names = name.segments();
        let (mut current, consumed) = self.resolve_package_prefix(names)?;
        for segment in &names[consumed..] {
            current = self.find_member_type(current, segment)?;
        }
        Some(current)
    }

    /// A type named without type arguments from within `scope`.
    pub(crate) fn simple_reference(&mut self, scope: &Scope<'p>, decl: BindingId) -> BindingId {
        let (enclosing, is_static, is_generic) = match self.binding(decl) {
            Binding::Type(ty) => (ty.enclosing, ty.modifiers.is_static, ty.is_generic()),
            _ => return decl,
        };
        match enclosing {
            Some(outer) if !is_static && scope.types.contains(&outer) => {
                if is_generic {
                    self.class_type(decl, None, None)
                } else {
                    decl
                }
            }
            _ => self.plain_reference(decl),
        }
    }

    /// A type named by a simple name in an expression (`String` in `String.valueOf(x)`).
    pub(crate) fn lookup_type_name(&mut self, scope: &Scope<'p>, name: &Name) -> Option<BindingId> {
        match self.lookup_simple_type(scope, name)? {
            SimpleType::Type(decl) => Some(self.simple_reference(scope, decl)),
            SimpleType::Var(_) => None,
        }
    }

    fn lookup_simple_type(&mut self, scope: &Scope<'p>, name: &Name) -> Option<SimpleType> {
        if let Some(var) = self.find_type_var(&scope.type_vars, name) {
            return Some(SimpleType::Var(var));
        }
        let mut type_vars_visible = true;
        for &ty in scope.types.iter().rev() {
            if type_vars_visible {
                let params = self.type_params_of(ty);
                if let Some(var) = self.find_type_var(&params, name) {
                    return Some(SimpleType::Var(var));
                }
            }
            if let Some(member) = self.find_member_type(ty, name) {
                return Some(SimpleType::Type(member));
            }
            if self.is_static_type(ty) {
                type_vars_visible = false;
            }
        }
        self.lookup_unit_type(scope, name).map(SimpleType::Type)
    }

    fn find_type_var(&self, vars: &[BindingId], name: &Name) -> Option<BindingId> {
        vars.iter().rev().copied().find(|&var| {
            matches!(self.binding(var), Binding::TypeVariable(tv) if &tv.name == name)
        })
    }

    /// A member type named `name` declared in or inherited by the type declaration `ty`.
    pub(crate) fn find_member_type(&mut self, ty: BindingId, name: &Name) -> Option<BindingId> {
        let mut visited = HashSet::new();
        self.find_member_type_in(ty, name, &mut visited)
    }

    fn find_member_type_in(
        &mut self,
        ty: BindingId,
        name: &Name,
        visited: &mut HashSet<BindingId>,
    ) -> Option<BindingId> {
        let ty = self.generic_of(ty)?;
        if !visited.insert(ty) {
            return None;
        }
        let (binary, supers) = match self.binding(ty) {
            Binding::Type(decl) => {
                let mut supers = decl.superclass.into_iter().collect::<Vec<_>>();
                supers.extend(decl.interfaces.iter().copied());
                (decl.name.clone(), supers)
            }
            _ => return None,
        };
        let candidate = binary.nested(name.as_str());
        if self.decls.member_types(&binary).contains(&candidate) {
            return self.lookup_type(&candidate);
        }
        supers
            .into_iter()
            .find_map(|sup| self.find_member_type_in(sup, name, visited))
    }

    /// Types visible by simple name at the compilation-unit level.
    fn lookup_unit_type(&mut self, scope: &Scope<'p>, name: &Name) -> Option<BindingId> {
        let unit = scope.unit;
        let package = unit.package_name();
        if unit.types.iter().any(|decl| &decl.name == name) {
            return self.lookup_type(&TypeName::in_package(&package, name.as_str()));
        }

        for import in &unit.imports {
            match &import.kind {
                ImportKind::Single(path) if path.last() == Some(name) => {
                    if let Some(found) = self.resolve_qualified_type(path) {
                        return Some(found);
                    }
                }
                ImportKind::StaticSingle { ty, member } if member == name => {
                    if let Some(found) = self
                        .resolve_qualified_type(ty)
                        .and_then(|owner| self.find_member_type(owner, name))
                    {
                        return Some(found);
                    }
                }
                _ => {}
            }
        }

        if let Some(found) = self.lookup_type(&TypeName::in_package(&package, name.as_str())) {
            return Some(found);
        }

        for import in &unit.imports {
            let found = match &import.kind {
                ImportKind::OnDemand(path) => {
                    let package = PackageName::from_segments(path.segments().to_vec());
                    match self.lookup_type(&TypeName::in_package(&package, name.as_str())) {
                        Some(found) => Some(found),
                        None => self
                            .resolve_qualified_type(path)
                            .and_then(|owner| self.find_member_type(owner, name)),
                    }
                }
                ImportKind::StaticOnDemand(path) => self
                    .resolve_qualified_type(path)
                    .and_then(|owner| self.find_member_type(owner, name)),
                _ => None,
            };
            if found.is_some() {
                return found;
            }
        }

        let java_lang = PackageName::from_dotted("java.lang");
        self.lookup_type(&TypeName::in_package(&java_lang, name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use nova_core::FileId;
    use nova_hir::HirBuilder;

    use super::*;
    use crate::options::ResolveOptions;
    use crate::project::Project;

    #[test]
    fn imports_shadow_package_types_and_java_lang_is_implicit() {
        let mut b = HirBuilder::new(FileId::from_raw(0));
        let mut unit = b.unit(Some("p"));
        unit.imports.push(b.import_single("java.util.List"));
        unit.types.push(b.class("A"));
        let mut project = Project::with_minimal_jdk();
        project.set_unit(unit);

        let mut session = Session::new(&project, ResolveOptions::default());
        let unit = project.unit(FileId::from_raw(0)).unwrap();
        let a = session.lookup_type(&TypeName::new("p.A")).unwrap();
        let scope = Scope::new(unit.file, unit, vec![a]);

        let list = b.ty("List");
        let string = b.ty("String");
        let mut out = Vec::new();
        let list = session.resolve_type(&scope, &list, false, &mut out).unwrap();
        let string = session.resolve_type(&scope, &string, false, &mut out).unwrap();
        assert!(session.is_raw(list));
        assert_eq!(
            session.binary_name(list).map(TypeName::as_str),
            Some("java.util.List")
        );
        assert_eq!(session.binary_name(string).map(TypeName::as_str), Some("java.lang.String"));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn unresolved_names_recover_into_the_unit_package() {
        let mut b = HirBuilder::new(FileId::from_raw(0));
        let mut unit = b.unit(Some("p"));
        unit.types.push(b.class("A"));
        let mut project = Project::with_minimal_jdk();
        project.set_unit(unit);

        let mut session = Session::new(&project, ResolveOptions::default());
        let unit = project.unit(FileId::from_raw(0)).unwrap();
        let scope = Scope::new(unit.file, unit, Vec::new());
        let nope = b.ty("Nope");

        assert_eq!(session.resolve_type(&scope, &nope, false, &mut Vec::new()), None);
        let missing = session
            .resolve_type(&scope, &nope, true, &mut Vec::new())
            .unwrap();
        assert!(session.is_missing(missing));
        assert_eq!(session.binary_name(missing).map(TypeName::as_str), Some("p.Nope"));
    }
}
