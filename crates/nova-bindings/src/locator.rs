//! Mapping bindings back to the declarations they came from.
//!
//! An [`Element`] names a declaration independently of any session: a source or dependency
//! type, a member by owner and erased descriptor, a type parameter, or a local by its
//! declaring member and range. Elements are always checked against the project a session
//! borrows, so a handle to a declaration that no longer exists locates nothing.

use nova_core::{FileId, Name, PackageName, TextRange, TypeName};

use crate::binding::{Binding, BindingId, TypeOrigin};
use crate::options::ResolveOptions;
use crate::project::Project;
use crate::session::Session;

const CONSTRUCTOR_NAME: &str = "<init>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementOrigin {
    Source(FileId),
    Dependency,
}

/// A handle to a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Element {
    Package {
        name: PackageName,
    },
    Type {
        name: TypeName,
        origin: ElementOrigin,
    },
    /// Constructors are named `<init>`.
    Method {
        owner: TypeName,
        name: Name,
        /// Erased JVM descriptor, e.g. `(Ljava/lang/Object;)Ljava/util/List;`.
        descriptor: String,
        origin: ElementOrigin,
    },
    Field {
        owner: TypeName,
        name: Name,
        origin: ElementOrigin,
    },
    TypeParameter {
        owner: Box<Element>,
        name: Name,
    },
    /// A parameter or local variable.
    Local {
        member: Box<Element>,
        name: Name,
        range: TextRange,
    },
}

/// Locates the declaration a binding key denotes in the current `project`.
pub fn locate_key(project: &Project, key: &str) -> Option<Element> {
    let mut session = Session::new(project, ResolveOptions::default());
    let binding = session.resolve_key(key)?;
    session.locate(binding)
}

impl<'p> Session<'p> {
    /// The declaration `binding` came from. Parameterized, raw and instantiated bindings locate
    /// their generic declaration; fabricated bindings (missing types, captures, wildcards,
    /// primitives, arrays, annotation instances) locate nothing.
    pub fn locate(&mut self, binding: BindingId) -> Option<Element> {
        let binding = self.declaration(binding);
        match self.binding(binding).clone() {
            Binding::Package(package) => self
                .decls
                .has_package(&package.name)
                .then_some(Element::Package { name: package.name }),
            Binding::Type(_) => {
                let (name, origin) = self.type_element(binding)?;
                Some(Element::Type { name, origin })
            }
            Binding::Method(method) => {
                let (owner, origin) = self.type_element(method.declaring)?;
                let name = if method.is_constructor {
                    Name::from(CONSTRUCTOR_NAME)
                } else {
                    method.name.clone()
                };
                let descriptor = self.erased_descriptor(&method.params, method.ret);
                Some(Element::Method {
                    owner,
                    name,
                    descriptor,
                    origin,
                })
            }
            Binding::Variable(var) if var.local.is_some() => {
                let member = self.locate(var.declaring)?;
                let range = var.local?.range;
                Some(Element::Local {
                    member: Box::new(member),
                    name: var.name,
                    range,
                })
            }
            Binding::Variable(var) => {
                let (owner, origin) = self.type_element(var.declaring)?;
                Some(Element::Field {
                    owner,
                    name: var.name,
                    origin,
                })
            }
            Binding::TypeVariable(var) => {
                let owner = self.locate(var.owner)?;
                Some(Element::TypeParameter {
                    owner: Box::new(owner),
                    name: var.name,
                })
            }
            Binding::Primitive(_)
            | Binding::Null
            | Binding::Void
            | Binding::Array(_)
            | Binding::Wildcard(_)
            | Binding::Parameterized(_)
            | Binding::Raw(_)
            | Binding::Capture(_)
            | Binding::Annotation(_) => None,
        }
    }

    /// Bindings for declaration handles, one entry per handle in order. Handles to
    /// declarations missing from the project yield `None`.
    pub fn create_bindings(&mut self, elements: &[Element]) -> Vec<Option<BindingId>> {
        elements
            .iter()
            .map(|element| self.create_binding(element))
            .collect()
    }

    fn create_binding(&mut self, element: &Element) -> Option<BindingId> {
        match element {
            Element::Package { name } => self.lookup_package(name),
            Element::Type { name, origin } => self.located_type(name, *origin),
            Element::Method {
                owner,
                name,
                descriptor,
                origin,
            } => {
                let owner = self.located_type(owner, *origin)?;
                self.declared_methods(owner).into_iter().find(|&method| {
                    let Some(m) = self.binding(method).as_method() else {
                        return false;
                    };
                    let matches_name = if m.is_constructor {
                        name.as_str() == CONSTRUCTOR_NAME
                    } else {
                        &m.name == name
                    };
                    if !matches_name {
                        return false;
                    }
                    let (params, ret) = (m.params.clone(), m.ret);
                    self.erased_descriptor(&params, ret) == *descriptor
                })
            }
            Element::Field {
                owner,
                name,
                origin,
            } => {
                let owner = self.located_type(owner, *origin)?;
                self.declared_fields(owner).into_iter().find(|&field| {
                    matches!(self.binding(field), Binding::Variable(v) if &v.name == name)
                })
            }
            Element::TypeParameter { owner, name } => {
                let owner = self.create_binding(owner)?;
                self.type_parameters(owner).into_iter().find(|&var| {
                    matches!(self.binding(var), Binding::TypeVariable(tv) if &tv.name == name)
                })
            }
            Element::Local {
                member,
                name,
                range,
            } => {
                let member = self.create_binding(member)?;
                self.ensure_locals(member);
                let locals = self.member_locals.get(&member)?;
                locals.iter().copied().find(|&local| {
                    matches!(self.binding(local), Binding::Variable(v)
                        if &v.name == name && v.local.is_some_and(|l| l.range == *range))
                })
            }
        }
    }

    /// The binary name and origin of a declared type, if the current project still declares it.
    fn type_element(&self, ty: BindingId) -> Option<(TypeName, ElementOrigin)> {
        let Binding::Type(decl) = self.binding(ty) else {
            return None;
        };
        let origin = match decl.origin {
            TypeOrigin::Source { file } => ElementOrigin::Source(file),
            TypeOrigin::Dependency => ElementOrigin::Dependency,
            TypeOrigin::Missing => return None,
        };
        self.declares(&decl.name, origin)
            .then(|| (decl.name.clone(), origin))
    }

    fn located_type(&mut self, name: &TypeName, origin: ElementOrigin) -> Option<BindingId> {
        if !self.declares(name, origin) {
            tracing::trace!(%name, ?origin, "element no longer declared");
            return None;
        }
        self.lookup_type(name)
    }

    fn declares(&self, name: &TypeName, origin: ElementOrigin) -> bool {
        let source = self.decls.source(name);
        match origin {
            ElementOrigin::Source(file) => source.is_some_and(|source| source.file == file),
            ElementOrigin::Dependency => {
                source.is_none()
                    && self
                        .project()
                        .classes()
                        .lookup_class(&name.to_internal())
                        .is_some()
            }
        }
    }

    fn erased_descriptor(&mut self, params: &[BindingId], ret: BindingId) -> String {
        let mut out = String::from("(");
        for &param in params {
            self.write_descriptor(param, &mut out);
        }
        out.push(')');
        self.write_descriptor(ret, &mut out);
        out
    }

    fn write_descriptor(&mut self, ty: BindingId, out: &mut String) {
        let erased = self.erasure(ty);
        match self.binding(erased) {
            Binding::Primitive(base) => out.push(base.descriptor_char()),
            Binding::Void => out.push('V'),
            Binding::Array(array) => {
                let array = *array;
                for _ in 0..array.dims {
                    out.push('[');
                }
                self.write_descriptor(array.element, out);
            }
            Binding::Type(decl) => {
                out.push('L');
                out.push_str(&decl.name.to_internal());
                out.push(';');
            }
            _ => out.push_str("Ljava/lang/Object;"),
        }
    }
}

#[cfg(test)]
mod tests {
    use nova_classfile::BaseType;
    use nova_hir::HirBuilder;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn dependency_methods_locate_by_erased_descriptor() {
        let project = Project::with_minimal_jdk();
        let mut session = Session::new(&project, ResolveOptions::default());
        let collections = session
            .lookup_type(&TypeName::new("java.util.Collections"))
            .unwrap();
        let singleton = session.find_methods(collections, &Name::from("singletonList"))[0];
        let string = session.string();
        let instance = session.instantiate(singleton, vec![string]).unwrap();

        let expected = Element::Method {
            owner: TypeName::new("java.util.Collections"),
            name: Name::from("singletonList"),
            descriptor: "(Ljava/lang/Object;)Ljava/util/List;".to_string(),
            origin: ElementOrigin::Dependency,
        };
        assert_eq!(session.locate(instance), Some(expected.clone()));
        assert_eq!(session.locate(singleton), Some(expected.clone()));
        assert_eq!(session.create_bindings(&[expected]), vec![Some(singleton)]);
    }

    #[test]
    fn fabricated_bindings_locate_nothing() {
        let project = Project::with_minimal_jdk();
        let mut session = Session::new(&project, ResolveOptions::default());
        let int = session.primitive(BaseType::Int);
        let array = session.array_of(int, 2);
        let missing = session.missing_type(&TypeName::new("p.Nope"));
        assert_eq!(session.locate(int), None);
        assert_eq!(session.locate(array), None);
        assert_eq!(session.locate(missing), None);
    }

    #[test]
    fn source_types_and_constructors_round_trip() {
        let mut b = HirBuilder::new(FileId::from_raw(3));
        let mut unit = b.unit(Some("p"));
        let t = b.type_param("T", Vec::new());
        let mut class = b.class("A");
        class.type_params.push(t);
        unit.types.push(class);
        let mut project = Project::with_minimal_jdk();
        project.set_unit(unit);

        let mut session = Session::new(&project, ResolveOptions::default());
        let a = session.lookup_type(&TypeName::new("p.A")).unwrap();
        let ctor = session.constructors(a)[0];
        let var = session.type_parameters(a)[0];
        let raw = session.raw_type(a).unwrap();

        let ty = Element::Type {
            name: TypeName::new("p.A"),
            origin: ElementOrigin::Source(FileId::from_raw(3)),
        };
        assert_eq!(session.locate(raw), Some(ty.clone()));
        assert_eq!(
            session.locate(ctor),
            Some(Element::Method {
                owner: TypeName::new("p.A"),
                name: Name::from("<init>"),
                descriptor: "()V".to_string(),
                origin: ElementOrigin::Source(FileId::from_raw(3)),
            })
        );
        let param = Element::TypeParameter {
            owner: Box::new(ty.clone()),
            name: Name::from("T"),
        };
        assert_eq!(session.locate(var), Some(param.clone()));

        let stale = Element::Type {
            name: TypeName::new("p.A"),
            origin: ElementOrigin::Dependency,
        };
        assert_eq!(
            session.create_bindings(&[ty, param, stale]),
            vec![Some(a), Some(var), None]
        );
    }
}
