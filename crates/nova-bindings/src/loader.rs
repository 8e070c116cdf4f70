//! Creates named type bindings and their members from source declarations and dependency stubs.
//!
//! Headers (type parameters and super types) are loaded as soon as a type binding is created;
//! members are loaded on first request.

use nova_classfile::{
    ClassStub, ClassTypeSignature, FieldType, ReturnType, TypeArgument, TypeParameter,
    TypeSignature, ACC_ABSTRACT, ACC_FINAL, ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC, ACC_STATIC,
};
use nova_core::{Name, TypeName};
use nova_hir::{MethodDecl, Modifiers, TypeKind, TypeParamDecl, TypeRef};

use crate::binding::{
    Binding, BindingId, ConstantState, Members, MemberOrigin, MethodBinding, TypeBinding,
    TypeOrigin, TypeVariableBinding, VariableBinding, VariableKind, WildcardKind,
};
use crate::decl_table::{DeclRef, SourceType};
use crate::resolver::scope::Scope;
use crate::session::{FieldSource, Session};

pub(crate) fn modifiers_from_flags(flags: u16) -> Modifiers {
    Modifiers {
        is_public: flags & ACC_PUBLIC != 0,
        is_private: flags & ACC_PRIVATE != 0,
        is_protected: flags & ACC_PROTECTED != 0,
        is_static: flags & ACC_STATIC != 0,
        is_final: flags & ACC_FINAL != 0,
        is_abstract: flags & ACC_ABSTRACT != 0,
    }
}

fn stub_kind(stub: &ClassStub) -> TypeKind {
    if stub.is_annotation() {
        TypeKind::Annotation
    } else if stub.is_enum() {
        TypeKind::Enum
    } else if stub.is_interface() {
        TypeKind::Interface
    } else {
        TypeKind::Class
    }
}

impl<'p> Session<'p> {
    /// The binding of the type with binary name `name`, declared in source or in a dependency.
    pub fn lookup_type(&mut self, name: &TypeName) -> Option<BindingId> {
        if let Some(&id) = self.interner.types.get(name) {
            return Some(id);
        }
        let decl = self.decls.lookup(name)?;
        let enclosing = match name.enclosing() {
            Some(outer) => Some(self.lookup_type(&outer)?),
            None => None,
        };
        // Loading the enclosing header may already have created this type.
        if let Some(&id) = self.interner.types.get(name) {
            return Some(id);
        }
        Some(self.create_type(name, decl, enclosing))
    }

    /// A fabricated type standing in for an unresolvable reference.
    pub(crate) fn missing_type(&mut self, name: &TypeName) -> BindingId {
        if let Some(&id) = self.interner.missing.get(name) {
            return id;
        }
        tracing::trace!(%name, "fabricating missing type");
        let id = self.interner.alloc(Binding::Type(TypeBinding {
            name: name.clone(),
            kind: TypeKind::Class,
            modifiers: Modifiers::none(),
            enclosing: None,
            origin: TypeOrigin::Missing,
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            members: Some(Members::default()),
        }));
        self.interner.missing.insert(name.clone(), id);
        id
    }

    fn create_type(
        &mut self,
        name: &TypeName,
        decl: DeclRef<'p>,
        enclosing: Option<BindingId>,
    ) -> BindingId {
        let (kind, mut modifiers, origin) = match decl {
            DeclRef::Source(source) => (
                source.decl.kind,
                source.decl.modifiers,
                TypeOrigin::Source { file: source.file },
            ),
            DeclRef::Dependency(stub) => (
                stub_kind(stub),
                modifiers_from_flags(stub.access_flags),
                TypeOrigin::Dependency,
            ),
        };
        if let Some(outer) = enclosing {
            let outer_is_interface = matches!(
                self.binding(outer),
                Binding::Type(ty) if ty.is_interface()
            );
            if kind != TypeKind::Class || outer_is_interface {
                modifiers.is_static = true;
            }
        }
        let id = self.interner.alloc(Binding::Type(TypeBinding {
            name: name.clone(),
            kind,
            modifiers,
            enclosing,
            origin,
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            members: None,
        }));
        self.interner.types.insert(name.clone(), id);
        match decl {
            DeclRef::Source(source) => self.load_source_header(id, source),
            DeclRef::Dependency(stub) => self.load_stub_header(id, stub),
        }
        id
    }

    fn type_mut(&mut self, id: BindingId) -> Option<&mut TypeBinding> {
        match self.interner.get_mut(id) {
            Binding::Type(ty) => Some(ty),
            _ => None,
        }
    }

    /// Enclosing type declarations of `ty`, outermost first, ending with `ty` itself.
    pub(crate) fn enclosing_chain(&self, ty: BindingId) -> Vec<BindingId> {
        let mut chain = vec![ty];
        let mut current = ty;
        while let Binding::Type(TypeBinding {
            enclosing: Some(outer),
            ..
        }) = self.binding(current)
        {
            chain.push(*outer);
            current = *outer;
        }
        chain.reverse();
        chain
    }

    /// Type variables of enclosing types visible inside a (non-static) member type.
    pub(crate) fn outer_type_vars(&self, ty: BindingId) -> Vec<BindingId> {
        let mut vars = Vec::new();
        let mut current = ty;
        loop {
            let (outer, is_static) = match self.binding(current) {
                Binding::Type(decl) => (decl.enclosing, decl.modifiers.is_static),
                _ => break,
            };
            let Some(outer) = outer else { break };
            if is_static {
                break;
            }
            vars.extend(self.type_params_of(outer));
            current = outer;
        }
        vars
    }

    /// The scope of a source type's body.
    pub(crate) fn type_scope(&self, ty: BindingId) -> Option<Scope<'p>> {
        let name = match self.binding(ty) {
            Binding::Type(decl) if decl.is_from_source() => decl.name.clone(),
            _ => return None,
        };
        let source = self.decls.source(&name)?;
        Some(Scope::new(source.file, source.unit, self.enclosing_chain(ty)))
    }

    fn load_source_header(&mut self, id: BindingId, source: SourceType<'p>) {
        let decl = source.decl;
        let scope = Scope::new(source.file, source.unit, self.enclosing_chain(id));
        self.declare_source_type_params(id, &decl.type_params, &scope);

        let superclass = match decl.kind {
            TypeKind::Class => match &decl.extends {
                Some(ty) => Some(self.resolve_signature_type(&scope, ty)),
                None if self.is_object(id) => None,
                None => Some(self.object()),
            },
            TypeKind::Enum => {
                let enum_ty = self.type_or_missing("java.lang.Enum");
                Some(self.class_type(enum_ty, None, Some(vec![id])))
            }
            TypeKind::Interface | TypeKind::Annotation => None,
        };
        let mut interfaces = decl
            .implements
            .iter()
            .map(|ty| self.resolve_signature_type(&scope, ty))
            .collect::<Vec<_>>();
        if decl.kind == TypeKind::Annotation {
            interfaces.push(self.type_or_missing("java.lang.annotation.Annotation"));
        }
        if let Some(ty) = self.type_mut(id) {
            ty.superclass = superclass;
            ty.interfaces = interfaces;
        }
    }

    fn load_stub_header(&mut self, id: BindingId, stub: &'p ClassStub) {
        let is_interface = stub.is_interface();
        let (superclass, interfaces) = match &stub.signature {
            Some(sig) => {
                let outer = self.outer_type_vars(id);
                let mut vars = self.declare_stub_type_params(id, &sig.type_parameters, &outer);
                vars.extend(outer);
                let superclass = if is_interface || stub.super_class.is_none() {
                    None
                } else {
                    Some(self.class_from_signature(&sig.super_class, &vars))
                };
                let interfaces = sig
                    .interfaces
                    .iter()
                    .map(|iface| self.class_from_signature(iface, &vars))
                    .collect();
                (superclass, interfaces)
            }
            None => {
                let superclass = match (&stub.super_class, is_interface) {
                    (Some(name), false) => Some(self.type_from_internal(name)),
                    _ => None,
                };
                let interfaces = stub
                    .interfaces
                    .iter()
                    .map(|name| self.type_from_internal(name))
                    .collect();
                (superclass, interfaces)
            }
        };
        if let Some(ty) = self.type_mut(id) {
            ty.superclass = superclass;
            ty.interfaces = interfaces;
        }
    }

    fn set_type_params(&mut self, owner: BindingId, vars: Vec<BindingId>) {
        match self.interner.get_mut(owner) {
            Binding::Type(ty) => ty.type_params = vars,
            Binding::Method(method) => method.type_params = vars,
            _ => {}
        }
    }

    fn set_bounds(&mut self, var: BindingId, bounds: Vec<BindingId>) {
        if let Binding::TypeVariable(tv) = self.interner.get_mut(var) {
            tv.bounds = bounds;
        }
    }

    fn alloc_type_vars<'n>(
        &mut self,
        owner: BindingId,
        names: impl Iterator<Item = &'n str>,
    ) -> Vec<BindingId> {
        let vars = names
            .enumerate()
            .map(|(rank, name)| {
                self.interner
                    .alloc(Binding::TypeVariable(TypeVariableBinding {
                        owner,
                        name: Name::from(name),
                        rank: rank as u32,
                        bounds: Vec::new(),
                    }))
            })
            .collect::<Vec<_>>();
        self.set_type_params(owner, vars.clone());
        vars
    }

    /// Declares source type parameters in two passes so bounds can refer to any parameter of
    /// the same owner (`T extends Comparable<T>`).
    pub(crate) fn declare_source_type_params(
        &mut self,
        owner: BindingId,
        params: &[TypeParamDecl],
        scope: &Scope<'p>,
    ) -> Vec<BindingId> {
        let vars = self.alloc_type_vars(owner, params.iter().map(|tp| tp.name.as_str()));
        let mut scope = scope.clone();
        scope.type_vars.extend(vars.iter().copied());
        for (tp, &var) in params.iter().zip(&vars) {
            let mut bounds = tp
                .bounds
                .iter()
                .map(|bound| self.resolve_signature_type(&scope, bound))
                .collect::<Vec<_>>();
            if bounds.is_empty() {
                bounds.push(self.object());
            }
            self.set_bounds(var, bounds);
        }
        vars
    }

    fn declare_stub_type_params(
        &mut self,
        owner: BindingId,
        params: &[TypeParameter],
        outer: &[BindingId],
    ) -> Vec<BindingId> {
        let vars = self.alloc_type_vars(owner, params.iter().map(|tp| tp.name.as_str()));
        let mut context = vars.clone();
        context.extend(outer.iter().copied());
        for (tp, &var) in params.iter().zip(&vars) {
            let mut bounds = tp
                .bounds()
                .map(|bound| self.type_from_signature(bound, &context))
                .collect::<Vec<_>>();
            if bounds.is_empty() {
                bounds.push(self.object());
            }
            self.set_bounds(var, bounds);
        }
        vars
    }

    /// Resolves a type in a declaration signature; unresolvable names become missing types.
    pub(crate) fn resolve_signature_type(&mut self, scope: &Scope<'p>, ty: &TypeRef) -> BindingId {
        match self.resolve_type(scope, ty, true, &mut Vec::new()) {
            Some(id) => id,
            None => self.object(),
        }
    }

    pub(crate) fn type_from_signature(&mut self, sig: &TypeSignature, vars: &[BindingId]) -> BindingId {
        match sig {
            TypeSignature::Base(base) => self.primitive(*base),
            TypeSignature::Array(element) => {
                let element = self.type_from_signature(element, vars);
                self.array_of(element, 1)
            }
            TypeSignature::TypeVariable(name) => {
                let found = vars.iter().copied().find(|&var| {
                    matches!(self.binding(var), Binding::TypeVariable(tv) if tv.name == name.as_str())
                });
                match found {
                    Some(var) => var,
                    None => self.object(),
                }
            }
            TypeSignature::Class(class) => self.class_from_signature(class, vars),
        }
    }

    fn type_argument(&mut self, arg: &TypeArgument, vars: &[BindingId]) -> BindingId {
        match arg {
            TypeArgument::Any => self.wildcard(WildcardKind::Unbounded, None),
            TypeArgument::Exact(ty) => self.type_from_signature(ty, vars),
            TypeArgument::Extends(ty) => {
                let bound = self.type_from_signature(ty, vars);
                self.wildcard(WildcardKind::Extends, Some(bound))
            }
            TypeArgument::Super(ty) => {
                let bound = self.type_from_signature(ty, vars);
                self.wildcard(WildcardKind::Super, Some(bound))
            }
        }
    }

    pub(crate) fn class_from_signature(
        &mut self,
        sig: &ClassTypeSignature,
        vars: &[BindingId],
    ) -> BindingId {
        let Some((first, rest)) = sig.segments.split_first() else {
            return self.object();
        };
        let mut internal = sig.package.join("/");
        if !internal.is_empty() {
            internal.push('/');
        }
        internal.push_str(&first.name);
        let name = TypeName::from_internal(&internal);
        let Some(decl) = self.lookup_type(&name) else {
            return self.missing_type(&name);
        };
        let args = first
            .type_arguments
            .iter()
            .map(|arg| self.type_argument(arg, vars))
            .collect::<Vec<_>>();
        let mut current = if args.is_empty() {
            self.plain_reference(decl)
        } else {
            self.class_type(decl, None, Some(args))
        };
        let mut current_name = name;
        for segment in rest {
            current_name = current_name.nested(&segment.name);
            let Some(member) = self.lookup_type(&current_name) else {
                return self.missing_type(&current_name);
            };
            let args = segment
                .type_arguments
                .iter()
                .map(|arg| self.type_argument(arg, vars))
                .collect::<Vec<_>>();
            let args = (!args.is_empty()).then_some(args);
            current = self.class_type(member, Some(current), args);
        }
        current
    }

    pub(crate) fn type_from_internal(&mut self, internal: &str) -> BindingId {
        let name = TypeName::from_internal(internal);
        match self.lookup_type(&name) {
            Some(decl) => self.plain_reference(decl),
            None => self.missing_type(&name),
        }
    }

    pub(crate) fn type_from_descriptor(&mut self, desc: &FieldType) -> BindingId {
        match desc {
            FieldType::Base(base) => self.primitive(*base),
            FieldType::Object(internal) => self.type_from_internal(internal),
            FieldType::Array(element) => {
                let element = self.type_from_descriptor(element);
                self.array_of(element, 1)
            }
        }
    }

    fn return_from_descriptor(&mut self, desc: &ReturnType) -> BindingId {
        match desc {
            ReturnType::Void => self.void_type(),
            ReturnType::Type(ty) => self.type_from_descriptor(ty),
        }
    }

    /// Members declared directly in a named type, loading them on first use.
    pub(crate) fn members(&mut self, ty: BindingId) -> Members {
        let (name, origin) = match self.binding(ty) {
            Binding::Type(decl) => {
                if let Some(members) = &decl.members {
                    return members.clone();
                }
                (decl.name.clone(), decl.origin.clone())
            }
            _ => return Members::default(),
        };
        if !self.loading_members.insert(ty) {
            return Members::default();
        }
        let _span = tracing::trace_span!("load_members", %name).entered();
        let members = match (origin, self.decls.lookup(&name)) {
            (TypeOrigin::Source { .. }, Some(DeclRef::Source(source))) => {
                self.load_source_members(ty, source)
            }
            (TypeOrigin::Dependency, Some(DeclRef::Dependency(stub))) => {
                self.load_stub_members(ty, stub)
            }
            _ => Members::default(),
        };
        self.loading_members.remove(&ty);
        if let Some(decl) = self.type_mut(ty) {
            decl.members = Some(members.clone());
        }
        self.load_annotation_defaults(&members.methods);
        members
    }

    fn member_type_bindings(&mut self, name: &TypeName) -> Vec<BindingId> {
        self.decls
            .member_types(name)
            .iter()
            .filter_map(|member| self.lookup_type(member))
            .collect()
    }

    fn load_source_members(&mut self, ty: BindingId, source: SourceType<'p>) -> Members {
        let decl = source.decl;
        let scope = Scope::new(source.file, source.unit, self.enclosing_chain(ty));
        let in_interface = matches!(decl.kind, TypeKind::Interface | TypeKind::Annotation);
        let mut members = Members::default();

        for constant in &decl.enum_constants {
            let var = self.interner.alloc_with(|id| {
                Binding::Variable(VariableBinding {
                    kind: VariableKind::EnumConstant,
                    declaring: ty,
                    name: constant.name.clone(),
                    ty,
                    modifiers: Modifiers {
                        is_public: true,
                        ..Modifiers::static_final()
                    },
                    constant: None,
                    declaration: id,
                    local: None,
                    origin: MemberOrigin::Source {
                        file: source.file,
                        node: Some(constant.id),
                    },
                    constant_state: ConstantState::Done,
                })
            });
            self.field_decls
                .insert(var, (source, FieldSource::EnumConstant(constant)));
            members.fields.push(var);
        }

        for field in &decl.fields {
            let field_ty = self.resolve_signature_type(&scope, &field.ty);
            let mut modifiers = field.modifiers;
            if in_interface {
                modifiers.is_public = true;
                modifiers.is_static = true;
                modifiers.is_final = true;
            }
            let constant_state = if modifiers.is_final && field.initializer.is_some() {
                ConstantState::Pending
            } else {
                ConstantState::Done
            };
            let var = self.interner.alloc_with(|id| {
                Binding::Variable(VariableBinding {
                    kind: VariableKind::Field,
                    declaring: ty,
                    name: field.name.clone(),
                    ty: field_ty,
                    modifiers,
                    constant: None,
                    declaration: id,
                    local: None,
                    origin: MemberOrigin::Source {
                        file: source.file,
                        node: Some(field.id),
                    },
                    constant_state,
                })
            });
            self.field_decls.insert(var, (source, FieldSource::Field(field)));
            members.fields.push(var);
        }

        for method in &decl.methods {
            let id = self.declare_source_method(ty, &scope, source, method, in_interface);
            members.methods.push(id);
        }

        let has_constructor = decl.methods.iter().any(MethodDecl::is_constructor);
        if matches!(decl.kind, TypeKind::Class | TypeKind::Enum) && !has_constructor {
            let modifiers = if decl.kind == TypeKind::Enum {
                Modifiers {
                    is_private: true,
                    ..Modifiers::none()
                }
            } else {
                Modifiers {
                    is_public: decl.modifiers.is_public,
                    ..Modifiers::none()
                }
            };
            let ctor = self.implicit_method(ty, source, decl.name.clone(), Vec::new(), None, modifiers);
            if let Binding::Method(method) = self.interner.get_mut(ctor) {
                method.is_constructor = true;
                method.is_default_constructor = true;
            }
            members.methods.push(ctor);
        }

        if decl.kind == TypeKind::Enum {
            let statics = Modifiers {
                is_public: true,
                ..Modifiers::static_()
            };
            let values_ret = self.array_of(ty, 1);
            let values = self.implicit_method(ty, source, Name::from("values"), Vec::new(), Some(values_ret), statics);
            let string = self.string();
            let value_of = self.implicit_method(ty, source, Name::from("valueOf"), vec![string], Some(ty), statics);
            members.methods.push(values);
            members.methods.push(value_of);
        }

        if let Some(name) = self.binary_name(ty).cloned() {
            members.types = self.member_type_bindings(&name);
        }
        members
    }

    fn implicit_method(
        &mut self,
        ty: BindingId,
        source: SourceType<'p>,
        name: Name,
        params: Vec<BindingId>,
        ret: Option<BindingId>,
        modifiers: Modifiers,
    ) -> BindingId {
        let ret = match ret {
            Some(ret) => ret,
            None => self.void_type(),
        };
        self.interner.alloc_with(|id| {
            Binding::Method(MethodBinding {
                declaring: ty,
                name,
                params,
                ret,
                type_params: Vec::new(),
                type_args: Vec::new(),
                modifiers,
                is_varargs: false,
                is_constructor: false,
                is_default_constructor: false,
                declaration: id,
                instance_of: None,
                origin: MemberOrigin::Source {
                    file: source.file,
                    node: None,
                },
                default_value: None,
            })
        })
    }

    fn declare_source_method(
        &mut self,
        ty: BindingId,
        scope: &Scope<'p>,
        source: SourceType<'p>,
        method: &'p MethodDecl,
        in_interface: bool,
    ) -> BindingId {
        let is_constructor = method.is_constructor();
        let name = if is_constructor {
            Name::from(source.decl.name.as_str())
        } else {
            method.name.clone()
        };
        let mut modifiers = method.modifiers;
        if in_interface {
            modifiers.is_public = true;
            if method.body.is_none() && !modifiers.is_static {
                modifiers.is_abstract = true;
            }
        }
        let void = self.void_type();
        let id = self.interner.alloc_with(|id| {
            Binding::Method(MethodBinding {
                declaring: ty,
                name,
                params: Vec::new(),
                ret: void,
                type_params: Vec::new(),
                type_args: Vec::new(),
                modifiers,
                is_varargs: method.is_varargs(),
                is_constructor,
                is_default_constructor: false,
                declaration: id,
                instance_of: None,
                origin: MemberOrigin::Source {
                    file: source.file,
                    node: Some(method.id),
                },
                default_value: None,
            })
        });
        let vars = self.declare_source_type_params(id, &method.type_params, scope);
        let mut scope = scope.clone();
        scope.type_vars.extend(vars);
        scope.method = Some(id);

        let params = method
            .params
            .iter()
            .map(|param| {
                let ty = self.resolve_signature_type(&scope, &param.ty);
                if param.is_varargs {
                    self.array_of(ty, 1)
                } else {
                    ty
                }
            })
            .collect::<Vec<_>>();
        let ret = match &method.return_type {
            Some(ret) => self.resolve_signature_type(&scope, ret),
            None => void,
        };
        if let Binding::Method(binding) = self.interner.get_mut(id) {
            binding.params = params;
            binding.ret = ret;
        }
        self.method_decls.insert(id, (source, method));
        id
    }

    fn load_stub_members(&mut self, ty: BindingId, stub: &'p ClassStub) -> Members {
        let mut vars = self.type_params_of(ty);
        vars.extend(self.outer_type_vars(ty));
        let simple_name = match self.binding(ty) {
            Binding::Type(decl) => Name::from(decl.name.simple_name()),
            _ => Name::from(""),
        };
        let mut members = Members::default();

        for field in &stub.fields {
            let field_ty = match &field.signature {
                Some(sig) => self.type_from_signature(sig, &vars),
                None => self.type_from_descriptor(&field.parsed_descriptor),
            };
            let kind = if field.is_enum_constant() {
                VariableKind::EnumConstant
            } else {
                VariableKind::Field
            };
            let constant = if kind == VariableKind::Field {
                field.constant_value.clone()
            } else {
                None
            };
            let var = self.interner.alloc_with(|id| {
                Binding::Variable(VariableBinding {
                    kind,
                    declaring: ty,
                    name: Name::from(field.name.as_str()),
                    ty: field_ty,
                    modifiers: modifiers_from_flags(field.access_flags),
                    constant,
                    declaration: id,
                    local: None,
                    origin: MemberOrigin::Dependency,
                    constant_state: ConstantState::Done,
                })
            });
            self.field_stubs.insert(var, field);
            members.fields.push(var);
        }

        for method in &stub.methods {
            if method.name == "<clinit>" {
                continue;
            }
            let is_constructor = method.is_constructor();
            let name = if is_constructor {
                simple_name.clone()
            } else {
                Name::from(method.name.as_str())
            };
            let void = self.void_type();
            let id = self.interner.alloc_with(|id| {
                Binding::Method(MethodBinding {
                    declaring: ty,
                    name,
                    params: Vec::new(),
                    ret: void,
                    type_params: Vec::new(),
                    type_args: Vec::new(),
                    modifiers: modifiers_from_flags(method.access_flags),
                    is_varargs: method.is_varargs(),
                    is_constructor,
                    is_default_constructor: false,
                    declaration: id,
                    instance_of: None,
                    origin: MemberOrigin::Dependency,
                    default_value: None,
                })
            });
            let (params, ret) = match &method.signature {
                Some(sig) => {
                    let mut context = self.declare_stub_type_params(id, &sig.type_parameters, &vars);
                    context.extend(vars.iter().copied());
                    let params = sig
                        .parameters
                        .iter()
                        .map(|param| self.type_from_signature(param, &context))
                        .collect::<Vec<_>>();
                    let ret = match &sig.return_type {
                        Some(ret) => self.type_from_signature(ret, &context),
                        None => void,
                    };
                    (params, ret)
                }
                None => {
                    let params = method
                        .parsed_descriptor
                        .params
                        .iter()
                        .map(|param| self.type_from_descriptor(param))
                        .collect::<Vec<_>>();
                    let ret = self.return_from_descriptor(&method.parsed_descriptor.return_type);
                    (params, ret)
                }
            };
            let default_value = method
                .annotation_default
                .as_ref()
                .and_then(|value| self.annotation_value_from_element(id, value));
            if let Binding::Method(binding) = self.interner.get_mut(id) {
                binding.params = params;
                binding.ret = ret;
                binding.default_value = default_value;
            }
            self.method_stubs.insert(id, method);
            members.methods.push(id);
        }

        let name = TypeName::from_internal(&stub.internal_name);
        members.types = self.member_type_bindings(&name);
        members
    }

    /// Methods declared in `ty`; for parameterized and raw types, the generic declaration's
    /// methods viewed through the type arguments.
    pub fn declared_methods(&mut self, ty: BindingId) -> Vec<BindingId> {
        self.declared_members(ty, |members| members.methods)
    }

    pub fn declared_fields(&mut self, ty: BindingId) -> Vec<BindingId> {
        self.declared_members(ty, |members| members.fields)
    }

    pub fn member_types(&mut self, ty: BindingId) -> Vec<BindingId> {
        match self.generic_of(ty) {
            Some(generic) => self.members(generic).types,
            None => Vec::new(),
        }
    }

    fn declared_members(
        &mut self,
        ty: BindingId,
        select: impl FnOnce(Members) -> Vec<BindingId>,
    ) -> Vec<BindingId> {
        let Some(generic) = self.generic_of(ty) else {
            return Vec::new();
        };
        let declared = select(self.members(generic));
        if generic == ty {
            return declared;
        }
        declared
            .into_iter()
            .map(|member| self.member_view(ty, member))
            .collect()
    }

    /// `member` (declared in the generic type behind `view`) as seen through `view`.
    ///
    /// Static members are shared by every view and returned unchanged.
    pub(crate) fn member_view(&mut self, view: BindingId, member: BindingId) -> BindingId {
        if let Some(&id) = self.interner.member_views.get(&(view, member)) {
            return id;
        }
        let is_static = match self.binding(member) {
            Binding::Method(method) => method.modifiers.is_static,
            Binding::Variable(var) => var.modifiers.is_static,
            _ => true,
        };
        if is_static {
            return member;
        }
        let raw = self.is_raw(view);
        let subst = self.substitution(view);
        let binding = match self.binding(member).clone() {
            Binding::Method(mut method) => {
                method.params = method
                    .params
                    .iter()
                    .map(|&param| self.view_type(param, raw, &subst))
                    .collect();
                method.ret = self.view_type(method.ret, raw, &subst);
                if raw {
                    method.type_params = Vec::new();
                }
                method.declaring = view;
                method.default_value = None;
                Binding::Method(method)
            }
            Binding::Variable(mut var) => {
                var.ty = self.view_type(var.ty, raw, &subst);
                var.declaring = view;
                Binding::Variable(var)
            }
            _ => return member,
        };
        let id = self.interner.alloc(binding);
        self.interner.member_views.insert((view, member), id);
        id
    }

    fn view_type(&mut self, ty: BindingId, raw: bool, subst: &[(BindingId, BindingId)]) -> BindingId {
        if raw {
            self.erasure(ty)
        } else {
            self.substitute(ty, subst)
        }
    }
}
