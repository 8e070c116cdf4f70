use std::collections::{HashMap, HashSet};

use nova_classfile::{BaseType, FieldStub, MethodStub};
use nova_core::{FileId, PackageName, TypeName};
use nova_hir::{EnumConstantDecl, Expr, FieldDecl, MethodDecl, NodeId, ParamDecl};

use crate::binding::{Binding, BindingId, WildcardKind};
use crate::decl_table::{DeclTable, SourceType};
use crate::interner::Interner;
use crate::options::ResolveOptions;
use crate::project::Project;

/// The source declaration behind a field binding.
#[derive(Debug, Clone, Copy)]
pub(crate) enum FieldSource<'p> {
    Field(&'p FieldDecl),
    EnumConstant(&'p EnumConstantDecl),
}

/// One resolution session over a project snapshot.
///
/// The session owns the binding arena and every interning cache; bindings handed out by a
/// session are only meaningful to that session. All state is threaded through `&mut self`,
/// so independent sessions over the same project can run on different threads without
/// sharing anything.
#[derive(Debug)]
pub struct Session<'p> {
    pub(crate) decls: DeclTable<'p>,
    pub(crate) options: ResolveOptions,
    pub(crate) interner: Interner,
    pub(crate) method_decls: HashMap<BindingId, (SourceType<'p>, &'p MethodDecl)>,
    pub(crate) field_decls: HashMap<BindingId, (SourceType<'p>, FieldSource<'p>)>,
    pub(crate) method_stubs: HashMap<BindingId, &'p MethodStub>,
    pub(crate) field_stubs: HashMap<BindingId, &'p FieldStub>,
    /// Parameters and locals of each source member, in declaration order.
    pub(crate) member_locals: HashMap<BindingId, Vec<BindingId>>,
    /// Parameter and local bindings by declaring node.
    pub(crate) local_nodes: HashMap<(FileId, NodeId), BindingId>,
    pub(crate) param_decls: HashMap<BindingId, &'p ParamDecl>,
    /// Initializers of `final` locals, folded on demand.
    pub(crate) local_inits: HashMap<BindingId, &'p Expr>,
    pub(crate) annotation_cache: HashMap<BindingId, Vec<BindingId>>,
    pub(crate) loading_members: HashSet<BindingId>,
}

impl<'p> Session<'p> {
    pub fn new(project: &'p Project, options: ResolveOptions) -> Self {
        Self {
            decls: DeclTable::new(project),
            options,
            interner: Interner::default(),
            method_decls: HashMap::new(),
            field_decls: HashMap::new(),
            method_stubs: HashMap::new(),
            field_stubs: HashMap::new(),
            member_locals: HashMap::new(),
            local_nodes: HashMap::new(),
            param_decls: HashMap::new(),
            local_inits: HashMap::new(),
            annotation_cache: HashMap::new(),
            loading_members: HashSet::new(),
        }
    }

    pub fn project(&self) -> &'p Project {
        self.decls.project()
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// # Panics
    ///
    /// Panics if `id` was handed out by a different session.
    pub fn binding(&self, id: BindingId) -> &Binding {
        self.interner.get(id)
    }

    /// Number of bindings created so far.
    pub fn binding_count(&self) -> usize {
        self.interner.len()
    }

    pub fn lookup_package(&mut self, name: &PackageName) -> Option<BindingId> {
        self.decls
            .has_package(name)
            .then(|| self.interner.package(name))
    }

    pub fn primitive(&mut self, ty: BaseType) -> BindingId {
        self.interner.primitive(ty)
    }

    pub fn null_type(&mut self) -> BindingId {
        self.interner.null()
    }

    pub fn void_type(&mut self) -> BindingId {
        self.interner.void()
    }

    pub fn array_of(&mut self, element: BindingId, dims: u32) -> BindingId {
        self.interner.array(element, dims)
    }

    pub fn wildcard(&mut self, kind: WildcardKind, bound: Option<BindingId>) -> BindingId {
        self.interner.wildcard(kind, bound)
    }

    /// `generic<args>`; `None` when the argument count does not match.
    pub fn parameterize(&mut self, generic: BindingId, args: Vec<BindingId>) -> Option<BindingId> {
        let arity = self.type_params_of(generic).len();
        if arity == 0 || arity != args.len() {
            return None;
        }
        Some(self.class_type(generic, None, Some(args)))
    }

    /// The raw reference to `generic`, as written without type arguments outside its own body.
    pub fn raw_type(&mut self, generic: BindingId) -> Option<BindingId> {
        self.raw_form(generic)
    }

    /// The binary name of a named, parameterized or raw type.
    pub fn binary_name(&self, id: BindingId) -> Option<&TypeName> {
        match self.binding(id) {
            Binding::Type(ty) => Some(&ty.name),
            Binding::Parameterized(p) => self.binary_name(p.generic),
            Binding::Raw(r) => self.binary_name(r.generic),
            _ => None,
        }
    }

    pub fn type_parameters(&self, id: BindingId) -> Vec<BindingId> {
        match self.binding(id) {
            Binding::Method(method) => method.type_params.clone(),
            _ => self.type_params_of(id),
        }
    }

    pub fn type_arguments(&self, id: BindingId) -> Vec<BindingId> {
        match self.binding(id) {
            Binding::Parameterized(p) => p.args.clone(),
            Binding::Method(method) => method.type_args.clone(),
            _ => Vec::new(),
        }
    }

    /// Type parameters of the generic declaration behind a named, parameterized or raw type.
    pub(crate) fn type_params_of(&self, id: BindingId) -> Vec<BindingId> {
        match self.binding(id) {
            Binding::Type(ty) => ty.type_params.clone(),
            Binding::Parameterized(p) => self.type_params_of(p.generic),
            Binding::Raw(r) => self.type_params_of(r.generic),
            _ => Vec::new(),
        }
    }

    /// The generic declaration behind a named, parameterized or raw type.
    pub(crate) fn generic_of(&self, id: BindingId) -> Option<BindingId> {
        match self.binding(id) {
            Binding::Type(_) => Some(id),
            Binding::Parameterized(p) => Some(p.generic),
            Binding::Raw(r) => Some(r.generic),
            _ => None,
        }
    }

    pub(crate) fn is_raw(&self, id: BindingId) -> bool {
        matches!(self.binding(id), Binding::Raw(_))
    }

    pub(crate) fn is_static_type(&self, id: BindingId) -> bool {
        match self.binding(id) {
            Binding::Type(ty) => ty.modifiers.is_static || ty.enclosing.is_none(),
            _ => true,
        }
    }

    /// Applies `args` to `generic` as a member of `enclosing` (a parameterized or raw enclosing
    /// type; plain declarations are ignored).
    ///
    /// `Some(vec![])` requests the raw type; `None` means no arguments were written.
    pub(crate) fn class_type(
        &mut self,
        generic: BindingId,
        enclosing: Option<BindingId>,
        args: Option<Vec<BindingId>>,
    ) -> BindingId {
        let enclosing = enclosing.filter(|&e| {
            matches!(
                self.binding(e),
                Binding::Parameterized(_) | Binding::Raw(_)
            )
        });
        let enclosing = match enclosing {
            Some(e) if self.is_static_type(generic) && !self.is_raw(e) => None,
            other => other,
        };
        let params = self.type_params_of(generic);
        match args {
            Some(args) if args.is_empty() => self.interner.raw(generic, enclosing),
            Some(args) => {
                if args.len() != params.len() {
                    self.interner.raw(generic, enclosing)
                } else if enclosing.is_none() && args == params {
                    generic
                } else {
                    self.interner.parameterized(generic, enclosing, args)
                }
            }
            None if !params.is_empty() => self.interner.raw(generic, enclosing),
            None => match enclosing {
                None => generic,
                Some(e) if self.is_raw(e) => self.interner.raw(generic, Some(e)),
                Some(e) => self.interner.parameterized(generic, Some(e), Vec::new()),
            },
        }
    }

    /// The raw form of a named type: `Raw` when it or any enclosing type is generic.
    pub(crate) fn raw_form(&mut self, ty: BindingId) -> Option<BindingId> {
        let (enclosing, generic) = match self.binding(ty) {
            Binding::Type(decl) => (decl.enclosing, decl.is_generic()),
            _ => return None,
        };
        let enclosing_raw = match enclosing {
            Some(outer) => self.raw_form(outer),
            None => None,
        };
        if generic || enclosing_raw.is_some() {
            Some(self.interner.raw(ty, enclosing_raw))
        } else {
            None
        }
    }

    /// The type as referenced by its simple name without arguments: raw when generic.
    pub(crate) fn plain_reference(&mut self, ty: BindingId) -> BindingId {
        self.raw_form(ty).unwrap_or(ty)
    }

    pub(crate) fn type_or_missing(&mut self, dotted: &str) -> BindingId {
        let name = TypeName::new(dotted);
        match self.lookup_type(&name) {
            Some(id) => id,
            None => self.missing_type(&name),
        }
    }

    pub(crate) fn object(&mut self) -> BindingId {
        self.type_or_missing("java.lang.Object")
    }

    pub(crate) fn string(&mut self) -> BindingId {
        self.type_or_missing("java.lang.String")
    }

    pub(crate) fn is_object(&self, id: BindingId) -> bool {
        matches!(self.binding(id), Binding::Type(ty) if ty.name.as_str() == "java.lang.Object")
    }

    pub(crate) fn is_missing(&self, id: BindingId) -> bool {
        matches!(self.binding(id), Binding::Type(ty) if ty.is_missing())
    }
}
