//! Resolution of compilation units.
//!
//! [`Session::resolve_unit`] walks one unit and pairs every declaration, type reference,
//! statement and expression node with the binding it denotes. Nodes keep the range and
//! recovery flags the parser gave them; a node whose binding is a fabricated missing type is
//! additionally flagged recovered.

mod exprs;
mod infer;
pub(crate) mod lookup;
pub(crate) mod scope;

use std::collections::HashMap;

use nova_core::{FileId, Name, TextRange, TypeName};
use nova_hir::{
    AnnotationUse, Block, ImportKind, MethodDecl, Modifiers, NodeFlags, NodeId, Stmt, StmtKind,
    TypeDecl, TypeParamDecl, TypeRef,
};

use crate::binding::{
    Binding, BindingId, ConstantState, LocalIdentity, MemberOrigin, Members, VariableBinding,
    VariableKind,
};
use crate::session::Session;

use self::exprs::Frame;
use self::scope::Scope;

/// What kind of syntax a [`ResolvedNode`] was recorded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Package,
    Import,
    Type,
    TypeParameter,
    EnumConstant,
    Field,
    Method,
    Parameter,
    Local,
    TypeRef,
    Annotation,
    Stmt,
    Expr,
}

/// One syntax node and what it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub range: TextRange,
    pub flags: NodeFlags,
    /// The entity the node declares or refers to.
    pub binding: Option<BindingId>,
    /// Expressions only: the type of the value.
    pub type_binding: Option<BindingId>,
    /// The value is boxed by the context it appears in.
    pub boxing: bool,
    /// The value is unboxed by the context it appears in.
    pub unboxing: bool,
}

impl ResolvedNode {
    pub fn start(&self) -> u32 {
        self.range.start().into()
    }

    pub fn length(&self) -> u32 {
        self.range.len().into()
    }

    pub fn is_recovered(&self) -> bool {
        self.flags.is_recovered()
    }

    pub fn is_malformed(&self) -> bool {
        self.flags.is_malformed()
    }
}

/// The resolved nodes of one compilation unit, in walk order.
#[derive(Debug, Clone)]
pub struct ResolvedUnit {
    file: FileId,
    nodes: Vec<ResolvedNode>,
    index: HashMap<NodeId, usize>,
}

impl ResolvedUnit {
    fn new(file: FileId, nodes: Vec<ResolvedNode>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id, idx))
            .collect();
        Self { file, nodes, index }
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn nodes(&self) -> &[ResolvedNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&ResolvedNode> {
        self.index.get(&id).map(|&idx| &self.nodes[idx])
    }

    pub fn binding(&self, id: NodeId) -> Option<BindingId> {
        self.node(id)?.binding
    }

    pub fn type_binding(&self, id: NodeId) -> Option<BindingId> {
        self.node(id)?.type_binding
    }
}

/// A parameter or local about to be declared.
struct LocalDecl<'a> {
    kind: VariableKind,
    name: &'a Name,
    ty: BindingId,
    is_final: bool,
    /// Folded lazily as a constant.
    constant: bool,
    range: TextRange,
    node: NodeId,
}

impl<'p> Session<'p> {
    /// Resolves every node of the unit `file`; `None` when the project has no such unit.
    pub fn resolve_unit(&mut self, file: FileId) -> Option<ResolvedUnit> {
        let unit = self.project().unit(file)?;
        let _span = tracing::debug_span!("resolve_unit", ?file).entered();
        let mut out = Vec::new();
        if let Some(package) = &unit.package {
            let binding = self.lookup_package(&package.name);
            self.record(&mut out, NodeKind::Package, package.id, package.range, package.flags, binding);
        }
        for import in &unit.imports {
            let binding = self.resolve_import(&import.kind);
            if binding.is_none() {
                tracing::trace!(kind = ?import.kind, "unresolved import");
            }
            self.record(&mut out, NodeKind::Import, import.id, import.range, import.flags, binding);
        }
        let package = unit.package_name();
        for decl in &unit.types {
            let name = TypeName::in_package(&package, decl.name.as_str());
            self.resolve_type_decl(&mut out, name, decl);
        }
        tracing::trace!(nodes = out.len(), "resolved unit");
        Some(ResolvedUnit::new(file, out))
    }

    fn resolve_import(&mut self, kind: &ImportKind) -> Option<BindingId> {
        match kind {
            ImportKind::Single(path) => self.resolve_qualified_type(path),
            ImportKind::OnDemand(path) => {
                let package = nova_core::PackageName::from_segments(path.segments().to_vec());
                match self.lookup_package(&package) {
                    Some(package) => Some(package),
                    None => self.resolve_qualified_type(path),
                }
            }
            ImportKind::StaticSingle { ty, member } => {
                let owner = self.resolve_qualified_type(ty)?;
                if let Some(field) = self.find_field(owner, member) {
                    return Some(field);
                }
                if let Some(&method) = self.find_methods(owner, member).first() {
                    return Some(method);
                }
                self.find_member_type(owner, member)
            }
            ImportKind::StaticOnDemand(ty) => self.resolve_qualified_type(ty),
        }
    }

    pub(crate) fn record(
        &self,
        out: &mut Vec<ResolvedNode>,
        kind: NodeKind,
        id: NodeId,
        range: TextRange,
        flags: NodeFlags,
        binding: Option<BindingId>,
    ) -> usize {
        let flags = match binding {
            Some(binding) if self.is_missing(binding) => flags.union(NodeFlags::RECOVERED),
            _ => flags,
        };
        out.push(ResolvedNode {
            id,
            kind,
            range,
            flags,
            binding,
            type_binding: None,
            boxing: false,
            unboxing: false,
        });
        out.len() - 1
    }

    /// Resolves a type reference in a unit body and records it with every nested reference.
    pub(crate) fn resolve_type_ref(
        &mut self,
        scope: &Scope<'p>,
        ty: &TypeRef,
        out: &mut Vec<ResolvedNode>,
    ) -> Option<BindingId> {
        let mut refs = Vec::new();
        let binding = self.resolve_type(scope, ty, self.options.binding_recovery, &mut refs);
        for node in refs {
            self.record(out, NodeKind::TypeRef, node.id, node.range, node.flags, node.binding);
        }
        binding
    }

    fn resolve_type_decl(&mut self, out: &mut Vec<ResolvedNode>, name: TypeName, decl: &'p TypeDecl) {
        let declared_here = self
            .decls
            .source(&name)
            .is_some_and(|source| std::ptr::eq(source.decl, decl));
        let ty = if declared_here {
            self.lookup_type(&name)
        } else {
            None
        };
        self.record(out, NodeKind::Type, decl.id, decl.range, decl.flags, ty);
        let Some(ty) = ty else {
            tracing::debug!(%name, "type declaration shadowed by an earlier one");
            return;
        };
        let Some(scope) = self.type_scope(ty) else {
            return;
        };
        self.resolve_annotation_uses(out, ty, &scope, &decl.annotations);
        let vars = self.type_params_of(ty);
        self.resolve_type_param_decls(out, &scope, &decl.type_params, &vars);
        if let Some(extends) = &decl.extends {
            self.resolve_type_ref(&scope, extends, out);
        }
        for iface in &decl.implements {
            self.resolve_type_ref(&scope, iface, out);
        }

        let members = self.members(ty);
        let by_node = self.members_by_node(&members);
        let static_scope = Scope {
            is_static: true,
            ..scope.clone()
        };

        for constant in &decl.enum_constants {
            let field = by_node.get(&constant.id).copied();
            self.record(out, NodeKind::EnumConstant, constant.id, constant.range, constant.flags, field);
            if let Some(field) = field {
                self.resolve_annotation_uses(out, field, &scope, &constant.annotations);
            }
            let frame = Frame::new(static_scope.clone());
            for arg in &constant.args {
                self.resolve_expr(&frame, arg, None, out);
            }
        }

        for field_decl in &decl.fields {
            let field = by_node.get(&field_decl.id).copied();
            self.record(out, NodeKind::Field, field_decl.id, field_decl.range, field_decl.flags, field);
            self.resolve_type_ref(&scope, &field_decl.ty, out);
            let declared = field.and_then(|field| {
                let var = self.binding(field).as_variable()?;
                Some((field, var.ty, var.modifiers))
            });
            if let Some((field, _, modifiers)) = declared {
                self.resolve_annotation_uses(out, field, &scope, &field_decl.annotations);
                if modifiers.is_final {
                    self.constant_value(field);
                }
            }
            if let Some(init) = &field_decl.initializer {
                let is_static = declared.map_or(field_decl.modifiers.is_static, |(_, _, m)| m.is_static);
                let frame = Frame::new(Scope {
                    is_static,
                    ..scope.clone()
                });
                self.resolve_expr_to(&frame, init, declared.map(|(_, ty, _)| ty), out);
            }
        }

        for method_decl in &decl.methods {
            let method = by_node.get(&method_decl.id).copied();
            self.resolve_method_decl(out, method, method_decl);
        }

        for nested in &decl.nested {
            self.resolve_type_decl(out, name.nested(nested.name.as_str()), nested);
        }
    }

    /// Source members of a type by the node that declared them.
    fn members_by_node(&self, members: &Members) -> HashMap<NodeId, BindingId> {
        members
            .fields
            .iter()
            .chain(&members.methods)
            .filter_map(|&id| {
                let origin = match self.binding(id) {
                    Binding::Method(method) => method.origin,
                    Binding::Variable(var) => var.origin,
                    _ => return None,
                };
                match origin {
                    MemberOrigin::Source {
                        node: Some(node), ..
                    } => Some((node, id)),
                    _ => None,
                }
            })
            .collect()
    }

    fn resolve_type_param_decls(
        &mut self,
        out: &mut Vec<ResolvedNode>,
        scope: &Scope<'p>,
        decls: &[TypeParamDecl],
        vars: &[BindingId],
    ) {
        for (idx, param) in decls.iter().enumerate() {
            let var = vars.get(idx).copied();
            self.record(out, NodeKind::TypeParameter, param.id, param.range, param.flags, var);
            for bound in &param.bounds {
                self.resolve_type_ref(scope, bound, out);
            }
        }
    }

    fn resolve_annotation_uses(
        &mut self,
        out: &mut Vec<ResolvedNode>,
        annotated: BindingId,
        scope: &Scope<'p>,
        uses: &[AnnotationUse],
    ) {
        for (index, annotation) in uses.iter().enumerate() {
            let binding = self.source_annotation(annotated, scope, uses, index);
            self.record(out, NodeKind::Annotation, annotation.id, annotation.range, annotation.flags, binding);
            let ty = self.resolve_type_ref(scope, &annotation.ty, out);
            let frame = Frame::new(scope.clone());
            for arg in &annotation.args {
                let element = match (&arg.name, ty) {
                    (Some(name), Some(ty)) => self.find_methods(ty, name).first().copied(),
                    (None, Some(ty)) => self.find_methods(ty, &Name::from("value")).first().copied(),
                    (_, None) => None,
                };
                let expected = element.and_then(|m| self.binding(m).as_method().map(|m| m.ret));
                self.resolve_expr_to(&frame, &arg.value, expected, out);
            }
        }
    }

    fn resolve_method_decl(
        &mut self,
        out: &mut Vec<ResolvedNode>,
        method: Option<BindingId>,
        decl: &'p MethodDecl,
    ) {
        self.record(out, NodeKind::Method, decl.id, decl.range, decl.flags, method);
        let Some(method) = method else {
            return;
        };
        let Some(scope) = self.method_scope(method) else {
            return;
        };
        let vars = self.type_parameters(method);
        self.resolve_type_param_decls(out, &scope, &decl.type_params, &vars);
        self.resolve_annotation_uses(out, method, &scope, &decl.annotations);
        if let Some(ret) = &decl.return_type {
            self.resolve_type_ref(&scope, ret, out);
        }

        self.ensure_locals(method);
        let mut params = Vec::new();
        for param in &decl.params {
            let var = self.local_nodes.get(&(scope.file, param.id)).copied();
            self.record(out, NodeKind::Parameter, param.id, param.range, param.flags, var);
            self.resolve_type_ref(&scope, &param.ty, out);
            if let Some(var) = var {
                self.resolve_annotation_uses(out, var, &scope, &param.annotations);
                params.push(var);
            }
        }

        let ret = self.binding(method).as_method().map(|m| m.ret);
        if let Some(default) = &decl.default_value {
            let frame = Frame::new(scope.clone());
            self.resolve_expr_to(&frame, default, ret, out);
        }
        if !self.options.resolve_method_bodies {
            return;
        }
        if let Some(body) = &decl.body {
            let mut frame = Frame::new(scope);
            frame.locals = params;
            frame.ret = ret;
            self.resolve_block(&mut frame, body, out);
        }
    }

    fn resolve_block(&mut self, frame: &mut Frame<'p>, block: &Block, out: &mut Vec<ResolvedNode>) {
        self.record(out, NodeKind::Stmt, block.id, block.range, block.flags, None);
        let depth = frame.locals.len();
        for stmt in &block.stmts {
            self.resolve_stmt(frame, stmt, out);
        }
        frame.locals.truncate(depth);
    }

    fn resolve_stmt(&mut self, frame: &mut Frame<'p>, stmt: &Stmt, out: &mut Vec<ResolvedNode>) {
        self.record(out, NodeKind::Stmt, stmt.id, stmt.range, stmt.flags, None);
        if self.skips(stmt) {
            tracing::trace!(id = ?stmt.id, "skipping malformed statement");
            return;
        }
        match &stmt.kind {
            StmtKind::Local(local) => {
                let var = self.local_nodes.get(&(frame.scope.file, local.id)).copied();
                self.record(out, NodeKind::Local, local.id, local.range, local.flags, var);
                self.resolve_type_ref(&frame.scope, &local.ty, out);
                let declared = var.and_then(|var| self.binding(var).as_variable().map(|v| v.ty));
                if let Some(init) = &local.initializer {
                    self.resolve_expr_to(frame, init, declared, out);
                }
                if let Some(var) = var {
                    if local.is_final {
                        self.constant_value(var);
                    }
                    frame.locals.push(var);
                }
            }
            StmtKind::Expr(expr) => {
                self.resolve_expr(frame, expr, None, out);
            }
            StmtKind::Return(Some(expr)) => {
                let ret = frame.ret;
                self.resolve_expr_to(frame, expr, ret, out);
            }
            StmtKind::Return(None) => {}
            StmtKind::Block(block) => self.resolve_block(frame, block, out),
        }
    }

    fn skips(&self, stmt: &Stmt) -> bool {
        stmt.flags.is_malformed() && !self.options.statements_recovery
    }

    /// The scope of a source method's body: its declaring type plus its type parameters.
    pub(crate) fn method_scope(&self, method: BindingId) -> Option<Scope<'p>> {
        let method = self.declaration(method);
        let &(source, _) = self.method_decls.get(&method)?;
        let binding = self.binding(method).as_method()?;
        let mut scope = Scope::new(source.file, source.unit, self.enclosing_chain(binding.declaring));
        scope.type_vars = binding.type_params.clone();
        scope.method = Some(method);
        scope.is_static = binding.modifiers.is_static;
        Some(scope)
    }

    /// Creates the parameter and local bindings of a source method, parameters first, in
    /// declaration order.
    pub(crate) fn ensure_locals(&mut self, member: BindingId) {
        let member = self.declaration(member);
        if self.member_locals.contains_key(&member) {
            return;
        }
        let mut locals = Vec::new();
        let source = self.method_decls.get(&member).copied();
        if let (Some((source, decl)), Some(scope)) = (source, self.method_scope(member)) {
            let param_types = self
                .binding(member)
                .as_method()
                .map(|method| method.params.clone())
                .unwrap_or_default();
            for (param, &ty) in decl.params.iter().zip(&param_types) {
                let local = LocalDecl {
                    kind: VariableKind::Parameter,
                    name: &param.name,
                    ty,
                    is_final: param.is_final,
                    constant: false,
                    range: param.range,
                    node: param.id,
                };
                let var = self.declare_local(member, source.file, &mut locals, local);
                self.param_decls.insert(var, param);
            }
            if let Some(body) = &decl.body {
                self.collect_locals(member, &scope, body, &mut locals);
            }
        }
        self.member_locals.insert(member, locals);
    }

    fn collect_locals(
        &mut self,
        member: BindingId,
        scope: &Scope<'p>,
        block: &'p Block,
        locals: &mut Vec<BindingId>,
    ) {
        for stmt in &block.stmts {
            if self.skips(stmt) {
                continue;
            }
            match &stmt.kind {
                StmtKind::Local(local) => {
                    let ty = self.resolve_signature_type(scope, &local.ty);
                    let init = local.initializer.as_ref().filter(|_| local.is_final);
                    let decl = LocalDecl {
                        kind: VariableKind::Local,
                        name: &local.name,
                        ty,
                        is_final: local.is_final,
                        constant: init.is_some(),
                        range: local.range,
                        node: local.id,
                    };
                    let var = self.declare_local(member, scope.file, locals, decl);
                    if let Some(init) = init {
                        self.local_inits.insert(var, init);
                    }
                }
                StmtKind::Block(inner) => self.collect_locals(member, scope, inner, locals),
                StmtKind::Expr(_) | StmtKind::Return(_) => {}
            }
        }
    }

    fn declare_local(
        &mut self,
        member: BindingId,
        file: FileId,
        locals: &mut Vec<BindingId>,
        local: LocalDecl<'_>,
    ) -> BindingId {
        let occurrence = locals
            .iter()
            .filter(|&&id| matches!(self.binding(id), Binding::Variable(v) if &v.name == local.name))
            .count() as u32;
        let rank = locals.len() as u32;
        let id = self.interner.alloc_with(|id| {
            Binding::Variable(VariableBinding {
                kind: local.kind,
                declaring: member,
                name: local.name.clone(),
                ty: local.ty,
                modifiers: Modifiers {
                    is_final: local.is_final,
                    ..Modifiers::none()
                },
                constant: None,
                declaration: id,
                local: Some(LocalIdentity {
                    occurrence,
                    rank,
                    range: local.range,
                }),
                origin: MemberOrigin::Source {
                    file,
                    node: Some(local.node),
                },
                constant_state: if local.constant {
                    ConstantState::Pending
                } else {
                    ConstantState::Done
                },
            })
        });
        self.interner
            .locals
            .insert((member, local.name.clone(), occurrence, rank), id);
        self.local_nodes.insert((file, local.node), id);
        locals.push(id);
        id
    }
}

#[cfg(test)]
mod tests {
    use nova_core::FileId;
    use nova_hir::{HirBuilder, Modifiers, PrimitiveType};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::options::ResolveOptions;
    use crate::project::Project;

    #[test]
    fn locals_get_occurrence_and_rank() {
        let mut b = HirBuilder::new(FileId::from_raw(0));
        let mut unit = b.unit(Some("p"));
        let mut class = b.class("A");
        let int = b.prim(PrimitiveType::Int);
        let x = b.param("x", int);
        let int = b.prim(PrimitiveType::Int);
        let first = b.local("y", int, None);
        let int = b.prim(PrimitiveType::Int);
        let second = b.local("y", int, None);
        let inner = b.block(vec![second]);
        let inner = b.block_stmt(inner);
        let body = b.block(vec![first, inner]);
        let void = b.void();
        class
            .methods
            .push(b.method("m", void, vec![x]).with_body(body));
        unit.types.push(class);
        let mut project = Project::with_minimal_jdk();
        project.set_unit(unit);

        let mut session = Session::new(&project, ResolveOptions::default());
        let a = session.lookup_type(&TypeName::new("p.A")).unwrap();
        let m = session.find_methods(a, &Name::from("m"))[0];
        session.ensure_locals(m);
        let locals = session.member_locals[&m].clone();
        let identities = locals
            .iter()
            .map(|&id| {
                let var = session.binding(id).as_variable().unwrap();
                let local = var.local.unwrap();
                (var.name.as_str().to_string(), var.kind, local.occurrence, local.rank)
            })
            .collect::<Vec<_>>();
        assert_eq!(
            identities,
            vec![
                ("x".to_string(), VariableKind::Parameter, 0, 0),
                ("y".to_string(), VariableKind::Local, 0, 1),
                ("y".to_string(), VariableKind::Local, 1, 2),
            ]
        );
        assert_eq!(session.key(locals[2]), "Lp/A;.m(I)V#y#1#2");
        assert_eq!(session.resolve_key("Lp/A;.m(I)V#y#1#2"), Some(locals[2]));
    }

    #[test]
    fn signatures_resolve_without_bodies() {
        let mut b = HirBuilder::new(FileId::from_raw(0));
        let mut unit = b.unit(Some("p"));
        let mut class = b.class("A");
        let string = b.ty("String");
        let call = b.call(None, "nope", Vec::new());
        let stmt = b.expr_stmt(call);
        let call_id = match &stmt.kind {
            StmtKind::Expr(expr) => expr.id,
            _ => unreachable!(),
        };
        let body = b.block(vec![stmt]);
        let method = b
            .method("m", string, Vec::new())
            .with_modifiers(Modifiers::static_())
            .with_body(body);
        let method_id = method.id;
        class.methods.push(method);
        unit.types.push(class);
        let mut project = Project::with_minimal_jdk();
        project.set_unit(unit);

        let options = ResolveOptions {
            resolve_method_bodies: false,
            ..ResolveOptions::default()
        };
        let mut session = Session::new(&project, options);
        let resolved = session.resolve_unit(FileId::from_raw(0)).unwrap();
        assert!(resolved.binding(method_id).is_some());
        assert!(resolved.node(call_id).is_none());
        assert_eq!(session.resolve_unit(FileId::from_raw(7)).map(|u| u.file()), None);
    }
}
