//! Expression typing: names, member access, method and constructor selection, and the
//! boxing and unboxing conversions applied to operands.

use nova_classfile::BaseType;
use nova_hir::{BinaryOp, Expr, ExprKind, Literal, NodeFlags, TypeRefKind, UnaryOp};

use crate::binding::{Binding, BindingId, CaptureSite};
use crate::resolver::lookup::NamePath;
use crate::resolver::scope::Scope;
use crate::resolver::{NodeKind, ResolvedNode};
use crate::session::Session;

/// What is visible to the expressions of a body.
#[derive(Debug, Clone)]
pub(crate) struct Frame<'p> {
    pub(crate) scope: Scope<'p>,
    /// Parameters and locals in scope, in declaration order.
    pub(crate) locals: Vec<BindingId>,
    /// Declared return type of the enclosing method.
    pub(crate) ret: Option<BindingId>,
}

impl<'p> Frame<'p> {
    pub(crate) fn new(scope: Scope<'p>) -> Self {
        Self {
            scope,
            locals: Vec::new(),
            ret: None,
        }
    }
}

/// The outcome of resolving one expression.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExprInfo {
    pub(crate) ty: Option<BindingId>,
    pub(crate) path: Option<NamePath>,
    /// Index of the expression's node in the output.
    pub(crate) node: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct Typed {
    binding: Option<BindingId>,
    ty: Option<BindingId>,
    path: Option<NamePath>,
    recovered: bool,
}

impl Typed {
    fn value(ty: Option<BindingId>) -> Self {
        Self {
            ty,
            ..Self::default()
        }
    }

    fn variable(var: BindingId, ty: BindingId) -> Self {
        Self {
            binding: Some(var),
            ty: Some(ty),
            ..Self::default()
        }
    }

    fn path(path: NamePath) -> Self {
        let (NamePath::Type(binding) | NamePath::Package(binding)) = path;
        Self {
            binding: Some(binding),
            path: Some(path),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// No boxing, no varargs.
    Strict,
    /// Boxing allowed.
    Loose,
    /// Boxing and variable arity.
    Varargs,
}

fn unary_promotion(base: BaseType) -> BaseType {
    match base {
        BaseType::Byte | BaseType::Short | BaseType::Char => BaseType::Int,
        other => other,
    }
}

fn binary_promotion(lhs: BaseType, rhs: BaseType) -> BaseType {
    use BaseType::*;
    match (lhs, rhs) {
        (Double, _) | (_, Double) => Double,
        (Float, _) | (_, Float) => Float,
        (Long, _) | (_, Long) => Long,
        _ => Int,
    }
}

impl<'p> Session<'p> {
    /// Resolves `expr` and its subexpressions, recording one node per expression in
    /// pre-order. `expected` is the type the context assigns the value to, if known.
    pub(crate) fn resolve_expr(
        &mut self,
        frame: &Frame<'p>,
        expr: &Expr,
        expected: Option<BindingId>,
        out: &mut Vec<ResolvedNode>,
    ) -> ExprInfo {
        let node = self.record(out, NodeKind::Expr, expr.id, expr.range, expr.flags, None);
        let typed = self.type_expr(frame, expr, expected, out);
        self.complete(out, node, typed);
        ExprInfo {
            ty: typed.ty,
            path: typed.path,
            node,
        }
    }

    /// Resolves an expression in an assignment context, marking the boxing or unboxing
    /// needed to convert it to `target`.
    pub(crate) fn resolve_expr_to(
        &mut self,
        frame: &Frame<'p>,
        expr: &Expr,
        target: Option<BindingId>,
        out: &mut Vec<ResolvedNode>,
    ) -> Option<BindingId> {
        let info = self.resolve_expr(frame, expr, target, out);
        if let Some(target) = target {
            self.mark_conversion(out, info.node, info.ty, target);
        }
        info.ty
    }

    fn complete(&self, out: &mut [ResolvedNode], node: usize, typed: Typed) {
        let missing = typed.binding.is_some_and(|b| self.is_missing(b))
            || typed.ty.is_some_and(|t| self.is_missing(t));
        let unresolved = typed.ty.is_none() && typed.path.is_none();
        let slot = &mut out[node];
        slot.binding = typed.binding;
        slot.type_binding = typed.ty;
        if typed.recovered || missing || unresolved {
            slot.flags = slot.flags.union(NodeFlags::RECOVERED);
        }
    }

    fn mark_conversion(
        &mut self,
        out: &mut [ResolvedNode],
        node: usize,
        from: Option<BindingId>,
        to: BindingId,
    ) {
        let Some(from) = from else {
            return;
        };
        let from_primitive = self.primitive_of(from).is_some();
        let to_primitive = self.primitive_of(to).is_some();
        if from_primitive && !to_primitive && self.binding(to).is_reference() {
            out[node].boxing = true;
        } else if !from_primitive && to_primitive && self.unboxed_type(from).is_some() {
            out[node].unboxing = true;
        }
    }

    fn site(&self, frame: &Frame<'p>, expr: &Expr) -> CaptureSite {
        CaptureSite {
            file: frame.scope.file,
            offset: expr.range.end().into(),
        }
    }

    fn type_expr(
        &mut self,
        frame: &Frame<'p>,
        expr: &Expr,
        expected: Option<BindingId>,
        out: &mut Vec<ResolvedNode>,
    ) -> Typed {
        match &expr.kind {
            ExprKind::Literal(lit) => Typed::value(Some(self.literal_type(lit))),
            ExprKind::Name(name) => {
                let local = frame.locals.iter().rev().copied().find(|&local| {
                    matches!(self.binding(local), Binding::Variable(v) if &v.name == name)
                });
                let var = match local {
                    Some(local) => Some(local),
                    None => self.lookup_field_in_scope(&frame.scope, name),
                };
                if let Some(var) = var {
                    return self.read_variable(frame, expr, var);
                }
                match self.name_path(&frame.scope, expr) {
                    Some(path) => Typed::path(path),
                    None => {
                        tracing::trace!(%name, "unresolved name");
                        Typed::default()
                    }
                }
            }
            ExprKind::FieldAccess { target, name } => {
                let target = self.resolve_expr(frame, target, None, out);
                if let Some(ty) = target.ty {
                    if matches!(self.binding(ty), Binding::Array(_)) {
                        if name.as_str() == "length" {
                            return Typed::value(Some(self.primitive(BaseType::Int)));
                        }
                        return Typed::default();
                    }
                    return match self.find_field(ty, name) {
                        Some(field) => self.read_variable(frame, expr, field),
                        None => Typed::default(),
                    };
                }
                let Some(path) = target.path else {
                    return Typed::default();
                };
                if let NamePath::Type(owner) = path {
                    if let Some(field) = self.find_field(owner, name) {
                        return self.read_variable(frame, expr, field);
                    }
                }
                match self.member_path(path, name) {
                    Some(path) => Typed::path(path),
                    None => Typed::default(),
                }
            }
            ExprKind::MethodCall { .. } => self.resolve_call(frame, expr, expected, out),
            ExprKind::New { ty, args } => {
                let created = self.resolve_type_ref(&frame.scope, ty, out);
                let args = self.resolve_args(frame, args, out);
                let Some(created) = created else {
                    return Typed::default();
                };
                let created = if is_diamond(ty) {
                    self.infer_diamond(created, &args, expected)
                } else {
                    created
                };
                let ctors = self.constructors(created);
                let arg_types = args.iter().map(|arg| arg.ty).collect::<Vec<_>>();
                match self.select_method(&ctors, &arg_types, None, None) {
                    Some((ctor, formals)) => {
                        self.mark_args(out, &args, &formals);
                        Typed {
                            binding: Some(ctor),
                            ty: Some(created),
                            ..Typed::default()
                        }
                    }
                    None => Typed {
                        ty: Some(created),
                        recovered: true,
                        ..Typed::default()
                    },
                }
            }
            ExprKind::Cast { ty, expr: inner } => {
                let target = self.resolve_type_ref(&frame.scope, ty, out);
                let inner = self.resolve_expr(frame, inner, None, out);
                if let Some(target) = target {
                    self.mark_conversion(out, inner.node, inner.ty, target);
                }
                Typed::value(target)
            }
            ExprKind::Unary { op, expr: inner } => {
                let inner = self.resolve_expr(frame, inner, None, out);
                let Some(operand) = self.unboxed_operand(out, &inner) else {
                    return Typed::default();
                };
                let result = match op {
                    UnaryOp::Not => BaseType::Boolean,
                    UnaryOp::Plus | UnaryOp::Minus | UnaryOp::BitNot => unary_promotion(operand),
                };
                Typed::value(Some(self.primitive(result)))
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.resolve_expr(frame, lhs, None, out);
                let rhs = self.resolve_expr(frame, rhs, None, out);
                self.binary_type(out, *op, &lhs, &rhs)
            }
            ExprKind::Paren(inner) => {
                let inner = self.resolve_expr(frame, inner, expected, out);
                Typed::value(inner.ty)
            }
            ExprKind::This => {
                if frame.scope.is_static {
                    return Typed::default();
                }
                Typed::value(frame.scope.current_type())
            }
            ExprKind::ClassLiteral(ty) => {
                let Some(target) = self.resolve_type_ref(&frame.scope, ty, out) else {
                    return Typed::default();
                };
                Typed::value(self.class_literal_type(target))
            }
            ExprKind::ArrayInit(elements) => {
                let element = expected.and_then(|expected| match self.binding(expected) {
                    Binding::Array(array) => Some(*array),
                    _ => None,
                });
                let element_ty = element.map(|array| self.array_of(array.element, array.dims - 1));
                for element in elements {
                    self.resolve_expr_to(frame, element, element_ty, out);
                }
                Typed::value(element.and(expected))
            }
            ExprKind::Missing => Typed::default(),
        }
    }

    fn literal_type(&mut self, lit: &Literal) -> BindingId {
        match lit {
            Literal::Int(_) => self.primitive(BaseType::Int),
            Literal::Long(_) => self.primitive(BaseType::Long),
            Literal::Float(_) => self.primitive(BaseType::Float),
            Literal::Double(_) => self.primitive(BaseType::Double),
            Literal::Char(_) => self.primitive(BaseType::Char),
            Literal::Boolean(_) => self.primitive(BaseType::Boolean),
            Literal::String(_) => self.string(),
            Literal::Null => self.null_type(),
        }
    }

    /// A variable read: the value has the captured type of the variable.
    fn read_variable(&mut self, frame: &Frame<'p>, expr: &Expr, var: BindingId) -> Typed {
        let Some(ty) = self.binding(var).as_variable().map(|v| v.ty) else {
            return Typed::default();
        };
        let ty = self.capture(self.site(frame, expr), ty);
        Typed::variable(var, ty)
    }

    fn class_literal_type(&mut self, target: BindingId) -> Option<BindingId> {
        let class = self.lookup_type(&nova_core::TypeName::new("java.lang.Class"))?;
        let arg = match self.binding(target) {
            Binding::Primitive(_) => self.boxed_type(target),
            Binding::Void => self.lookup_type(&nova_core::TypeName::new("java.lang.Void")),
            _ => Some(target),
        };
        let arg = arg.map(|arg| self.erasure(arg));
        match arg.and_then(|arg| self.parameterize(class, vec![arg])) {
            Some(ty) => Some(ty),
            None => Some(self.plain_reference(class)),
        }
    }

    fn resolve_args(
        &mut self,
        frame: &Frame<'p>,
        args: &[Expr],
        out: &mut Vec<ResolvedNode>,
    ) -> Vec<ExprInfo> {
        args.iter()
            .map(|arg| self.resolve_expr(frame, arg, None, out))
            .collect()
    }

    fn mark_args(&mut self, out: &mut [ResolvedNode], args: &[ExprInfo], formals: &[BindingId]) {
        for (arg, &formal) in args.iter().zip(formals) {
            self.mark_conversion(out, arg.node, arg.ty, formal);
        }
    }

    fn resolve_call(
        &mut self,
        frame: &Frame<'p>,
        expr: &Expr,
        expected: Option<BindingId>,
        out: &mut Vec<ResolvedNode>,
    ) -> Typed {
        let ExprKind::MethodCall {
            target,
            name,
            type_args,
            args,
        } = &expr.kind
        else {
            return Typed::default();
        };
        let candidates = match target {
            None => self
                .lookup_methods_in_scope(&frame.scope, name)
                .map(|(_, methods)| methods)
                .unwrap_or_default(),
            Some(target) => {
                let target = self.resolve_expr(frame, target, None, out);
                match (target.ty, target.path) {
                    (Some(ty), _) => self.find_methods(ty, name),
                    (None, Some(NamePath::Type(owner))) => self.find_methods(owner, name),
                    _ => Vec::new(),
                }
            }
        };

        let mut explicit = type_args.as_ref().map(|_| Vec::new());
        for arg in type_args.iter().flatten() {
            let resolved = self.resolve_type_ref(&frame.scope, arg, out);
            match resolved {
                Some(resolved) => {
                    if let Some(explicit) = explicit.as_mut() {
                        explicit.push(resolved);
                    }
                }
                None => explicit = None,
            }
        }
        let args = self.resolve_args(frame, args, out);
        let arg_types = args.iter().map(|arg| arg.ty).collect::<Vec<_>>();

        let selected = self.select_method(&candidates, &arg_types, explicit.as_deref(), expected);
        let (method, recovered) = match selected {
            Some((method, formals)) => {
                self.mark_args(out, &args, &formals);
                (method, false)
            }
            None => {
                let fallback = candidates
                    .iter()
                    .copied()
                    .find(|&m| self.binding(m).as_method().is_some_and(|m| m.params.len() == args.len()))
                    .or_else(|| candidates.first().copied());
                match fallback.filter(|_| self.options.binding_recovery) {
                    Some(method) => (method, true),
                    None => {
                        tracing::trace!(%name, candidates = candidates.len(), "no applicable method");
                        return Typed::default();
                    }
                }
            }
        };
        let Some(ret) = self.binding(method).as_method().map(|m| m.ret) else {
            return Typed::default();
        };
        let ty = self.capture(self.site(frame, expr), ret);
        Typed {
            binding: Some(method),
            ty: Some(ty),
            recovered,
            ..Typed::default()
        }
    }

    /// Picks the most specific applicable method (JLS 15.12.2), trying strict, loose and
    /// variable-arity invocation in turn. Returns the selected method, instantiated when
    /// generic, together with the formal type of each argument.
    fn select_method(
        &mut self,
        candidates: &[BindingId],
        args: &[Option<BindingId>],
        explicit: Option<&[BindingId]>,
        expected: Option<BindingId>,
    ) -> Option<(BindingId, Vec<BindingId>)> {
        for phase in [Phase::Strict, Phase::Loose, Phase::Varargs] {
            let applicable = candidates
                .iter()
                .filter_map(|&candidate| self.applicable(candidate, args, explicit, expected, phase))
                .collect::<Vec<_>>();
            if let Some(found) = self.most_specific(applicable) {
                return Some(found);
            }
        }
        None
    }

    fn applicable(
        &mut self,
        candidate: BindingId,
        args: &[Option<BindingId>],
        explicit: Option<&[BindingId]>,
        expected: Option<BindingId>,
        phase: Phase,
    ) -> Option<(BindingId, Vec<BindingId>)> {
        let method = self.binding(candidate).as_method()?.clone();
        let arity_ok = match phase {
            Phase::Strict | Phase::Loose => method.params.len() == args.len(),
            Phase::Varargs => method.is_varargs && args.len() + 1 >= method.params.len(),
        };
        if !arity_ok {
            return None;
        }
        let expand = phase == Phase::Varargs;
        let mut selected = candidate;
        if !method.type_params.is_empty() {
            let type_args = match explicit {
                Some(explicit) => explicit.to_vec(),
                None => {
                    let formals = self.formal_types(&method.params, args.len(), expand);
                    let result = expected.map(|expected| (method.ret, expected));
                    self.infer_type_args(&method.type_params, &formals, args, result)
                }
            };
            selected = self.instantiate(candidate, type_args)?;
        }
        let params = self.binding(selected).as_method()?.params.clone();
        let formals = self.formal_types(&params, args.len(), expand);
        for (arg, &formal) in args.iter().zip(&formals) {
            let Some(arg) = *arg else {
                continue;
            };
            let ok = match phase {
                Phase::Strict => self.is_strictly_assignable(arg, formal),
                Phase::Loose | Phase::Varargs => self.is_assignable(arg, formal),
            };
            if !ok {
                return None;
            }
        }
        Some((selected, formals))
    }

    /// Parameter types matched against `count` arguments; with `expand`, the trailing array
    /// parameter contributes its component type for each remaining argument.
    fn formal_types(&mut self, params: &[BindingId], count: usize, expand: bool) -> Vec<BindingId> {
        let Some((&last, fixed)) = params.split_last().filter(|_| expand) else {
            return params.to_vec();
        };
        let component = match self.binding(last) {
            Binding::Array(array) => {
                let array = *array;
                self.array_of(array.element, array.dims - 1)
            }
            _ => last,
        };
        let mut formals = fixed.to_vec();
        formals.resize(count.max(fixed.len()), component);
        formals.truncate(count);
        formals
    }

    fn most_specific(
        &mut self,
        applicable: Vec<(BindingId, Vec<BindingId>)>,
    ) -> Option<(BindingId, Vec<BindingId>)> {
        if applicable.len() <= 1 {
            return applicable.into_iter().next();
        }
        let mut best = None;
        for (idx, (_, formals)) in applicable.iter().enumerate() {
            let dominates = applicable.iter().enumerate().all(|(other, (_, others))| {
                other == idx
                    || formals
                        .iter()
                        .zip(others)
                        .all(|(&mine, &theirs)| self.is_strictly_assignable(mine, theirs))
            });
            if dominates {
                best = Some(idx);
                break;
            }
        }
        if best.is_none() {
            tracing::debug!(candidates = applicable.len(), "ambiguous method invocation");
        }
        applicable.into_iter().nth(best.unwrap_or(0))
    }

    /// `new X<>(args)`: infers the type arguments of `X` from the constructor arguments, then
    /// from the type the instance is assigned to.
    fn infer_diamond(
        &mut self,
        created: BindingId,
        args: &[ExprInfo],
        expected: Option<BindingId>,
    ) -> BindingId {
        let Some(generic) = self.generic_of(created) else {
            return created;
        };
        let vars = self.type_params_of(generic);
        if vars.is_empty() {
            return created;
        }
        let arg_types = args.iter().map(|arg| arg.ty).collect::<Vec<_>>();
        let ctor = self
            .constructors(generic)
            .into_iter()
            .filter_map(|ctor| self.binding(ctor).as_method().cloned())
            .find(|ctor| {
                ctor.params.len() == args.len()
                    || (ctor.is_varargs && args.len() + 1 >= ctor.params.len())
            });
        let formals = match ctor {
            Some(ctor) => {
                let expand = ctor.params.len() != args.len();
                self.formal_types(&ctor.params, args.len(), expand)
            }
            None => Vec::new(),
        };
        let result = expected.and_then(|expected| {
            let target = self.generic_of(expected)?;
            let declared = self.as_super(generic, target)?;
            Some((declared, expected))
        });
        let inferred = self.infer_type_args(&vars, &formals, &arg_types, result);
        self.parameterize(generic, inferred).unwrap_or(created)
    }

    fn unboxed_operand(&mut self, out: &mut [ResolvedNode], info: &ExprInfo) -> Option<BaseType> {
        let ty = info.ty?;
        if let Some(base) = self.primitive_of(ty) {
            return Some(base);
        }
        let unboxed = self.unboxed_type(ty)?;
        out[info.node].unboxing = true;
        self.primitive_of(unboxed)
    }

    fn is_string(&self, ty: Option<BindingId>) -> bool {
        ty.and_then(|ty| self.binary_name(ty))
            .is_some_and(|name| name.as_str() == "java.lang.String")
    }

    fn binary_type(
        &mut self,
        out: &mut [ResolvedNode],
        op: BinaryOp,
        lhs: &ExprInfo,
        rhs: &ExprInfo,
    ) -> Typed {
        use BinaryOp::*;
        if op == Add && (self.is_string(lhs.ty) || self.is_string(rhs.ty)) {
            return Typed::value(Some(self.string()));
        }
        let boolean = self.primitive(BaseType::Boolean);
        if matches!(op, Eq | Ne) {
            let (Some(l), Some(r)) = (lhs.ty, rhs.ty) else {
                return Typed::value(Some(boolean));
            };
            if self.primitive_of(l).is_some() || self.primitive_of(r).is_some() {
                self.unboxed_operand(out, lhs);
                self.unboxed_operand(out, rhs);
            }
            return Typed::value(Some(boolean));
        }
        let (Some(l), Some(r)) = (self.unboxed_operand(out, lhs), self.unboxed_operand(out, rhs)) else {
            return Typed::default();
        };
        let result = match op {
            And | Or | Lt | Le | Gt | Ge => BaseType::Boolean,
            BitAnd | BitOr | BitXor if l == BaseType::Boolean && r == BaseType::Boolean => {
                BaseType::Boolean
            }
            Shl | Shr | UShr => unary_promotion(l),
            _ => binary_promotion(l, r),
        };
        Typed::value(Some(self.primitive(result)))
    }
}

fn is_diamond(ty: &nova_hir::TypeRef) -> bool {
    match &ty.kind {
        TypeRefKind::Named(segments) => segments
            .last()
            .is_some_and(|segment| segment.args.as_ref().is_some_and(Vec::is_empty)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use nova_core::{FileId, TypeName};
    use nova_hir::{BinaryOp, HirBuilder, NodeId, PrimitiveType, Stmt, StmtKind};
    use pretty_assertions::assert_eq;

    use crate::options::ResolveOptions;
    use crate::project::Project;
    use crate::session::Session;

    fn initializer_id(stmt: &Stmt) -> NodeId {
        match &stmt.kind {
            StmtKind::Local(local) => local.initializer.as_ref().map(|init| init.id).unwrap(),
            StmtKind::Expr(expr) => expr.id,
            _ => unreachable!(),
        }
    }

    fn project_with_body(build: impl FnOnce(&mut HirBuilder) -> Vec<Stmt>) -> Project {
        let mut b = HirBuilder::new(FileId::from_raw(0));
        let mut unit = b.unit(Some("p"));
        unit.imports.push(b.import_on_demand("java.util"));
        let mut class = b.class("A");
        let stmts = build(&mut b);
        let body = b.block(stmts);
        let void = b.void();
        class.methods.push(b.method("m", void, Vec::new()).with_body(body));
        unit.types.push(class);
        let mut project = Project::with_minimal_jdk();
        project.set_unit(unit);
        project
    }

    #[test]
    fn generic_calls_are_inferred_and_arguments_boxed() {
        let mut ids = Vec::new();
        let project = project_with_body(|b| {
            let integer = b.ty("Integer");
            let ty = b.generic("List", vec![integer]);
            let one = b.int(1);
            ids.push(one.id);
            let target = b.name("Collections");
            let call = b.call(Some(target), "singletonList", vec![one]);
            let stmt = b.local("l", ty, Some(call));
            ids.push(initializer_id(&stmt));
            vec![stmt]
        });
        let mut session = Session::new(&project, ResolveOptions::default());
        let unit = session.resolve_unit(FileId::from_raw(0)).unwrap();

        let integer = session.lookup_type(&TypeName::new("java.lang.Integer")).unwrap();
        let list = session.lookup_type(&TypeName::new("java.util.List")).unwrap();
        let list_of_integer = session.parameterize(list, vec![integer]).unwrap();
        let call = unit.node(ids[1]).unwrap();
        let method = call.binding.unwrap();
        assert_eq!(session.type_arguments(method), vec![integer]);
        assert_eq!(call.type_binding, Some(list_of_integer));
        assert!(!call.is_recovered());
        assert!(unit.node(ids[0]).unwrap().boxing);
    }

    #[test]
    fn diamond_takes_type_arguments_from_the_target() {
        let mut id = None;
        let project = project_with_body(|b| {
            let string = b.ty("String");
            let ty = b.generic("List", vec![string]);
            let created = b.diamond("ArrayList");
            let new = b.new_instance(created, Vec::new());
            id = Some(new.id);
            vec![b.local("l", ty, Some(new))]
        });
        let mut session = Session::new(&project, ResolveOptions::default());
        let unit = session.resolve_unit(FileId::from_raw(0)).unwrap();

        let string = session.string();
        let array_list = session
            .lookup_type(&TypeName::new("java.util.ArrayList"))
            .unwrap();
        let expected = session.parameterize(array_list, vec![string]);
        let node = unit.node(id.unwrap()).unwrap();
        assert_eq!(node.type_binding, expected);
        let ctor = node.binding.unwrap();
        assert!(session.binding(ctor).as_method().unwrap().is_constructor);
    }

    #[test]
    fn operators_promote_and_concatenate() {
        let mut ids = Vec::new();
        let project = project_with_body(|b| {
            let s = b.string("a");
            let one = b.int(1);
            let concat = b.binary(BinaryOp::Add, s, one);
            ids.push(concat.id);
            let string = b.ty("String");
            let first = b.local("s", string, Some(concat));

            let one = b.int(1);
            let two = b.lit(nova_hir::Literal::Long(2));
            let sum = b.binary(BinaryOp::Add, one, two);
            ids.push(sum.id);
            let long = b.prim(PrimitiveType::Long);
            let second = b.local("n", long, Some(sum));
            vec![first, second]
        });
        let mut session = Session::new(&project, ResolveOptions::default());
        let unit = session.resolve_unit(FileId::from_raw(0)).unwrap();

        let string = session.string();
        let long = session.primitive(nova_classfile::BaseType::Long);
        assert_eq!(unit.type_binding(ids[0]), Some(string));
        assert_eq!(unit.type_binding(ids[1]), Some(long));
    }

    #[test]
    fn unresolved_calls_are_recovered() {
        let mut id = None;
        let project = project_with_body(|b| {
            let call = b.call(None, "nope", Vec::new());
            id = Some(call.id);
            vec![b.expr_stmt(call)]
        });
        let mut session = Session::new(&project, ResolveOptions::default());
        let unit = session.resolve_unit(FileId::from_raw(0)).unwrap();

        let node = unit.node(id.unwrap()).unwrap();
        assert_eq!(node.binding, None);
        assert!(node.is_recovered());
        assert!(!node.is_malformed());
    }
}
