use nova_core::{FileId, Name, PackageName, QualifiedName, TextRange, TextSize};

use crate::{
    AnnotationArg, AnnotationUse, BinaryOp, Block, CompilationUnit, EnumConstantDecl, Expr,
    ExprKind, FieldDecl, ImportDecl, ImportKind, Literal, LocalVarDecl, MethodDecl, Modifiers,
    NodeFlags, NodeId, PackageDecl, ParamDecl, PrimitiveType, Stmt, StmtKind, TypeDecl, TypeKind,
    TypeParamDecl, TypeRef, TypeRefKind, TypeRefSegment, UnaryOp, WildcardBoundKind,
};

/// Synthesizes HIR for callers that don't go through the parser (code generators, tests).
///
/// Every node receives a fresh [`NodeId`] and a distinct, non-overlapping text range. Ranges
/// are laid out in construction order, so they are unique per unit but do not nest.
#[derive(Debug)]
pub struct HirBuilder {
    file: FileId,
    next_id: u32,
    cursor: u32,
}

impl HirBuilder {
    pub fn new(file: FileId) -> Self {
        Self {
            file,
            next_id: 0,
            cursor: 0,
        }
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    fn id(&mut self) -> NodeId {
        let id = NodeId::from_raw(self.next_id);
        self.next_id += 1;
        id
    }

    fn range(&mut self, len: usize) -> TextRange {
        let len = u32::try_from(len.max(1)).unwrap_or(u32::MAX / 2);
        let start = self.cursor;
        self.cursor = self.cursor.saturating_add(len + 1);
        TextRange::at(TextSize::from(start), TextSize::from(len))
    }

    pub fn unit(&mut self, package: Option<&str>) -> CompilationUnit {
        let package = package.map(|name| PackageDecl {
            id: self.id(),
            name: PackageName::from_dotted(name),
            range: self.range(name.len()),
            flags: NodeFlags::NONE,
        });
        CompilationUnit {
            file: self.file,
            package,
            imports: Vec::new(),
            types: Vec::new(),
        }
    }

    pub fn import(&mut self, kind: ImportKind) -> ImportDecl {
        ImportDecl {
            id: self.id(),
            kind,
            range: self.range(8),
            flags: NodeFlags::NONE,
        }
    }

    pub fn import_single(&mut self, name: &str) -> ImportDecl {
        self.import(ImportKind::Single(QualifiedName::from_dotted(name)))
    }

    pub fn import_on_demand(&mut self, name: &str) -> ImportDecl {
        self.import(ImportKind::OnDemand(QualifiedName::from_dotted(name)))
    }

    pub fn type_decl(&mut self, kind: TypeKind, name: &str) -> TypeDecl {
        let id = self.id();
        let range = self.range(name.len() + 8);
        let name_range = self.range(name.len());
        TypeDecl {
            id,
            kind,
            name: Name::from(name),
            name_range,
            modifiers: Modifiers::none(),
            type_params: Vec::new(),
            extends: None,
            implements: Vec::new(),
            enum_constants: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            nested: Vec::new(),
            annotations: Vec::new(),
            range,
            flags: NodeFlags::NONE,
        }
    }

    pub fn class(&mut self, name: &str) -> TypeDecl {
        self.type_decl(TypeKind::Class, name)
    }

    pub fn interface(&mut self, name: &str) -> TypeDecl {
        self.type_decl(TypeKind::Interface, name)
    }

    pub fn enum_decl(&mut self, name: &str) -> TypeDecl {
        self.type_decl(TypeKind::Enum, name)
    }

    pub fn annotation_decl(&mut self, name: &str) -> TypeDecl {
        self.type_decl(TypeKind::Annotation, name)
    }

    pub fn type_param(&mut self, name: &str, bounds: Vec<TypeRef>) -> TypeParamDecl {
        TypeParamDecl {
            id: self.id(),
            name: Name::from(name),
            bounds,
            range: self.range(name.len()),
            flags: NodeFlags::NONE,
        }
    }

    pub fn enum_constant(&mut self, name: &str) -> EnumConstantDecl {
        EnumConstantDecl {
            id: self.id(),
            name: Name::from(name),
            args: Vec::new(),
            annotations: Vec::new(),
            range: self.range(name.len()),
            flags: NodeFlags::NONE,
        }
    }

    pub fn field(&mut self, name: &str, ty: TypeRef) -> FieldDecl {
        FieldDecl {
            id: self.id(),
            name: Name::from(name),
            modifiers: Modifiers::none(),
            ty,
            initializer: None,
            annotations: Vec::new(),
            range: self.range(name.len()),
            flags: NodeFlags::NONE,
        }
    }

    pub fn method(&mut self, name: &str, return_type: TypeRef, params: Vec<ParamDecl>) -> MethodDecl {
        self.method_decl(name, Some(return_type), params)
    }

    pub fn constructor(&mut self, type_name: &str, params: Vec<ParamDecl>) -> MethodDecl {
        self.method_decl(type_name, None, params)
    }

    fn method_decl(
        &mut self,
        name: &str,
        return_type: Option<TypeRef>,
        params: Vec<ParamDecl>,
    ) -> MethodDecl {
        MethodDecl {
            id: self.id(),
            name: Name::from(name),
            modifiers: Modifiers::none(),
            type_params: Vec::new(),
            params,
            return_type,
            body: None,
            default_value: None,
            annotations: Vec::new(),
            range: self.range(name.len()),
            flags: NodeFlags::NONE,
        }
    }

    pub fn param(&mut self, name: &str, ty: TypeRef) -> ParamDecl {
        ParamDecl {
            id: self.id(),
            name: Name::from(name),
            ty,
            is_varargs: false,
            is_final: false,
            annotations: Vec::new(),
            range: self.range(name.len()),
            flags: NodeFlags::NONE,
        }
    }

    pub fn varargs_param(&mut self, name: &str, element: TypeRef) -> ParamDecl {
        ParamDecl {
            is_varargs: true,
            ..self.param(name, element)
        }
    }

    pub fn annotation(&mut self, name: &str, args: Vec<(Option<&str>, Expr)>) -> AnnotationUse {
        let id = self.id();
        let range = self.range(name.len() + 1);
        let ty = self.ty(name);
        let args = args
            .into_iter()
            .map(|(name, value)| AnnotationArg {
                id: self.id(),
                name: name.map(Name::from),
                value,
                range: self.range(name.map_or(1, str::len)),
            })
            .collect();
        AnnotationUse {
            id,
            ty,
            args,
            range,
            flags: NodeFlags::NONE,
        }
    }

    // Types

    fn type_ref(&mut self, kind: TypeRefKind, len: usize) -> TypeRef {
        TypeRef {
            id: self.id(),
            kind,
            range: self.range(len),
            flags: NodeFlags::NONE,
        }
    }

    /// A possibly-qualified type name without type arguments (`String`, `java.util.List`).
    pub fn ty(&mut self, dotted: &str) -> TypeRef {
        let segments = dotted
            .split('.')
            .map(|seg| TypeRefSegment {
                name: Name::from(seg),
                args: None,
                range: self.range(seg.len()),
            })
            .collect();
        self.type_ref(TypeRefKind::Named(segments), dotted.len())
    }

    /// A type name whose last segment carries type arguments (`List<String>`).
    pub fn generic(&mut self, dotted: &str, args: Vec<TypeRef>) -> TypeRef {
        let mut ty = self.ty(dotted);
        if let TypeRefKind::Named(segments) = &mut ty.kind {
            if let Some(last) = segments.last_mut() {
                last.args = Some(args);
            }
        }
        ty
    }

    /// A type name given segment by segment (`Outer<String>.Inner<Integer>`).
    pub fn qualified(&mut self, segments: Vec<(&str, Option<Vec<TypeRef>>)>) -> TypeRef {
        let len = segments.iter().map(|(n, _)| n.len() + 1).sum();
        let segments = segments
            .into_iter()
            .map(|(name, args)| TypeRefSegment {
                name: Name::from(name),
                args,
                range: self.range(name.len()),
            })
            .collect();
        self.type_ref(TypeRefKind::Named(segments), len)
    }

    pub fn diamond(&mut self, dotted: &str) -> TypeRef {
        self.generic(dotted, Vec::new())
    }

    pub fn prim(&mut self, prim: PrimitiveType) -> TypeRef {
        self.type_ref(TypeRefKind::Primitive(prim), 3)
    }

    pub fn void(&mut self) -> TypeRef {
        self.type_ref(TypeRefKind::Void, 4)
    }

    pub fn array(&mut self, element: TypeRef, dims: u32) -> TypeRef {
        self.type_ref(
            TypeRefKind::Array {
                element: Box::new(element),
                dims,
            },
            2 * dims as usize,
        )
    }

    pub fn wildcard(&mut self) -> TypeRef {
        self.type_ref(TypeRefKind::Wildcard { bound: None }, 1)
    }

    pub fn extends(&mut self, bound: TypeRef) -> TypeRef {
        self.type_ref(
            TypeRefKind::Wildcard {
                bound: Some((WildcardBoundKind::Extends, Box::new(bound))),
            },
            9,
        )
    }

    pub fn super_(&mut self, bound: TypeRef) -> TypeRef {
        self.type_ref(
            TypeRefKind::Wildcard {
                bound: Some((WildcardBoundKind::Super, Box::new(bound))),
            },
            7,
        )
    }

    /// A type the parser had to invent; flagged malformed.
    pub fn missing_type(&mut self) -> TypeRef {
        let mut ty = self.type_ref(TypeRefKind::Missing, 1);
        ty.flags = NodeFlags::MALFORMED;
        ty
    }

    // Statements

    pub fn block(&mut self, stmts: Vec<Stmt>) -> Block {
        Block {
            id: self.id(),
            stmts,
            range: self.range(2),
            flags: NodeFlags::NONE,
        }
    }

    fn stmt(&mut self, kind: StmtKind) -> Stmt {
        Stmt {
            id: self.id(),
            kind,
            range: self.range(1),
            flags: NodeFlags::NONE,
        }
    }

    pub fn local(&mut self, name: &str, ty: TypeRef, initializer: Option<Expr>) -> Stmt {
        let decl = LocalVarDecl {
            id: self.id(),
            name: Name::from(name),
            ty,
            is_final: false,
            initializer,
            range: self.range(name.len()),
            flags: NodeFlags::NONE,
        };
        self.stmt(StmtKind::Local(decl))
    }

    pub fn final_local(&mut self, name: &str, ty: TypeRef, initializer: Expr) -> Stmt {
        let mut stmt = self.local(name, ty, Some(initializer));
        if let StmtKind::Local(decl) = &mut stmt.kind {
            decl.is_final = true;
        }
        stmt
    }

    pub fn expr_stmt(&mut self, expr: Expr) -> Stmt {
        self.stmt(StmtKind::Expr(expr))
    }

    pub fn ret(&mut self, expr: Option<Expr>) -> Stmt {
        self.stmt(StmtKind::Return(expr))
    }

    pub fn block_stmt(&mut self, block: Block) -> Stmt {
        self.stmt(StmtKind::Block(block))
    }

    // Expressions

    fn expr(&mut self, kind: ExprKind, len: usize) -> Expr {
        Expr {
            id: self.id(),
            kind,
            range: self.range(len),
            flags: NodeFlags::NONE,
        }
    }

    pub fn lit(&mut self, lit: Literal) -> Expr {
        self.expr(ExprKind::Literal(lit), 1)
    }

    pub fn int(&mut self, value: i32) -> Expr {
        self.lit(Literal::Int(value))
    }

    pub fn string(&mut self, value: &str) -> Expr {
        self.expr(ExprKind::Literal(Literal::String(value.to_string())), value.len() + 2)
    }

    pub fn boolean(&mut self, value: bool) -> Expr {
        self.lit(Literal::Boolean(value))
    }

    pub fn null(&mut self) -> Expr {
        self.expr(ExprKind::Literal(Literal::Null), 4)
    }

    pub fn name(&mut self, name: &str) -> Expr {
        self.expr(ExprKind::Name(Name::from(name)), name.len())
    }

    /// A dotted name expression (`java.lang.Math.PI`) as nested field accesses.
    pub fn path(&mut self, dotted: &str) -> Expr {
        let mut segments = dotted.split('.');
        let first = segments.next().unwrap_or_default();
        let mut expr = self.name(first);
        for seg in segments {
            expr = self.field_access(expr, seg);
        }
        expr
    }

    pub fn field_access(&mut self, target: Expr, name: &str) -> Expr {
        self.expr(
            ExprKind::FieldAccess {
                target: Box::new(target),
                name: Name::from(name),
            },
            name.len(),
        )
    }

    pub fn call(&mut self, target: Option<Expr>, name: &str, args: Vec<Expr>) -> Expr {
        self.expr(
            ExprKind::MethodCall {
                target: target.map(Box::new),
                name: Name::from(name),
                type_args: None,
                args,
            },
            name.len() + 2,
        )
    }

    pub fn call_with_type_args(
        &mut self,
        target: Option<Expr>,
        name: &str,
        type_args: Vec<TypeRef>,
        args: Vec<Expr>,
    ) -> Expr {
        self.expr(
            ExprKind::MethodCall {
                target: target.map(Box::new),
                name: Name::from(name),
                type_args: Some(type_args),
                args,
            },
            name.len() + 4,
        )
    }

    pub fn new_instance(&mut self, ty: TypeRef, args: Vec<Expr>) -> Expr {
        self.expr(ExprKind::New { ty, args }, 5)
    }

    pub fn cast(&mut self, ty: TypeRef, expr: Expr) -> Expr {
        self.expr(
            ExprKind::Cast {
                ty,
                expr: Box::new(expr),
            },
            2,
        )
    }

    pub fn unary(&mut self, op: UnaryOp, expr: Expr) -> Expr {
        self.expr(
            ExprKind::Unary {
                op,
                expr: Box::new(expr),
            },
            1,
        )
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        self.expr(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            1,
        )
    }

    pub fn paren(&mut self, expr: Expr) -> Expr {
        self.expr(ExprKind::Paren(Box::new(expr)), 2)
    }

    pub fn this(&mut self) -> Expr {
        self.expr(ExprKind::This, 4)
    }

    pub fn class_literal(&mut self, ty: TypeRef) -> Expr {
        self.expr(ExprKind::ClassLiteral(ty), 6)
    }

    pub fn array_init(&mut self, elements: Vec<Expr>) -> Expr {
        self.expr(ExprKind::ArrayInit(elements), 2)
    }

    /// An expression the parser had to invent; flagged malformed.
    pub fn missing_expr(&mut self) -> Expr {
        let mut expr = self.expr(ExprKind::Missing, 1);
        expr.flags = NodeFlags::MALFORMED;
        expr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_allocates_distinct_ids_and_ranges() {
        let mut b = HirBuilder::new(FileId::from_raw(0));
        let a = b.ty("String");
        let c = b.ty("String");
        assert_ne!(a.id, c.id);
        assert_ne!(a.range, c.range);
        assert!(a.range.end() <= c.range.start());
    }

    #[test]
    fn diamond_has_empty_argument_list() {
        let mut b = HirBuilder::new(FileId::from_raw(0));
        let ty = b.diamond("java.util.ArrayList");
        let TypeRefKind::Named(segments) = &ty.kind else {
            panic!("expected named type");
        };
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[2].args.as_ref().map(Vec::len), Some(0));
        assert!(segments[0].args.is_none());
    }

    #[test]
    fn find_type_walks_nested_declarations() {
        let mut b = HirBuilder::new(FileId::from_raw(0));
        let mut unit = b.unit(Some("p"));
        let mut outer = b.class("Outer");
        outer.nested.push(b.class("Inner"));
        unit.types.push(outer);

        assert!(unit.find_type("Outer$Inner").is_some());
        assert!(unit.find_type("Outer$Missing").is_none());
        assert_eq!(unit.package_name(), PackageName::from_dotted("p"));
    }
}
