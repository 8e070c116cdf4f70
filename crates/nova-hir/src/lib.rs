//! High-level intermediate representation (HIR) for Java compilation units.
//!
//! The HIR is what the external parser hands to the binding resolver: a
//! declaration-shaped tree whose nodes carry a stable [`NodeId`], a text range
//! into the unit and [`NodeFlags`] describing error recovery.

mod builder;

use std::fmt;

use nova_core::{FileId, Name, PackageName, QualifiedName, TextRange};

pub use builder::HirBuilder;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        NodeId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Error-recovery markers set by the parser.
///
/// `MALFORMED` nodes were structurally repaired and are always `RECOVERED` too.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeFlags(u8);

impl NodeFlags {
    pub const NONE: NodeFlags = NodeFlags(0);
    pub const RECOVERED: NodeFlags = NodeFlags(0b01);
    pub const MALFORMED: NodeFlags = NodeFlags(0b11);

    #[inline]
    pub fn is_recovered(self) -> bool {
        self.0 & Self::RECOVERED.0 != 0
    }

    #[inline]
    pub fn is_malformed(self) -> bool {
        self.0 & 0b10 != 0
    }

    #[must_use]
    pub fn union(self, other: NodeFlags) -> NodeFlags {
        NodeFlags(self.0 | other.0)
    }
}

impl fmt::Debug for NodeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.is_recovered(), self.is_malformed()) {
            (_, true) => f.write_str("MALFORMED"),
            (true, false) => f.write_str("RECOVERED"),
            _ => f.write_str("NONE"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub file: FileId,
    pub package: Option<PackageDecl>,
    pub imports: Vec<ImportDecl>,
    pub types: Vec<TypeDecl>,
}

impl CompilationUnit {
    pub fn package_name(&self) -> PackageName {
        self.package
            .as_ref()
            .map(|p| p.name.clone())
            .unwrap_or_default()
    }

    /// Finds a (possibly nested) type declaration by its `$`-separated path relative to the unit,
    /// e.g. `Outer$Inner`.
    pub fn find_type(&self, relative_binary_name: &str) -> Option<&TypeDecl> {
        let mut segments = relative_binary_name.split('$');
        let first = segments.next()?;
        let mut current = self.types.iter().find(|t| t.name == first)?;
        for seg in segments {
            current = current.nested.iter().find(|t| t.name == seg)?;
        }
        Some(current)
    }
}

#[derive(Debug, Clone)]
pub struct PackageDecl {
    pub id: NodeId,
    pub name: PackageName,
    pub range: TextRange,
    pub flags: NodeFlags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportKind {
    /// `import java.util.List;`
    Single(QualifiedName),
    /// `import java.util.*;` (package or type)
    OnDemand(QualifiedName),
    /// `import static java.lang.Math.max;`
    StaticSingle { ty: QualifiedName, member: Name },
    /// `import static java.lang.Math.*;`
    StaticOnDemand(QualifiedName),
}

#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub id: NodeId,
    pub kind: ImportKind,
    pub range: TextRange,
    pub flags: NodeFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub is_public: bool,
    pub is_private: bool,
    pub is_protected: bool,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
}

impl Modifiers {
    pub const fn none() -> Self {
        Modifiers {
            is_public: false,
            is_private: false,
            is_protected: false,
            is_static: false,
            is_final: false,
            is_abstract: false,
        }
    }

    pub const fn static_() -> Self {
        Modifiers {
            is_static: true,
            ..Self::none()
        }
    }

    pub const fn final_() -> Self {
        Modifiers {
            is_final: true,
            ..Self::none()
        }
    }

    pub const fn static_final() -> Self {
        Modifiers {
            is_static: true,
            is_final: true,
            ..Self::none()
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub id: NodeId,
    pub kind: TypeKind,
    pub name: Name,
    pub name_range: TextRange,
    pub modifiers: Modifiers,
    pub type_params: Vec<TypeParamDecl>,
    /// `extends` clause of a class.
    pub extends: Option<TypeRef>,
    /// `implements` clause of a class/enum, or `extends` clause of an interface.
    pub implements: Vec<TypeRef>,
    pub enum_constants: Vec<EnumConstantDecl>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub nested: Vec<TypeDecl>,
    pub annotations: Vec<AnnotationUse>,
    pub range: TextRange,
    pub flags: NodeFlags,
}

#[derive(Debug, Clone)]
pub struct TypeParamDecl {
    pub id: NodeId,
    pub name: Name,
    pub bounds: Vec<TypeRef>,
    pub range: TextRange,
    pub flags: NodeFlags,
}

#[derive(Debug, Clone)]
pub struct EnumConstantDecl {
    pub id: NodeId,
    pub name: Name,
    pub args: Vec<Expr>,
    pub annotations: Vec<AnnotationUse>,
    pub range: TextRange,
    pub flags: NodeFlags,
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub id: NodeId,
    pub name: Name,
    pub modifiers: Modifiers,
    pub ty: TypeRef,
    pub initializer: Option<Expr>,
    pub annotations: Vec<AnnotationUse>,
    pub range: TextRange,
    pub flags: NodeFlags,
}

impl FieldDecl {
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_initializer(mut self, init: Expr) -> Self {
        self.initializer = Some(init);
        self
    }
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub id: NodeId,
    pub name: Name,
    pub modifiers: Modifiers,
    pub type_params: Vec<TypeParamDecl>,
    pub params: Vec<ParamDecl>,
    /// `None` for constructors.
    pub return_type: Option<TypeRef>,
    pub body: Option<Block>,
    /// Annotation type members only: the `default` value.
    pub default_value: Option<Expr>,
    pub annotations: Vec<AnnotationUse>,
    pub range: TextRange,
    pub flags: NodeFlags,
}

impl MethodDecl {
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }

    pub fn is_varargs(&self) -> bool {
        self.params.last().is_some_and(|p| p.is_varargs)
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Block) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub id: NodeId,
    pub name: Name,
    /// For varargs parameters this is the element type as written (`String` in `String...`).
    pub ty: TypeRef,
    pub is_varargs: bool,
    pub is_final: bool,
    pub annotations: Vec<AnnotationUse>,
    pub range: TextRange,
    pub flags: NodeFlags,
}

#[derive(Debug, Clone)]
pub struct AnnotationUse {
    pub id: NodeId,
    pub ty: TypeRef,
    pub args: Vec<AnnotationArg>,
    pub range: TextRange,
    pub flags: NodeFlags,
}

#[derive(Debug, Clone)]
pub struct AnnotationArg {
    pub id: NodeId,
    /// `None` for the single-element shorthand `@A(x)`, which means `value = x`.
    pub name: Option<Name>,
    pub value: Expr,
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WildcardBoundKind {
    Extends,
    Super,
}

#[derive(Debug, Clone)]
pub struct TypeRef {
    pub id: NodeId,
    pub kind: TypeRefKind,
    pub range: TextRange,
    pub flags: NodeFlags,
}

#[derive(Debug, Clone)]
pub enum TypeRefKind {
    Primitive(PrimitiveType),
    Void,
    /// `java.util.Map.Entry<K, V>`: one segment per dotted name.
    Named(Vec<TypeRefSegment>),
    Array { element: Box<TypeRef>, dims: u32 },
    Wildcard {
        bound: Option<(WildcardBoundKind, Box<TypeRef>)>,
    },
    /// A type the parser expected but could not find.
    Missing,
}

#[derive(Debug, Clone)]
pub struct TypeRefSegment {
    pub name: Name,
    /// `None` when no `<...>` follows the segment; `Some(vec![])` for the diamond `<>`.
    pub args: Option<Vec<TypeRef>>,
    pub range: TextRange,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub id: NodeId,
    pub stmts: Vec<Stmt>,
    pub range: TextRange,
    pub flags: NodeFlags,
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
    pub range: TextRange,
    pub flags: NodeFlags,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Local(LocalVarDecl),
    Expr(Expr),
    Return(Option<Expr>),
    Block(Block),
}

#[derive(Debug, Clone)]
pub struct LocalVarDecl {
    pub id: NodeId,
    pub name: Name,
    pub ty: TypeRef,
    pub is_final: bool,
    pub initializer: Option<Expr>,
    pub range: TextRange,
    pub flags: NodeFlags,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    String(String),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    BitNot,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub range: TextRange,
    pub flags: NodeFlags,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(Literal),
    /// A simple name; may denote a variable, a type or a package.
    Name(Name),
    FieldAccess {
        target: Box<Expr>,
        name: Name,
    },
    MethodCall {
        target: Option<Box<Expr>>,
        name: Name,
        type_args: Option<Vec<TypeRef>>,
        args: Vec<Expr>,
    },
    New {
        ty: TypeRef,
        args: Vec<Expr>,
    },
    Cast {
        ty: TypeRef,
        expr: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Paren(Box<Expr>),
    This,
    ClassLiteral(TypeRef),
    /// `{a, b}` in annotation values and array initializers.
    ArrayInit(Vec<Expr>),
    Missing,
}
