//! The binding model.
//!
//! Every semantic entity the resolver can name is one variant of the closed [`Binding`] enum and
//! lives in the session arena under a [`BindingId`]. Identity of a binding is identity of its id:
//! the interner guarantees that structurally equal bindings share one id, except captures, which
//! are additionally keyed by their syntactic occurrence.

use std::fmt;

use nova_classfile::{BaseType, ConstValue};
use nova_core::{FileId, Name, PackageName, TextRange, TypeName};
use nova_hir::{Modifiers, NodeId, TypeKind};

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u32);

impl BindingId {
    #[inline]
    pub(crate) fn from_index(idx: usize) -> Self {
        BindingId(idx as u32)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BindingId({})", self.0)
    }
}

#[derive(Debug, Clone)]
pub enum Binding {
    Package(PackageBinding),
    Primitive(BaseType),
    Null,
    Void,
    Type(TypeBinding),
    Array(ArrayBinding),
    TypeVariable(TypeVariableBinding),
    Wildcard(WildcardBinding),
    Parameterized(ParameterizedBinding),
    Raw(RawBinding),
    Capture(CaptureBinding),
    Method(MethodBinding),
    Variable(VariableBinding),
    Annotation(AnnotationBinding),
}

impl Binding {
    /// Whether this binding denotes a type (as opposed to a package, member or annotation).
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            Binding::Primitive(_)
                | Binding::Null
                | Binding::Void
                | Binding::Type(_)
                | Binding::Array(_)
                | Binding::TypeVariable(_)
                | Binding::Wildcard(_)
                | Binding::Parameterized(_)
                | Binding::Raw(_)
                | Binding::Capture(_)
        )
    }

    /// Whether values of this type are references (everything but primitives and `void`).
    pub fn is_reference(&self) -> bool {
        self.is_type() && !matches!(self, Binding::Primitive(_) | Binding::Void)
    }

    pub fn as_type(&self) -> Option<&TypeBinding> {
        match self {
            Binding::Type(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodBinding> {
        match self {
            Binding::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&VariableBinding> {
        match self {
            Binding::Variable(var) => Some(var),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Binding::Package(_) => "package",
            Binding::Primitive(_) => "primitive",
            Binding::Null => "null",
            Binding::Void => "void",
            Binding::Type(_) => "type",
            Binding::Array(_) => "array",
            Binding::TypeVariable(_) => "type variable",
            Binding::Wildcard(_) => "wildcard",
            Binding::Parameterized(_) => "parameterized type",
            Binding::Raw(_) => "raw type",
            Binding::Capture(_) => "capture",
            Binding::Method(_) => "method",
            Binding::Variable(_) => "variable",
            Binding::Annotation(_) => "annotation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageBinding {
    pub name: PackageName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeOrigin {
    Source { file: FileId },
    Dependency,
    /// Fabricated for a reference that could not be resolved.
    Missing,
}

/// A class, interface, enum or annotation type as declared.
///
/// For generic types this binding doubles as the generic declaration; references with type
/// arguments are [`ParameterizedBinding`]s and references without them are [`RawBinding`]s.
#[derive(Debug, Clone)]
pub struct TypeBinding {
    pub name: TypeName,
    pub kind: TypeKind,
    pub modifiers: Modifiers,
    pub enclosing: Option<BindingId>,
    pub origin: TypeOrigin,
    pub type_params: Vec<BindingId>,
    pub superclass: Option<BindingId>,
    pub interfaces: Vec<BindingId>,
    pub(crate) members: Option<Members>,
}

impl TypeBinding {
    pub fn is_from_source(&self) -> bool {
        matches!(self.origin, TypeOrigin::Source { .. })
    }

    pub fn is_missing(&self) -> bool {
        self.origin == TypeOrigin::Missing
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface | TypeKind::Annotation)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Members {
    pub(crate) fields: Vec<BindingId>,
    pub(crate) methods: Vec<BindingId>,
    pub(crate) types: Vec<BindingId>,
}

/// Arrays are flattened: `element` is never itself an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrayBinding {
    pub element: BindingId,
    pub dims: u32,
}

#[derive(Debug, Clone)]
pub struct TypeVariableBinding {
    /// The declaring type or method.
    pub owner: BindingId,
    pub name: Name,
    pub rank: u32,
    /// Never empty once the owner is loaded; `java.lang.Object` when nothing was declared.
    pub bounds: Vec<BindingId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WildcardKind {
    Unbounded,
    Extends,
    Super,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WildcardBinding {
    pub kind: WildcardKind,
    pub bound: Option<BindingId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterizedBinding {
    pub generic: BindingId,
    /// Set when this is a member type of a parameterized or raw type.
    pub enclosing: Option<BindingId>,
    pub args: Vec<BindingId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBinding {
    pub generic: BindingId,
    pub enclosing: Option<BindingId>,
}

/// The syntactic occurrence a capture was allocated for: the end offset of the captured
/// expression within its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaptureSite {
    pub file: FileId,
    pub offset: u32,
}

#[derive(Debug, Clone)]
pub struct CaptureBinding {
    pub wildcard: BindingId,
    /// The generic declaration whose type argument was captured.
    pub generic: BindingId,
    pub rank: u32,
    pub site: CaptureSite,
    pub upper_bounds: Vec<BindingId>,
    pub lower_bound: Option<BindingId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberOrigin {
    /// `node` is `None` for implicit members (default constructors, enum helpers).
    Source { file: FileId, node: Option<NodeId> },
    Dependency,
}

#[derive(Debug, Clone)]
pub struct MethodBinding {
    pub declaring: BindingId,
    pub name: Name,
    pub params: Vec<BindingId>,
    pub ret: BindingId,
    pub type_params: Vec<BindingId>,
    /// Explicit or inferred type arguments of a generic method instantiation.
    pub type_args: Vec<BindingId>,
    pub modifiers: Modifiers,
    pub is_varargs: bool,
    pub is_constructor: bool,
    pub is_default_constructor: bool,
    /// The declared method this one was derived from; itself for declarations.
    pub declaration: BindingId,
    /// For instantiations: the method that was instantiated.
    pub instance_of: Option<BindingId>,
    pub origin: MemberOrigin,
    /// Annotation type members only.
    pub default_value: Option<AnnotationValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Field,
    EnumConstant,
    Parameter,
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalIdentity {
    /// Number of earlier locals with the same name in the same member.
    pub occurrence: u32,
    /// Declaration ordinal within the member, parameters first.
    pub rank: u32,
    pub range: TextRange,
}

#[derive(Debug, Clone)]
pub struct VariableBinding {
    pub kind: VariableKind,
    /// The declaring type for fields, the declaring method for parameters and locals.
    pub declaring: BindingId,
    pub name: Name,
    pub ty: BindingId,
    pub modifiers: Modifiers,
    pub constant: Option<ConstValue>,
    /// The field as declared; itself unless viewed through a parameterized or raw type.
    pub declaration: BindingId,
    pub local: Option<LocalIdentity>,
    pub origin: MemberOrigin,
    pub(crate) constant_state: ConstantState,
}

impl VariableBinding {
    pub fn is_field(&self) -> bool {
        matches!(self.kind, VariableKind::Field | VariableKind::EnumConstant)
    }

    pub fn is_enum_constant(&self) -> bool {
        self.kind == VariableKind::EnumConstant
    }

    pub fn is_parameter(&self) -> bool {
        self.kind == VariableKind::Parameter
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConstantState {
    Pending,
    InProgress,
    Done,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    Const(ConstValue),
    EnumConstant(BindingId),
    Type(BindingId),
    Annotation(BindingId),
    Array(Vec<AnnotationValue>),
}

#[derive(Debug, Clone)]
pub struct AnnotationBinding {
    pub annotated: BindingId,
    pub ty: BindingId,
    /// Distinguishes repeated uses of `ty` on `annotated`, counting from 0.
    pub ordinal: u32,
    pub explicit: Vec<(Name, AnnotationValue)>,
    /// Explicit pairs followed by the defaults of every member not given explicitly.
    pub all: Vec<(Name, AnnotationValue)>,
}
