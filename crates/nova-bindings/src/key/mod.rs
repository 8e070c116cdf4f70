//! Binding keys: canonical strings that identify a binding across sessions.
//!
//! ```text
//! Lp/X<TT;>;                      generic declaration p.X<T>
//! Lp/X<>;                         raw p.X
//! Lp/X<Ljava/lang/String;>;       p.X<String>
//! Lp/X<>.Y;                       member type Y of raw p.X
//! Lp/X<TT;>;:TT;                  type variable T of p.X
//! Lp/X;.m<TU;>(TU;[I)V            method <U> void m(U, int[])
//! Lp/X;.m()V%<Ljava/lang/String;> m instantiated with String
//! Lp/X;.f)Ljava/lang/String;      field f
//! Lp/X;.m()V#i#0#1                local i of m (occurrence 0, rank 1)
//! Lp/X;@Lp/A;                     annotation @A on p.X
//! Lp/X;@Lp/A;#1                   second use of @A on p.X
//! !0&Lp/X;{0}+Ljava/lang/String;*42
//!                                 capture of `? extends String` ending at offset 42 of file 0
//! java/lang                       package java.lang
//! ```

mod decode;
mod encode;
mod parse;

use std::ops::Range;

use nova_classfile::BaseType;

use crate::binding::WildcardKind;
use crate::error::KeyParseError;

pub(crate) use parse::parse_key;

/// Checks that `key` is well-formed without resolving it.
pub fn validate_key(key: &str, max_depth: usize) -> Result<(), KeyParseError> {
    parse_key(key, max_depth).map(|_| ())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KeyNode {
    pub(crate) kind: KeyKind,
    /// Byte range of this node within the parsed key.
    pub(crate) span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ClassSegment {
    pub(crate) name: String,
    /// `None` without `<...>`; an empty list for `<>`.
    pub(crate) args: Option<Vec<KeyNode>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum KeyKind {
    Package(String),
    Primitive(BaseType),
    Void,
    Null,
    Array {
        dims: u32,
        element: Box<KeyNode>,
    },
    /// Outermost segment first; the first segment carries the internal binary name.
    Class(Vec<ClassSegment>),
    /// `TT;` resolved against the enclosing owners, or `<owner>:TT;`. Declared bounds only
    /// appear in type parameter declarations.
    TypeVar {
        owner: Option<Box<KeyNode>>,
        name: String,
        bounds: Vec<KeyNode>,
    },
    Wildcard {
        kind: WildcardKind,
        bound: Option<Box<KeyNode>>,
    },
    Capture {
        file: u32,
        generic: Box<KeyNode>,
        rank: u32,
        wildcard: Box<KeyNode>,
        offset: u32,
    },
    /// A capture referring back, by offset, to one being written.
    CaptureRef(u32),
    Method {
        declaring: Box<KeyNode>,
        name: String,
        type_params: Vec<KeyNode>,
        params: Vec<KeyNode>,
        ret: Box<KeyNode>,
    },
    Field {
        declaring: Box<KeyNode>,
        name: String,
        ty: Box<KeyNode>,
    },
    Local {
        member: Box<KeyNode>,
        name: String,
        occurrence: u32,
        rank: u32,
    },
    Annotation {
        annotated: Box<KeyNode>,
        ty: Box<KeyNode>,
        /// Position among the uses of the same annotation type on `annotated`.
        ordinal: u32,
    },
    Instance {
        method: Box<KeyNode>,
        args: Vec<KeyNode>,
    },
}
