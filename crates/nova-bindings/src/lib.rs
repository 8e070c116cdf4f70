//! Binding resolution and binding keys for Java syntax trees.
//!
//! A [`Session`] borrows a [`Project`] snapshot and attaches semantic bindings to the nodes of
//! its compilation units: the type, method, field, variable or package every name denotes,
//! with generics, wildcard capture, raw types and boxing modelled the way the language does.
//! Every binding has a canonical string key ([`Session::key`]) that names it across sessions
//! and can be resolved back ([`Session::resolve_key`]) or mapped to its declaration
//! ([`Session::locate`], [`locate_key`]).
//!
//! Structurally equal bindings are interned, so binding identity is [`BindingId`] equality.
//! Captures are the exception: each syntactic occurrence gets its own.

#![forbid(unsafe_code)]

mod annotations;
mod batch;
mod binding;
mod capture;
mod constant;
mod decl_table;
mod erasure;
mod error;
mod interner;
mod key;
mod loader;
mod locator;
mod options;
mod project;
mod resolver;
mod session;
mod typeops;

pub use crate::batch::{resolve_batch, BatchSummary, BindingRequestor};
pub use crate::binding::{
    AnnotationBinding, AnnotationValue, ArrayBinding, Binding, BindingId, CaptureBinding,
    CaptureSite, LocalIdentity, MemberOrigin, MethodBinding, PackageBinding,
    ParameterizedBinding, RawBinding, TypeBinding, TypeOrigin, TypeVariableBinding,
    VariableBinding, VariableKind, WildcardBinding, WildcardKind,
};
pub use crate::error::{KeyParseError, OptionsError};
pub use crate::key::validate_key;
pub use crate::locator::{locate_key, Element, ElementOrigin};
pub use crate::options::ResolveOptions;
pub use crate::project::Project;
pub use crate::resolver::{NodeKind, ResolvedNode, ResolvedUnit};
pub use crate::session::Session;
