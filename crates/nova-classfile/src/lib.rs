//! Declaration-level model of dependency classes.
//!
//! Nova never resolves bindings from raw bytes on the hot path: dependencies are
//! indexed ahead of time into [`ClassStub`]s, whose descriptors and generic
//! signatures are parsed here.

#![forbid(unsafe_code)]

mod annotation;
mod descriptor;
mod error;
mod index;
mod jdk;
mod signature;
mod stub;

pub use crate::annotation::{descriptor_to_internal_name, Annotation, ConstValue, ElementValue};
pub use crate::descriptor::{parse_field_descriptor, parse_method_descriptor};
pub use crate::descriptor::{BaseType, FieldType, MethodDescriptor, ReturnType};
pub use crate::error::{Error, Result};
pub use crate::index::{ClassProvider, StubIndex};
pub use crate::signature::{
    parse_class_signature, parse_field_signature, parse_method_signature, ClassSignature,
    ClassTypeSignature, FieldTypeSignature, MethodSignature, SimpleClassTypeSignature,
    TypeArgument, TypeParameter, TypeSignature,
};
pub use crate::stub::{
    ClassStub, FieldStub, MethodStub, ACC_ABSTRACT, ACC_ANNOTATION, ACC_ENUM, ACC_FINAL,
    ACC_INTERFACE, ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC, ACC_STATIC, ACC_VARARGS,
};
