use crate::annotation::{Annotation, ConstValue, ElementValue};
use crate::descriptor::{parse_field_descriptor, parse_method_descriptor, FieldType, MethodDescriptor};
use crate::error::Result;
use crate::signature::{
    parse_class_signature, parse_field_signature, parse_method_signature, ClassSignature,
    FieldTypeSignature, MethodSignature,
};

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_VARARGS: u16 = 0x0080;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_ANNOTATION: u16 = 0x2000;
pub const ACC_ENUM: u16 = 0x4000;

/// Declaration-level view of a dependency class, as recorded by the classpath indexer.
///
/// Member types carry the access flags of their `InnerClasses` entry, so a static
/// member type has `ACC_STATIC` set here.
#[derive(Debug, Clone)]
pub struct ClassStub {
    pub internal_name: String,
    pub access_flags: u16,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub signature: Option<ClassSignature>,
    pub annotations: Vec<Annotation>,
    pub fields: Vec<FieldStub>,
    pub methods: Vec<MethodStub>,
}

#[derive(Debug, Clone)]
pub struct FieldStub {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub parsed_descriptor: FieldType,
    pub signature: Option<FieldTypeSignature>,
    pub constant_value: Option<ConstValue>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone)]
pub struct MethodStub {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub parsed_descriptor: MethodDescriptor,
    pub signature: Option<MethodSignature>,
    pub annotation_default: Option<ElementValue>,
    pub annotations: Vec<Annotation>,
}

impl ClassStub {
    pub fn new(internal_name: impl Into<String>, access_flags: u16) -> Self {
        Self {
            internal_name: internal_name.into(),
            access_flags,
            super_class: None,
            interfaces: Vec::new(),
            signature: None,
            annotations: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_super(mut self, internal_name: impl Into<String>) -> Self {
        self.super_class = Some(internal_name.into());
        self
    }

    pub fn with_interface(mut self, internal_name: impl Into<String>) -> Self {
        self.interfaces.push(internal_name.into());
        self
    }

    pub fn with_signature(mut self, signature: &str) -> Result<Self> {
        self.signature = Some(parse_class_signature(signature)?);
        Ok(self)
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_field(mut self, field: FieldStub) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: MethodStub) -> Self {
        self.methods.push(method);
        self
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags & ACC_INTERFACE != 0
    }

    pub fn is_annotation(&self) -> bool {
        self.access_flags & ACC_ANNOTATION != 0
    }

    pub fn is_enum(&self) -> bool {
        self.access_flags & ACC_ENUM != 0
    }

    pub fn field(&self, name: &str) -> Option<&FieldStub> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl FieldStub {
    pub fn new(access_flags: u16, name: impl Into<String>, descriptor: &str) -> Result<Self> {
        Ok(Self {
            access_flags,
            name: name.into(),
            descriptor: descriptor.to_string(),
            parsed_descriptor: parse_field_descriptor(descriptor)?,
            signature: None,
            constant_value: None,
            annotations: Vec::new(),
        })
    }

    pub fn with_signature(mut self, signature: &str) -> Result<Self> {
        self.signature = Some(parse_field_signature(signature)?);
        Ok(self)
    }

    pub fn with_constant(mut self, value: ConstValue) -> Self {
        self.constant_value = Some(value);
        self
    }

    pub fn is_static(&self) -> bool {
        self.access_flags & ACC_STATIC != 0
    }

    pub fn is_enum_constant(&self) -> bool {
        self.access_flags & ACC_ENUM != 0
    }
}

impl MethodStub {
    pub fn new(access_flags: u16, name: impl Into<String>, descriptor: &str) -> Result<Self> {
        Ok(Self {
            access_flags,
            name: name.into(),
            descriptor: descriptor.to_string(),
            parsed_descriptor: parse_method_descriptor(descriptor)?,
            signature: None,
            annotation_default: None,
            annotations: Vec::new(),
        })
    }

    pub fn with_signature(mut self, signature: &str) -> Result<Self> {
        self.signature = Some(parse_method_signature(signature)?);
        Ok(self)
    }

    pub fn with_default(mut self, value: ElementValue) -> Self {
        self.annotation_default = Some(value);
        self
    }

    pub fn is_static(&self) -> bool {
        self.access_flags & ACC_STATIC != 0
    }

    pub fn is_varargs(&self) -> bool {
        self.access_flags & ACC_VARARGS != 0
    }

    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }
}
