use std::fmt;

/// An annotation recorded on a dependency class, field or method.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub type_descriptor: String,
    pub type_internal_name: Option<String>,
    pub elements: Vec<(String, ElementValue)>,
}

impl Annotation {
    pub fn new(type_descriptor: impl Into<String>) -> Self {
        let type_descriptor = type_descriptor.into();
        let type_internal_name = descriptor_to_internal_name(&type_descriptor);
        Self {
            type_descriptor,
            type_internal_name,
            elements: Vec::new(),
        }
    }

    pub fn with_element(mut self, name: impl Into<String>, value: ElementValue) -> Self {
        self.elements.push((name.into(), value));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Const(ConstValue),
    Enum {
        type_descriptor: String,
        const_name: String,
    },
    /// A class literal, stored as a return descriptor (`Ljava/lang/String;`, `V`).
    Class(String),
    Annotation(Box<Annotation>),
    Array(Vec<ElementValue>),
}

/// A compile-time constant as stored in `ConstantValue` attributes and annotation elements.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    String(String),
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Byte(v) => write!(f, "{v}"),
            ConstValue::Char(v) => write!(f, "{v}"),
            ConstValue::Short(v) => write!(f, "{v}"),
            ConstValue::Int(v) => write!(f, "{v}"),
            ConstValue::Long(v) => write!(f, "{v}"),
            ConstValue::Float(v) => write!(f, "{v}"),
            ConstValue::Double(v) => write!(f, "{v}"),
            ConstValue::Boolean(v) => write!(f, "{v}"),
            ConstValue::String(v) => f.write_str(v),
        }
    }
}

pub fn descriptor_to_internal_name(desc: &str) -> Option<String> {
    desc.strip_prefix('L')
        .and_then(|rest| rest.strip_suffix(';'))
        .map(|name| name.to_string())
}
