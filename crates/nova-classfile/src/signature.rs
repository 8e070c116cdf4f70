//! Generic `Signature` attribute grammar (JVMS 4.7.9.1).

use crate::descriptor::BaseType;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSignature {
    Base(BaseType),
    Class(ClassTypeSignature),
    TypeVariable(String),
    Array(Box<TypeSignature>),
}

/// Field signatures share the reference/primitive grammar of [`TypeSignature`].
pub type FieldTypeSignature = TypeSignature;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTypeSignature {
    /// Package segments (`["java", "util"]`).
    pub package: Vec<String>,
    /// Outermost type first; member types follow (`Map`, `Entry`).
    pub segments: Vec<SimpleClassTypeSignature>,
}

impl ClassTypeSignature {
    /// Slash-separated binary name, `$` between nested segments (`java/util/Map$Entry`).
    pub fn internal_name(&self) -> String {
        let mut out = String::new();
        for pkg in &self.package {
            out.push_str(pkg);
            out.push('/');
        }
        for (idx, seg) in self.segments.iter().enumerate() {
            if idx > 0 {
                out.push('$');
            }
            out.push_str(&seg.name);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleClassTypeSignature {
    pub name: String,
    pub type_arguments: Vec<TypeArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArgument {
    Any,
    Exact(Box<TypeSignature>),
    Extends(Box<TypeSignature>),
    Super(Box<TypeSignature>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    pub class_bound: Option<TypeSignature>,
    pub interface_bounds: Vec<TypeSignature>,
}

impl TypeParameter {
    /// All declared bounds in order (class bound first).
    pub fn bounds(&self) -> impl Iterator<Item = &TypeSignature> {
        self.class_bound.iter().chain(self.interface_bounds.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub super_class: ClassTypeSignature,
    pub interfaces: Vec<ClassTypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub parameters: Vec<TypeSignature>,
    /// `None` for `void`.
    pub return_type: Option<TypeSignature>,
    pub throws: Vec<TypeSignature>,
}

pub fn parse_class_signature(sig: &str) -> Result<ClassSignature> {
    let mut p = Parser::new(sig);
    let type_parameters = p.type_parameters_opt()?;
    let super_class = p.class_type()?;
    let mut interfaces = Vec::new();
    while !p.at_end() {
        interfaces.push(p.class_type()?);
    }
    Ok(ClassSignature {
        type_parameters,
        super_class,
        interfaces,
    })
}

pub fn parse_field_signature(sig: &str) -> Result<FieldTypeSignature> {
    let mut p = Parser::new(sig);
    let ty = p.reference_type()?;
    p.finish()?;
    Ok(ty)
}

pub fn parse_method_signature(sig: &str) -> Result<MethodSignature> {
    let mut p = Parser::new(sig);
    let type_parameters = p.type_parameters_opt()?;
    p.expect('(')?;
    let mut parameters = Vec::new();
    while !p.eat(')') {
        parameters.push(p.java_type()?);
    }
    let return_type = if p.eat('V') {
        None
    } else {
        Some(p.java_type()?)
    };
    let mut throws = Vec::new();
    while p.eat('^') {
        throws.push(p.reference_type()?);
    }
    p.finish()?;
    Ok(MethodSignature {
        type_parameters,
        parameters,
        return_type,
        throws,
    })
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn err(&self) -> Error {
        Error::InvalidSignature(self.input.to_string())
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.err())
        }
    }

    fn finish(&self) -> Result<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.err())
        }
    }

    /// Reads an identifier terminated by one of `stops`; the terminator is not consumed.
    fn identifier(&mut self, stops: &[char]) -> Result<&'a str> {
        let rest = &self.input[self.pos..];
        let end = rest
            .char_indices()
            .find(|(_, c)| stops.contains(c))
            .map(|(idx, _)| idx)
            .ok_or_else(|| self.err())?;
        if end == 0 {
            return Err(self.err());
        }
        self.pos += end;
        Ok(&rest[..end])
    }

    fn type_parameters_opt(&mut self) -> Result<Vec<TypeParameter>> {
        if !self.eat('<') {
            return Ok(Vec::new());
        }
        let mut params = Vec::new();
        while !self.eat('>') {
            let name = self.identifier(&[':'])?.to_string();
            self.expect(':')?;
            let class_bound = match self.peek() {
                Some('L' | 'T' | '[') => Some(self.reference_type()?),
                _ => None,
            };
            let mut interface_bounds = Vec::new();
            while self.eat(':') {
                interface_bounds.push(self.reference_type()?);
            }
            params.push(TypeParameter {
                name,
                class_bound,
                interface_bounds,
            });
        }
        if params.is_empty() {
            return Err(self.err());
        }
        Ok(params)
    }

    fn java_type(&mut self) -> Result<TypeSignature> {
        match self.peek() {
            Some(c) => match BaseType::from_descriptor_char(c) {
                Some(base) => {
                    self.pos += 1;
                    Ok(TypeSignature::Base(base))
                }
                None => self.reference_type(),
            },
            None => Err(self.err()),
        }
    }

    fn reference_type(&mut self) -> Result<TypeSignature> {
        match self.peek() {
            Some('L') => Ok(TypeSignature::Class(self.class_type()?)),
            Some('T') => {
                self.pos += 1;
                let name = self.identifier(&[';'])?.to_string();
                self.expect(';')?;
                Ok(TypeSignature::TypeVariable(name))
            }
            Some('[') => {
                self.pos += 1;
                Ok(TypeSignature::Array(Box::new(self.java_type()?)))
            }
            _ => Err(self.err()),
        }
    }

    fn class_type(&mut self) -> Result<ClassTypeSignature> {
        self.expect('L')?;
        let mut package = Vec::new();
        let mut segments = Vec::new();
        loop {
            let ident = self.identifier(&['/', '<', '.', ';'])?.to_string();
            if self.eat('/') {
                if !segments.is_empty() {
                    return Err(self.err());
                }
                package.push(ident);
                continue;
            }
            let type_arguments = self.type_arguments_opt()?;
            segments.push(SimpleClassTypeSignature {
                name: ident,
                type_arguments,
            });
            if self.eat('.') {
                continue;
            }
            self.expect(';')?;
            break;
        }
        Ok(ClassTypeSignature { package, segments })
    }

    fn type_arguments_opt(&mut self) -> Result<Vec<TypeArgument>> {
        if !self.eat('<') {
            return Ok(Vec::new());
        }
        let mut args = Vec::new();
        while !self.eat('>') {
            let arg = if self.eat('*') {
                TypeArgument::Any
            } else if self.eat('+') {
                TypeArgument::Extends(Box::new(self.reference_type()?))
            } else if self.eat('-') {
                TypeArgument::Super(Box::new(self.reference_type()?))
            } else {
                TypeArgument::Exact(Box::new(self.reference_type()?))
            };
            args.push(arg);
        }
        if args.is_empty() {
            return Err(self.err());
        }
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(internal: &str) -> TypeSignature {
        let (package, name) = internal.rsplit_once('/').unwrap();
        TypeSignature::Class(ClassTypeSignature {
            package: package.split('/').map(str::to_string).collect(),
            segments: vec![SimpleClassTypeSignature {
                name: name.to_string(),
                type_arguments: vec![],
            }],
        })
    }

    #[test]
    fn parses_self_referential_class_signature() {
        let sig = parse_class_signature(
            "<E:Ljava/lang/Enum<TE;>;>Ljava/lang/Object;Ljava/lang/Comparable<TE;>;",
        )
        .unwrap();
        assert_eq!(sig.type_parameters.len(), 1);
        assert_eq!(sig.type_parameters[0].name, "E");
        let Some(TypeSignature::Class(bound)) = &sig.type_parameters[0].class_bound else {
            panic!("expected class bound");
        };
        assert_eq!(bound.internal_name(), "java/lang/Enum");
        assert_eq!(
            bound.segments[0].type_arguments,
            vec![TypeArgument::Exact(Box::new(TypeSignature::TypeVariable(
                "E".to_string()
            )))]
        );
        assert_eq!(sig.super_class.internal_name(), "java/lang/Object");
        assert_eq!(sig.interfaces.len(), 1);
    }

    #[test]
    fn parses_interface_only_bounds_and_wildcards() {
        let sig = parse_method_signature(
            "<T::Ljava/lang/Comparable<-TT;>;>(Ljava/util/List<+TT;>;[I)TT;^Ljava/io/IOException;",
        )
        .unwrap();
        assert_eq!(sig.type_parameters[0].class_bound, None);
        assert_eq!(sig.type_parameters[0].interface_bounds.len(), 1);
        assert_eq!(sig.parameters.len(), 2);
        assert_eq!(
            sig.parameters[1],
            TypeSignature::Array(Box::new(TypeSignature::Base(BaseType::Int)))
        );
        assert_eq!(
            sig.return_type,
            Some(TypeSignature::TypeVariable("T".to_string()))
        );
        assert_eq!(sig.throws, vec![class("java/io/IOException")]);
    }

    #[test]
    fn parses_member_type_of_parameterized_outer() {
        let ty = parse_field_signature("Lp/Outer<Ljava/lang/String;>.Inner<*>;").unwrap();
        let TypeSignature::Class(ct) = ty else {
            panic!("expected class type");
        };
        assert_eq!(ct.internal_name(), "p/Outer$Inner");
        assert_eq!(ct.segments[1].type_arguments, vec![TypeArgument::Any]);
    }

    #[test]
    fn rejects_truncated_signatures() {
        assert!(parse_field_signature("Ljava/util/List<TT;").is_err());
        assert!(parse_method_signature("(I").is_err());
        assert!(parse_class_signature("<>Ljava/lang/Object;").is_err());
    }
}
