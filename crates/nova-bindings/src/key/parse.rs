use nova_classfile::BaseType;

use crate::binding::WildcardKind;
use crate::error::KeyParseError;

use super::{ClassSegment, KeyKind, KeyNode};

type Result<T> = std::result::Result<T, KeyParseError>;

/// Parses a binding key into its syntax tree.
///
/// A key made only of identifier characters and `/` names a package, except for the
/// single-letter primitive, `void` and `null` keys.
pub(crate) fn parse_key(key: &str, max_depth: usize) -> Result<KeyNode> {
    if is_package_key(key) {
        return Ok(KeyNode {
            kind: KeyKind::Package(key.to_string()),
            span: 0..key.len(),
        });
    }
    let mut parser = KeyParser {
        input: key,
        pos: 0,
        depth: 0,
        max_depth,
    };
    let node = parser.top()?;
    if !parser.at_end() {
        return Err(KeyParseError::Trailing { offset: parser.pos });
    }
    Ok(node)
}

fn is_package_key(key: &str) -> bool {
    if key.len() == 1 && matches!(key, "Z" | "B" | "C" | "S" | "I" | "J" | "F" | "D" | "V" | "N") {
        return false;
    }
    key.chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '/'))
}

struct KeyParser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> KeyParser<'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek2(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Result<char> {
        let c = self.peek().ok_or(KeyParseError::UnexpectedEnd)?;
        self.pos += c.len_utf8();
        Ok(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += c.len_utf8();
                Ok(())
            }
            Some(_) => Err(KeyParseError::Expected {
                expected,
                offset: self.pos,
            }),
            None => Err(KeyParseError::UnexpectedEnd),
        }
    }

    /// Reads a non-empty name up to (not including) one of `stops`.
    fn name(&mut self, stops: &[char]) -> Result<String> {
        let start = self.pos;
        let rest = &self.input[start..];
        let end = rest
            .char_indices()
            .find(|(_, c)| stops.contains(c))
            .map(|(idx, _)| idx)
            .ok_or(KeyParseError::UnexpectedEnd)?;
        if end == 0 {
            return Err(KeyParseError::EmptyName { offset: start });
        }
        self.pos += end;
        Ok(rest[..end].to_string())
    }

    fn number(&mut self) -> Result<u32> {
        let start = self.pos;
        let digits = self.input[start..]
            .chars()
            .take_while(char::is_ascii_digit)
            .count();
        if digits == 0 {
            return Err(KeyParseError::InvalidNumber { offset: start });
        }
        self.pos += digits;
        self.input[start..self.pos]
            .parse()
            .map_err(|_| KeyParseError::InvalidNumber { offset: start })
    }

    fn node(&self, kind: KeyKind, start: usize) -> KeyNode {
        KeyNode {
            kind,
            span: start..self.pos,
        }
    }

    fn top(&mut self) -> Result<KeyNode> {
        let start = self.pos;
        let mut node = self.ty(true)?;
        loop {
            node = match self.peek() {
                Some('#') if matches!(node.kind, KeyKind::Method { .. } | KeyKind::Field { .. }) => {
                    self.pos += 1;
                    let name = self.name(&['#'])?;
                    self.expect('#')?;
                    let occurrence = self.number()?;
                    self.expect('#')?;
                    let rank = self.number()?;
                    let kind = KeyKind::Local {
                        member: Box::new(node),
                        name,
                        occurrence,
                        rank,
                    };
                    self.node(kind, start)
                }
                Some('@') => {
                    self.pos += 1;
                    let ty = self.ty(true)?;
                    let ordinal = if self.eat('#') { self.number()? } else { 0 };
                    let kind = KeyKind::Annotation {
                        annotated: Box::new(node),
                        ty: Box::new(ty),
                        ordinal,
                    };
                    self.node(kind, start)
                }
                Some('%') if matches!(node.kind, KeyKind::Method { .. }) => {
                    self.pos += 1;
                    self.expect('<')?;
                    let args = self.list('>')?;
                    let kind = KeyKind::Instance {
                        method: Box::new(node),
                        args,
                    };
                    self.node(kind, start)
                }
                _ => return Ok(node),
            };
        }
    }

    /// Types up to `close`, which is consumed.
    fn list(&mut self, close: char) -> Result<Vec<KeyNode>> {
        let mut items = Vec::new();
        while !self.eat(close) {
            if self.at_end() {
                return Err(KeyParseError::UnexpectedEnd);
            }
            items.push(self.ty(true)?);
        }
        Ok(items)
    }

    fn ty(&mut self, suffixes: bool) -> Result<KeyNode> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(KeyParseError::TooDeep {
                limit: self.max_depth,
            });
        }
        let result = self.ty_inner(suffixes);
        self.depth -= 1;
        result
    }

    fn ty_inner(&mut self, suffixes: bool) -> Result<KeyNode> {
        let start = self.pos;
        let c = self.peek().ok_or(KeyParseError::UnexpectedEnd)?;
        let kind = match c {
            'V' => {
                self.pos += 1;
                KeyKind::Void
            }
            'N' => {
                self.pos += 1;
                KeyKind::Null
            }
            '[' => {
                let mut dims = 0u32;
                while self.eat('[') {
                    dims = dims.saturating_add(1);
                }
                let element = self.ty(suffixes)?;
                KeyKind::Array {
                    dims,
                    element: Box::new(element),
                }
            }
            'L' => KeyKind::Class(self.class()?),
            'T' => {
                self.pos += 1;
                let name = self.name(&[';', ':'])?;
                let mut bounds = Vec::new();
                // Bounds take no suffixes so `:TU;` after a bound starts the next bound.
                while self.eat(':') {
                    bounds.push(self.ty(false)?);
                }
                self.expect(';')?;
                KeyKind::TypeVar {
                    owner: None,
                    name,
                    bounds,
                }
            }
            '*' => {
                self.pos += 1;
                if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    KeyKind::CaptureRef(self.number()?)
                } else {
                    KeyKind::Wildcard {
                        kind: WildcardKind::Unbounded,
                        bound: None,
                    }
                }
            }
            '+' | '-' => {
                self.pos += 1;
                let bound = self.ty(true)?;
                KeyKind::Wildcard {
                    kind: if c == '+' {
                        WildcardKind::Extends
                    } else {
                        WildcardKind::Super
                    },
                    bound: Some(Box::new(bound)),
                }
            }
            '!' => {
                self.pos += 1;
                let file = self.number()?;
                self.expect('&')?;
                let generic_start = self.pos;
                let segments = self.class()?;
                let generic = self.node(KeyKind::Class(segments), generic_start);
                self.expect('{')?;
                let rank = self.number()?;
                self.expect('}')?;
                let wildcard = self.ty(true)?;
                self.expect('*')?;
                let offset = self.number()?;
                KeyKind::Capture {
                    file,
                    generic: Box::new(generic),
                    rank,
                    wildcard: Box::new(wildcard),
                    offset,
                }
            }
            _ => match BaseType::from_descriptor_char(c) {
                Some(base) => {
                    self.pos += 1;
                    KeyKind::Primitive(base)
                }
                None => {
                    return Err(KeyParseError::Unexpected {
                        found: c,
                        offset: start,
                    })
                }
            },
        };
        let node = self.node(kind, start);
        if suffixes {
            self.suffixes(node, start)
        } else {
            Ok(node)
        }
    }

    fn class(&mut self) -> Result<Vec<ClassSegment>> {
        self.expect('L')?;
        let mut segments = Vec::new();
        loop {
            let name = self.name(&['<', ';', '.'])?;
            let args = if self.eat('<') {
                Some(self.list('>')?)
            } else {
                None
            };
            segments.push(ClassSegment { name, args });
            if !self.eat('.') {
                break;
            }
        }
        self.expect(';')?;
        Ok(segments)
    }

    /// Member (`.name...`) and type variable (`:TT;`) suffixes of a type.
    fn suffixes(&mut self, mut node: KeyNode, start: usize) -> Result<KeyNode> {
        loop {
            let is_class = matches!(node.kind, KeyKind::Class(_));
            let is_method = matches!(node.kind, KeyKind::Method { .. });
            match self.peek() {
                Some(':') if (is_class || is_method) && self.peek2() == Some('T') => {
                    self.pos += 2;
                    let name = self.name(&[';'])?;
                    self.expect(';')?;
                    let kind = KeyKind::TypeVar {
                        owner: Some(Box::new(node)),
                        name,
                        bounds: Vec::new(),
                    };
                    node = self.node(kind, start);
                }
                Some('.') if is_class => {
                    self.pos += 1;
                    let name = self.name(&['<', '(', ')'])?;
                    let type_params = if self.eat('<') {
                        self.list('>')?
                    } else {
                        Vec::new()
                    };
                    let kind = match self.bump()? {
                        '(' => {
                            let params = self.list(')')?;
                            // The return type takes no suffixes: a trailing `:T` names a type
                            // variable of the method itself.
                            let ret = self.ty(false)?;
                            KeyKind::Method {
                                declaring: Box::new(node),
                                name,
                                type_params,
                                params,
                                ret: Box::new(ret),
                            }
                        }
                        ')' if type_params.is_empty() => {
                            let ty = self.ty(true)?;
                            KeyKind::Field {
                                declaring: Box::new(node),
                                name,
                                ty: Box::new(ty),
                            }
                        }
                        found => {
                            return Err(KeyParseError::Unexpected {
                                found,
                                offset: self.pos - found.len_utf8(),
                            })
                        }
                    };
                    node = self.node(kind, start);
                }
                _ => return Ok(node),
            }
        }
    }
}
