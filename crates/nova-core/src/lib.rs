//! Core shared types for Nova's binding resolver.
//!
//! This crate is intentionally small: names, file ids and text ranges that every
//! other crate in the workspace speaks.

use std::fmt;

use smol_str::SmolStr;

pub use text_size::{TextRange, TextSize};

/// A single Java identifier.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(SmolStr);

impl Name {
    #[inline]
    pub fn new(text: impl AsRef<str>) -> Self {
        Self(SmolStr::new(text.as_ref()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Name::new(value)
    }
}

impl From<&String> for Name {
    fn from(value: &String) -> Self {
        Name::new(value)
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// A possibly-qualified name as written in source (`java.util.List`, `Map.Entry`).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    segments: Vec<Name>,
}

impl QualifiedName {
    pub fn from_dotted(text: &str) -> Self {
        Self {
            segments: text
                .split('.')
                .filter(|s| !s.is_empty())
                .map(Name::from)
                .collect(),
        }
    }

    pub fn from_segments(segments: Vec<Name>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Name] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&Name> {
        self.segments.last()
    }

    pub fn to_dotted(&self) -> String {
        join(&self.segments, ".")
    }
}

impl fmt::Debug for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QualifiedName({})", self.to_dotted())
    }
}

/// A package name (`java.lang`). The default package has no segments.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PackageName {
    segments: Vec<Name>,
}

impl PackageName {
    pub fn from_dotted(text: &str) -> Self {
        Self {
            segments: text
                .split('.')
                .filter(|s| !s.is_empty())
                .map(Name::from)
                .collect(),
        }
    }

    /// Parses the slash-separated form used inside class files (`java/lang`).
    pub fn from_internal(text: &str) -> Self {
        Self {
            segments: text
                .split('/')
                .filter(|s| !s.is_empty())
                .map(Name::from)
                .collect(),
        }
    }

    pub fn from_segments(segments: Vec<Name>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Name] {
        &self.segments
    }

    pub fn is_default(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn to_dotted(&self) -> String {
        join(&self.segments, ".")
    }

    pub fn to_internal(&self) -> String {
        join(&self.segments, "/")
    }
}

impl fmt::Debug for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackageName({})", self.to_dotted())
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dotted())
    }
}

/// A binary type name in dotted form, with `$` separating nested types
/// (`java.util.Map$Entry`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(SmolStr);

impl TypeName {
    pub fn new(binary_name: impl AsRef<str>) -> Self {
        Self(SmolStr::new(binary_name.as_ref()))
    }

    /// Builds a type name from the slash-separated internal form (`java/util/Map$Entry`).
    pub fn from_internal(internal: &str) -> Self {
        Self(SmolStr::new(internal.replace('/', ".")))
    }

    pub fn in_package(package: &PackageName, simple: &str) -> Self {
        if package.is_default() {
            Self::new(simple)
        } else {
            Self::new(format!("{}.{}", package.to_dotted(), simple))
        }
    }

    /// The name of a member type nested directly in `self`.
    pub fn nested(&self, simple: &str) -> Self {
        Self::new(format!("{}${}", self.0, simple))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn to_internal(&self) -> String {
        self.0.replace('.', "/")
    }

    pub fn package(&self) -> PackageName {
        match self.0.rfind('.') {
            Some(idx) => PackageName::from_dotted(&self.0[..idx]),
            None => PackageName::default(),
        }
    }

    /// The simple name of the innermost type (`Entry` for `java.util.Map$Entry`).
    pub fn simple_name(&self) -> &str {
        let tail = self.0.rsplit('.').next().unwrap_or(&self.0);
        tail.rsplit('$').next().unwrap_or(tail)
    }

    /// The binary name of the directly enclosing type, if this is a member type.
    pub fn enclosing(&self) -> Option<TypeName> {
        let dot = self.0.rfind('.').map(|idx| idx + 1).unwrap_or(0);
        let dollar = self.0[dot..].rfind('$')?;
        Some(TypeName::new(&self.0[..dot + dollar]))
    }
}

impl fmt::Debug for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeName({})", self.0)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies a source unit within a project snapshot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u32);

impl FileId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn to_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.0)
    }
}

fn join(segments: &[Name], sep: &str) -> String {
    let mut out = String::new();
    for (idx, seg) in segments.iter().enumerate() {
        if idx > 0 {
            out.push_str(sep);
        }
        out.push_str(seg.as_str());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_name_nesting_helpers() {
        let entry = TypeName::new("java.util.Map").nested("Entry");
        assert_eq!(entry.as_str(), "java.util.Map$Entry");
        assert_eq!(entry.to_internal(), "java/util/Map$Entry");
        assert_eq!(entry.simple_name(), "Entry");
        assert_eq!(entry.enclosing(), Some(TypeName::new("java.util.Map")));
        assert_eq!(entry.package(), PackageName::from_dotted("java.util"));
    }

    #[test]
    fn top_level_type_in_default_package() {
        let x = TypeName::in_package(&PackageName::default(), "X");
        assert_eq!(x.as_str(), "X");
        assert_eq!(x.enclosing(), None);
        assert!(x.package().is_default());
        assert_eq!(TypeName::from_internal("p/q/X$Y").as_str(), "p.q.X$Y");
    }
}
