use std::collections::HashMap;

use nova_classfile::BaseType;
use nova_core::{Name, PackageName, TypeName};

use crate::binding::{
    ArrayBinding, Binding, BindingId, CaptureSite, PackageBinding, ParameterizedBinding,
    RawBinding, WildcardBinding, WildcardKind,
};

/// Arena of every binding created in a session, plus the canonicalization maps that keep one id
/// per semantic identity.
///
/// Bindings are append-only: nothing is ever removed or replaced, only completed (headers and
/// members are filled in lazily by the session).
#[derive(Debug, Default)]
pub(crate) struct Interner {
    bindings: Vec<Binding>,
    packages: HashMap<PackageName, BindingId>,
    primitives: HashMap<BaseType, BindingId>,
    null: Option<BindingId>,
    void: Option<BindingId>,
    pub(crate) types: HashMap<TypeName, BindingId>,
    pub(crate) missing: HashMap<TypeName, BindingId>,
    arrays: HashMap<(BindingId, u32), BindingId>,
    wildcards: HashMap<(WildcardKind, Option<BindingId>), BindingId>,
    parameterized: HashMap<(BindingId, Option<BindingId>, Vec<BindingId>), BindingId>,
    raw: HashMap<(BindingId, Option<BindingId>), BindingId>,
    pub(crate) captures: HashMap<(CaptureSite, u32), BindingId>,
    /// Members of parameterized/raw types, keyed by (viewing type, declared member).
    pub(crate) member_views: HashMap<(BindingId, BindingId), BindingId>,
    /// Generic method instantiations, keyed by (instantiated method, type arguments).
    pub(crate) instances: HashMap<(BindingId, Vec<BindingId>), BindingId>,
    /// Parameters and locals, keyed by (member, name, occurrence, rank).
    pub(crate) locals: HashMap<(BindingId, Name, u32, u32), BindingId>,
    /// Annotation instances, keyed by (annotated, annotation type, ordinal).
    pub(crate) annotations: HashMap<(BindingId, BindingId, u32), BindingId>,
}

impl Interner {
    pub(crate) fn alloc(&mut self, binding: Binding) -> BindingId {
        let id = BindingId::from_index(self.bindings.len());
        self.bindings.push(binding);
        id
    }

    /// Allocates a binding that needs to know its own id (declarations point at themselves).
    pub(crate) fn alloc_with(&mut self, make: impl FnOnce(BindingId) -> Binding) -> BindingId {
        let id = BindingId::from_index(self.bindings.len());
        self.bindings.push(make(id));
        id
    }

    /// # Panics
    ///
    /// Panics if `id` was not allocated by this interner.
    pub(crate) fn get(&self, id: BindingId) -> &Binding {
        &self.bindings[id.idx()]
    }

    pub(crate) fn get_mut(&mut self, id: BindingId) -> &mut Binding {
        &mut self.bindings[id.idx()]
    }

    pub(crate) fn len(&self) -> usize {
        self.bindings.len()
    }

    pub(crate) fn package(&mut self, name: &PackageName) -> BindingId {
        if let Some(&id) = self.packages.get(name) {
            return id;
        }
        let id = self.alloc(Binding::Package(PackageBinding { name: name.clone() }));
        self.packages.insert(name.clone(), id);
        id
    }

    pub(crate) fn primitive(&mut self, ty: BaseType) -> BindingId {
        if let Some(&id) = self.primitives.get(&ty) {
            return id;
        }
        let id = self.alloc(Binding::Primitive(ty));
        self.primitives.insert(ty, id);
        id
    }

    pub(crate) fn null(&mut self) -> BindingId {
        if let Some(id) = self.null {
            return id;
        }
        let id = self.alloc(Binding::Null);
        self.null = Some(id);
        id
    }

    pub(crate) fn void(&mut self) -> BindingId {
        if let Some(id) = self.void {
            return id;
        }
        let id = self.alloc(Binding::Void);
        self.void = Some(id);
        id
    }

    /// Arrays of arrays are flattened into one array binding with the summed dimension.
    pub(crate) fn array(&mut self, element: BindingId, dims: u32) -> BindingId {
        let (element, dims) = match self.get(element) {
            Binding::Array(inner) => (inner.element, inner.dims + dims),
            _ => (element, dims),
        };
        if dims == 0 {
            return element;
        }
        if let Some(&id) = self.arrays.get(&(element, dims)) {
            return id;
        }
        let id = self.alloc(Binding::Array(ArrayBinding { element, dims }));
        self.arrays.insert((element, dims), id);
        id
    }

    pub(crate) fn wildcard(&mut self, kind: WildcardKind, bound: Option<BindingId>) -> BindingId {
        let bound = if kind == WildcardKind::Unbounded { None } else { bound };
        if let Some(&id) = self.wildcards.get(&(kind, bound)) {
            return id;
        }
        let id = self.alloc(Binding::Wildcard(WildcardBinding { kind, bound }));
        self.wildcards.insert((kind, bound), id);
        id
    }

    pub(crate) fn parameterized(
        &mut self,
        generic: BindingId,
        enclosing: Option<BindingId>,
        args: Vec<BindingId>,
    ) -> BindingId {
        let key = (generic, enclosing, args);
        if let Some(&id) = self.parameterized.get(&key) {
            return id;
        }
        let (generic, enclosing, args) = key;
        let id = self.alloc(Binding::Parameterized(ParameterizedBinding {
            generic,
            enclosing,
            args: args.clone(),
        }));
        self.parameterized.insert((generic, enclosing, args), id);
        id
    }

    pub(crate) fn raw(&mut self, generic: BindingId, enclosing: Option<BindingId>) -> BindingId {
        if let Some(&id) = self.raw.get(&(generic, enclosing)) {
            return id;
        }
        let id = self.alloc(Binding::Raw(RawBinding { generic, enclosing }));
        self.raw.insert((generic, enclosing), id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrays_flatten_and_intern() {
        let mut interner = Interner::default();
        let int = interner.primitive(BaseType::Int);
        let one = interner.array(int, 1);
        let two = interner.array(one, 1);
        assert_eq!(two, interner.array(int, 2));
        let Binding::Array(array) = interner.get(two) else {
            panic!("expected array");
        };
        assert_eq!(array.element, int);
        assert_eq!(array.dims, 2);
        assert_eq!(interner.array(int, 0), int);
    }

    #[test]
    fn unbounded_wildcards_ignore_bound() {
        let mut interner = Interner::default();
        let int = interner.primitive(BaseType::Int);
        assert_eq!(
            interner.wildcard(WildcardKind::Unbounded, Some(int)),
            interner.wildcard(WildcardKind::Unbounded, None)
        );
        assert_ne!(
            interner.wildcard(WildcardKind::Extends, Some(int)),
            interner.wildcard(WildcardKind::Super, Some(int))
        );
    }
}
