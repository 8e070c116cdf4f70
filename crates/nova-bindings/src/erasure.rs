use std::collections::HashSet;

use crate::binding::{Binding, BindingId, WildcardKind};
use crate::session::Session;

impl<'p> Session<'p> {
    /// The erasure of a type (JLS 4.6). Non-type bindings erase to themselves.
    pub fn erasure(&mut self, id: BindingId) -> BindingId {
        let mut seen = HashSet::new();
        self.erasure_inner(id, &mut seen)
    }

    fn erasure_inner(&mut self, id: BindingId, seen: &mut HashSet<BindingId>) -> BindingId {
        match self.binding(id).clone() {
            Binding::Parameterized(p) => p.generic,
            Binding::Raw(r) => r.generic,
            Binding::Array(array) => {
                let element = self.erasure_inner(array.element, seen);
                self.array_of(element, array.dims)
            }
            Binding::TypeVariable(tv) => self.erase_bound(id, tv.bounds.first().copied(), seen),
            Binding::Capture(capture) => {
                self.erase_bound(id, capture.upper_bounds.first().copied(), seen)
            }
            Binding::Wildcard(wildcard) => match (wildcard.kind, wildcard.bound) {
                (WildcardKind::Extends, Some(bound)) => self.erase_bound(id, Some(bound), seen),
                _ => self.object(),
            },
            _ => id,
        }
    }

    fn erase_bound(
        &mut self,
        id: BindingId,
        bound: Option<BindingId>,
        seen: &mut HashSet<BindingId>,
    ) -> BindingId {
        match bound {
            Some(bound) if seen.insert(id) => self.erasure_inner(bound, seen),
            _ => self.object(),
        }
    }

    /// The generic declaration behind a binding: the declared type for parameterized and raw
    /// types, the declared method for instantiations and views, the declared field for views.
    pub fn declaration(&self, id: BindingId) -> BindingId {
        match self.binding(id) {
            Binding::Parameterized(p) => p.generic,
            Binding::Raw(r) => r.generic,
            Binding::Method(method) => method.declaration,
            Binding::Variable(var) => var.declaration,
            _ => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use nova_core::TypeName;

    use super::*;
    use crate::options::ResolveOptions;
    use crate::project::Project;

    #[test]
    fn erasure_and_declaration_are_idempotent() {
        let project = Project::with_minimal_jdk();
        let mut session = Session::new(&project, ResolveOptions::default());
        let list = session.lookup_type(&TypeName::new("java.util.List")).unwrap();
        let string = session.string();
        let list_of_string = session.parameterize(list, vec![string]).unwrap();
        let raw_list = session.raw_type(list).unwrap();

        assert_ne!(raw_list, list);
        assert_eq!(session.erasure(raw_list), session.erasure(list));
        assert_eq!(session.erasure(list_of_string), list);
        assert_eq!(session.declaration(list_of_string), list);
        assert_eq!(session.declaration(session.declaration(raw_list)), list);

        let element = session.type_parameters(list)[0];
        let object = session.object();
        assert_eq!(session.erasure(element), object);
        let erased = session.erasure(element);
        assert_eq!(session.erasure(erased), erased);

        let array = session.array_of(list_of_string, 2);
        let erased_array = session.erasure(array);
        assert_eq!(erased_array, session.array_of(list, 2));
    }

    #[test]
    fn self_referential_bounds_erase_to_the_bound() {
        let project = Project::with_minimal_jdk();
        let mut session = Session::new(&project, ResolveOptions::default());
        let enum_ty = session.lookup_type(&TypeName::new("java.lang.Enum")).unwrap();
        let e = session.type_parameters(enum_ty)[0];
        assert_eq!(session.erasure(e), enum_ty);
    }
}
