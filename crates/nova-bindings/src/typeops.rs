//! Substitution, supertypes, subtyping and boxing over bindings.

use std::collections::{HashSet, VecDeque};

use nova_classfile::BaseType;

use crate::binding::{Binding, BindingId, WildcardBinding, WildcardKind};
use crate::session::Session;

const BOXES: [(BaseType, &str); 8] = [
    (BaseType::Boolean, "java.lang.Boolean"),
    (BaseType::Byte, "java.lang.Byte"),
    (BaseType::Char, "java.lang.Character"),
    (BaseType::Short, "java.lang.Short"),
    (BaseType::Int, "java.lang.Integer"),
    (BaseType::Long, "java.lang.Long"),
    (BaseType::Float, "java.lang.Float"),
    (BaseType::Double, "java.lang.Double"),
];

/// `from` widens to `to` by a primitive widening conversion (JLS 5.1.2), or they are equal.
pub(crate) fn primitive_widens(from: BaseType, to: BaseType) -> bool {
    use BaseType::*;
    if from == to {
        return true;
    }
    match from {
        Byte => matches!(to, Short | Int | Long | Float | Double),
        Short | Char => matches!(to, Int | Long | Float | Double),
        Int => matches!(to, Long | Float | Double),
        Long => matches!(to, Float | Double),
        Float => to == Double,
        Double | Boolean => false,
    }
}

impl<'p> Session<'p> {
    pub(crate) fn wildcard_of(&self, ty: BindingId) -> Option<WildcardBinding> {
        match self.binding(ty) {
            Binding::Wildcard(wildcard) => Some(*wildcard),
            _ => None,
        }
    }

    pub(crate) fn primitive_of(&self, ty: BindingId) -> Option<BaseType> {
        match self.binding(ty) {
            Binding::Primitive(base) => Some(*base),
            _ => None,
        }
    }

    /// The box class of a primitive type.
    pub fn boxed_type(&mut self, ty: BindingId) -> Option<BindingId> {
        let base = self.primitive_of(ty)?;
        let (_, name) = BOXES.iter().find(|(b, _)| *b == base)?;
        Some(self.type_or_missing(name))
    }

    /// The primitive type a box class unboxes to.
    pub fn unboxed_type(&mut self, ty: BindingId) -> Option<BindingId> {
        let name = self.binary_name(ty)?.clone();
        let (base, _) = BOXES.iter().find(|(_, n)| *n == name.as_str())?;
        Some(self.primitive(*base))
    }

    /// Type variable to type argument pairs of a parameterized type, including the arguments of
    /// parameterized enclosing types.
    pub(crate) fn substitution(&self, ty: BindingId) -> Vec<(BindingId, BindingId)> {
        let mut subst = Vec::new();
        let mut current = Some(ty);
        while let Some(id) = current {
            match self.binding(id) {
                Binding::Parameterized(p) => {
                    let params = self.type_params_of(p.generic);
                    if params.len() == p.args.len() {
                        subst.extend(params.into_iter().zip(p.args.iter().copied()));
                    }
                    current = p.enclosing;
                }
                _ => current = None,
            }
        }
        subst
    }

    /// Replaces type variables in `ty` according to `subst`.
    pub fn substitute(&mut self, ty: BindingId, subst: &[(BindingId, BindingId)]) -> BindingId {
        if subst.is_empty() {
            return ty;
        }
        match self.binding(ty).clone() {
            Binding::TypeVariable(_) => subst
                .iter()
                .find(|(var, _)| *var == ty)
                .map_or(ty, |(_, replacement)| *replacement),
            Binding::Array(array) => {
                let element = self.substitute(array.element, subst);
                self.array_of(element, array.dims)
            }
            Binding::Wildcard(wildcard) => match wildcard.bound {
                Some(bound) => {
                    let bound = self.substitute(bound, subst);
                    self.wildcard(wildcard.kind, Some(bound))
                }
                None => ty,
            },
            Binding::Parameterized(p) => {
                let enclosing = p.enclosing.map(|e| self.substitute(e, subst));
                let args = p
                    .args
                    .iter()
                    .map(|&arg| self.substitute(arg, subst))
                    .collect::<Vec<_>>();
                if args.is_empty() {
                    self.class_type(p.generic, enclosing, None)
                } else {
                    self.class_type(p.generic, enclosing, Some(args))
                }
            }
            Binding::Type(decl) => {
                let params = decl.type_params.clone();
                let args = params
                    .iter()
                    .map(|&param| self.substitute(param, subst))
                    .collect::<Vec<_>>();
                let enclosing = match decl.enclosing {
                    Some(outer) if !decl.modifiers.is_static => {
                        let substituted = self.substitute(outer, subst);
                        (substituted != outer).then_some(substituted)
                    }
                    _ => None,
                };
                if args == params && enclosing.is_none() {
                    return ty;
                }
                if args.is_empty() {
                    self.class_type(ty, enclosing, None)
                } else {
                    self.class_type(ty, enclosing, Some(args))
                }
            }
            _ => ty,
        }
    }

    /// The direct superclass of a class type, viewed through its type arguments.
    pub fn superclass(&mut self, ty: BindingId) -> Option<BindingId> {
        let generic = self.generic_of(ty)?;
        let declared = self.binding(generic).as_type()?.superclass?;
        Some(self.view_super(ty, declared))
    }

    /// The direct superinterfaces of a class type, viewed through its type arguments.
    pub fn interfaces(&mut self, ty: BindingId) -> Vec<BindingId> {
        let Some(generic) = self.generic_of(ty) else {
            return Vec::new();
        };
        let declared = match self.binding(generic).as_type() {
            Some(decl) => decl.interfaces.clone(),
            None => return Vec::new(),
        };
        declared
            .into_iter()
            .map(|sup| self.view_super(ty, sup))
            .collect()
    }

    fn view_super(&mut self, ty: BindingId, declared: BindingId) -> BindingId {
        match self.binding(ty) {
            Binding::Raw(_) => self.erasure(declared),
            Binding::Parameterized(_) => {
                let subst = self.substitution(ty);
                self.substitute(declared, &subst)
            }
            _ => declared,
        }
    }

    /// Direct supertypes: superclass and interfaces for class types, bounds for type variables
    /// and captures.
    pub(crate) fn direct_supertypes(&mut self, ty: BindingId) -> Vec<BindingId> {
        match self.binding(ty) {
            Binding::TypeVariable(tv) => tv.bounds.clone(),
            Binding::Capture(capture) => capture.upper_bounds.clone(),
            Binding::Type(_) | Binding::Parameterized(_) | Binding::Raw(_) => {
                let mut supers = self.superclass(ty).into_iter().collect::<Vec<_>>();
                supers.extend(self.interfaces(ty));
                if supers.is_empty() && !self.is_object(ty) {
                    supers.push(self.object());
                }
                supers
            }
            _ => Vec::new(),
        }
    }

    /// `ty` viewed as its supertype declared by `target` (`ArrayList<String>` as `List` is
    /// `List<String>`).
    pub fn as_super(&mut self, ty: BindingId, target: BindingId) -> Option<BindingId> {
        let target = self.generic_of(target)?;
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([ty]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            if self.generic_of(current) == Some(target) {
                return Some(current);
            }
            queue.extend(self.direct_supertypes(current));
        }
        None
    }

    /// Type arguments of a class type as seen by subtyping: a generic declaration is its own
    /// parameterization.
    fn subtyping_args(&self, ty: BindingId) -> Option<Vec<BindingId>> {
        match self.binding(ty) {
            Binding::Parameterized(p) => Some(p.args.clone()),
            Binding::Type(decl) if decl.is_generic() => Some(decl.type_params.clone()),
            _ => None,
        }
    }

    pub fn is_subtype(&mut self, sub: BindingId, sup: BindingId) -> bool {
        let mut seen = HashSet::new();
        self.is_subtype_inner(sub, sup, &mut seen)
    }

    fn is_subtype_inner(
        &mut self,
        sub: BindingId,
        sup: BindingId,
        seen: &mut HashSet<(BindingId, BindingId)>,
    ) -> bool {
        if sub == sup || self.is_missing(sub) || self.is_missing(sup) {
            return true;
        }
        if !seen.insert((sub, sup)) {
            return false;
        }
        let sub_binding = self.binding(sub).clone();
        let sup_binding = self.binding(sup).clone();
        match (&sub_binding, &sup_binding) {
            (Binding::Primitive(_), _) | (_, Binding::Primitive(_)) => false,
            (Binding::Void, _) | (_, Binding::Void) => false,
            (Binding::Null, _) => sup_binding.is_reference(),
            (_, _) if self.is_object(sup) => sub_binding.is_reference(),
            (_, Binding::Capture(capture)) => match capture.lower_bound {
                Some(lower) => self.is_subtype_inner(sub, lower, seen),
                None => false,
            },
            (Binding::TypeVariable(_) | Binding::Capture(_), _) => self
                .direct_supertypes(sub)
                .into_iter()
                .any(|bound| self.is_subtype_inner(bound, sup, seen)),
            (Binding::Array(a), Binding::Array(b)) => {
                if a.dims == b.dims {
                    let (ae, be) = (a.element, b.element);
                    if self.primitive_of(ae).is_some() || self.primitive_of(be).is_some() {
                        return ae == be;
                    }
                    self.is_subtype_inner(ae, be, seen)
                } else if a.dims > b.dims {
                    let element = b.element;
                    self.is_array_supertype(element)
                } else {
                    false
                }
            }
            (Binding::Array(_), _) => self.is_array_supertype(sup),
            (_, Binding::TypeVariable(_)) => false,
            (
                Binding::Type(_) | Binding::Parameterized(_) | Binding::Raw(_),
                Binding::Type(_) | Binding::Parameterized(_) | Binding::Raw(_),
            ) => {
                let Some(found) = self.as_super(sub, sup) else {
                    return false;
                };
                if self.is_raw(found) || self.is_raw(sup) {
                    return true;
                }
                let (Some(actual), Some(expected)) =
                    (self.subtyping_args(found), self.subtyping_args(sup))
                else {
                    return true;
                };
                actual.len() == expected.len()
                    && actual
                        .iter()
                        .zip(&expected)
                        .all(|(&a, &e)| self.contains_type_arg(a, e, seen))
            }
            _ => false,
        }
    }

    fn is_array_supertype(&self, ty: BindingId) -> bool {
        match self.binary_name(ty) {
            Some(name) => matches!(
                name.as_str(),
                "java.lang.Object" | "java.lang.Cloneable" | "java.io.Serializable"
            ),
            None => false,
        }
    }

    /// Type argument containment (JLS 4.5.1): whether `expected` contains `actual`.
    fn contains_type_arg(
        &mut self,
        actual: BindingId,
        expected: BindingId,
        seen: &mut HashSet<(BindingId, BindingId)>,
    ) -> bool {
        if actual == expected || self.is_missing(actual) || self.is_missing(expected) {
            return true;
        }
        let Some(wildcard) = self.wildcard_of(expected) else {
            return false;
        };
        match (wildcard.kind, wildcard.bound) {
            (WildcardKind::Unbounded, _) | (_, None) => true,
            (WildcardKind::Extends, Some(bound)) => {
                let upper = match self.wildcard_of(actual) {
                    Some(w) if w.kind == WildcardKind::Extends => w.bound,
                    Some(_) => Some(self.object()),
                    None => Some(actual),
                };
                upper.is_some_and(|upper| self.is_subtype_inner(upper, bound, seen))
            }
            (WildcardKind::Super, Some(bound)) => {
                let lower = match self.wildcard_of(actual) {
                    Some(w) if w.kind == WildcardKind::Super => w.bound,
                    Some(_) => None,
                    None => Some(actual),
                };
                lower.is_some_and(|lower| self.is_subtype_inner(bound, lower, seen))
            }
        }
    }

    /// Assignment without boxing: identity, primitive widening, reference subtyping or an
    /// unchecked conversion from a raw type.
    pub(crate) fn is_strictly_assignable(&mut self, from: BindingId, to: BindingId) -> bool {
        match (self.primitive_of(from), self.primitive_of(to)) {
            (Some(from), Some(to)) => primitive_widens(from, to),
            (Some(_), None) | (None, Some(_)) => false,
            (None, None) => {
                if self.is_subtype(from, to) {
                    return true;
                }
                let (erased_from, erased_to) = (self.erasure(from), self.erasure(to));
                self.is_raw_like(from) && self.is_subtype(erased_from, erased_to)
            }
        }
    }

    fn is_raw_like(&self, ty: BindingId) -> bool {
        match self.binding(ty) {
            Binding::Raw(_) => true,
            Binding::Array(array) => self.is_raw_like(array.element),
            _ => false,
        }
    }

    /// Assignment contexts (JLS 5.2) including boxing and unboxing.
    pub fn is_assignable(&mut self, from: BindingId, to: BindingId) -> bool {
        if self.is_strictly_assignable(from, to) {
            return true;
        }
        if let Some(boxed) = self.boxed_type(from) {
            return self.is_subtype(boxed, to);
        }
        match (self.unboxed_type(from), self.primitive_of(to)) {
            (Some(unboxed), Some(to)) => self
                .primitive_of(unboxed)
                .is_some_and(|from| primitive_widens(from, to)),
            _ => false,
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
    fn parameterized_subtyping_follows_type_arguments() {
        let project = Project::with_minimal_jdk();
        let mut session = Session::new(&project, ResolveOptions::default());
        let string = session.string();
        let object = session.object();
        let list = session.lookup_type(&TypeName::new("java.util.List")).unwrap();
        let array_list = session
            .lookup_type(&TypeName::new("java.util.ArrayList"))
            .unwrap();
        let collection = session
            .lookup_type(&TypeName::new("java.util.Collection"))
            .unwrap();

        let list_of_string = session.parameterize(list, vec![string]).unwrap();
        let list_of_object = session.parameterize(list, vec![object]).unwrap();
        let array_list_of_string = session.parameterize(array_list, vec![string]).unwrap();
        let extends_object = session.wildcard(WildcardKind::Extends, Some(object));
        let collection_of_any = session.parameterize(collection, vec![extends_object]).unwrap();

        assert!(session.is_subtype(array_list_of_string, list_of_string));
        assert!(!session.is_subtype(list_of_string, list_of_object));
        assert!(session.is_subtype(list_of_string, collection_of_any));
        assert_eq!(
            session.as_super(array_list_of_string, collection),
            session.parameterize(collection, vec![string])
        );
    }

    #[test]
    fn boxing_and_widening() {
        let project = Project::with_minimal_jdk();
        let mut session = Session::new(&project, ResolveOptions::default());
        let int = session.primitive(BaseType::Int);
        let long = session.primitive(BaseType::Long);
        let integer = session.boxed_type(int).unwrap();
        let object = session.object();

        assert!(session.is_assignable(int, long));
        assert!(!session.is_assignable(long, int));
        assert!(session.is_assignable(int, object));
        assert!(!session.is_strictly_assignable(int, object));
        assert!(session.is_assignable(integer, long));
        assert_eq!(session.unboxed_type(integer), Some(int));
    }
}
