//! Generic method instantiation and type argument inference.

use crate::binding::{Binding, BindingId, MethodBinding};
use crate::session::Session;

/// Constraint collection gives up below this nesting, which only self-referential types reach.
const MAX_DEPTH: u32 = 16;

impl<'p> Session<'p> {
    /// The instantiation of the generic `method` with `args` for its type parameters.
    ///
    /// Instantiations are interned: equal arguments give the same binding, and every
    /// instantiation shares the declaration of `method`.
    pub fn instantiate(&mut self, method: BindingId, args: Vec<BindingId>) -> Option<BindingId> {
        let declared = self.binding(method).as_method()?.clone();
        if declared.type_params.is_empty() || declared.type_params.len() != args.len() {
            return None;
        }
        if !args.iter().all(|&arg| self.is_type_argument(arg)) {
            return None;
        }
        if let Some(&id) = self.interner.instances.get(&(method, args.clone())) {
            return Some(id);
        }
        let subst = declared
            .type_params
            .iter()
            .copied()
            .zip(args.iter().copied())
            .collect::<Vec<_>>();
        let params = declared
            .params
            .iter()
            .map(|&param| self.substitute(param, &subst))
            .collect();
        let ret = self.substitute(declared.ret, &subst);
        let id = self.interner.alloc(Binding::Method(MethodBinding {
            params,
            ret,
            type_params: Vec::new(),
            type_args: args.clone(),
            instance_of: Some(method),
            default_value: None,
            ..declared
        }));
        self.interner.instances.insert((method, args), id);
        Some(id)
    }

    fn is_type_argument(&self, id: BindingId) -> bool {
        let binding = self.binding(id);
        binding.is_reference() && !matches!(binding, Binding::Wildcard(_) | Binding::Null)
    }

    /// Infers `vars` from the argument types of a call. A variable the arguments say nothing
    /// about is taken from `result`, the declared return type paired with the type the call
    /// result is assigned to, and otherwise defaults to its erasure.
    pub(crate) fn infer_type_args(
        &mut self,
        vars: &[BindingId],
        formals: &[BindingId],
        actuals: &[Option<BindingId>],
        result: Option<(BindingId, BindingId)>,
    ) -> Vec<BindingId> {
        let mut candidates: Vec<Vec<BindingId>> = vec![Vec::new(); vars.len()];
        for (&formal, actual) in formals.iter().zip(actuals) {
            if let Some(actual) = *actual {
                self.collect_constraints(vars, formal, actual, &mut candidates, 0);
            }
        }
        if let Some((ret, expected)) = result {
            let mut from_target: Vec<Vec<BindingId>> = vec![Vec::new(); vars.len()];
            self.collect_constraints(vars, ret, expected, &mut from_target, 0);
            for (found, target) in candidates.iter_mut().zip(from_target) {
                if found.is_empty() {
                    *found = target;
                }
            }
        }
        vars.iter()
            .zip(candidates)
            .map(|(&var, found)| match self.most_general(&found) {
                Some(ty) => ty,
                None => self.erasure(var),
            })
            .collect()
    }

    fn collect_constraints(
        &mut self,
        vars: &[BindingId],
        formal: BindingId,
        actual: BindingId,
        out: &mut [Vec<BindingId>],
        depth: u32,
    ) {
        if depth > MAX_DEPTH {
            return;
        }
        let actual = match self.boxed_type(actual) {
            Some(boxed) => boxed,
            None => actual,
        };
        match self.binding(formal).clone() {
            Binding::TypeVariable(_) => {
                let Some(idx) = vars.iter().position(|&var| var == formal) else {
                    return;
                };
                let actual = match self.binding(actual) {
                    Binding::Null | Binding::Void => return,
                    Binding::Wildcard(wildcard) => match wildcard.bound {
                        Some(bound) => bound,
                        None => return,
                    },
                    _ => actual,
                };
                if !out[idx].contains(&actual) {
                    out[idx].push(actual);
                }
            }
            Binding::Array(array) => {
                let found = match self.binding(actual) {
                    Binding::Array(found) => *found,
                    _ => return,
                };
                if found.dims >= array.dims {
                    let element = self.array_of(found.element, found.dims - array.dims);
                    self.collect_constraints(vars, array.element, element, out, depth + 1);
                }
            }
            Binding::Parameterized(_) | Binding::Type(_) => {
                let Some((generic, formal_args)) = self.class_args(formal) else {
                    return;
                };
                let Some(found) = self.as_super(actual, generic) else {
                    return;
                };
                let Some((_, actual_args)) = self.class_args(found) else {
                    return;
                };
                for (&formal_arg, &actual_arg) in formal_args.iter().zip(&actual_args) {
                    let formal_arg = match self.wildcard_of(formal_arg) {
                        Some(wildcard) => match wildcard.bound {
                            Some(bound) => bound,
                            None => continue,
                        },
                        None => formal_arg,
                    };
                    self.collect_constraints(vars, formal_arg, actual_arg, out, depth + 1);
                }
            }
            Binding::Wildcard(wildcard) => {
                if let Some(bound) = wildcard.bound {
                    self.collect_constraints(vars, bound, actual, out, depth + 1);
                }
            }
            _ => {}
        }
    }

    /// The generic declaration and type arguments of a class type; a generic declaration
    /// stands for its parameterization by its own type parameters.
    fn class_args(&self, ty: BindingId) -> Option<(BindingId, Vec<BindingId>)> {
        match self.binding(ty) {
            Binding::Parameterized(p) => Some((p.generic, p.args.clone())),
            Binding::Type(decl) if decl.is_generic() => Some((ty, decl.type_params.clone())),
            _ => None,
        }
    }

    /// The candidate every other candidate is a subtype of, else the first one.
    fn most_general(&mut self, found: &[BindingId]) -> Option<BindingId> {
        let first = *found.first()?;
        for &candidate in found {
            if found.iter().all(|&other| self.is_subtype(other, candidate)) {
                return Some(candidate);
            }
        }
        Some(first)
    }
}

#[cfg(test)]
mod tests {
    use nova_classfile::BaseType;
    use nova_core::{Name, TypeName};
    use pretty_assertions::assert_eq;

    use crate::options::ResolveOptions;
    use crate::project::Project;
    use crate::session::Session;

    #[test]
    fn instantiations_are_interned_and_share_the_declaration() {
        let project = Project::with_minimal_jdk();
        let mut session = Session::new(&project, ResolveOptions::default());
        let collections = session
            .lookup_type(&TypeName::new("java.util.Collections"))
            .unwrap();
        let singleton = session.find_methods(collections, &Name::from("singletonList"))[0];
        let string = session.string();
        let integer = session.lookup_type(&TypeName::new("java.lang.Integer")).unwrap();

        let a = session.instantiate(singleton, vec![string]).unwrap();
        let b = session.instantiate(singleton, vec![string]).unwrap();
        let c = session.instantiate(singleton, vec![integer]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(session.declaration(a), singleton);
        assert_eq!(session.declaration(c), singleton);

        let list = session.lookup_type(&TypeName::new("java.util.List")).unwrap();
        let list_of_string = session.parameterize(list, vec![string]).unwrap();
        assert_eq!(session.binding(a).as_method().unwrap().ret, list_of_string);
        assert_eq!(session.type_arguments(a), vec![string]);
        assert_eq!(session.instantiate(singleton, Vec::new()), None);
        let int = session.primitive(BaseType::Int);
        assert_eq!(session.instantiate(singleton, vec![int]), None);
    }

    #[test]
    fn inference_uses_arguments_then_the_assignment_target() {
        let project = Project::with_minimal_jdk();
        let mut session = Session::new(&project, ResolveOptions::default());
        let collections = session
            .lookup_type(&TypeName::new("java.util.Collections"))
            .unwrap();
        let singleton = session.find_methods(collections, &Name::from("singletonList"))[0];
        let empty = session.find_methods(collections, &Name::from("emptyList"))[0];
        let string = session.string();
        let object = session.object();
        let int = session.primitive(BaseType::Int);
        let integer = session.lookup_type(&TypeName::new("java.lang.Integer")).unwrap();
        let list = session.lookup_type(&TypeName::new("java.util.List")).unwrap();
        let list_of_string = session.parameterize(list, vec![string]).unwrap();

        let vars = session.type_parameters(singleton);
        let formals = session.binding(singleton).as_method().unwrap().params.clone();
        assert_eq!(
            session.infer_type_args(&vars, &formals, &[Some(int)], None),
            vec![integer]
        );

        let vars = session.type_parameters(empty);
        let ret = session.binding(empty).as_method().unwrap().ret;
        assert_eq!(
            session.infer_type_args(&vars, &[], &[], Some((ret, list_of_string))),
            vec![string]
        );
        assert_eq!(session.infer_type_args(&vars, &[], &[], None), vec![object]);
    }
}
