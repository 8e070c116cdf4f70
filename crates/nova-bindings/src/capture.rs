//! Capture conversion (JLS 5.1.10).
//!
//! Every wildcard argument of a parameterized type gets a fresh capture binding per syntactic
//! occurrence. Occurrences are identified by a [`CaptureSite`]; capturing the same type at the same
//! site twice returns the same bindings.

use crate::binding::{Binding, BindingId, CaptureBinding, CaptureSite, WildcardKind};
use crate::session::Session;

impl<'p> Session<'p> {
    /// Captures the wildcard arguments of `ty` at `site`. Types without wildcard arguments are
    /// returned unchanged.
    pub fn capture(&mut self, site: CaptureSite, ty: BindingId) -> BindingId {
        let (generic, enclosing, args) = match self.binding(ty) {
            Binding::Parameterized(p) => (p.generic, p.enclosing, p.args.clone()),
            _ => return ty,
        };
        if !args
            .iter()
            .any(|&arg| matches!(self.binding(arg), Binding::Wildcard(_)))
        {
            return ty;
        }

        let mut fresh = Vec::new();
        let captured = args
            .iter()
            .enumerate()
            .map(|(rank, &arg)| {
                let Binding::Wildcard(_) = self.binding(arg) else {
                    return arg;
                };
                let rank = rank as u32;
                if let Some(&existing) = self.interner.captures.get(&(site, rank)) {
                    return existing;
                }
                let id = self.interner.alloc(Binding::Capture(CaptureBinding {
                    wildcard: arg,
                    generic,
                    rank,
                    site,
                    upper_bounds: Vec::new(),
                    lower_bound: None,
                }));
                self.interner.captures.insert((site, rank), id);
                fresh.push(id);
                id
            })
            .collect::<Vec<_>>();

        // Parameter bounds may mention other parameters (`E extends Enum<E>`), so they are
        // substituted with the captured arguments.
        let params = self.type_params_of(generic);
        let subst = params
            .iter()
            .copied()
            .zip(captured.iter().copied())
            .collect::<Vec<_>>();
        for capture in fresh {
            self.init_capture_bounds(capture, &params, &subst);
        }
        self.class_type(generic, enclosing, Some(captured))
    }

    fn init_capture_bounds(
        &mut self,
        capture: BindingId,
        params: &[BindingId],
        subst: &[(BindingId, BindingId)],
    ) {
        let Binding::Capture(binding) = self.binding(capture) else {
            return;
        };
        let (wildcard, rank) = (binding.wildcard, binding.rank as usize);
        let declared = match params.get(rank).map(|&param| self.binding(param)) {
            Some(Binding::TypeVariable(tv)) => tv.bounds.clone(),
            _ => Vec::new(),
        };
        let mut param_bounds = Vec::new();
        for bound in declared {
            let bound = self.substitute(bound, subst);
            if !self.is_object(bound) {
                param_bounds.push(bound);
            }
        }
        let Some(wildcard) = self.wildcard_of(wildcard) else {
            return;
        };

        let (mut upper, lower) = match (wildcard.kind, wildcard.bound) {
            (WildcardKind::Extends, Some(bound)) => {
                let mut upper = vec![bound];
                upper.extend(param_bounds.into_iter().filter(|&b| b != bound));
                (upper, None)
            }
            (WildcardKind::Super, Some(bound)) => (param_bounds, Some(bound)),
            _ => (param_bounds, None),
        };
        if upper.is_empty() {
            upper.push(self.object());
        }
        if let Binding::Capture(binding) = self.interner.get_mut(capture) {
            binding.upper_bounds = upper;
            binding.lower_bound = lower;
        }
    }

    /// Bounds of a type variable, capture or wildcard: declared bounds for type variables, upper
    /// bounds for captures, the bound of an `extends` wildcard.
    pub fn type_bounds(&self, id: BindingId) -> Vec<BindingId> {
        match self.binding(id) {
            Binding::TypeVariable(tv) => tv.bounds.clone(),
            Binding::Capture(capture) => capture.upper_bounds.clone(),
            Binding::Wildcard(wildcard) if wildcard.kind == WildcardKind::Extends => {
                wildcard.bound.into_iter().collect()
            }
            _ => Vec::new(),
        }
    }

    /// The lower bound of a capture or `super` wildcard.
    pub fn lower_bound(&self, id: BindingId) -> Option<BindingId> {
        match self.binding(id) {
            Binding::Capture(capture) => capture.lower_bound,
            Binding::Wildcard(wildcard) if wildcard.kind == WildcardKind::Super => wildcard.bound,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use nova_core::{FileId, TypeName};

    use super::*;
    use crate::options::ResolveOptions;
    use crate::project::Project;

    #[test]
    fn captures_are_distinct_per_site() {
        let project = Project::with_minimal_jdk();
        let mut session = Session::new(&project, ResolveOptions::default());
        let list = session.lookup_type(&TypeName::new("java.util.List")).unwrap();
        let string = session.string();
        let wildcard = session.wildcard(WildcardKind::Extends, Some(string));
        let ty = session.parameterize(list, vec![wildcard]).unwrap();

        let site = |offset| CaptureSite {
            file: FileId::from_raw(0),
            offset,
        };
        let first = session.capture(site(10), ty);
        let again = session.capture(site(10), ty);
        let second = session.capture(site(20), ty);
        assert_eq!(first, again);
        assert_ne!(first, second);

        let c1 = session.type_arguments(first)[0];
        let c2 = session.type_arguments(second)[0];
        assert_ne!(c1, c2);
        assert_eq!(session.type_bounds(c1), vec![string]);
        assert_eq!(session.type_bounds(c1), session.type_bounds(c2));
    }

    #[test]
    fn unbounded_capture_takes_the_parameter_bound() {
        let project = Project::with_minimal_jdk();
        let mut session = Session::new(&project, ResolveOptions::default());
        let enum_ty = session.lookup_type(&TypeName::new("java.lang.Enum")).unwrap();
        let any = session.wildcard(WildcardKind::Unbounded, None);
        let ty = session.parameterize(enum_ty, vec![any]).unwrap();
        let site = CaptureSite {
            file: FileId::from_raw(0),
            offset: 3,
        };
        let captured = session.capture(site, ty);
        let capture = session.type_arguments(captured)[0];
        let bounds = session.type_bounds(capture);
        assert_eq!(bounds, vec![captured]);
        assert_eq!(session.lower_bound(capture), None);
    }
}
