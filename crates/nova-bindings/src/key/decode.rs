use nova_core::{FileId, Name, PackageName, TypeName};

use crate::binding::{Binding, BindingId, CaptureSite};
use crate::session::Session;

use super::{parse_key, ClassSegment, KeyKind, KeyNode};

impl<'p> Session<'p> {
    /// The binding named by `key` in this session, or `None` when the key is malformed or
    /// names nothing in the current project.
    pub fn resolve_key(&mut self, key: &str) -> Option<BindingId> {
        let node = match parse_key(key, self.options.max_key_depth) {
            Ok(node) => node,
            Err(err) => {
                tracing::debug!(key, %err, "malformed binding key");
                return None;
            }
        };
        let mut context = Vec::new();
        let resolved = self.decode(key, &node, &mut context);
        if resolved.is_none() {
            tracing::trace!(key, "binding key names nothing");
        }
        resolved
    }

    /// `context` mirrors the encoder's: owners whose type variables short keys refer to.
    fn decode(&mut self, key: &str, node: &KeyNode, context: &mut Vec<BindingId>) -> Option<BindingId> {
        match &node.kind {
            KeyKind::Package(name) => self.lookup_package(&PackageName::from_internal(name)),
            KeyKind::Primitive(base) => Some(self.primitive(*base)),
            KeyKind::Void => Some(self.void_type()),
            KeyKind::Null => Some(self.null_type()),
            KeyKind::Array { dims, element } => {
                let element = self.decode(key, element, context)?;
                if !self.binding(element).is_type() || matches!(self.binding(element), Binding::Void) {
                    return None;
                }
                Some(self.array_of(element, *dims))
            }
            KeyKind::Class(segments) => self.decode_class(key, segments, context),
            KeyKind::TypeVar {
                owner: None, name, ..
            } => self.type_var_in_context(context, name),
            KeyKind::TypeVar {
                owner: Some(owner),
                name,
                ..
            } => {
                let owner = self.decode(key, owner, &mut Vec::new())?;
                self.type_parameters(owner).into_iter().find(|&var| {
                    matches!(self.binding(var), Binding::TypeVariable(tv) if tv.name == name.as_str())
                })
            }
            KeyKind::Wildcard { kind, bound } => {
                let bound = match bound {
                    Some(bound) => Some(self.decode(key, bound, context)?),
                    None => None,
                };
                Some(self.wildcard(*kind, bound))
            }
            KeyKind::Capture {
                file,
                generic,
                rank,
                wildcard,
                offset,
            } => {
                let generic = self.decode(key, generic, &mut Vec::new())?;
                let generic = self.generic_of(generic)?;
                let wildcard = self.decode(key, wildcard, context)?;
                let site = CaptureSite {
                    file: FileId::from_raw(*file),
                    offset: *offset,
                };
                let id = self.interner.captures.get(&(site, *rank)).copied()?;
                let same = matches!(self.binding(id), Binding::Capture(c)
                    if c.generic == generic && c.wildcard == wildcard);
                same.then_some(id)
            }
            // Back references only occur inside the capture they refer to, and capture keys are
            // matched structurally.
            KeyKind::CaptureRef(_) => None,
            KeyKind::Method { declaring, .. } => {
                let declaring = self.decode(key, declaring, &mut Vec::new())?;
                let candidates = self.declared_methods(declaring);
                self.find_by_key(candidates, &key[node.span.clone()])
            }
            KeyKind::Field { declaring, .. } => {
                let declaring = self.decode(key, declaring, &mut Vec::new())?;
                let candidates = self.declared_fields(declaring);
                self.find_by_key(candidates, &key[node.span.clone()])
            }
            KeyKind::Local {
                member,
                name,
                occurrence,
                rank,
            } => {
                let member = self.decode(key, member, &mut Vec::new())?;
                self.ensure_locals(member);
                self.interner
                    .locals
                    .get(&(member, Name::from(name.as_str()), *occurrence, *rank))
                    .copied()
            }
            KeyKind::Annotation { annotated, .. } => {
                let annotated = self.decode(key, annotated, &mut Vec::new())?;
                let candidates = self.annotation_candidates(annotated);
                self.find_by_key(candidates, &key[node.span.clone()])
            }
            KeyKind::Instance { method, args } => {
                let method = self.decode(key, method, &mut Vec::new())?;
                let args = args
                    .iter()
                    .map(|arg| self.decode(key, arg, &mut Vec::new()))
                    .collect::<Option<Vec<_>>>()?;
                self.instantiate(method, args)
            }
        }
    }

    /// Member keys are written without context, so they can be compared as text.
    fn find_by_key(&self, candidates: Vec<BindingId>, text: &str) -> Option<BindingId> {
        candidates.into_iter().find(|&id| self.key(id) == text)
    }

    /// Whether `args` spell the declaration form `Lp/X<TT;>;` of `decl`: its own parameter
    /// names in order, not all of which are in scope where the key refers to them.
    fn is_declaration_form(
        &self,
        decl: BindingId,
        args: &[KeyNode],
        context: &[BindingId],
    ) -> bool {
        let params = self.type_params_of(decl);
        if params.len() != args.len() {
            return false;
        }
        let mut in_context = true;
        for (&param, arg) in params.iter().zip(args) {
            let KeyKind::TypeVar {
                owner: None, name, ..
            } = &arg.kind
            else {
                return false;
            };
            if self.type_var_name(param) != Some(name.as_str()) {
                return false;
            }
            in_context &= self.type_var_in_context(context, name).is_some();
        }
        !in_context
    }

    fn decode_all(
        &mut self,
        key: &str,
        nodes: &[KeyNode],
        context: &mut Vec<BindingId>,
    ) -> Option<Vec<BindingId>> {
        nodes
            .iter()
            .map(|node| self.decode(key, node, context))
            .collect()
    }

    fn decode_class(
        &mut self,
        key: &str,
        segments: &[ClassSegment],
        context: &mut Vec<BindingId>,
    ) -> Option<BindingId> {
        let (first, rest) = segments.split_first()?;
        let mut name = TypeName::from_internal(&first.name);
        let mut current = self.decode_segment(key, &name, None, first, context)?;
        for segment in rest {
            name = name.nested(&segment.name);
            current = self.decode_segment(key, &name, Some(current), segment, context)?;
        }
        Some(current)
    }

    fn decode_segment(
        &mut self,
        key: &str,
        name: &TypeName,
        enclosing: Option<BindingId>,
        segment: &ClassSegment,
        context: &mut Vec<BindingId>,
    ) -> Option<BindingId> {
        let decl = self.lookup_type(name)?;
        let args = match &segment.args {
            None => None,
            Some(args) => {
                let depth = context.len();
                if self.is_declaration_form(decl, args, context) {
                    context.extend(self.enclosing_chain(decl));
                }
                let decoded = self.decode_all(key, args, context);
                context.truncate(depth);
                Some(decoded?)
            }
        };
        if enclosing.is_none() && args.is_none() {
            return Some(decl);
        }
        Some(self.class_type(decl, enclosing, args))
    }
}

#[cfg(test)]
mod tests {
    use nova_core::TypeName;
    use pretty_assertions::assert_eq;

    use crate::binding::WildcardKind;
    use crate::options::ResolveOptions;
    use crate::project::Project;
    use crate::session::Session;

    #[test]
    fn type_keys_decode_to_the_same_bindings() {
        let project = Project::with_minimal_jdk();
        let mut session = Session::new(&project, ResolveOptions::default());
        let map = session.lookup_type(&TypeName::new("java.util.Map")).unwrap();
        let entry = session.lookup_type(&TypeName::new("java.util.Map$Entry")).unwrap();
        let string = session.string();
        let any = session.wildcard(WildcardKind::Super, Some(string));
        let map_ty = session.parameterize(map, vec![string, any]).unwrap();
        let raw_entry = session.raw_type(entry).unwrap();
        let array = session.array_of(map_ty, 3);
        let k = session.type_parameters(map)[0];

        for id in [map, entry, map_ty, raw_entry, array, k, string] {
            let key = session.key(id);
            assert_eq!(session.resolve_key(&key), Some(id), "{key}");
        }
    }

    #[test]
    fn methods_and_fields_decode_from_their_keys() {
        let project = Project::with_minimal_jdk();
        let mut session = Session::new(&project, ResolveOptions::default());
        let list = session.lookup_type(&TypeName::new("java.util.List")).unwrap();
        let string = session.string();
        let list_of_string = session.parameterize(list, vec![string]).unwrap();
        let integer = session.lookup_type(&TypeName::new("java.lang.Integer")).unwrap();

        let mut members = session.declared_methods(list_of_string);
        members.extend(session.declared_methods(integer));
        members.extend(session.declared_fields(integer));
        assert!(!members.is_empty());
        for id in members {
            let key = session.key(id);
            assert_eq!(session.resolve_key(&key), Some(id), "{key}");
        }
    }

    #[test]
    fn unknown_and_malformed_keys_resolve_to_nothing() {
        let project = Project::with_minimal_jdk();
        let mut session = Session::new(&project, ResolveOptions::default());
        assert_eq!(session.resolve_key("Lno/Such;"), None);
        assert_eq!(session.resolve_key("Ljava/lang/String;.nope()V"), None);
        assert_eq!(session.resolve_key("Ljava/lang/String"), None);
        assert_eq!(session.resolve_key("no/such/pkg"), None);
        assert_eq!(session.resolve_key("[V"), None);
        assert!(session.resolve_key("java/lang").is_some());
    }
}
