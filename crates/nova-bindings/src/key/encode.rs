use crate::binding::{Binding, BindingId, WildcardKind};
use crate::session::Session;

impl<'p> Session<'p> {
    /// The binding key of `id`.
    ///
    /// Keys are deterministic: the same declaration yields the same key in every session over an
    /// equivalent project, which is what makes them usable across sessions.
    pub fn key(&self, id: BindingId) -> String {
        let mut encoder = KeyEncoder {
            session: self,
            out: String::new(),
            context: Vec::new(),
            captures: Vec::new(),
            owners: Vec::new(),
        };
        encoder.binding(id);
        encoder.out
    }

    /// Finds the type variable `name` the way a short `T<name>;` key refers to it: in the
    /// innermost owner of `context` declaring a parameter with that name.
    pub(crate) fn type_var_in_context(&self, context: &[BindingId], name: &str) -> Option<BindingId> {
        context.iter().rev().find_map(|&owner| {
            self.type_parameters(owner)
                .into_iter()
                .find(|&var| self.type_var_name(var) == Some(name))
        })
    }

    pub(super) fn type_var_name(&self, var: BindingId) -> Option<&str> {
        match self.binding(var) {
            Binding::TypeVariable(tv) => Some(tv.name.as_str()),
            _ => None,
        }
    }
}

struct KeyEncoder<'s, 'p> {
    session: &'s Session<'p>,
    out: String,
    /// Generic declarations and methods whose type variables may be written in short form.
    context: Vec<BindingId>,
    /// Captures currently being written, for back references.
    captures: Vec<BindingId>,
    /// Type variable owners currently being written.
    owners: Vec<BindingId>,
}

impl KeyEncoder<'_, '_> {
    fn binding(&mut self, id: BindingId) {
        let session = self.session;
        match session.binding(id) {
            Binding::Package(pkg) => self.out.push_str(&pkg.name.to_internal()),
            Binding::Primitive(base) => self.out.push(base.descriptor_char()),
            Binding::Null => self.out.push('N'),
            Binding::Void => self.out.push('V'),
            Binding::Type(_) => self.declared_type(id),
            Binding::Array(array) => {
                for _ in 0..array.dims {
                    self.out.push('[');
                }
                self.binding(array.element);
            }
            Binding::TypeVariable(_) => self.type_var(id),
            Binding::Wildcard(wildcard) => {
                match wildcard.kind {
                    WildcardKind::Unbounded => self.out.push('*'),
                    WildcardKind::Extends => self.out.push('+'),
                    WildcardKind::Super => self.out.push('-'),
                }
                if let Some(bound) = wildcard.bound {
                    self.binding(bound);
                }
            }
            Binding::Parameterized(_) | Binding::Raw(_) => self.class_reference(id),
            Binding::Capture(_) => self.capture(id),
            Binding::Method(_) | Binding::Variable(_) | Binding::Annotation(_) => self.member(id),
        }
    }

    fn internal_name(&mut self, ty: BindingId) {
        if let Some(name) = self.session.binary_name(ty) {
            self.out.push_str(&name.to_internal());
        }
    }

    /// `Lp/X;`, or the declaration form `Lp/X<TT;>;` for generic types.
    fn declared_type(&mut self, ty: BindingId) {
        let params = self.session.type_params_of(ty);
        self.out.push('L');
        self.internal_name(ty);
        if !params.is_empty() {
            let with_bounds = !self.context.contains(&ty);
            let depth = self.context.len();
            self.context.extend(self.session.enclosing_chain(ty));
            self.out.push('<');
            for param in params {
                self.type_param_decl(param, with_bounds);
            }
            self.out.push('>');
            self.context.truncate(depth);
        }
        self.out.push(';');
    }

    /// `TT;`, or `TT:B1:B2;` when the bounds are not just `Object`.
    fn type_param_decl(&mut self, var: BindingId, with_bounds: bool) {
        let session = self.session;
        let Binding::TypeVariable(tv) = session.binding(var) else {
            return;
        };
        self.out.push('T');
        self.out.push_str(tv.name.as_str());
        let only_object = tv.bounds.len() == 1 && session.is_object(tv.bounds[0]);
        if with_bounds && !only_object {
            for &bound in &tv.bounds {
                self.out.push(':');
                self.binding(bound);
            }
        }
        self.out.push(';');
    }

    fn type_var(&mut self, var: BindingId) {
        let session = self.session;
        let Binding::TypeVariable(tv) = session.binding(var) else {
            return;
        };
        let short = session.type_var_in_context(&self.context, tv.name.as_str()) == Some(var)
            || self.owners.contains(&tv.owner);
        if !short {
            let owner = tv.owner;
            self.owners.push(owner);
            self.fresh(|encoder| encoder.binding(owner));
            self.owners.pop();
            self.out.push(':');
        }
        self.out.push('T');
        self.out.push_str(tv.name.as_str());
        self.out.push(';');
    }

    /// Parameterized and raw references, e.g. `Lp/X<Ljava/lang/String;>;` or `Lp/X<>.Y;`.
    fn class_reference(&mut self, id: BindingId) {
        let (generic, enclosing, args) = match self.session.binding(id) {
            Binding::Parameterized(p) => (p.generic, p.enclosing, Some(p.args.clone())),
            Binding::Raw(r) => (r.generic, r.enclosing, None),
            _ => return,
        };
        match enclosing {
            Some(outer) => {
                self.binding(outer);
                self.out.pop();
                self.out.push('.');
                if let Some(name) = self.session.binary_name(generic) {
                    self.out.push_str(name.simple_name());
                }
            }
            None => {
                self.out.push('L');
                self.internal_name(generic);
            }
        }
        match args {
            // Arguments are written in the referencing context, not the generic's own.
            Some(args) if !args.is_empty() => {
                self.out.push('<');
                for arg in args {
                    self.binding(arg);
                }
                self.out.push('>');
            }
            Some(_) => {}
            None => {
                if !self.session.type_params_of(generic).is_empty() {
                    self.out.push_str("<>");
                }
            }
        }
        self.out.push(';');
    }

    /// `!<file>&Lp/X;{rank}<wildcard>*<offset>`, or just `*<offset>` for a capture already
    /// being written.
    fn capture(&mut self, id: BindingId) {
        let Binding::Capture(capture) = self.session.binding(id) else {
            return;
        };
        let (generic, rank, wildcard, site) =
            (capture.generic, capture.rank, capture.wildcard, capture.site);
        if self.captures.contains(&id) {
            self.out.push('*');
            self.out.push_str(&site.offset.to_string());
            return;
        }
        self.captures.push(id);
        self.out.push_str(&format!("!{}&L", site.file.to_raw()));
        self.internal_name(generic);
        self.out.push_str(&format!(";{{{rank}}}"));
        self.binding(wildcard);
        self.out.push('*');
        self.out.push_str(&site.offset.to_string());
        self.captures.pop();
    }

    /// Runs `f` with an empty context, so member keys read the same wherever they appear.
    fn fresh(&mut self, f: impl FnOnce(&mut Self)) {
        let context = std::mem::take(&mut self.context);
        let captures = std::mem::take(&mut self.captures);
        f(self);
        self.context = context;
        self.captures = captures;
    }

    fn member(&mut self, id: BindingId) {
        let session = self.session;
        self.fresh(|encoder| match session.binding(id) {
            Binding::Method(_) => encoder.method(id),
            Binding::Variable(_) => encoder.variable(id),
            Binding::Annotation(annotation) => {
                let (annotated, ty, ordinal) =
                    (annotation.annotated, annotation.ty, annotation.ordinal);
                encoder.binding(annotated);
                encoder.out.push('@');
                encoder.binding(ty);
                if ordinal > 0 {
                    encoder.out.push_str(&format!("#{ordinal}"));
                }
            }
            _ => {}
        });
    }

    /// Pushes what the signature of a member declared in `declaring` can refer to.
    fn push_member_context(&mut self, declaring: BindingId) {
        if let Some(generic) = self.session.generic_of(declaring) {
            self.context.extend(self.session.enclosing_chain(generic));
        }
    }

    fn method(&mut self, id: BindingId) {
        let session = self.session;
        let Some(method) = session.binding(id).as_method() else {
            return;
        };
        if let Some(instantiated) = method.instance_of {
            self.binding(instantiated);
            self.out.push_str("%<");
            for &arg in &method.type_args {
                self.fresh(|encoder| encoder.binding(arg));
            }
            self.out.push('>');
            return;
        }

        self.binding(method.declaring);
        self.push_member_context(method.declaring);
        self.context.push(method.declaration);
        self.context.push(id);
        self.out.push('.');
        self.out.push_str(method.name.as_str());
        if !method.type_params.is_empty() {
            self.out.push('<');
            for &param in &method.type_params {
                self.type_param_decl(param, true);
            }
            self.out.push('>');
        }
        self.out.push('(');
        for &param in &method.params {
            self.binding(param);
        }
        self.out.push(')');
        self.binding(method.ret);
    }

    fn variable(&mut self, id: BindingId) {
        let session = self.session;
        let Some(var) = session.binding(id).as_variable() else {
            return;
        };
        match var.local {
            Some(local) => {
                self.binding(var.declaring);
                self.out.push('#');
                self.out.push_str(var.name.as_str());
                self.out
                    .push_str(&format!("#{}#{}", local.occurrence, local.rank));
            }
            None => {
                self.binding(var.declaring);
                self.push_member_context(var.declaring);
                self.out.push('.');
                self.out.push_str(var.name.as_str());
                self.out.push(')');
                self.binding(var.ty);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use nova_core::{FileId, TypeName};
    use nova_hir::HirBuilder;
    use pretty_assertions::assert_eq;

    use crate::binding::WildcardKind;
    use crate::options::ResolveOptions;
    use crate::project::Project;
    use crate::session::Session;

    #[test]
    fn type_keys() {
        let project = Project::with_minimal_jdk();
        let mut session = Session::new(&project, ResolveOptions::default());
        let list = session.lookup_type(&TypeName::new("java.util.List")).unwrap();
        let string = session.string();
        let list_of_string = session.parameterize(list, vec![string]).unwrap();
        let raw_list = session.raw_type(list).unwrap();
        let wildcard = session.wildcard(WildcardKind::Extends, Some(string));
        let list_of_wildcard = session.parameterize(list, vec![wildcard]).unwrap();
        let array = session.array_of(list_of_string, 2);

        assert_eq!(session.key(string), "Ljava/lang/String;");
        assert_eq!(session.key(list), "Ljava/util/List<TE;>;");
        assert_eq!(session.key(raw_list), "Ljava/util/List<>;");
        assert_eq!(session.key(list_of_string), "Ljava/util/List<Ljava/lang/String;>;");
        assert_eq!(
            session.key(list_of_wildcard),
            "Ljava/util/List<+Ljava/lang/String;>;"
        );
        assert_eq!(session.key(array), "[[Ljava/util/List<Ljava/lang/String;>;");
    }

    #[test]
    fn self_bounded_declaration() {
        let project = Project::with_minimal_jdk();
        let mut session = Session::new(&project, ResolveOptions::default());
        let enum_ty = session.lookup_type(&TypeName::new("java.lang.Enum")).unwrap();
        assert_eq!(
            session.key(enum_ty),
            "Ljava/lang/Enum<TE:Ljava/lang/Enum<TE;>;;>;"
        );
        let e = session.type_parameters(enum_ty)[0];
        assert_eq!(session.key(e), "Ljava/lang/Enum<TE:Ljava/lang/Enum<TE;>;;>;:TE;");
    }

    #[test]
    fn bounds_refer_back_to_the_declaring_type() {
        let file = FileId::from_raw(0);
        let mut b = HirBuilder::new(file);
        let mut unit = b.unit(Some("p"));
        let t = b.ty("T");
        let bound = b.generic("Comparable", vec![t]);
        let mut a = b.class("A");
        a.type_params.push(b.type_param("T", vec![bound]));
        unit.types.push(a);
        let mut project = Project::with_minimal_jdk();
        project.set_unit(unit);

        let mut session = Session::new(&project, ResolveOptions::default());
        let a = session.lookup_type(&TypeName::new("p.A")).unwrap();
        let t = session.type_parameters(a)[0];
        let key = session.key(a);
        assert_eq!(key, "Lp/A<TT:Ljava/lang/Comparable<TT;>;;>;");
        assert_eq!(session.key(t), "Lp/A<TT:Ljava/lang/Comparable<TT;>;;>;:TT;");

        let mut fresh = Session::new(&project, ResolveOptions::default());
        let decoded = fresh.resolve_key(&key);
        assert_eq!(decoded.map(|id| fresh.key(id)), Some(key));
        let t_key = session.key(t);
        let decoded = fresh.resolve_key(&t_key);
        assert_eq!(decoded.map(|id| fresh.key(id)), Some(t_key));
    }
}
