//! Annotation instances and annotation element values.

use nova_classfile::{descriptor_to_internal_name, parse_field_descriptor, Annotation, ElementValue};
use nova_core::{Name, TypeName};
use nova_hir::{AnnotationUse, Expr, ExprKind, TypeKind};

use crate::binding::{
    AnnotationBinding, AnnotationValue, Binding, BindingId, MemberOrigin, TypeOrigin, VariableKind,
};
use crate::resolver::scope::Scope;
use crate::session::{FieldSource, Session};

impl<'p> Session<'p> {
    /// Annotations on a type, method, field or parameter, in declaration order. Members seen
    /// through a parameterized or raw type carry the annotations of their declaration.
    pub fn annotations(&mut self, annotated: BindingId) -> Vec<BindingId> {
        let annotated = self.declaration(annotated);
        if let Some(cached) = self.annotation_cache.get(&annotated) {
            return cached.clone();
        }
        let resolved = match self.annotation_source(annotated) {
            Some(AnnotationSource::Source(scope, uses)) => (0..uses.len())
                .filter_map(|index| self.source_annotation(annotated, &scope, uses, index))
                .collect(),
            Some(AnnotationSource::Dependency(annotations)) => (0..annotations.len())
                .filter_map(|index| self.stub_annotation(annotated, annotations, index))
                .collect(),
            None => Vec::new(),
        };
        self.annotation_cache.insert(annotated, resolved.clone());
        resolved
    }

    fn annotation_source(&mut self, annotated: BindingId) -> Option<AnnotationSource<'p>> {
        match self.binding(annotated).clone() {
            Binding::Type(decl) => match decl.origin {
                TypeOrigin::Source { .. } => {
                    let source = self.decls.source(&decl.name)?;
                    let scope = self.type_scope(annotated)?;
                    Some(AnnotationSource::Source(scope, &source.decl.annotations))
                }
                TypeOrigin::Dependency => {
                    let stub = self.project().classes().lookup_class(&decl.name.to_internal())?;
                    Some(AnnotationSource::Dependency(&stub.annotations))
                }
                TypeOrigin::Missing => None,
            },
            Binding::Method(method) => match method.origin {
                MemberOrigin::Source { .. } => {
                    let &(_, decl) = self.method_decls.get(&annotated)?;
                    let scope = self.method_scope(annotated)?;
                    Some(AnnotationSource::Source(scope, &decl.annotations))
                }
                MemberOrigin::Dependency => {
                    let stub = *self.method_stubs.get(&annotated)?;
                    Some(AnnotationSource::Dependency(&stub.annotations))
                }
            },
            Binding::Variable(var) => match var.kind {
                VariableKind::Field | VariableKind::EnumConstant => match var.origin {
                    MemberOrigin::Source { .. } => {
                        let &(_, field) = self.field_decls.get(&annotated)?;
                        let scope = self.type_scope(var.declaring)?;
                        let uses = match field {
                            FieldSource::Field(field) => &field.annotations,
                            FieldSource::EnumConstant(constant) => &constant.annotations,
                        };
                        Some(AnnotationSource::Source(scope, uses))
                    }
                    MemberOrigin::Dependency => {
                        let stub = *self.field_stubs.get(&annotated)?;
                        Some(AnnotationSource::Dependency(&stub.annotations))
                    }
                },
                VariableKind::Parameter => {
                    let param = *self.param_decls.get(&annotated)?;
                    let scope = self.method_scope(var.declaring)?;
                    Some(AnnotationSource::Source(scope, &param.annotations))
                }
                VariableKind::Local => None,
            },
            _ => None,
        }
    }

    /// Annotations on `annotated` followed by the annotations nested in their values and, for
    /// annotation type elements, in the element's default.
    pub(crate) fn annotation_candidates(&mut self, annotated: BindingId) -> Vec<BindingId> {
        let mut found = self.annotations(annotated);
        let mut values = Vec::new();
        if let Some(method) = self.binding(annotated).as_method() {
            values.extend(method.default_value.clone());
        }
        for &annotation in &found {
            if let Binding::Annotation(annotation) = self.binding(annotation) {
                values.extend(annotation.all.iter().map(|(_, value)| value.clone()));
            }
        }
        while let Some(value) = values.pop() {
            match value {
                AnnotationValue::Annotation(nested) => {
                    if let Binding::Annotation(annotation) = self.binding(nested) {
                        values.extend(annotation.all.iter().map(|(_, value)| value.clone()));
                    }
                    found.push(nested);
                }
                AnnotationValue::Array(items) => values.extend(items),
                _ => {}
            }
        }
        found
    }

    fn annotation_type(
        &mut self,
        scope: &Scope<'p>,
        annotation: &AnnotationUse,
    ) -> Option<BindingId> {
        let ty = self.resolve_type(scope, &annotation.ty, false, &mut Vec::new())?;
        self.generic_of(ty)
    }

    /// The annotation binding for `uses[index]`, written in source on `annotated`.
    pub(crate) fn source_annotation(
        &mut self,
        annotated: BindingId,
        scope: &Scope<'p>,
        uses: &[AnnotationUse],
        index: usize,
    ) -> Option<BindingId> {
        let annotation = uses.get(index)?;
        let ty = self.annotation_type(scope, annotation)?;
        let mut ordinal = 0;
        for earlier in &uses[..index] {
            if self.annotation_type(scope, earlier) == Some(ty) {
                ordinal += 1;
            }
        }
        if let Some(&existing) = self.interner.annotations.get(&(annotated, ty, ordinal)) {
            return Some(existing);
        }
        let elements = self.declared_methods(ty);
        let mut explicit = Vec::new();
        for arg in &annotation.args {
            let name = arg.name.clone().unwrap_or_else(|| Name::from("value"));
            let Some(ret) = elements.iter().find_map(|&m| match self.binding(m) {
                Binding::Method(method) if method.name == name => Some(method.ret),
                _ => None,
            }) else {
                tracing::trace!(%name, "annotation argument names no element");
                continue;
            };
            if let Some(value) = self.annotation_value(annotated, scope, &arg.value, ret) {
                explicit.push((name, value));
            }
        }
        Some(self.intern_annotation(annotated, ty, ordinal, explicit))
    }

    fn stub_annotation(
        &mut self,
        annotated: BindingId,
        annotations: &[Annotation],
        index: usize,
    ) -> Option<BindingId> {
        let annotation = annotations.get(index)?;
        let same_type = annotations[..index]
            .iter()
            .filter(|earlier| earlier.type_internal_name == annotation.type_internal_name)
            .count();
        self.intern_stub_annotation(annotated, annotation, same_type as u32)
    }

    /// Interns an annotation recorded in a dependency class under the first free ordinal
    /// from `from`. Nested annotation values take ordinals on the element they belong to.
    fn intern_stub_annotation(
        &mut self,
        annotated: BindingId,
        annotation: &Annotation,
        from: u32,
    ) -> Option<BindingId> {
        let internal = annotation.type_internal_name.as_deref()?;
        let ty = self.lookup_type(&TypeName::from_internal(internal))?;
        let explicit = annotation
            .elements
            .iter()
            .filter_map(|(name, value)| {
                let value = self.annotation_value_from_element(annotated, value)?;
                Some((Name::from(name.as_str()), value))
            })
            .collect();
        let mut ordinal = from;
        while self.interner.annotations.contains_key(&(annotated, ty, ordinal)) {
            ordinal += 1;
        }
        Some(self.intern_annotation(annotated, ty, ordinal, explicit))
    }

    /// Allocates the annotation with its derived pairs: explicit values followed by the
    /// defaults of every element not given explicitly.
    fn intern_annotation(
        &mut self,
        annotated: BindingId,
        ty: BindingId,
        ordinal: u32,
        explicit: Vec<(Name, AnnotationValue)>,
    ) -> BindingId {
        let mut all = explicit.clone();
        for element in self.declared_methods(ty) {
            let Binding::Method(method) = self.binding(element) else {
                continue;
            };
            if all.iter().any(|(name, _)| name == &method.name) {
                continue;
            }
            if let Some(default) = &method.default_value {
                all.push((method.name.clone(), default.clone()));
            }
        }
        let id = self.interner.alloc(Binding::Annotation(AnnotationBinding {
            annotated,
            ty,
            ordinal,
            explicit,
            all,
        }));
        self.interner.annotations.insert((annotated, ty, ordinal), id);
        id
    }

    /// The value of an annotation element written as `expr`, for an element of type
    /// `expected`.
    fn annotation_value(
        &mut self,
        annotated: BindingId,
        scope: &Scope<'p>,
        expr: &Expr,
        expected: BindingId,
    ) -> Option<AnnotationValue> {
        let array = match self.binding(expected) {
            Binding::Array(array) => Some(*array),
            _ => None,
        };
        if let Some(array) = array {
            let element = self.array_of(array.element, array.dims - 1);
            let items = match &expr.kind {
                ExprKind::ArrayInit(items) => items.iter().collect::<Vec<_>>(),
                _ => vec![expr],
            };
            let values = items
                .into_iter()
                .filter_map(|item| self.annotation_value(annotated, scope, item, element))
                .collect();
            return Some(AnnotationValue::Array(values));
        }
        match &expr.kind {
            ExprKind::Paren(inner) => return self.annotation_value(annotated, scope, inner, expected),
            ExprKind::ClassLiteral(ty) => {
                return self
                    .resolve_type(scope, ty, false, &mut Vec::new())
                    .map(AnnotationValue::Type);
            }
            _ => {}
        }
        let is_enum = matches!(
            self.binding(expected),
            Binding::Type(decl) if decl.kind == TypeKind::Enum
        );
        if is_enum {
            let name = match &expr.kind {
                ExprKind::Name(name) => name,
                ExprKind::FieldAccess { name, .. } => name,
                _ => return None,
            };
            return self
                .find_field(expected, name)
                .filter(|&field| {
                    matches!(self.binding(field), Binding::Variable(v) if v.is_enum_constant())
                })
                .map(AnnotationValue::EnumConstant);
        }
        let value = self.fold(scope, &[], expr)?;
        self.coerce_to(value, expected).map(AnnotationValue::Const)
    }

    /// Converts an element value recorded in a dependency class. Nested annotations are
    /// attached to `owner`.
    pub(crate) fn annotation_value_from_element(
        &mut self,
        owner: BindingId,
        value: &ElementValue,
    ) -> Option<AnnotationValue> {
        match value {
            ElementValue::Const(constant) => Some(AnnotationValue::Const(constant.clone())),
            ElementValue::Enum {
                type_descriptor,
                const_name,
            } => {
                let internal = descriptor_to_internal_name(type_descriptor)?;
                let ty = self.lookup_type(&TypeName::from_internal(&internal))?;
                self.declared_fields(ty)
                    .into_iter()
                    .find(|&field| {
                        matches!(self.binding(field), Binding::Variable(v) if v.name == const_name.as_str())
                    })
                    .map(AnnotationValue::EnumConstant)
            }
            ElementValue::Class(descriptor) if descriptor == "V" => {
                Some(AnnotationValue::Type(self.void_type()))
            }
            ElementValue::Class(descriptor) => {
                let ty = parse_field_descriptor(descriptor).ok()?;
                Some(AnnotationValue::Type(self.type_from_descriptor(&ty)))
            }
            ElementValue::Annotation(annotation) => self
                .intern_stub_annotation(owner, annotation, 0)
                .map(AnnotationValue::Annotation),
            ElementValue::Array(items) => Some(AnnotationValue::Array(
                items
                    .iter()
                    .filter_map(|item| self.annotation_value_from_element(owner, item))
                    .collect(),
            )),
        }
    }

    /// Computes the `default` values of source annotation type elements.
    pub(crate) fn load_annotation_defaults(&mut self, methods: &[BindingId]) {
        for &method in methods {
            let Some(&(_, decl)) = self.method_decls.get(&method) else {
                continue;
            };
            let Some(default) = decl.default_value.as_ref() else {
                continue;
            };
            let (declaring, ret) = match self.binding(method) {
                Binding::Method(m) => (m.declaring, m.ret),
                _ => continue,
            };
            let Some(scope) = self.type_scope(declaring) else {
                continue;
            };
            let value = self.annotation_value(method, &scope, default, ret);
            if let Binding::Method(binding) = self.interner.get_mut(method) {
                binding.default_value = value;
            }
        }
    }
}

enum AnnotationSource<'p> {
    Source(Scope<'p>, &'p [AnnotationUse]),
    Dependency(&'p [Annotation]),
}

#[cfg(test)]
mod tests {
    use nova_classfile::ConstValue;
    use nova_core::{FileId, TypeName};
    use nova_hir::{HirBuilder, PrimitiveType};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::options::ResolveOptions;
    use crate::project::Project;

    #[test]
    fn explicit_values_and_defaults() {
        let mut b = HirBuilder::new(FileId::from_raw(0));
        let mut unit = b.unit(Some("p"));
        let mut a = b.class("A");
        let since = b.string("9");
        a.annotations.push(b.annotation("Deprecated", vec![(Some("since"), since)]));
        let mut holder = b.class("B");
        let mut tag = b.annotation_decl("Tag");
        let int = b.prim(PrimitiveType::Int);
        let mut level = b.method("level", int, Vec::new());
        level.default_value = Some(b.int(3));
        tag.methods.push(level);
        holder.annotations.push(b.annotation("Tag", Vec::new()));
        unit.types.push(a);
        unit.types.push(tag);
        unit.types.push(holder);
        let mut project = Project::with_minimal_jdk();
        project.set_unit(unit);
        let mut session = Session::new(&project, ResolveOptions::default());

        let a = session.lookup_type(&TypeName::new("p.A")).unwrap();
        let annotations = session.annotations(a);
        assert_eq!(annotations.len(), 1);
        let Binding::Annotation(deprecated) = session.binding(annotations[0]).clone() else {
            panic!("expected an annotation");
        };
        assert_eq!(
            deprecated.explicit,
            vec![(Name::from("since"), AnnotationValue::Const(ConstValue::String("9".into())))]
        );
        assert_eq!(deprecated.all.len(), 2);
        assert_eq!(
            deprecated.all[1],
            (Name::from("forRemoval"), AnnotationValue::Const(ConstValue::Boolean(false)))
        );

        let holder = session.lookup_type(&TypeName::new("p.B")).unwrap();
        let tag = session.lookup_type(&TypeName::new("p.Tag")).unwrap();
        assert!(matches!(session.binding(tag), Binding::Type(t) if t.kind == TypeKind::Annotation));
        let annotations = session.annotations(holder);
        let Binding::Annotation(use_) = session.binding(annotations[0]).clone() else {
            panic!("expected an annotation");
        };
        assert!(use_.explicit.is_empty());
        assert_eq!(
            use_.all,
            vec![(Name::from("level"), AnnotationValue::Const(ConstValue::Int(3)))]
        );
        assert_eq!(session.annotations(holder), annotations);
    }

    #[test]
    fn repeated_annotations_are_separate_instances() {
        let file = FileId::from_raw(0);
        let mut b = HirBuilder::new(file);
        let mut unit = b.unit(Some("p"));
        let mut tag = b.annotation_decl("Tag");
        let int = b.prim(PrimitiveType::Int);
        tag.methods.push(b.method("value", int, Vec::new()));
        let mut holder = b.class("B");
        let mut uses = Vec::new();
        for value in [1, 2] {
            let value = b.int(value);
            let annotation = b.annotation("Tag", vec![(None, value)]);
            uses.push(annotation.id);
            holder.annotations.push(annotation);
        }
        unit.types.push(tag);
        unit.types.push(holder);
        let mut project = Project::with_minimal_jdk();
        project.set_unit(unit);
        let mut session = Session::new(&project, ResolveOptions::default());

        let holder = session.lookup_type(&TypeName::new("p.B")).unwrap();
        let annotations = session.annotations(holder);
        assert_eq!(annotations.len(), 2);
        assert_ne!(annotations[0], annotations[1]);
        let explicit = annotations
            .iter()
            .map(|&id| match session.binding(id) {
                Binding::Annotation(annotation) => annotation.explicit.clone(),
                _ => Vec::new(),
            })
            .collect::<Vec<_>>();
        assert_eq!(
            explicit,
            vec![
                vec![(Name::from("value"), AnnotationValue::Const(ConstValue::Int(1)))],
                vec![(Name::from("value"), AnnotationValue::Const(ConstValue::Int(2)))],
            ]
        );

        assert_eq!(session.key(annotations[0]), "Lp/B;@Lp/Tag;");
        assert_eq!(session.key(annotations[1]), "Lp/B;@Lp/Tag;#1");
        for &id in &annotations {
            let key = session.key(id);
            assert_eq!(session.resolve_key(&key), Some(id), "{key}");
        }

        let resolved = session.resolve_unit(file).unwrap();
        assert_eq!(resolved.binding(uses[0]), Some(annotations[0]));
        assert_eq!(resolved.binding(uses[1]), Some(annotations[1]));
    }
}
