use nova_bindings::{Binding, BindingId, Project, ResolveOptions, Session};
use nova_classfile::ConstValue;
use nova_core::{FileId, TypeName};
use nova_hir::{BinaryOp, CompilationUnit, HirBuilder, Modifiers, NodeId, PrimitiveType};
use pretty_assertions::{assert_eq, assert_ne};

use crate::fixture::{expr_id, project_with, FILE};

fn field(session: &mut Session<'_>, owner: BindingId, name: &str) -> BindingId {
    session
        .declared_fields(owner)
        .into_iter()
        .find(|&f| {
            session
                .binding(f)
                .as_variable()
                .is_some_and(|v| v.name.as_str() == name)
        })
        .unwrap()
}

#[test]
fn raw_types_are_distinct_from_their_declaration() {
    let project = project_with(|b| {
        let mut unit = b.unit(Some("p"));
        let t = b.type_param("T", Vec::new());
        let mut x = b.class("X");
        x.type_params.push(t);
        unit.types.push(x);
        unit
    });
    let mut session = Session::new(&project, ResolveOptions::default());
    let x = session.lookup_type(&TypeName::new("p.X")).unwrap();
    let raw = session.raw_type(x).unwrap();

    assert_ne!(raw, x);
    assert_eq!(session.raw_type(x), Some(raw));
    assert_eq!(session.erasure(raw), session.erasure(x));
    assert_eq!(session.declaration(raw), x);
    assert_eq!(session.key(x), "Lp/X<TT;>;");
    assert_eq!(session.key(raw), "Lp/X<>;");
}

#[test]
fn each_occurrence_captures_separately() {
    let mut ids = Vec::new();
    let project = project_with(|b| {
        let mut unit = b.unit(Some("p"));
        unit.imports.push(b.import_single("java.util.List"));
        let mut a = b.class("A");
        let string = b.ty("String");
        let bound = b.extends(string);
        let ty = b.generic("List", vec![bound]);
        a.fields.push(b.field("f", ty));
        let mut stmts = Vec::new();
        for _ in 0..2 {
            let read = b.name("f");
            ids.push(read.id);
            stmts.push(b.expr_stmt(read));
        }
        let body = b.block(stmts);
        let void = b.void();
        a.methods.push(b.method("m", void, Vec::new()).with_body(body));
        unit.types.push(a);
        unit
    });
    let mut session = Session::new(&project, ResolveOptions::default());
    let unit = session.resolve_unit(FILE).unwrap();
    let string = session
        .lookup_type(&TypeName::new("java.lang.String"))
        .unwrap();

    let first = unit.type_binding(ids[0]).unwrap();
    let second = unit.type_binding(ids[1]).unwrap();
    assert_ne!(first, second);
    let a = session.lookup_type(&TypeName::new("p.A")).unwrap();
    let f = field(&mut session, a, "f");
    assert_eq!(unit.binding(ids[0]), Some(f));
    assert_eq!(unit.binding(ids[1]), Some(f));

    let c1 = session.type_arguments(first)[0];
    let c2 = session.type_arguments(second)[0];
    assert_ne!(c1, c2);
    assert!(matches!(session.binding(c1), Binding::Capture(_)));
    assert_eq!(session.type_bounds(c1), vec![string]);
    assert_eq!(session.type_bounds(c2), vec![string]);
    assert_eq!(session.erasure(c1), string);
    assert_ne!(session.key(c1), session.key(c2));

    // Resolving the same occurrence again yields the same capture.
    let again = session.resolve_unit(FILE).unwrap();
    assert_eq!(again.type_binding(ids[0]), Some(first));
}

/// `class <name> { List<? extends String> f; void m() { f; } }` in package `p`, with the read
/// of `f`.
fn capturing_unit(file: FileId, name: &str) -> (CompilationUnit, NodeId) {
    let mut b = HirBuilder::new(file);
    let mut unit = b.unit(Some("p"));
    unit.imports.push(b.import_single("java.util.List"));
    let mut decl = b.class(name);
    let string = b.ty("String");
    let bound = b.extends(string);
    let ty = b.generic("List", vec![bound]);
    decl.fields.push(b.field("f", ty));
    let read = b.name("f");
    let read_id = read.id;
    let stmt = b.expr_stmt(read);
    let body = b.block(vec![stmt]);
    let void = b.void();
    decl.methods.push(b.method("m", void, Vec::new()).with_body(body));
    unit.types.push(decl);
    (unit, read_id)
}

#[test]
fn captures_at_the_same_offset_of_different_units_have_different_keys() {
    let other = FileId::from_raw(1);
    let (first_unit, first_read) = capturing_unit(FILE, "A");
    let (second_unit, second_read) = capturing_unit(other, "B");
    let mut project = Project::with_minimal_jdk();
    project.set_unit(first_unit);
    project.set_unit(second_unit);

    let mut session = Session::new(&project, ResolveOptions::default());
    let first = session.resolve_unit(FILE).unwrap();
    let second = session.resolve_unit(other).unwrap();
    let c1 = session.type_arguments(first.type_binding(first_read).unwrap())[0];
    let c2 = session.type_arguments(second.type_binding(second_read).unwrap())[0];
    assert_ne!(c1, c2);

    let (k1, k2) = (session.key(c1), session.key(c2));
    assert_ne!(k1, k2);
    assert!(k1.starts_with("!0&Ljava/util/List;{0}+Ljava/lang/String;*"), "{k1}");
    assert!(k2.starts_with("!1&Ljava/util/List;{0}+Ljava/lang/String;*"), "{k2}");
    assert_eq!(session.resolve_key(&k1), Some(c1));
    assert_eq!(session.resolve_key(&k2), Some(c2));
}

#[test]
fn extends_wildcards_carry_their_bound() {
    let project = project_with(|b| {
        let mut unit = b.unit(Some("p"));
        let t = b.type_param("T", Vec::new());
        let mut x = b.class("X");
        x.type_params.push(t);
        let mut a = b.class("A");
        let string = b.ty("String");
        let bound = b.extends(string);
        let ty = b.generic("X", vec![bound]);
        a.fields.push(b.field("f", ty));
        unit.types.push(x);
        unit.types.push(a);
        unit
    });
    let mut session = Session::new(&project, ResolveOptions::default());
    let a = session.lookup_type(&TypeName::new("p.A")).unwrap();
    let x = session.lookup_type(&TypeName::new("p.X")).unwrap();
    let string = session
        .lookup_type(&TypeName::new("java.lang.String"))
        .unwrap();
    let f = field(&mut session, a, "f");
    let ty = session.binding(f).as_variable().unwrap().ty;

    assert_eq!(session.declaration(ty), x);
    let wildcard = session.type_arguments(ty)[0];
    assert_eq!(session.type_bounds(wildcard), vec![string]);
    assert_eq!(session.lower_bound(wildcard), None);
}

#[test]
fn generic_method_instances_are_shared_per_argument_list() {
    let mut ids = Vec::new();
    let project = project_with(|b| {
        let mut unit = b.unit(Some("p"));
        unit.imports.push(b.import_single("java.util.Collections"));
        let mut a = b.class("A");
        let args = [b.string("a"), b.string("b"), b.int(1)];
        let mut stmts = Vec::new();
        for arg in args {
            let target = b.name("Collections");
            let call = b.call(Some(target), "singletonList", vec![arg]);
            let stmt = b.expr_stmt(call);
            ids.push(expr_id(&stmt));
            stmts.push(stmt);
        }
        let body = b.block(stmts);
        let void = b.void();
        a.methods.push(b.method("m", void, Vec::new()).with_body(body));
        unit.types.push(a);
        unit
    });
    let mut session = Session::new(&project, ResolveOptions::default());
    let unit = session.resolve_unit(FILE).unwrap();

    let with_a = unit.binding(ids[0]).unwrap();
    let with_b = unit.binding(ids[1]).unwrap();
    let with_int = unit.binding(ids[2]).unwrap();
    assert_eq!(with_a, with_b);
    assert_ne!(with_a, with_int);
    assert_eq!(session.declaration(with_a), session.declaration(with_int));
    assert_ne!(session.declaration(with_a), with_a);

    let integer = session
        .lookup_type(&TypeName::new("java.lang.Integer"))
        .unwrap();
    assert_eq!(session.type_arguments(with_int), vec![integer]);
    let key = session.key(with_a);
    assert!(key.contains('%'), "{key}");
    assert_eq!(session.resolve_key(&key), Some(with_a));
}

#[test]
fn only_final_fields_with_constant_initializers_are_constants() {
    let project = project_with(|b| {
        let mut unit = b.unit(Some("p"));
        let mut e = b.enum_decl("E");
        e.enum_constants.push(b.enum_constant("A"));

        let mut c = b.class("C");
        let int = b.prim(PrimitiveType::Int);
        let value = b.int(42);
        c.fields.push(
            b.field("MAX", int)
                .with_modifiers(Modifiers::static_final())
                .with_initializer(value),
        );
        let int = b.prim(PrimitiveType::Int);
        let value = b.int(1);
        c.fields.push(b.field("plain", int).with_initializer(value));
        let string = b.ty("String");
        let lhs = b.string("v");
        let rhs = b.int(1);
        let concat = b.binary(BinaryOp::Add, lhs, rhs);
        c.fields.push(
            b.field("S", string)
                .with_modifiers(Modifiers::static_final())
                .with_initializer(concat),
        );
        unit.types.push(e);
        unit.types.push(c);
        unit
    });
    let mut session = Session::new(&project, ResolveOptions::default());
    let e = session.lookup_type(&TypeName::new("p.E")).unwrap();
    let c = session.lookup_type(&TypeName::new("p.C")).unwrap();

    let constant = field(&mut session, e, "A");
    assert!(session.binding(constant).as_variable().unwrap().is_enum_constant());
    assert_eq!(session.constant_value(constant), None);

    let max = field(&mut session, c, "MAX");
    let plain = field(&mut session, c, "plain");
    let s = field(&mut session, c, "S");
    assert_eq!(session.constant_value(max), Some(ConstValue::Int(42)));
    assert_eq!(session.constant_value(plain), None);
    assert_eq!(session.constant_value(s), Some(ConstValue::String("v1".into())));
}
