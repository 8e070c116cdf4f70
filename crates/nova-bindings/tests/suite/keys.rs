use nova_bindings::{validate_key, BindingId, KeyParseError, Project, ResolveOptions, Session};
use nova_classfile::BaseType;
use nova_core::{Name, PackageName, TypeName};
use nova_hir::{Modifiers, NodeId, PrimitiveType};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::fixture::{project_with, FILE};

#[test]
fn member_types_of_raw_types_keep_the_raw_enclosing_type() {
    let project = project_with(|b| {
        let mut unit = b.unit(Some("p"));
        let t = b.type_param("T", Vec::new());
        let mut x = b.class("X");
        x.type_params.push(t);
        let mut y = b.class("Y");
        y.modifiers = Modifiers::static_();
        let ty = b.ty("Y");
        y.fields.push(b.field("y", ty));
        x.nested.push(y);
        unit.types.push(x);
        unit
    });
    let mut session = Session::new(&project, ResolveOptions::default());
    let y = session.lookup_type(&TypeName::new("p.X$Y")).unwrap();
    let field = session.declared_fields(y)[0];
    let ty = session.binding(field).as_variable().unwrap().ty;

    assert_eq!(session.key(ty), "Lp/X<>.Y;");
    assert_eq!(session.key(field), "Lp/X$Y;.y)Lp/X<>.Y;");
    assert_eq!(session.declaration(ty), y);
    assert_eq!(session.resolve_key("Lp/X<>.Y;"), Some(ty));
    assert_eq!(session.resolve_key("Lp/X$Y;.y)Lp/X<>.Y;"), Some(field));
}

fn generic_project(param: &mut Option<NodeId>) -> Project {
    project_with(|b| {
        let mut unit = b.unit(Some("p"));
        unit.imports.push(b.import_single("java.util.List"));
        let t = b.type_param("T", Vec::new());
        let mut a = b.class("A");
        a.type_params.push(t);
        let element = b.ty("T");
        let list = b.generic("List", vec![element]);
        a.fields.push(b.field("items", list));

        let u_ty = b.ty("U");
        let u = b.param("u", u_ty);
        *param = Some(u.id);
        let int = b.prim(PrimitiveType::Int);
        let ints = b.array(int, 1);
        let i = b.param("i", ints);
        let ret = b.ty("U");
        let mut pick = b.method("pick", ret, vec![u, i]);
        pick.type_params.push(b.type_param("U", Vec::new()));
        let body = b.block(Vec::new());
        a.methods.push(pick.with_body(body));
        unit.types.push(a);
        unit
    })
}

#[test]
fn keys_name_the_same_binding_in_every_session() {
    let mut param = None;
    let project = generic_project(&mut param);

    let mut first = Session::new(&project, ResolveOptions::default());
    let unit = first.resolve_unit(FILE).unwrap();
    let a = first.lookup_type(&TypeName::new("p.A")).unwrap();
    let t = first.type_parameters(a)[0];
    let items = first.declared_fields(a)[0];
    let items_ty = first.binding(items).as_variable().unwrap().ty;
    let pick = first
        .declared_methods(a)
        .into_iter()
        .find(|&m| first.binding(m).as_method().is_some_and(|m| m.name == Name::from("pick")))
        .unwrap();
    let u = first.type_parameters(pick)[0];
    let u_param = unit.binding(param.unwrap()).unwrap();
    let package = first.lookup_package(&PackageName::from_dotted("p")).unwrap();
    let int = first.primitive(BaseType::Int);
    let ints = first.array_of(int, 1);
    let raw = first.raw_type(a).unwrap();

    let bindings: Vec<BindingId> = vec![a, t, items, items_ty, pick, u, u_param, package, ints, raw];
    let keys = bindings.iter().map(|&b| first.key(b)).collect::<Vec<_>>();
    for (&binding, key) in bindings.iter().zip(&keys) {
        assert_eq!(first.resolve_key(key), Some(binding), "{key}");
    }

    let mut second = Session::new(&project, ResolveOptions::default());
    for key in &keys {
        let binding = second.resolve_key(key).unwrap_or_else(|| panic!("{key} did not resolve"));
        assert_eq!(&second.key(binding), key);
    }
}

#[test]
fn malformed_and_dangling_keys_resolve_to_nothing() {
    let mut param = None;
    let project = generic_project(&mut param);
    let mut session = Session::new(&project, ResolveOptions::default());

    for key in ["", "Lp/A<", "L;", "Lp/A;;"] {
        assert!(validate_key(key, 64).is_err(), "{key}");
        assert_eq!(session.resolve_key(key), None, "{key}");
    }
    for key in ["Lp/Nope;", "Lp/A;.nope()V", "Lp/A;.missing)I", "q/r"] {
        assert_eq!(validate_key(key, 64), Ok(()), "{key}");
        assert_eq!(session.resolve_key(key), None, "{key}");
    }
}

#[test]
fn nesting_beyond_the_configured_depth_is_rejected() {
    let key = "Ljava/util/List<Ljava/util/List<Ljava/util/List<Ljava/lang/String;>;>;>;";
    assert_eq!(validate_key(key, 2), Err(KeyParseError::TooDeep { limit: 2 }));

    let project = Project::with_minimal_jdk();
    let mut shallow = Session::new(
        &project,
        ResolveOptions {
            max_key_depth: 2,
            ..ResolveOptions::default()
        },
    );
    assert_eq!(shallow.resolve_key(key), None);
    let mut deep = Session::new(&project, ResolveOptions::default());
    assert!(deep.resolve_key(key).is_some());
}

proptest! {
    #[test]
    fn arbitrary_keys_never_panic(key in "[LTp/Xj;<>.()%#!{}*+:@\\[IV0-9-]{0,32}") {
        let project = Project::with_minimal_jdk();
        let mut session = Session::new(&project, ResolveOptions::default());
        let _ = validate_key(&key, 8);
        if let Some(binding) = session.resolve_key(&key) {
            let _ = session.key(binding);
        }
    }
}
