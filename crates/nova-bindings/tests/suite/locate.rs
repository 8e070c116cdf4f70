use nova_bindings::{locate_key, Element, ElementOrigin, ResolveOptions, Session};
use nova_core::{Name, PackageName, TextRange, TypeName};
use nova_hir::{NodeId, PrimitiveType};
use pretty_assertions::assert_eq;

use crate::fixture::{project_with, FILE};

struct Ids {
    param: NodeId,
    param_range: TextRange,
}

fn project(ids: &mut Option<Ids>) -> nova_bindings::Project {
    project_with(|b| {
        let mut unit = b.unit(Some("p"));
        let mut a = b.class("A");
        let string = b.ty("String");
        a.fields.push(b.field("f", string));
        let string = b.ty("String");
        let s = b.param("s", string);
        *ids = Some(Ids {
            param: s.id,
            param_range: s.range,
        });
        let int = b.prim(PrimitiveType::Int);
        let ints = b.array(int, 1);
        let xs = b.param("xs", ints);
        let void = b.void();
        let body = b.block(Vec::new());
        a.methods.push(b.method("run", void, vec![s, xs]).with_body(body));
        unit.types.push(a);
        unit
    })
}

fn type_a() -> Element {
    Element::Type {
        name: TypeName::new("p.A"),
        origin: ElementOrigin::Source(FILE),
    }
}

fn run_method() -> Element {
    Element::Method {
        owner: TypeName::new("p.A"),
        name: Name::from("run"),
        descriptor: "(Ljava/lang/String;[I)V".to_string(),
        origin: ElementOrigin::Source(FILE),
    }
}

#[test]
fn keys_locate_until_the_declaration_disappears() {
    let mut ids = None;
    let mut project = project(&mut ids);

    let mut session = Session::new(&project, ResolveOptions::default());
    let a = session.lookup_type(&TypeName::new("p.A")).unwrap();
    let run = session
        .declared_methods(a)
        .into_iter()
        .find(|&m| session.binding(m).as_method().is_some_and(|m| m.name == Name::from("run")))
        .unwrap();
    let run_key = session.key(run);
    drop(session);

    assert_eq!(locate_key(&project, "Lp/A;"), Some(type_a()));
    assert_eq!(locate_key(&project, &run_key), Some(run_method()));

    project.remove_unit(FILE);
    assert_eq!(locate_key(&project, "Lp/A;"), None);
    assert_eq!(locate_key(&project, &run_key), None);
}

#[test]
fn parameters_locate_through_their_method() {
    let mut ids = None;
    let project = project(&mut ids);
    let ids = ids.unwrap();

    let mut session = Session::new(&project, ResolveOptions::default());
    let unit = session.resolve_unit(FILE).unwrap();
    let param = unit.binding(ids.param).unwrap();

    let element = Element::Local {
        member: Box::new(run_method()),
        name: Name::from("s"),
        range: ids.param_range,
    };
    assert_eq!(session.locate(param), Some(element.clone()));

    let mut fresh = Session::new(&project, ResolveOptions::default());
    let created = fresh.create_bindings(&[element])[0].unwrap();
    assert_eq!(fresh.key(created), session.key(param));
}

#[test]
fn created_bindings_follow_the_order_of_the_elements() {
    let mut ids = None;
    let project = project(&mut ids);
    let mut session = Session::new(&project, ResolveOptions::default());
    let a = session.lookup_type(&TypeName::new("p.A")).unwrap();
    let f = session.declared_fields(a)[0];
    let string = session
        .lookup_type(&TypeName::new("java.lang.String"))
        .unwrap();
    let java_lang = session
        .lookup_package(&PackageName::from_dotted("java.lang"))
        .unwrap();

    let elements = [
        Element::Field {
            owner: TypeName::new("p.A"),
            name: Name::from("f"),
            origin: ElementOrigin::Source(FILE),
        },
        Element::Type {
            name: TypeName::new("java.lang.String"),
            origin: ElementOrigin::Dependency,
        },
        Element::Type {
            name: TypeName::new("p.Gone"),
            origin: ElementOrigin::Source(FILE),
        },
        Element::Package {
            name: PackageName::from_dotted("java.lang"),
        },
        type_a(),
    ];
    assert_eq!(
        session.create_bindings(&elements),
        vec![Some(f), Some(string), None, Some(java_lang), Some(a)]
    );

    for (element, binding) in elements.iter().zip([f, string]) {
        assert_eq!(session.locate(binding).as_ref(), Some(element));
    }
}
