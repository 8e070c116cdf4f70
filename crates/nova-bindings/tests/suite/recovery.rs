use nova_bindings::{NodeKind, ResolveOptions, Session};
use nova_core::TextRange;
use nova_hir::{NodeFlags, NodeId, PrimitiveType};
use pretty_assertions::assert_eq;

use crate::fixture::{expr_id, project_with, FILE};

#[test]
fn missing_expressions_are_malformed_and_recovered() {
    let mut ids = None;
    let project = project_with(|b| {
        let mut unit = b.unit(Some("p"));
        let mut a = b.class("A");
        let int = b.prim(PrimitiveType::Int);
        let missing = b.missing_expr();
        let stmt = b.local("x", int, Some(missing));
        ids = Some((stmt.id, expr_id(&stmt)));
        let body = b.block(vec![stmt]);
        let void = b.void();
        a.methods.push(b.method("m", void, Vec::new()).with_body(body));
        unit.types.push(a);
        unit
    });
    let (stmt, missing) = ids.unwrap();
    let mut session = Session::new(&project, ResolveOptions::default());
    let unit = session.resolve_unit(FILE).unwrap();

    let node = unit.node(missing).unwrap();
    assert_eq!(node.kind, NodeKind::Expr);
    assert!(node.is_malformed());
    assert!(node.is_recovered());
    assert_eq!(node.binding, None);
    assert_eq!(node.type_binding, None);

    let stmt = unit.node(stmt).unwrap();
    assert!(!stmt.is_malformed());
    assert!(!stmt.is_recovered());
}

#[test]
fn unresolved_types_become_missing_only_with_binding_recovery() {
    let mut ty_id = None;
    let project = project_with(|b| {
        let mut unit = b.unit(Some("p"));
        let mut a = b.class("A");
        let ty = b.ty("Nope");
        ty_id = Some(ty.id);
        a.fields.push(b.field("f", ty));
        unit.types.push(a);
        unit
    });
    let ty_id = ty_id.unwrap();

    let mut strict = Session::new(&project, ResolveOptions::default());
    let unit = strict.resolve_unit(FILE).unwrap();
    assert_eq!(unit.binding(ty_id), None);

    let options = ResolveOptions {
        binding_recovery: true,
        ..ResolveOptions::default()
    };
    let mut lenient = Session::new(&project, options);
    let unit = lenient.resolve_unit(FILE).unwrap();
    let node = unit.node(ty_id).unwrap();
    assert_eq!(node.kind, NodeKind::TypeRef);
    assert!(node.is_recovered());
    assert!(!node.is_malformed());
    let missing = node.binding.unwrap();
    assert!(lenient.binding(missing).as_type().unwrap().is_missing());
    assert_eq!(lenient.locate(missing), None);
}

#[test]
fn malformed_statements_are_skipped_without_statement_recovery() {
    let mut ids = None;
    let project = project_with(|b| {
        let mut unit = b.unit(Some("p"));
        let mut a = b.class("A");
        let one = b.int(1);
        let mut stmt = b.expr_stmt(one);
        stmt.flags = NodeFlags::MALFORMED;
        ids = Some((stmt.id, expr_id(&stmt)));
        let body = b.block(vec![stmt]);
        let void = b.void();
        a.methods.push(b.method("m", void, Vec::new()).with_body(body));
        unit.types.push(a);
        unit
    });
    let (stmt, expr) = ids.unwrap();

    let mut session = Session::new(&project, ResolveOptions::default());
    let unit = session.resolve_unit(FILE).unwrap();
    assert!(unit.node(stmt).unwrap().is_malformed());
    let int = session.primitive(nova_classfile::BaseType::Int);
    assert_eq!(unit.type_binding(expr), Some(int));

    let options = ResolveOptions {
        statements_recovery: false,
        ..ResolveOptions::default()
    };
    let mut session = Session::new(&project, options);
    let unit = session.resolve_unit(FILE).unwrap();
    assert!(unit.node(stmt).unwrap().is_malformed());
    assert_eq!(unit.node(expr), None);
}

#[test]
fn nodes_report_the_ranges_they_were_parsed_with() {
    let mut spans: Vec<(NodeId, TextRange)> = Vec::new();
    let project = project_with(|b| {
        let mut unit = b.unit(Some("p"));
        let mut a = b.class("A");
        spans.push((a.id, a.range));
        let string = b.ty("String");
        spans.push((string.id, string.range));
        let field = b.field("name", string);
        spans.push((field.id, field.range));
        a.fields.push(field);
        unit.types.push(a);
        unit
    });
    let mut session = Session::new(&project, ResolveOptions::default());
    let unit = session.resolve_unit(FILE).unwrap();

    for (id, range) in spans {
        let node = unit.node(id).unwrap();
        assert_eq!(node.start(), u32::from(range.start()));
        assert_eq!(node.length(), u32::from(range.len()));
        assert!(!node.is_recovered());
    }
    let kinds = unit.nodes().iter().map(|node| node.kind).collect::<Vec<_>>();
    assert_eq!(
        kinds,
        vec![NodeKind::Package, NodeKind::Type, NodeKind::Field, NodeKind::TypeRef]
    );
}
