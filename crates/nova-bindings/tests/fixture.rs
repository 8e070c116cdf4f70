use nova_bindings::Project;
use nova_core::FileId;
use nova_hir::{CompilationUnit, HirBuilder, NodeId, Stmt, StmtKind};

pub const FILE: FileId = FileId::from_raw(0);

/// A project over the minimal JDK plus one source unit in [`FILE`].
pub fn project_with(build: impl FnOnce(&mut HirBuilder) -> CompilationUnit) -> Project {
    let mut b = HirBuilder::new(FILE);
    let unit = build(&mut b);
    let mut project = Project::with_minimal_jdk();
    project.set_unit(unit);
    project
}

/// The expression of an expression statement, or the initializer of a local.
pub fn expr_id(stmt: &Stmt) -> NodeId {
    match &stmt.kind {
        StmtKind::Expr(expr) => expr.id,
        StmtKind::Local(local) => local.initializer.as_ref().map(|init| init.id).unwrap(),
        other => panic!("no expression in {other:?}"),
    }
}
