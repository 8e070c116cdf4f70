use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use nova_classfile::{ClassProvider, StubIndex};
use nova_core::FileId;
use nova_hir::CompilationUnit;

/// The current snapshot of source units plus the dependency index they compile against.
///
/// Sessions borrow a project; replacing or removing a unit (discarding a working copy) is only
/// possible between sessions.
#[derive(Clone)]
pub struct Project {
    units: BTreeMap<FileId, Arc<CompilationUnit>>,
    classes: Arc<dyn ClassProvider + Send + Sync>,
}

impl Project {
    pub fn new(classes: impl ClassProvider + Send + Sync + 'static) -> Self {
        Self {
            units: BTreeMap::new(),
            classes: Arc::new(classes),
        }
    }

    /// A project compiling against [`StubIndex::minimal_jdk`].
    pub fn with_minimal_jdk() -> Self {
        Self::new(StubIndex::minimal_jdk())
    }

    /// Adds `unit`, replacing any unit with the same file id.
    pub fn set_unit(&mut self, unit: CompilationUnit) -> Option<Arc<CompilationUnit>> {
        self.units.insert(unit.file, Arc::new(unit))
    }

    pub fn remove_unit(&mut self, file: FileId) -> Option<Arc<CompilationUnit>> {
        self.units.remove(&file)
    }

    pub fn unit(&self, file: FileId) -> Option<&CompilationUnit> {
        self.units.get(&file).map(|unit| &**unit)
    }

    pub fn units(&self) -> impl Iterator<Item = &CompilationUnit> {
        self.units.values().map(|unit| &**unit)
    }

    pub fn classes(&self) -> &dyn ClassProvider {
        &*self.classes
    }
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("units", &self.units.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
