//! Batch resolution with results delivered through callbacks.

use nova_core::FileId;

use crate::binding::BindingId;
use crate::options::ResolveOptions;
use crate::project::Project;
use crate::resolver::ResolvedUnit;
use crate::session::Session;

/// Receives the results of [`resolve_batch`].
///
/// Both callbacks get the session the results belong to, so bindings can be inspected, keyed
/// or located while it is still alive.
pub trait BindingRequestor {
    /// Called once per requested unit that exists in the project, in request order.
    fn accept_unit(&mut self, session: &mut Session<'_>, unit: ResolvedUnit);

    /// Called once per requested key that names a binding, after every unit was delivered.
    fn accept_binding(&mut self, session: &mut Session<'_>, key: &str, binding: BindingId);
}

/// What a batch delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub units: usize,
    pub bindings: usize,
}

/// Resolves `files` and `keys` in one session and hands every result to `requestor`.
///
/// Files missing from the project and keys that name nothing produce no callback.
pub fn resolve_batch<K: AsRef<str>>(
    project: &Project,
    files: &[FileId],
    keys: &[K],
    options: ResolveOptions,
    requestor: &mut dyn BindingRequestor,
) -> BatchSummary {
    let _span = tracing::debug_span!("resolve_batch", files = files.len(), keys = keys.len()).entered();
    let mut session = Session::new(project, options);
    let mut summary = BatchSummary::default();
    for &file in files {
        match session.resolve_unit(file) {
            Some(unit) => {
                summary.units += 1;
                requestor.accept_unit(&mut session, unit);
            }
            None => tracing::debug!(?file, "requested unit is not in the project"),
        }
    }
    for key in keys {
        let key = key.as_ref();
        if let Some(binding) = session.resolve_key(key) {
            summary.bindings += 1;
            requestor.accept_binding(&mut session, key, binding);
        }
    }
    tracing::debug!(units = summary.units, bindings = summary.bindings, "batch complete");
    summary
}
