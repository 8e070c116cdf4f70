use std::io;
use std::sync::{Arc, Mutex};

use nova_bindings::{
    resolve_batch, BatchSummary, BindingId, BindingRequestor, ResolveOptions, ResolvedUnit,
    Session,
};
use nova_core::{FileId, TypeName};
use pretty_assertions::assert_eq;
use tracing_subscriber::fmt::MakeWriter;

use crate::fixture::{project_with, FILE};

#[derive(Default)]
struct Collector {
    units: Vec<FileId>,
    nodes: usize,
    keys: Vec<(String, String)>,
}

impl BindingRequestor for Collector {
    fn accept_unit(&mut self, _session: &mut Session<'_>, unit: ResolvedUnit) {
        self.units.push(unit.file());
        self.nodes += unit.nodes().len();
    }

    fn accept_binding(&mut self, session: &mut Session<'_>, key: &str, binding: BindingId) {
        self.keys.push((key.to_string(), session.key(binding)));
    }
}

#[test]
fn batches_deliver_units_then_keys() {
    let project = project_with(|b| {
        let mut unit = b.unit(Some("p"));
        let mut a = b.class("A");
        let string = b.ty("String");
        a.fields.push(b.field("f", string));
        unit.types.push(a);
        unit
    });

    let mut collector = Collector::default();
    let summary = resolve_batch(
        &project,
        &[FILE, FileId::from_raw(9)],
        &["Lp/A;", "Lp/Missing;", "Ljava/lang/String;", "Lp/A<"],
        ResolveOptions::default(),
        &mut collector,
    );

    assert_eq!(summary, BatchSummary { units: 1, bindings: 2 });
    assert_eq!(collector.units, vec![FILE]);
    assert!(collector.nodes > 0);
    assert_eq!(
        collector.keys,
        vec![
            ("Lp/A;".to_string(), "Lp/A;".to_string()),
            ("Ljava/lang/String;".to_string(), "Ljava/lang/String;".to_string()),
        ]
    );
}

#[test]
fn requestors_can_use_the_session_they_are_handed() {
    struct Superclasses(Vec<Option<String>>);

    impl BindingRequestor for Superclasses {
        fn accept_unit(&mut self, _session: &mut Session<'_>, _unit: ResolvedUnit) {}

        fn accept_binding(&mut self, session: &mut Session<'_>, _key: &str, binding: BindingId) {
            let superclass = session.superclass(binding);
            let name = superclass
                .and_then(|s| session.binary_name(s))
                .map(TypeName::to_string);
            self.0.push(name);
        }
    }

    let project = nova_bindings::Project::with_minimal_jdk();
    let mut requestor = Superclasses(Vec::new());
    let keys: [&str; 2] = ["Ljava/lang/Integer;", "Ljava/lang/Object;"];
    let summary = resolve_batch(&project, &[], &keys, ResolveOptions::default(), &mut requestor);

    assert_eq!(summary.bindings, 2);
    assert_eq!(
        requestor.0,
        vec![Some("java.lang.Number".to_string()), None]
    );
}

#[derive(Clone, Default)]
struct SharedLogBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedLogBuffer {
    fn as_string(&self) -> String {
        let bytes = self.0.lock().expect("log buffer mutex poisoned");
        String::from_utf8_lossy(&bytes).to_string()
    }
}

struct SharedLogWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut out = self.0.lock().expect("log buffer mutex poisoned");
        out.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SharedLogBuffer {
    type Writer = SharedLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SharedLogWriter(self.0.clone())
    }
}

#[test]
fn missing_units_are_logged_not_delivered() {
    let project = nova_bindings::Project::with_minimal_jdk();
    let logs = SharedLogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(logs.clone())
        .finish();

    let mut collector = Collector::default();
    let summary = tracing::subscriber::with_default(subscriber, || {
        let keys: [&str; 0] = [];
        resolve_batch(&project, &[FILE], &keys, ResolveOptions::default(), &mut collector)
    });

    assert_eq!(summary, BatchSummary::default());
    assert!(collector.units.is_empty());
    let text = logs.as_string();
    assert!(
        text.contains("requested unit is not in the project"),
        "expected a missing-unit event, got:\n{text}"
    );
}
