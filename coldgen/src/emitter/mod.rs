//! Emitters and the shared run loop.
//!
//! An [`Emitter`] knows how to render the project-level files of one target
//! and one file per domain class. [`run_emitter`] drives it: wipe the output
//! root, write the project files, then walk the classes in document order.

pub mod java;
pub mod model;
pub mod schema;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::domain::{ClassEntry, Resolver};
use crate::error::{CoreResult, WriteError};
use crate::settings::GenerationContext;
use crate::writer::{FileWriter, WriteResult};

pub use java::ClassEmitter;
pub use model::ModelEmitter;
pub use schema::SchemaEmitter;

/// A rendered file, relative to the emitter's output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: PathBuf,
    pub content: String,
}

impl RenderedFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// One output target.
pub trait Emitter {
    /// Short identifier used to select the target (`java`, `model`, `schema`).
    fn id(&self) -> &'static str;

    /// Human-readable name.
    fn name(&self) -> &'static str;

    /// Extension of per-class files, without the dot.
    fn file_extension(&self) -> &'static str;

    /// Directory owned by this emitter.
    fn output_root(&self) -> &Path;

    /// Project-level files (build descriptor, manifests).
    fn project_files(&self, ctx: &GenerationContext) -> CoreResult<Vec<RenderedFile>>;

    /// Render one class. `Ok(None)` means the target has no file for it.
    fn render_class(
        &self,
        entry: &ClassEntry,
        ctx: &GenerationContext,
    ) -> CoreResult<Option<RenderedFile>>;
}

/// Receives progress notifications from [`run_emitter`].
pub trait ProgressSink {
    fn on_start(&mut self, _target: &str, _total: usize) {}

    /// Called once per class, after it has been counted.
    fn on_class(&mut self, _processed: usize, _total: usize, _label: &str) {}

    fn on_finish(&mut self, _target: &str, _report: &EmitReport) {}
}

/// Progress sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {}

/// Outcome of one emitter run.
#[derive(Debug)]
pub struct EmitReport {
    /// Emitter id.
    pub target: &'static str,
    /// Classes visited, including those without an output file.
    pub processed: usize,
    /// Number of classes in the model.
    pub total: usize,
    /// Files written (or captured, in dry-run mode).
    pub written: Vec<WriteResult>,
    /// Classes for which the target produces no file.
    pub skipped: Vec<String>,
    /// Files that could not be written.
    pub failures: Vec<WriteError>,
    pub elapsed: Duration,
}

impl EmitReport {
    fn new(target: &'static str, total: usize) -> Self {
        Self {
            target,
            processed: 0,
            total,
            written: Vec::new(),
            skipped: Vec::new(),
            failures: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// True when every file was written.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total bytes written.
    pub fn bytes(&self) -> usize {
        self.written.iter().map(WriteResult::bytes).sum()
    }

    /// Record a write outcome; failures are logged and kept.
    fn record(&mut self, outcome: Result<WriteResult, WriteError>) {
        match outcome {
            Ok(result) => self.written.push(result),
            Err(err) => {
                error!(target_id = self.target, error = %err, "failed to write file");
                self.failures.push(err);
            }
        }
    }
}

/// Run one emitter over the whole model.
///
/// Fails on anything that breaks the output as a whole: the root cannot be
/// prepared, a project file or a class cannot be rendered. A file that cannot
/// be written is recorded in the report and the run continues.
pub fn run_emitter(
    emitter: &dyn Emitter,
    ctx: &GenerationContext,
    writer: &FileWriter,
    progress: &mut dyn ProgressSink,
) -> CoreResult<EmitReport> {
    let started = Instant::now();
    let root = emitter.output_root();
    let total = ctx.model.class_count();
    let mut report = EmitReport::new(emitter.id(), total);

    info!(
        target_id = emitter.id(),
        root = %root.display(),
        version = %ctx.settings.lib_version,
        classes = total,
        dry_run = writer.is_dry_run(),
        "starting {}",
        emitter.name()
    );
    progress.on_start(emitter.id(), total);

    writer.clean_dir(root)?;

    for file in emitter.project_files(ctx)? {
        report.record(writer.write(&root.join(&file.path), &file.content));
    }

    for entry in ctx.model.classes() {
        report.processed += 1;
        let label = entry.label();
        progress.on_class(report.processed, total, &label);

        match emitter.render_class(entry, ctx)? {
            Some(file) => {
                debug!(target_id = emitter.id(), class = %label, path = %file.path.display(), "rendered class");
                report.record(writer.write(&root.join(&file.path), &file.content));
            }
            None => {
                debug!(target_id = emitter.id(), class = %label, "no output for class");
                report.skipped.push(label);
            }
        }
    }

    report.elapsed = started.elapsed();
    info!(
        target_id = emitter.id(),
        processed = report.processed,
        files = report.written.len(),
        failures = report.failures.len(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "finished {}",
        emitter.name()
    );
    progress.on_finish(emitter.id(), &report);
    Ok(report)
}

/// `src/domain/<ns>/<kebab><suffix>` for the TypeScript targets.
pub(crate) fn script_module_path(entry: &ClassEntry, suffix: &str) -> String {
    let mut path = String::from("src/domain/");
    for segment in &entry.namespace {
        path.push_str(segment);
        path.push('/');
    }
    path.push_str(&crate::render::kebab_name(entry.name()));
    path.push_str(suffix);
    path
}

/// Log an import that resolved to nothing.
pub(crate) fn log_import_miss(target: &str, class: &str, ty: &str) {
    debug!(target_id = target, class, ty, "no import for type");
}

/// True when `ty` names a class other than `current`.
pub(crate) fn other_class<'a>(
    resolver: &Resolver<'a>,
    current: &str,
    ty: &str,
) -> Option<&'a ClassEntry> {
    resolver.find_class(ty).filter(|e| e.name() != current)
}
