//! Command workflows shared by the binary and the tests.
//!
//! A [`Project`] is a loaded configuration plus its definition documents.
//! It runs emitters for real or in dry-run mode, and compares a dry run with
//! the tree already on disk.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use coldgen::{run_emitter, EmitReport, FileWriter, GenerationContext, ProgressSink};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::Config;
use crate::definitions::{Definitions, Target};
use crate::error::CliResult;

/// A configuration with its definitions loaded and the model resolved.
pub struct Project {
    config: Config,
    definitions: Definitions,
    context: GenerationContext,
}

/// Summary numbers for the `stats` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub lib_version: String,
    pub classes: usize,
    pub enums: usize,
    pub packages: usize,
}

/// A difference between generated output and the tree on disk.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Drift {
    /// Would be generated but is not on disk.
    Missing(PathBuf),
    /// On disk with different content.
    Changed(PathBuf),
    /// On disk but would no longer be generated.
    Extra(PathBuf),
}

impl fmt::Display for Drift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(path) => write!(f, "missing  {}", path.display()),
            Self::Changed(path) => write!(f, "changed  {}", path.display()),
            Self::Extra(path) => write!(f, "extra    {}", path.display()),
        }
    }
}

impl Project {
    /// Load definitions and build the generation context.
    pub fn load(config: Config) -> CliResult<Self> {
        config.validate()?;
        let definitions = Definitions::load(&config.definition)?;
        let context = definitions.context(&config)?;
        Ok(Self {
            config,
            definitions,
            context,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn context(&self) -> &GenerationContext {
        &self.context
    }

    pub fn stats(&self) -> Stats {
        Stats {
            lib_version: self.config.lib_version.clone(),
            classes: self.context.model.class_count(),
            enums: self.context.model.enum_count(),
            packages: self.context.model.package_count(),
        }
    }

    /// Run the selected targets in order. An empty selection means all.
    pub fn generate(
        &self,
        targets: &[Target],
        dry_run: bool,
        progress: &mut dyn ProgressSink,
    ) -> CliResult<Vec<EmitReport>> {
        let writer = FileWriter::new(dry_run);
        let mut reports = Vec::new();
        for target in selected(targets) {
            let emitter = self.definitions.emitter(target, &self.config)?;
            let report = run_emitter(emitter.as_ref(), &self.context, &writer, progress)?;
            reports.push(report);
        }
        Ok(reports)
    }

    /// Compare a dry run of the selected targets with the files on disk.
    pub fn check(&self, targets: &[Target]) -> CliResult<Vec<Drift>> {
        let writer = FileWriter::new(true);
        let mut drift = Vec::new();

        for target in selected(targets) {
            let emitter = self.definitions.emitter(target, &self.config)?;
            let report =
                run_emitter(emitter.as_ref(), &self.context, &writer, &mut coldgen::NoopProgress)?;

            let mut expected = BTreeSet::new();
            for result in &report.written {
                let path = result.path().to_path_buf();
                let content = result.dry_run_content().unwrap_or_default();
                match std::fs::read_to_string(&path) {
                    Ok(existing) if existing == content => {}
                    Ok(_) => drift.push(Drift::Changed(path.clone())),
                    Err(_) => drift.push(Drift::Missing(path.clone())),
                }
                expected.insert(path);
            }

            drift.extend(
                files_under(emitter.output_root())
                    .into_iter()
                    .filter(|path| !expected.contains(path))
                    .map(Drift::Extra),
            );
            debug!(target_id = target.as_str(), expected = expected.len(), "checked target");
        }

        info!(differences = drift.len(), "check complete");
        Ok(drift)
    }
}

/// The requested targets, deduplicated in canonical order.
pub fn selected(targets: &[Target]) -> Vec<Target> {
    if targets.is_empty() {
        return Target::ALL.to_vec();
    }
    let set: BTreeSet<Target> = targets.iter().copied().collect();
    set.into_iter().collect()
}

fn files_under(root: &Path) -> Vec<PathBuf> {
    if !root.exists() {
        return Vec::new();
    }
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}
